//! Bakes deployment overrides into the firmware.
//!
//! Any `PLANTY_*` variable found in a `.env` file next to this crate (or in
//! the build environment) is passed to the compiler, where
//! `planty_firmware::config` picks it up with `option_env!`.

use std::env;

use planty_core::config::OVERRIDE_KEYS;

fn main() {
    println!("cargo:rerun-if-changed=.env");

    if let Ok(env_path) = dotenvy::dotenv() {
        println!("cargo:warning=Loaded config from {:?}", env_path);
    }

    for key in OVERRIDE_KEYS {
        println!("cargo:rerun-if-env-changed={}", key);
        if let Ok(value) = env::var(key) {
            println!("cargo:rustc-env={}={}", key, value);
        }
    }

    println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
}
