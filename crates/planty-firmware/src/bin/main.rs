#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::timer::timg::TimerGroup;
use log::info;
use planty_core::Controller;
use planty_core::pump::PumpDriver;
use planty_core::radio::OokTransmitter;
use planty_firmware::config::load_config;
use planty_firmware::control::control_task;
use planty_firmware::hardware::{BoardSensors, PUMP_ACTIVE_LOW};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!(log::LevelFilter::Info);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("=== Planty Starting ===");

    let controller_config = load_config();
    info!(
        "Night threshold {} ({:?}), moisture threshold {} ({:?})",
        controller_config.night_threshold,
        controller_config.daylight_polarity,
        controller_config.moisture_threshold,
        controller_config.dryness_polarity
    );

    // Analog inputs share ADC1
    let mut adc_config = AdcConfig::new();
    let light_pin = adc_config.enable_pin(peripherals.GPIO1, Attenuation::_11dB);
    let moisture_pin = adc_config.enable_pin(peripherals.GPIO2, Attenuation::_11dB);
    let adc = Adc::new(peripherals.ADC1, adc_config);

    #[cfg(feature = "sensor-sht40")]
    let sensors = {
        let i2c = planty_firmware::hardware::create_i2c_bus(
            peripherals.I2C0,
            peripherals.GPIO12,
            peripherals.GPIO11,
        );
        BoardSensors::new(adc, light_pin, moisture_pin, i2c)
    };
    #[cfg(not(feature = "sensor-sht40"))]
    let sensors = BoardSensors::new(adc, light_pin, moisture_pin);

    let pump_pin = Output::new(peripherals.GPIO9, Level::Low, OutputConfig::default());
    let pump = PumpDriver::new(pump_pin, PUMP_ACTIVE_LOW).expect("GPIO output is infallible");

    let radio_pin = Output::new(peripherals.GPIO13, Level::Low, OutputConfig::default());
    let radio = OokTransmitter::from_config(radio_pin, Delay::new(), &controller_config);

    let controller = Controller::new(
        controller_config,
        sensors,
        pump,
        radio,
        embassy_time::Delay,
    );

    spawner.spawn(control_task(controller).expect("control task spawned twice"));
    info!("Control task spawned");

    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
