//! Periodic control task

use embassy_time::Ticker;
use log::info;
use planty_core::Controller;
use planty_core::pump::PumpDriver;
use planty_core::radio::OokTransmitter;

use crate::hardware::BoardSensors;

pub type BoardController = Controller<
    BoardSensors,
    PumpDriver<esp_hal::gpio::Output<'static>>,
    OokTransmitter<esp_hal::gpio::Output<'static>, esp_hal::delay::Delay>,
    embassy_time::Delay,
>;

/// Run one cycle immediately, then one per configured period.
///
/// The ticker keeps the period fixed from cycle start to cycle start, so time
/// spent pumping and transmitting does not stretch the schedule.
#[embassy_executor::task]
pub async fn control_task(mut controller: BoardController) {
    let period = controller.config().cycle_period();
    info!("Control task started, cycle every {} s", period.as_secs());

    let mut ticker = Ticker::every(period);
    let mut cycle: u32 = 0;
    loop {
        cycle = cycle.wrapping_add(1);
        info!("=== Cycle {} ===", cycle);
        controller.run_cycle().await;
        ticker.next().await;
    }
}
