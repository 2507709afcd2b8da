//! Telemetry packet encoding and transmission
//!
//! Every cycle sends four fixed-width integer packets over the radio, one per
//! reading. A packet is `tag * 1000 + value`, where the tag identifies the
//! sensor and the value is the reading saturated to `0..=999`. Receivers
//! decode with integer division, so the tag values and the send order are
//! part of the wire format and must not change.
//!
//! | Tag | Reading          | Rounded |
//! |-----|------------------|---------|
//! | 10  | Soil moisture    | no      |
//! | 11  | Air humidity     | yes     |
//! | 12  | Air temperature  | yes     |
//! | 13  | Light            | no      |

use embedded_hal_async::delay::DelayNs;
use log::{debug, error};

use crate::config::ControllerConfig;
use crate::reading::ReadingSet;

/// Largest value a packet can carry.
pub const MAX_VALUE: u16 = 999;

/// Distance between two consecutive tags on the wire.
pub const TAG_SCALE: u32 = 1000;

/// Number of packets sent per cycle.
pub const PACKETS_PER_CYCLE: usize = 4;

/// Sensor identity carried in the thousands of each packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorTag {
    SoilMoisture = 10,
    AirHumidity = 11,
    AirTemperature = 12,
    Light = 13,
}

impl SensorTag {
    /// Order in which packets go out each cycle.
    pub const ORDER: [SensorTag; PACKETS_PER_CYCLE] = [
        SensorTag::SoilMoisture,
        SensorTag::AirHumidity,
        SensorTag::AirTemperature,
        SensorTag::Light,
    ];

    pub const fn offset(self) -> u32 {
        self as u32 * TAG_SCALE
    }

    pub const fn from_u32(tag: u32) -> Option<Self> {
        match tag {
            10 => Some(Self::SoilMoisture),
            11 => Some(Self::AirHumidity),
            12 => Some(Self::AirTemperature),
            13 => Some(Self::Light),
            _ => None,
        }
    }
}

/// Clamp a reading into the range a packet can carry.
#[inline]
pub const fn saturate(value: u32) -> u16 {
    if value > MAX_VALUE as u32 {
        MAX_VALUE
    } else {
        value as u16
    }
}

/// Clamp a signed reading into `0..=999`.
///
/// Negative values would otherwise reach into the previous tag's range.
#[inline]
pub const fn saturate_signed(value: i32) -> u16 {
    if value < 0 { 0 } else { saturate(value as u32) }
}

/// Round half up, `floor(value + 0.5)`. NaN rounds to 0.
pub fn round_half_up(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let shifted = value + 0.5;
    // `as` truncates toward zero and saturates at the i32 limits.
    let truncated = shifted as i32;
    if (truncated as f32) > shifted {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}

/// One telemetry packet as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet(u32);

impl Packet {
    pub const fn encode(tag: SensorTag, value: u32) -> Self {
        Self(tag.offset() + saturate(value) as u32)
    }

    /// Encode a floating point reading, rounding before saturation.
    pub fn encode_float(tag: SensorTag, value: f32) -> Self {
        Self(tag.offset() + saturate_signed(round_half_up(value)) as u32)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Split a packet back into tag and value. Unknown tags yield `None`.
    pub const fn decode(self) -> Option<(SensorTag, u16)> {
        match SensorTag::from_u32(self.0 / TAG_SCALE) {
            Some(tag) => Some((tag, (self.0 % TAG_SCALE) as u16)),
            None => None,
        }
    }
}

/// Packets for one cycle, in wire order.
pub fn packets(
    light: u16,
    air_humidity: f32,
    air_temperature: f32,
    soil_moisture: u16,
) -> [Packet; PACKETS_PER_CYCLE] {
    [
        Packet::encode(SensorTag::SoilMoisture, soil_moisture as u32),
        Packet::encode_float(SensorTag::AirHumidity, air_humidity),
        Packet::encode_float(SensorTag::AirTemperature, air_temperature),
        Packet::encode(SensorTag::Light, light as u32),
    ]
}

/// Radio primitive that sends an integer of a given bit width.
///
/// Implementations are expected to repeat the frame on the link layer; the
/// encoder sends each packet exactly once and never retries.
pub trait Transmitter {
    type Error: core::fmt::Debug;

    fn transmit(&mut self, value: u32, bits: u8) -> Result<(), Self::Error>;
}

pub struct TelemetryEncoder<T> {
    transmitter: T,
    bits: u8,
    spacing_ms: u32,
}

impl<T: Transmitter> TelemetryEncoder<T> {
    pub const fn new(transmitter: T, bits: u8, spacing_ms: u32) -> Self {
        Self {
            transmitter,
            bits,
            spacing_ms,
        }
    }

    pub const fn from_config(transmitter: T, config: &ControllerConfig) -> Self {
        Self::new(transmitter, config.packet_bits, config.packet_spacing_ms)
    }

    pub fn transmitter(&mut self) -> &mut T {
        &mut self.transmitter
    }

    /// Encode the readings and send them with the configured spacing.
    ///
    /// Returns how many packets the transmitter accepted. A failed packet is
    /// logged and skipped; the rest of the cycle's packets still go out.
    pub async fn encode_and_send<D: DelayNs>(
        &mut self,
        delay: &mut D,
        light: u16,
        air_humidity: f32,
        air_temperature: f32,
        soil_moisture: u16,
    ) -> u8 {
        let mut sent = 0;
        let packets = packets(light, air_humidity, air_temperature, soil_moisture);

        for (index, packet) in packets.iter().enumerate() {
            if index > 0 {
                delay.delay_ms(self.spacing_ms).await;
            }

            match self.transmitter.transmit(packet.raw(), self.bits) {
                Ok(()) => {
                    debug!("Sent packet {} ({} bits)", packet.raw(), self.bits);
                    sent += 1;
                }
                Err(e) => error!("Failed to send packet {}: {:?}", packet.raw(), e),
            }
        }

        sent
    }

    pub async fn send<D: DelayNs>(&mut self, delay: &mut D, readings: &ReadingSet) -> u8 {
        self.encode_and_send(
            delay,
            readings.light,
            readings.air_humidity,
            readings.air_temperature,
            readings.soil_moisture,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[derive(Default)]
    struct RecordingTransmitter {
        sent: Vec<(u32, u8)>,
        fail_on: Option<u32>,
    }

    impl Transmitter for RecordingTransmitter {
        type Error = &'static str;

        fn transmit(&mut self, value: u32, bits: u8) -> Result<(), Self::Error> {
            if self.fail_on == Some(value) {
                return Err("radio busy");
            }
            self.sent.push((value, bits));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        waits_ns: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns);
        }
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(0), 0);
        assert_eq!(saturate(999), 999);
        assert_eq!(saturate(1000), 999);
        assert_eq!(saturate(u32::MAX), 999);
        for value in [0, 1, 500, 998, 999, 1000, 1200, 4095, 65535] {
            assert_eq!(saturate(value), value.min(999) as u16);
            assert_eq!(saturate(saturate(value) as u32), saturate(value));
        }
    }

    #[test]
    fn test_saturate_signed() {
        assert_eq!(saturate_signed(-5), 0);
        assert_eq!(saturate_signed(0), 0);
        assert_eq!(saturate_signed(42), 42);
        assert_eq!(saturate_signed(i32::MAX), 999);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(71.4), 71);
        assert_eq!(round_half_up(71.5), 72);
        assert_eq!(round_half_up(71.6), 72);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(-0.2), 0);
        assert_eq!(round_half_up(-0.7), -1);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(f32::NAN), 0);
        assert_eq!(round_half_up(-3.0e9), i32::MIN);
        assert_eq!(round_half_up(f32::NEG_INFINITY), i32::MIN);
        assert_eq!(round_half_up(f32::INFINITY), i32::MAX);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for tag in SensorTag::ORDER {
            for value in 0..=MAX_VALUE {
                let packet = Packet::encode(tag, value as u32);
                assert_eq!(packet.decode(), Some((tag, value)));
            }
        }
    }

    #[test]
    fn test_decode_rejects_unknown_tags() {
        assert_eq!(Packet::from_raw(9999).decode(), None);
        assert_eq!(Packet::from_raw(14000).decode(), None);
        assert_eq!(
            Packet::from_raw(13000).decode(),
            Some((SensorTag::Light, 0))
        );
    }

    #[test]
    fn test_moisture_saturates() {
        assert_eq!(Packet::encode(SensorTag::SoilMoisture, 1200).raw(), 10999);
    }

    #[test]
    fn test_humidity_rounding() {
        assert_eq!(Packet::encode_float(SensorTag::AirHumidity, 71.4).raw(), 11071);
        assert_eq!(Packet::encode_float(SensorTag::AirHumidity, 71.6).raw(), 11072);
    }

    #[test]
    fn test_sub_zero_temperature_stays_in_its_tag() {
        let packet = Packet::encode_float(SensorTag::AirTemperature, -4.0);
        assert_eq!(packet.raw(), 12000);
        assert_eq!(packet.decode(), Some((SensorTag::AirTemperature, 0)));

        for extreme in [-3.0e9, f32::NEG_INFINITY] {
            let packet = Packet::encode_float(SensorTag::AirTemperature, extreme);
            assert_eq!(packet.raw(), 12000);
        }
    }

    #[test]
    fn test_packets_follow_wire_order() {
        let packets = packets(1023, 48.2, 22.5, 640);
        assert_eq!(
            packets.map(Packet::raw),
            [10640, 11048, 12023, 13999]
        );
    }

    #[test]
    fn test_send_spacing_and_width() {
        let mut encoder = TelemetryEncoder::new(RecordingTransmitter::default(), 24, 500);
        let mut delay = RecordingDelay::default();

        let sent = block_on(encoder.encode_and_send(&mut delay, 900, 71.4, 19.6, 1200));

        assert_eq!(sent, 4);
        assert_eq!(
            encoder.transmitter().sent,
            vec![(10999, 24), (11071, 24), (12020, 24), (13900, 24)]
        );
        assert_eq!(delay.waits_ns, vec![500_000_000; 3]);
    }

    #[test]
    fn test_send_clamps_out_of_range_temperature() {
        let mut encoder = TelemetryEncoder::new(RecordingTransmitter::default(), 24, 500);
        let mut delay = RecordingDelay::default();

        let sent = block_on(encoder.encode_and_send(&mut delay, 700, 50.0, -3.0e9, 300));

        assert_eq!(sent, 4);
        assert_eq!(
            encoder.transmitter().sent,
            vec![(10300, 24), (11050, 24), (12000, 24), (13700, 24)]
        );
    }

    #[test]
    fn test_failed_packet_does_not_stop_the_rest() {
        let transmitter = RecordingTransmitter {
            fail_on: Some(11050),
            ..Default::default()
        };
        let mut encoder = TelemetryEncoder::new(transmitter, 24, 500);
        let mut delay = RecordingDelay::default();
        let readings = ReadingSet {
            light: 700,
            air_humidity: 50.0,
            air_temperature: 20.0,
            soil_moisture: 300,
            water_available: true,
        };

        let sent = block_on(encoder.send(&mut delay, &readings));

        assert_eq!(sent, 3);
        let values: Vec<u32> = encoder.transmitter().sent.iter().map(|&(v, _)| v).collect();
        assert_eq!(values, vec![10300, 12020, 13700]);
        assert_eq!(delay.waits_ns.len(), 3);
    }
}
