//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the feed servo, exposing them through
//! [`SensorPort`] and [`DispenserPort`].  This is the only module in the
//! system that touches actual hardware.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{DispenserPort, SensorPort};
use crate::drivers::servo::FeedServo;
use crate::sensors::{SensorHub, SensorSnapshot};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    hub: SensorHub,
    servo: FeedServo,
}

impl HardwareAdapter {
    pub fn new(hub: SensorHub, servo: FeedServo) -> Self {
        Self { hub, servo }
    }

    /// Park the hopper gate closed.  Call once at boot.
    pub fn park_servo(&mut self) {
        self.servo.park();
    }

    /// Dispenses since boot (diagnostics).
    pub fn dispense_count(&self) -> u32 {
        self.servo.dispense_count()
    }

    /// Direct hub access for simulation injection on host builds.
    pub fn hub_mut(&mut self) -> &mut SensorHub {
        &mut self.hub
    }
}

impl SensorPort for HardwareAdapter {
    fn read_all(&mut self) -> SensorSnapshot {
        self.hub.read_all()
    }
}

impl DispenserPort for HardwareAdapter {
    fn dispense_once(&mut self) {
        self.servo.dispense_once();
    }
}
