//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and produces a [`SensorSnapshot`] each
//! loop iteration.  All three decision components (alerts, scheduler,
//! command interpreter) observe the same snapshot for that iteration.

pub mod battery;
pub mod ultrasonic;

use battery::BatteryMonitor;
use ultrasonic::UltrasonicSensor;

/// A point-in-time snapshot of every sensor in the system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    /// Food hopper fill level (0–100 %).
    pub food_percent: u8,
    /// Water reservoir fill level (0–100 %).
    pub water_percent: u8,
    /// Battery charge estimate (0–100 %).
    pub battery_percent: f32,
    /// Battery pack voltage.
    pub battery_volts: f32,
}

/// Aggregates all sensor drivers and produces a unified snapshot.
pub struct SensorHub {
    pub food: UltrasonicSensor,
    pub water: UltrasonicSensor,
    pub battery: BatteryMonitor,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(food: UltrasonicSensor, water: UltrasonicSensor, battery: BatteryMonitor) -> Self {
        Self {
            food,
            water,
            battery,
        }
    }

    /// Read every sensor and return a unified snapshot.
    pub fn read_all(&mut self) -> SensorSnapshot {
        let food = self.food.read();
        let water = self.water.read();
        let batt = self.battery.read();

        SensorSnapshot {
            food_percent: food,
            water_percent: water,
            battery_percent: batt.percent,
            battery_volts: batt.volts,
        }
    }
}
