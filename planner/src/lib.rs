use thiserror::Error;
use uavplan_structs::Position;

pub mod endpoints;
pub mod hierarchical;
pub mod hierarchical_tests;
pub mod intermediate;
pub mod interpolate;
pub mod schedule;
pub mod subflight;

pub const WAYPOINT_SPACING: f64 = 30.0; // meters between waypoint samples
pub const AIRSPEED: f64 = 14.0; // meters per second
pub const TIMESLICE: f64 = 15.0; // seconds
pub const MAX_TURN_ANGLE: f64 = std::f64::consts::PI / 4.0;

// Arc length is proxied by sample count; every site deriving times or
// indices from a waypoint list uses this same convention.
pub fn flight_duration(path: &[Position]) -> f64 {
    path.len() as f64 * WAYPOINT_SPACING / AIRSPEED
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("scheduling search exhausted without reaching the goal state")]
    ScheduleExhausted,
}
