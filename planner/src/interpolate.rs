use log::debug;
use uavplan_structs::geo::{degrees_lat_per_meter, degrees_lon_per_meter};
use uavplan_structs::{Position, UavPose};

use crate::{AIRSPEED, WAYPOINT_SPACING};

// Map a time offset along a waypoint list to the position and heading the
// UAV would hold there. Every segment counts as WAYPOINT_SPACING meters of
// arc; a time past the end extrapolates along the last segment.
pub fn interpolate_path(
    path: &[Position],
    starting_pose: UavPose,
    goal_time: f64,
) -> Option<(Position, UavPose)> {
    if goal_time < 0.0 {
        debug!("can't interpolate: bad time {}", goal_time);
        return None;
    }
    if path.is_empty() {
        debug!("can't interpolate: empty path");
        return None;
    }
    if path.len() == 1 {
        return Some((path[0], starting_pose));
    }

    let mut distance_so_far = 0.0;
    let mut time_so_far = 0.0;
    let mut result = None;

    for i in 1..path.len() {
        let pos = &path[i];
        let last_pos = &path[i - 1];
        distance_so_far += WAYPOINT_SPACING;
        time_so_far = distance_so_far / AIRSPEED;

        if time_so_far >= goal_time || i == path.len() - 1 {
            let lon_per_meter = degrees_lon_per_meter(pos.lat);
            let lat_per_meter = degrees_lat_per_meter(pos.lat);
            let last_time = time_so_far - WAYPOINT_SPACING / AIRSPEED;
            let ratio = (goal_time - last_time) / (time_so_far - last_time);
            let (dir_x, dir_y) = normalize(
                (pos.lon - last_pos.lon) / lon_per_meter,
                (pos.lat - last_pos.lat) / lat_per_meter,
            );
            let dist_to_go = WAYPOINT_SPACING * ratio;
            let out = Position::new(
                last_pos.lon + dist_to_go * dir_x * lon_per_meter,
                last_pos.lat + dist_to_go * dir_y * lat_per_meter,
            );
            result = Some((out, UavPose::new(dir_y.atan2(dir_x))));
            break;
        }
    }

    if time_so_far < goal_time {
        debug!(
            "interpolating past the end of the path: goal time {} but path ends at {}",
            goal_time, time_so_far
        );
    }

    result
}

fn normalize(x: f64, y: f64) -> (f64, f64) {
    let len = (x * x + y * y).sqrt();
    if len < 1e-12 {
        return (0.0, 0.0);
    }
    (x / len, y / len)
}
