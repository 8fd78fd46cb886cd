use uavplan_structs::geo::{degrees_lat_per_meter, degrees_lon_per_meter};
use uavplan_structs::problem::{Task, TaskArea};
use uavplan_structs::{Position, UavPose};

use crate::WAYPOINT_SPACING;

// Produces the waypoint sequence that services one task inside its area.
// Same spacing contract as the intermediate planners; first waypoint at
// the entry point.
pub trait SubFlightPlanner {
    fn plan(
        &self,
        task: &Task,
        area: &TaskArea,
        entry: Position,
        entry_pose: UavPose,
    ) -> Vec<Position>;
}

// Marches from the entry point along the entry heading while inside the
// area polygon, yielding the diameter chord the endpoint selection aimed
// for. Area-filling patterns plug in through the same trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransectPlanner;

impl SubFlightPlanner for TransectPlanner {
    fn plan(
        &self,
        _task: &Task,
        area: &TaskArea,
        entry: Position,
        entry_pose: UavPose,
    ) -> Vec<Position> {
        let lon_per_meter = degrees_lon_per_meter(entry.lat);
        let lat_per_meter = degrees_lat_per_meter(entry.lat);

        let rect = area.geo_poly.bounding_rect();
        let width_m = rect.width() / lon_per_meter;
        let height_m = rect.height() / lat_per_meter;
        let diagonal_m = (width_m * width_m + height_m * height_m).sqrt();
        let max_samples = (diagonal_m / WAYPOINT_SPACING).ceil() as usize + 1;

        let (dir_x, dir_y) = (entry_pose.radians.cos(), entry_pose.radians.sin());

        let mut results = vec![entry];
        let mut entered = false;
        for i in 1..=max_samples {
            let t = i as f64 * WAYPOINT_SPACING;
            let p = Position::new(
                entry.lon + t * dir_x * lon_per_meter,
                entry.lat + t * dir_y * lat_per_meter,
            );
            if area.geo_poly.contains(&p) {
                entered = true;
                results.push(p);
            } else if entered {
                break;
            }
        }
        results
    }
}
