use uavplan_structs::geo::{degrees_lat_per_meter, degrees_lon_per_meter, GeoPolygon};
use uavplan_structs::{Position, UavPose};

use crate::WAYPOINT_SPACING;

// Point-to-point connector between two oriented positions. Waypoints come
// back spaced WAYPOINT_SPACING apart with the first point at the start;
// None means no connection was found.
pub trait IntermediatePlanner {
    fn plan(
        &self,
        start: Position,
        start_pose: UavPose,
        end: Position,
        end_pose: UavPose,
        obstacles: &[GeoPolygon],
    ) -> Option<Vec<Position>>;
}

// Samples the straight segment in local tangent-plane meters around the
// mean latitude. Ignores obstacles and the endpoint headings.
#[derive(Debug, Default, Clone, Copy)]
pub struct StraightLinePlanner;

impl IntermediatePlanner for StraightLinePlanner {
    fn plan(
        &self,
        start: Position,
        _start_pose: UavPose,
        end: Position,
        _end_pose: UavPose,
        _obstacles: &[GeoPolygon],
    ) -> Option<Vec<Position>> {
        let avg_lat = (start.lat + end.lat) / 2.0;
        let lon_per_meter = degrees_lon_per_meter(avg_lat);
        let lat_per_meter = degrees_lat_per_meter(avg_lat);

        let dx = (end.lon - start.lon) / lon_per_meter;
        let dy = (end.lat - start.lat) / lat_per_meter;
        let length = (dx * dx + dy * dy).sqrt();

        let n_samples = ((length / WAYPOINT_SPACING).round() as usize).max(1);
        let (dir_x, dir_y) = if length < 1e-9 {
            (0.0, 0.0)
        } else {
            (dx / length, dy / length)
        };

        let mut results = Vec::with_capacity(n_samples);
        for i in 0..n_samples {
            let t = i as f64 * WAYPOINT_SPACING;
            results.push(Position::new(
                start.lon + t * dir_x * lon_per_meter,
                start.lat + t * dir_y * lat_per_meter,
            ));
        }
        Some(results)
    }
}
