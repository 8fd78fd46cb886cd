use log::debug;
use uavplan_structs::geo::{dist_squared_xyz, GeoPolygon};
use uavplan_structs::{Position, UavPose};

#[derive(Debug, Clone, Copy)]
pub struct AreaEndpoints {
    pub start: Position,
    pub end: Position,
    pub start_pose: UavPose,
}

const DIVISIONS: f64 = 100.0;

pub fn average_center<'a>(polys: impl Iterator<Item = &'a GeoPolygon>) -> Position {
    let mut sum_lon = 0.0;
    let mut sum_lat = 0.0;
    let mut n = 0usize;
    for poly in polys {
        let c = poly.bounding_rect().center();
        sum_lon += c.lon;
        sum_lat += c.lat;
        n += 1;
    }
    if n == 0 {
        return Position::new(0.0, 0.0);
    }
    Position::new(sum_lon / n as f64, sum_lat / n as f64)
}

// Pick start/end points on the area boundary whose connecting segment runs
// roughly along the area's diameter, scanning half a turn of directions
// from the bounding-rect centre.
pub fn select_endpoints(poly: &GeoPolygon, avg_center: &Position) -> AreaEndpoints {
    let rect = poly.bounding_rect();
    let center = rect.center();
    let step = (rect.width() / DIVISIONS).max(rect.height() / DIVISIONS);

    let mut most_distance = f64::MIN;
    let mut best1 = center;
    let mut best2 = center;

    for angle_deg in 0..179 {
        let angle = (angle_deg as f64).to_radians();
        let (dir_x, dir_y) = (angle.cos(), angle.sin());

        let pos = walk_to_boundary(poly, &center, dir_x, dir_y, step);
        let neg = walk_to_boundary(poly, &center, -dir_x, -dir_y, step);

        let distance = dist_squared_xyz(&pos, &neg);
        if distance > most_distance {
            most_distance = distance;
            best1 = pos;
            best2 = neg;
        }
    }

    // The endpoint closest to the other areas becomes the start.
    let (start, end) = if best1.manhattan(avg_center) < best2.manhattan(avg_center) {
        (best1, best2)
    } else {
        (best2, best1)
    };

    let start_pose = UavPose::new((end.lat - start.lat).atan2(end.lon - start.lon));
    debug!(
        "area endpoints: start {:?} end {:?} pose {}",
        start, end, start_pose.radians
    );

    AreaEndpoints {
        start,
        end,
        start_pose,
    }
}

// First sample along the ray that falls outside the polygon. The walk is
// bounded; a degenerate area exits at the centre itself.
fn walk_to_boundary(
    poly: &GeoPolygon,
    center: &Position,
    dir_x: f64,
    dir_y: f64,
    step: f64,
) -> Position {
    let max_steps = 10 * DIVISIONS as usize;
    for count in 0..=max_steps {
        let trial = Position::new(
            center.lon + dir_x * step * count as f64,
            center.lat + dir_y * step * count as f64,
        );
        if !poly.contains(&trial) {
            return trial;
        }
    }
    *center
}
