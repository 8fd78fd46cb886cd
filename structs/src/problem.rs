use serde::{Deserialize, Serialize};

use crate::{geo::GeoPolygon, Position, UavPose};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Flyover,
    Sampling,
    #[serde(rename = "No-Fly Zone")]
    NoFlyZone,
}

impl TaskKind {
    pub fn is_no_fly(&self) -> bool {
        matches!(self, TaskKind::NoFlyZone)
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Task {
    pub name: String,
    pub kind: TaskKind,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct TaskArea {
    pub geo_poly: GeoPolygon,
    pub tasks: Vec<Task>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct PlanningProblem {
    pub start_position: Position,
    pub start_pose: UavPose,
    pub areas: Vec<TaskArea>,
}
