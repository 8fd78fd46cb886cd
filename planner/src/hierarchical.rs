use std::collections::HashMap;

use log::{debug, warn};
use uavplan_structs::geo::GeoPolygon;
use uavplan_structs::problem::{PlanningProblem, Task};
use uavplan_structs::Position;

use crate::endpoints::{self, AreaEndpoints};
use crate::intermediate::IntermediatePlanner;
use crate::interpolate::interpolate_path;
use crate::schedule::{self, Schedule};
use crate::subflight::SubFlightPlanner;
use crate::{flight_duration, PlanError, AIRSPEED, WAYPOINT_SPACING};

pub struct HierarchicalPlanner {
    problem: PlanningProblem,
    intermediate: Box<dyn IntermediatePlanner>,
    subflight: Box<dyn SubFlightPlanner>,

    pub(crate) tasks: Vec<Task>,
    // Index into problem.areas for each entry of tasks.
    pub(crate) task_areas: Vec<usize>,
    pub(crate) obstacles: Vec<GeoPolygon>,

    pub(crate) area_endpoints: HashMap<usize, AreaEndpoints>,
    // One entry per distinct area; None records a failed planning attempt.
    pub(crate) start_transitions: HashMap<usize, Option<Vec<Position>>>,
    pub(crate) task_sub_flights: Vec<Vec<Position>>,

    best_flight: Vec<Position>,
}

impl HierarchicalPlanner {
    pub fn new(
        problem: PlanningProblem,
        intermediate: Box<dyn IntermediatePlanner>,
        subflight: Box<dyn SubFlightPlanner>,
    ) -> HierarchicalPlanner {
        let mut planner = HierarchicalPlanner {
            problem,
            intermediate,
            subflight,
            tasks: Vec::new(),
            task_areas: Vec::new(),
            obstacles: Vec::new(),
            area_endpoints: HashMap::new(),
            start_transitions: HashMap::new(),
            task_sub_flights: Vec::new(),
            best_flight: Vec::new(),
        };
        planner.reset();
        planner
    }

    // Untouched by failed iterations.
    pub fn best_flight_so_far(&self) -> &[Position] {
        &self.best_flight
    }

    pub fn set_problem(&mut self, problem: PlanningProblem) {
        self.problem = problem;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.tasks.clear();
        self.task_areas.clear();
        self.obstacles.clear();
        self.area_endpoints.clear();
        self.start_transitions.clear();
        self.task_sub_flights.clear();

        for (area_idx, area) in self.problem.areas.iter().enumerate() {
            for task in area.tasks.iter() {
                // Obstacles are handled separately, not as tasks.
                if task.kind.is_no_fly() {
                    self.obstacles.push(area.geo_poly.clone());
                } else {
                    self.tasks.push(task.clone());
                    self.task_areas.push(area_idx);
                }
            }
        }
    }

    // One synchronous planning pass over freshly rebuilt tables.
    pub fn iterate(&mut self) -> Result<(), PlanError> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("hierarchical iteration");

        self.reset();
        self.build_endpoints();
        self.build_start_transitions();
        self.build_sub_flights();
        let schedule = self.build_schedule()?;
        self.best_flight = self.reconstruct_path(&schedule);
        debug!(
            "published flight with {} waypoints over {} tasks",
            self.best_flight.len(),
            self.tasks.len()
        );
        Ok(())
    }

    fn build_endpoints(&mut self) {
        let mut distinct_areas = self.task_areas.clone();
        distinct_areas.dedup();

        let avg_center = endpoints::average_center(
            distinct_areas
                .iter()
                .map(|a| &self.problem.areas[*a].geo_poly),
        );

        for area_idx in distinct_areas {
            let e = endpoints::select_endpoints(&self.problem.areas[area_idx].geo_poly, &avg_center);
            self.area_endpoints.insert(area_idx, e);
        }
    }

    fn build_start_transitions(&mut self) {
        let global_start = self.problem.start_position;
        let global_pose = self.problem.start_pose;

        for task_idx in 0..self.tasks.len() {
            let area_idx = self.task_areas[task_idx];
            // Tasks sharing an area share one start transition. Failed
            // attempts are cached too, so each area is planned only once.
            if self.start_transitions.contains_key(&area_idx) {
                continue;
            }
            let e = self.area_endpoints[&area_idx];
            debug!(
                "start transition into area {}: {:?} @ {} -> {:?} @ {}",
                area_idx, global_start, global_pose.radians, e.start, e.start_pose.radians
            );
            let flight = self.intermediate.plan(
                global_start,
                global_pose,
                e.start,
                e.start_pose,
                &self.obstacles,
            );
            if flight.is_none() {
                warn!("no start transition found into area {}", area_idx);
            }
            self.start_transitions.insert(area_idx, flight);
        }
    }

    fn build_sub_flights(&mut self) {
        for task_idx in 0..self.tasks.len() {
            let area_idx = self.task_areas[task_idx];
            let area = &self.problem.areas[area_idx];
            let e = self.area_endpoints[&area_idx];
            let flight = self
                .subflight
                .plan(&self.tasks[task_idx], area, e.start, e.start_pose);
            self.task_sub_flights.push(flight);
        }
    }

    fn build_schedule(&self) -> Result<Schedule, PlanError> {
        let task_times: Vec<f64> = self
            .task_sub_flights
            .iter()
            .map(|f| flight_duration(f))
            .collect();

        let start_transitions = &self.start_transitions;
        let task_areas = &self.task_areas;
        let area_endpoints = &self.area_endpoints;
        let sub_flights = &self.task_sub_flights;
        let intermediate = &*self.intermediate;
        let obstacles = &self.obstacles;

        schedule::build_schedule(
            &task_times,
            |i| {
                start_transitions
                    .get(&task_areas[i])
                    .and_then(|f| f.as_ref())
                    .map(|f| flight_duration(f))
                    .unwrap_or(f64::INFINITY)
            },
            |from_task, from_time, to_task, to_time| {
                let from_entry = area_endpoints[&task_areas[from_task]].start_pose;
                let to_entry = area_endpoints[&task_areas[to_task]].start_pose;
                let (from_pos, from_pose) =
                    interpolate_path(&sub_flights[from_task], from_entry, from_time)?;
                let (to_pos, to_pose) =
                    interpolate_path(&sub_flights[to_task], to_entry, to_time)?;
                intermediate.plan(from_pos, from_pose, to_pos, to_pose, obstacles)
            },
        )
    }

    pub(crate) fn reconstruct_path(&self, schedule: &Schedule) -> Vec<Position> {
        let mut path: Vec<Position> = Vec::new();
        let origin = match schedule.states.first() {
            Some(origin) => origin,
            None => return path,
        };

        let mut prev = origin;
        for cur in schedule.states.iter().skip(1) {
            let task_idx = schedule.last_task[cur];
            let area_idx = self.task_areas[task_idx];

            if prev == origin {
                if let Some(Some(start)) = self.start_transitions.get(&area_idx) {
                    path.extend_from_slice(start);
                }
            } else if schedule.last_task[prev] != task_idx {
                if let Some(transition) = schedule.transitions.get(cur) {
                    path.extend_from_slice(transition);
                }
            }

            // Splice in the portion of the sub-flight this move covered.
            let sub_flight = &self.task_sub_flights[task_idx];
            path.extend(path_portion(
                sub_flight,
                prev.val(task_idx),
                cur.val(task_idx),
            ));

            prev = cur;
        }
        path
    }
}

// Waypoints of `path` covering the closed-open time interval
// [start_time, end_time). Times arrive as count * WAYPOINT_SPACING /
// AIRSPEED; the epsilon absorbs that rounding noise before flooring.
fn path_portion(path: &[Position], start_time: f64, end_time: f64) -> impl Iterator<Item = Position> + '_ {
    let start_idx = ((start_time * AIRSPEED / WAYPOINT_SPACING) + 1e-9).floor() as usize;
    let end_idx = ((end_time * AIRSPEED / WAYPOINT_SPACING) + 1e-9).floor() as usize;
    path[start_idx.min(path.len())..end_idx.min(path.len())]
        .iter()
        .copied()
}
