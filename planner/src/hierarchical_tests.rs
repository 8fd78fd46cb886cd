#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use uavplan_structs::geo::{
        degrees_lat_per_meter, degrees_lon_per_meter, dist_squared_xyz, GeoPolygon,
    };
    use uavplan_structs::problem::{PlanningProblem, Task, TaskArea, TaskKind};
    use uavplan_structs::{Position, UavPose};

    use crate::hierarchical::HierarchicalPlanner;
    use crate::intermediate::{IntermediatePlanner, StraightLinePlanner};
    use crate::schedule::{ProgressState, Schedule};
    use crate::subflight::{SubFlightPlanner, TransectPlanner};
    use crate::WAYPOINT_SPACING;

    fn flyover(name: &str) -> Task {
        Task {
            name: name.to_string(),
            kind: TaskKind::Flyover,
        }
    }

    // A 0.1 x 0.05 degree rectangular area at latitude 60, west edge at
    // lon0.
    fn square_area(lon0: f64, tasks: Vec<Task>) -> TaskArea {
        TaskArea {
            geo_poly: GeoPolygon::new(vec![
                Position::new(lon0, 60.0),
                Position::new(lon0 + 0.1, 60.0),
                Position::new(lon0 + 0.1, 60.05),
                Position::new(lon0, 60.05),
            ]),
            tasks,
        }
    }

    fn problem(areas: Vec<TaskArea>) -> PlanningProblem {
        PlanningProblem {
            start_position: Position::new(9.9, 60.02),
            start_pose: UavPose::new(0.0),
            areas,
        }
    }

    // Intermediate planner stub with a fixed sample count, marching from
    // the start toward the end.
    struct FixedIntermediate {
        n: usize,
    }

    impl IntermediatePlanner for FixedIntermediate {
        fn plan(
            &self,
            start: Position,
            _start_pose: UavPose,
            end: Position,
            _end_pose: UavPose,
            _obstacles: &[GeoPolygon],
        ) -> Option<Vec<Position>> {
            let lon_per_meter = degrees_lon_per_meter(start.lat);
            let lat_per_meter = degrees_lat_per_meter(start.lat);
            let dx = (end.lon - start.lon) / lon_per_meter;
            let dy = (end.lat - start.lat) / lat_per_meter;
            let len = (dx * dx + dy * dy).sqrt();
            let (ux, uy) = if len < 1e-9 { (0.0, 0.0) } else { (dx / len, dy / len) };
            Some(
                (0..self.n)
                    .map(|i| {
                        let t = i as f64 * WAYPOINT_SPACING;
                        Position::new(
                            start.lon + t * ux * lon_per_meter,
                            start.lat + t * uy * lat_per_meter,
                        )
                    })
                    .collect(),
            )
        }
    }

    // Intermediate planner stub that never finds a connection.
    struct FailingIntermediate;

    impl IntermediatePlanner for FailingIntermediate {
        fn plan(
            &self,
            _start: Position,
            _start_pose: UavPose,
            _end: Position,
            _end_pose: UavPose,
            _obstacles: &[GeoPolygon],
        ) -> Option<Vec<Position>> {
            None
        }
    }

    // Sub-flight stub with per-task waypoint counts, marching due east
    // from the entry point.
    struct StubSubFlight {
        lengths: HashMap<String, usize>,
    }

    impl StubSubFlight {
        fn new(lengths: &[(&str, usize)]) -> StubSubFlight {
            StubSubFlight {
                lengths: lengths
                    .iter()
                    .map(|(name, n)| (name.to_string(), *n))
                    .collect(),
            }
        }
    }

    impl SubFlightPlanner for StubSubFlight {
        fn plan(
            &self,
            task: &Task,
            _area: &TaskArea,
            entry: Position,
            _entry_pose: UavPose,
        ) -> Vec<Position> {
            let lon_per_meter = degrees_lon_per_meter(entry.lat);
            (0..self.lengths[&task.name])
                .map(|i| {
                    Position::new(
                        entry.lon + i as f64 * WAYPOINT_SPACING * lon_per_meter,
                        entry.lat,
                    )
                })
                .collect()
        }
    }

    fn find_subsequence(hay: &[Position], needle: &[Position]) -> Option<usize> {
        if needle.is_empty() {
            return Some(0);
        }
        if hay.len() < needle.len() {
            return None;
        }
        hay.windows(needle.len())
            .position(|w| w.iter().zip(needle).all(|(a, b)| a.eq_lonlat(b)))
    }

    #[test]
    fn single_task_flight_is_start_transition_plus_subflight() {
        let _ = env_logger::try_init();
        let prob = problem(vec![square_area(10.0, vec![flyover("survey")])]);
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        planner.iterate().unwrap();

        let start = planner.start_transitions[&0].clone().unwrap();
        let sub = planner.task_sub_flights[0].clone();
        assert!(start.len() > 1);
        assert!(sub.len() > 2);

        let mut expected = start.clone();
        expected.extend_from_slice(&sub);

        let flight = planner.best_flight_so_far();
        assert_eq!(flight.len(), expected.len());
        for (a, b) in flight.iter().zip(expected.iter()) {
            assert!(a.eq_lonlat(b));
        }

        // Transition waypoints hold the spacing contract.
        for pair in start.windows(2) {
            let d = dist_squared_xyz(&pair[0], &pair[1]).sqrt();
            assert!((d - WAYPOINT_SPACING).abs() < 1.0, "spacing {}", d);
        }
    }

    #[test]
    fn two_tasks_complete_with_a_single_context_switch() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("a")]),
            square_area(10.3, vec![flyover("b")]),
        ]);
        // 14 waypoints = 30 s per task = 2 timeslices each.
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(FixedIntermediate { n: 10 }),
            Box::new(StubSubFlight::new(&[("a", 14), ("b", 14)])),
        );
        planner.iterate().unwrap();

        let flight = planner.best_flight_so_far().to_vec();
        let start_a = planner.start_transitions[&0].clone().unwrap();
        let sub_a = planner.task_sub_flights[0].clone();
        let sub_b = planner.task_sub_flights[1].clone();

        // The flight opens with the first task's start transition and runs
        // each sub-flight to completion exactly once, with one connector
        // in between.
        assert!(find_subsequence(&flight[..start_a.len()], &start_a) == Some(0));
        let ia = find_subsequence(&flight, &sub_a).unwrap();
        let ib = find_subsequence(&flight, &sub_b).unwrap();
        assert!(ia < ib, "task a scheduled before task b");
        assert_eq!(flight.len(), start_a.len() + sub_a.len() + 10 + sub_b.len());
    }

    #[test]
    fn no_fly_areas_become_obstacles_not_tasks() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("survey")]),
            square_area(
                10.3,
                vec![Task {
                    name: "keep out".to_string(),
                    kind: TaskKind::NoFlyZone,
                }],
            ),
        ]);
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        assert_eq!(planner.tasks.len(), 1);
        assert_eq!(planner.obstacles.len(), 1);

        planner.iterate().unwrap();
        assert_eq!(planner.task_sub_flights.len(), 1);
        assert!(!planner.best_flight_so_far().is_empty());
    }

    #[test]
    fn empty_problem_publishes_empty_flight() {
        let _ = env_logger::try_init();
        let mut planner = HierarchicalPlanner::new(
            problem(vec![]),
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        planner.iterate().unwrap();
        assert!(planner.best_flight_so_far().is_empty());
    }

    #[test]
    fn zero_length_subflight_contributes_nothing() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("empty")]),
            square_area(10.3, vec![flyover("tiny")]),
        ]);
        // Task "empty" needs zero seconds; "tiny" is shorter than one
        // timeslice and saturates in a single clamped move.
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(FixedIntermediate { n: 10 }),
            Box::new(StubSubFlight::new(&[("empty", 0), ("tiny", 1)])),
        );
        planner.iterate().unwrap();

        let start_tiny = planner.start_transitions[&1].clone().unwrap();
        let sub_tiny = planner.task_sub_flights[1].clone();
        let flight = planner.best_flight_so_far();
        assert_eq!(flight.len(), start_tiny.len() + 1);
        assert!(flight.last().unwrap().eq_lonlat(&sub_tiny[0]));
    }

    #[test]
    fn reconstruction_splices_context_switch_transitions() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("a")]),
            square_area(10.3, vec![flyover("b")]),
        ]);
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(FixedIntermediate { n: 10 }),
            Box::new(StubSubFlight::new(&[("a", 14), ("b", 14)])),
        );
        planner.iterate().unwrap();

        // Hand-built schedule: one timeslice of task a, then a context
        // switch into one timeslice of task b.
        let origin = ProgressState::zeros(2);
        let s1 = ProgressState::from_totals(&[15.0, 0.0]);
        let s2 = ProgressState::from_totals(&[15.0, 15.0]);
        let marker: Vec<Position> = (0..3).map(|i| Position::new(i as f64, -45.0)).collect();

        let mut last_task = HashMap::new();
        last_task.insert(s1.clone(), 0);
        last_task.insert(s2.clone(), 1);
        let mut transitions = HashMap::new();
        transitions.insert(s2.clone(), marker.clone());
        let sched = Schedule {
            states: vec![origin, s1, s2],
            last_task,
            transitions,
        };

        let path = planner.reconstruct_path(&sched);

        let start_a = planner.start_transitions[&0].clone().unwrap();
        let sub_a = &planner.task_sub_flights[0];
        let sub_b = &planner.task_sub_flights[1];
        // 15 s of progress covers floor(15 * AIRSPEED / WAYPOINT_SPACING)
        // = 7 waypoints of each sub-flight.
        let mut expected: Vec<Position> = start_a.clone();
        expected.extend_from_slice(&sub_a[0..7]);
        expected.extend_from_slice(&marker);
        expected.extend_from_slice(&sub_b[0..7]);

        assert_eq!(path.len(), expected.len());
        for (a, b) in path.iter().zip(expected.iter()) {
            assert!(a.eq_lonlat(b));
        }
    }

    #[test]
    fn failed_start_transitions_do_not_abort_planning() {
        let _ = env_logger::try_init();
        let prob = problem(vec![square_area(10.0, vec![flyover("survey")])]);
        let mut planner = HierarchicalPlanner::new(
            prob,
            Box::new(FailingIntermediate),
            Box::new(StubSubFlight::new(&[("survey", 14)])),
        );
        planner.iterate().unwrap();

        // No connector could be planned, so the flight is the bare
        // sub-flight; the failed attempt is still cached for the area.
        let sub = planner.task_sub_flights[0].clone();
        let flight = planner.best_flight_so_far();
        assert_eq!(flight.len(), sub.len());
        assert!(planner.start_transitions[&0].is_none());
    }

    #[test]
    fn identical_inputs_give_identical_flights() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("a")]),
            square_area(10.3, vec![flyover("b")]),
        ]);

        let mut p1 = HierarchicalPlanner::new(
            prob.clone(),
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        let mut p2 = HierarchicalPlanner::new(
            prob,
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        p1.iterate().unwrap();
        p2.iterate().unwrap();
        assert_eq!(p1.best_flight_so_far(), p2.best_flight_so_far());

        // Re-running the same planner republishes the same flight.
        let first = p1.best_flight_so_far().to_vec();
        p1.iterate().unwrap();
        assert_eq!(first, p1.best_flight_so_far());
    }

    #[test]
    fn problems_round_trip_as_json() {
        let _ = env_logger::try_init();
        let prob = problem(vec![
            square_area(10.0, vec![flyover("survey")]),
            square_area(
                10.3,
                vec![Task {
                    name: "keep out".to_string(),
                    kind: TaskKind::NoFlyZone,
                }],
            ),
        ]);

        let json = serde_json::to_string(&prob).unwrap();
        assert!(json.contains("No-Fly Zone"));
        let parsed: PlanningProblem = serde_json::from_str(&json).unwrap();

        let mut p1 = HierarchicalPlanner::new(
            prob,
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        let mut p2 = HierarchicalPlanner::new(
            parsed,
            Box::new(StraightLinePlanner),
            Box::new(TransectPlanner),
        );
        p1.iterate().unwrap();
        p2.iterate().unwrap();
        assert_eq!(p1.best_flight_so_far(), p2.best_flight_so_far());
    }
}
