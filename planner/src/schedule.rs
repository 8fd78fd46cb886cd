use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace};
use ordered_float::OrderedFloat;
use tinyvec::TinyVec;
use uavplan_structs::Position;

use crate::{flight_duration, PlanError, TIMESLICE};

// Per-task elapsed-time vector used as the search state. Coordinates only
// take values produced by repeated TIMESLICE addition clamped at the task
// total, so full-precision equality and hashing are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProgressState(TinyVec<[OrderedFloat<f64>; 8]>);

impl ProgressState {
    pub fn zeros(dimension: usize) -> ProgressState {
        ProgressState((0..dimension).map(|_| OrderedFloat(0.0)).collect())
    }

    pub fn from_totals(totals: &[f64]) -> ProgressState {
        ProgressState(totals.iter().map(|t| OrderedFloat(*t)).collect())
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn val(&self, axis: usize) -> f64 {
        self.0[axis].0
    }

    pub fn manhattan_to(&self, other: &ProgressState) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (b.0 - a.0).abs())
            .sum()
    }

    // One scheduling move: spend a TIMESLICE on `axis`, clamped to `cap`.
    pub fn advanced(&self, axis: usize, cap: f64) -> ProgressState {
        let mut next = self.clone();
        next.0[axis] = OrderedFloat(cap.min(next.0[axis].0 + TIMESLICE));
        next
    }
}

#[derive(Debug, Default)]
pub struct Schedule {
    pub states: Vec<ProgressState>,
    // Axis advanced by the move that produced each state. Undefined for
    // the origin.
    pub last_task: HashMap<ProgressState, usize>,
    // Connector flights keyed by the state whose generating move switched
    // tasks.
    pub transitions: HashMap<ProgressState, Vec<Position>>,
}

// Best-first search over the progress-time state space, from all-zeros to
// all-tasks-complete. `start_cost` prices the move that leaves the origin
// on a given axis; `switch_flight` plans the connector when a move resumes
// a different task than its parent's (None counts as infinite cost, the
// move is still enqueued).
pub fn build_schedule(
    task_times: &[f64],
    mut start_cost: impl FnMut(usize) -> f64,
    mut switch_flight: impl FnMut(usize, f64, usize, f64) -> Option<Vec<Position>>,
) -> Result<Schedule, PlanError> {
    #[cfg(feature = "prof")]
    let _p = hprof::enter("build_schedule");

    let start_state = ProgressState::zeros(task_times.len());
    let end_state = ProgressState::from_totals(task_times);
    debug!("schedule from {:?} to {:?}", start_state, end_state);

    let mut parents: HashMap<ProgressState, ProgressState> = Default::default();
    let mut last_task: HashMap<ProgressState, usize> = Default::default();
    let mut transitions: HashMap<ProgressState, Vec<Position>> = Default::default();

    let mut worklist: BTreeMap<(OrderedFloat<f64>, u64), ProgressState> = Default::default();
    let mut closed: HashSet<ProgressState> = Default::default();
    let mut insertions = 0u64;
    worklist.insert((OrderedFloat(0.0), insertions), start_state);

    while let Some(((cost_key, _), state)) = worklist.pop_first() {
        closed.insert(state.clone());
        trace!("at {:?} with cost {}", state, cost_key);

        if state == end_state {
            debug!("done scheduling - traceback");
            let mut states = Vec::new();
            let mut current = state;
            loop {
                states.push(current.clone());
                match parents.get(&current) {
                    Some(parent) => current = parent.clone(),
                    None => break,
                }
            }
            states.reverse();
            return Ok(Schedule {
                states,
                last_task,
                transitions,
            });
        }

        for i in 0..state.dimension() {
            let new_state = state.advanced(i, task_times[i]);
            if closed.contains(&new_state) {
                continue;
            }
            // Close at generation so the state is never regenerated; the
            // first discovered path to it is the one kept.
            closed.insert(new_state.clone());
            parents.insert(new_state.clone(), state.clone());
            last_task.insert(new_state.clone(), i);

            // Remaining distance in the state space draws the search
            // toward the goal; switching tasks pays for the connector.
            let mut cost = state.manhattan_to(&end_state);
            match last_task.get(&state) {
                None => cost += start_cost(i),
                Some(&j) if j == i => {}
                Some(&j) => match switch_flight(j, state.val(j), i, state.val(i)) {
                    Some(flight) => {
                        cost += flight_duration(&flight);
                        transitions.insert(new_state.clone(), flight);
                    }
                    None => cost = f64::INFINITY,
                },
            }

            insertions += 1;
            worklist.insert((OrderedFloat(cost), insertions), new_state);
        }
    }

    Err(PlanError::ScheduleExhausted)
}
