//! Four-direction rotator with cyclic direction preference.
//!
//! The timeout branch and the queue-exhaustion branch both need to "pick
//! the next non-empty direction cyclically"; they share [`advance_direction`]
//! rather than each carrying their own copy of that logic.

use std::collections::VecDeque;
use std::sync::Condvar;
use std::time::Instant;

use tracing::debug;

use crate::traffic::monitor::{self, Monitor};
use crate::traffic::output::{Action, ConnectorType, OutputSink};
use crate::traffic::PASS_DELAY_MS;

struct State {
    queues: [VecDeque<u32>; 4],
    current_direction: Option<usize>,
    timing_out_car: Option<u32>,
    cars_on_cross: u32,
    deadline: Instant,
}

/// Find the first non-empty queue among `(from+1, from+2, from+3) mod 4`,
/// in that order. Returns `None` if all three are empty.
fn next_direction_with_cars(queues: &[VecDeque<u32>; 4], from: usize) -> Option<usize> {
    (1..=3).map(|step| (from + step) % 4).find(|d| !queues[*d].is_empty())
}

/// Picks the head of the first non-active, non-empty queue as the new
/// timer owner, or `None` if every other queue is empty.
fn next_timing_out_car(queues: &[VecDeque<u32>; 4], active: usize) -> Option<u32> {
    (0..4)
        .filter(|d| *d != active)
        .find_map(|d| queues[d].front().copied())
}

pub struct Crossroad {
    id: u32,
    travel_time_ms: u64,
    max_wait_time_ms: u64,
    monitor: Monitor<State>,
    can_pass: [Condvar; 4],
}

impl Crossroad {
    pub fn new(id: u32, travel_time_ms: u64, max_wait_time_ms: u64) -> Self {
        Crossroad {
            id,
            travel_time_ms,
            max_wait_time_ms,
            monitor: Monitor::new(State {
                queues: Default::default(),
                current_direction: None,
                timing_out_car: None,
                cars_on_cross: 0,
                deadline: Instant::now(),
            }),
            can_pass: [Condvar::new(), Condvar::new(), Condvar::new(), Condvar::new()],
        }
    }

    /// Move to `new_direction`, resetting the timeout and waking the
    /// directions that need to re-check their condition. Shared by both the
    /// timeout branch and the queue-exhaustion branch.
    fn advance_direction(&self, guard: &mut State, new_direction: usize) {
        guard.current_direction = Some(new_direction);
        guard.deadline = monitor::deadline_from_now(self.max_wait_time_ms);
        guard.timing_out_car = next_timing_out_car(&guard.queues, new_direction);
        for cv in &self.can_pass {
            cv.notify_all();
        }
    }

    pub fn pass(&self, car_id: u32, direction: usize, sink: &dyn OutputSink) {
        let mut guard = self.monitor.lock();

        sink.write_event(car_id, ConnectorType::Crossroad, self.id, Action::Arrive);
        guard.queues[direction].push_back(car_id);

        if guard.current_direction.is_none() {
            guard.current_direction = Some(direction);
        }

        if guard.current_direction != Some(direction) && guard.queues[direction].front() == Some(&car_id) {
            let active = guard.current_direction.unwrap();
            let others_empty = (0..4).all(|d| d == active || d == direction || guard.queues[d].is_empty());
            if others_empty {
                guard.deadline = monitor::deadline_from_now(self.max_wait_time_ms);
                guard.timing_out_car = Some(car_id);
            }
        }

        loop {
            while guard.current_direction != Some(direction) || guard.queues[direction].front() != Some(&car_id) {
                if guard.current_direction == Some(direction) {
                    guard = monitor::wait(&self.can_pass[direction], guard);
                } else if guard.timing_out_car == Some(car_id) {
                    let deadline = guard.deadline;
                    let (next, timed_out) = monitor::timedwait(&self.can_pass[direction], guard, deadline);
                    guard = next;
                    if timed_out
                        && guard.current_direction != Some(direction)
                        && guard.queues[direction].front() == Some(&car_id)
                    {
                        debug!(car_id, connector_id = self.id, "timeout at crossroad");
                        let active = guard.current_direction.unwrap();
                        if let Some(next) = next_direction_with_cars(&guard.queues, active) {
                            debug!(connector_id = self.id, new_direction = next, "switching direction");
                            guard.current_direction = Some(next);
                            guard.deadline = monitor::deadline_from_now(self.max_wait_time_ms);
                        }
                        let active = guard.current_direction.unwrap();
                        guard.timing_out_car = next_timing_out_car(&guard.queues, active);
                        for d in 0..4 {
                            if d != active {
                                self.can_pass[d].notify_all();
                            }
                        }
                        while guard.cars_on_cross > 0 {
                            guard = monitor::wait(&self.can_pass[active], guard);
                        }
                        self.can_pass[active].notify_all();
                    }
                } else {
                    guard = monitor::wait(&self.can_pass[direction], guard);
                }
            }

            if guard.cars_on_cross > 0 {
                drop(guard);
                std::thread::sleep(std::time::Duration::from_millis(PASS_DELAY_MS));
                guard = self.monitor.lock();
            }

            if guard.current_direction != Some(direction) {
                continue;
            }

            guard.queues[direction].pop_front();
            self.can_pass[direction].notify_all();

            sink.write_event(car_id, ConnectorType::Crossroad, self.id, Action::StartPassing);
            guard.cars_on_cross += 1;
            drop(guard);
            std::thread::sleep(std::time::Duration::from_millis(self.travel_time_ms));
            guard = self.monitor.lock();
            guard.cars_on_cross -= 1;
            sink.write_event(car_id, ConnectorType::Crossroad, self.id, Action::FinishPassing);

            let active = guard.current_direction.unwrap();
            if guard.queues[active].is_empty() && guard.cars_on_cross == 0 {
                match next_direction_with_cars(&guard.queues, active) {
                    Some(next) => self.advance_direction(&mut guard, next),
                    None => guard.current_direction = None,
                }
            } else if !guard.queues[active].is_empty() {
                self.can_pass[active].notify_all();
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::output::testing::RecordingSink;
    use std::sync::Arc;

    #[test]
    fn single_car_passes_and_returns_to_idle() {
        let crossroad = Arc::new(Crossroad::new(0, 10, 200));
        let sink = Arc::new(RecordingSink::new());
        crossroad.pass(1, 2, sink.as_ref());
        assert_eq!(
            sink.events_for_car(1),
            vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
        );
        assert_eq!(crossroad.monitor.lock().current_direction, None);
    }

    #[test]
    fn four_directions_in_order_service_cyclically() {
        let crossroad = Arc::new(Crossroad::new(0, 20, 5_000));
        let sink = Arc::new(RecordingSink::new());

        let mut handles = Vec::new();
        for direction in 0..4 {
            let c = Arc::clone(&crossroad);
            let s = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || c.pass(direction, direction as usize, s.as_ref())));
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        for h in handles {
            h.join().unwrap();
        }

        let starts: Vec<u32> = sink
            .events()
            .into_iter()
            .filter(|(_, _, _, a)| *a == Action::StartPassing)
            .map(|(id, ..)| id)
            .collect();
        assert_eq!(starts, vec![0, 1, 2, 3]);
    }
}
