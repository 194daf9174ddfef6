//! Two-direction bidirectional connector.

use std::sync::Condvar;
use std::time::Instant;

use crate::traffic::monitor::{self, Monitor};
use crate::traffic::output::{Action, ConnectorType, OutputSink};
use crate::traffic::PASS_DELAY_MS;

struct State {
    queues: [std::collections::VecDeque<u32>; 2],
    current_direction: Option<usize>,
    cars_on_bridge: u32,
    deadline: [Instant; 2],
}

pub struct NarrowBridge {
    id: u32,
    travel_time_ms: u64,
    max_wait_time_ms: u64,
    monitor: Monitor<State>,
    can_pass: [Condvar; 2],
}

impl NarrowBridge {
    pub fn new(id: u32, travel_time_ms: u64, max_wait_time_ms: u64) -> Self {
        let now = Instant::now();
        NarrowBridge {
            id,
            travel_time_ms,
            max_wait_time_ms,
            monitor: Monitor::new(State {
                queues: [Default::default(), Default::default()],
                current_direction: None,
                cars_on_bridge: 0,
                deadline: [now, now],
            }),
            can_pass: [Condvar::new(), Condvar::new()],
        }
    }

    /// `direction` is the destination side of the hop (for a narrow bridge,
    /// `to` carries the direction, not `from`).
    pub fn pass(&self, car_id: u32, direction: usize, sink: &dyn OutputSink) {
        let opposite = 1 - direction;
        let mut guard = self.monitor.lock();

        sink.write_event(car_id, ConnectorType::NarrowBridge, self.id, Action::Arrive);
        guard.queues[direction].push_back(car_id);

        if guard.current_direction.is_none() {
            guard.current_direction = Some(direction);
        }

        if guard.queues[direction].front() == Some(&car_id) {
            guard.deadline[direction] = monitor::deadline_from_now(self.max_wait_time_ms);
        }

        loop {
            while guard.current_direction != Some(direction)
                || guard.queues[direction].front() != Some(&car_id)
            {
                if guard.current_direction == Some(direction) {
                    guard = monitor::wait(&self.can_pass[direction], guard);
                } else {
                    let deadline = guard.deadline[direction];
                    let (next, timed_out) = monitor::timedwait(&self.can_pass[direction], guard, deadline);
                    guard = next;
                    if timed_out
                        && guard.current_direction != Some(direction)
                        && guard.queues[direction].front() == Some(&car_id)
                    {
                        guard.current_direction = Some(direction);
                        while guard.cars_on_bridge > 0 {
                            guard = monitor::wait(&self.can_pass[direction], guard);
                        }
                        guard.deadline[opposite] = monitor::deadline_from_now(self.max_wait_time_ms);
                        self.can_pass[opposite].notify_all();
                        self.can_pass[direction].notify_all();
                    }
                }
            }

            if guard.cars_on_bridge > 0 {
                drop(guard);
                std::thread::sleep(std::time::Duration::from_millis(PASS_DELAY_MS));
                guard = self.monitor.lock();
            }

            if guard.current_direction != Some(direction) {
                continue;
            }

            guard.queues[direction].pop_front();
            self.can_pass[direction].notify_all();

            sink.write_event(car_id, ConnectorType::NarrowBridge, self.id, Action::StartPassing);
            guard.cars_on_bridge += 1;
            drop(guard);
            std::thread::sleep(std::time::Duration::from_millis(self.travel_time_ms));
            guard = self.monitor.lock();
            guard.cars_on_bridge -= 1;
            sink.write_event(car_id, ConnectorType::NarrowBridge, self.id, Action::FinishPassing);

            let current = guard.current_direction.unwrap();
            let other = 1 - current;
            if guard.queues[current].is_empty() && !guard.queues[other].is_empty() && guard.cars_on_bridge == 0 {
                guard.current_direction = Some(other);
                guard.deadline[other] = monitor::deadline_from_now(self.max_wait_time_ms);
                self.can_pass[other].notify_all();
                self.can_pass[current].notify_all();
            } else if guard.queues[current].is_empty() && guard.queues[other].is_empty() {
                guard.current_direction = None;
            } else if !guard.queues[current].is_empty() {
                self.can_pass[current].notify_all();
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
    fn single_car_passes_immediately() {
        let bridge = Arc::new(NarrowBridge::new(0, 10, 500));
        let sink = Arc::new(RecordingSink::new());
        bridge.pass(1, 0, sink.as_ref());
        assert_eq!(
            sink.events_for_car(1),
            vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
        );
    }

    #[test]
    fn opposite_directions_both_complete() {
        let bridge = Arc::new(NarrowBridge::new(0, 20, 200));
        let sink = Arc::new(RecordingSink::new());

        let b1 = Arc::clone(&bridge);
        let s1 = Arc::clone(&sink);
        let t1 = std::thread::spawn(move || b1.pass(1, 0, s1.as_ref()));

        let b2 = Arc::clone(&bridge);
        let s2 = Arc::clone(&sink);
        let t2 = std::thread::spawn(move || b2.pass(2, 1, s2.as_ref()));

        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(
            sink.events_for_car(1),
            vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
        );
        assert_eq!(
            sink.events_for_car(2),
            vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
        );
    }

    #[test]
    fn same_direction_cars_are_fifo() {
        let bridge = Arc::new(NarrowBridge::new(0, 10, 500));
        let sink = Arc::new(RecordingSink::new());

        let mut handles = Vec::new();
        for id in 1..=4 {
            let b = Arc::clone(&bridge);
            let s = Arc::clone(&sink);
            handles.push(std::thread::spawn(move || b.pass(id, 0, s.as_ref())));
            // Stagger spawns so arrival order at the queue is deterministic.
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
        assert_eq!(starts, vec![1, 2, 3, 4]);
    }
}
