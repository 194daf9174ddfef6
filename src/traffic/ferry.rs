//! Two-side batched connector with capacity and timed departure.

use std::sync::Condvar;
use std::time::Instant;

use crate::traffic::monitor::{self, Monitor};
use crate::traffic::output::{Action, ConnectorType, OutputSink};

struct State {
    cars_loaded: [u32; 2],
    departure_deadline: [Instant; 2],
    /// Bumped every time a side departs (reaches capacity or times out).
    /// Waiters compare against the epoch they arrived in so a spurious
    /// `Condvar` wakeup (no state change) doesn't get mistaken for a real
    /// departure or a timeout that already happened.
    departure_epoch: [u64; 2],
}

pub struct Ferry {
    id: u32,
    travel_time_ms: u64,
    max_wait_time_ms: u64,
    capacity: u32,
    monitor: Monitor<State>,
    ready_to_depart: [Condvar; 2],
}

impl Ferry {
    pub fn new(id: u32, travel_time_ms: u64, max_wait_time_ms: u64, capacity: u32) -> Self {
        let now = Instant::now();
        Ferry {
            id,
            travel_time_ms,
            max_wait_time_ms,
            capacity,
            monitor: Monitor::new(State {
                cars_loaded: [0, 0],
                departure_deadline: [now, now],
                departure_epoch: [0, 0],
            }),
            ready_to_depart: [Condvar::new(), Condvar::new()],
        }
    }

    /// `side` is the loading side of the hop (for a ferry, `from` carries
    /// the side).
    pub fn pass(&self, car_id: u32, side: usize, sink: &dyn OutputSink) {
        let mut guard = self.monitor.lock();

        sink.write_event(car_id, ConnectorType::Ferry, self.id, Action::Arrive);
        guard.cars_loaded[side] += 1;
        let my_epoch = guard.departure_epoch[side];

        if guard.cars_loaded[side] == 1 {
            guard.departure_deadline[side] = monitor::deadline_from_now(self.max_wait_time_ms);
        }

        if guard.cars_loaded[side] >= self.capacity {
            guard.cars_loaded[side] = 0;
            guard.departure_epoch[side] = guard.departure_epoch[side].wrapping_add(1);
            self.ready_to_depart[side].notify_all();
        } else {
            let deadline = guard.departure_deadline[side];
            while guard.departure_epoch[side] == my_epoch {
                let (next, timed_out) = monitor::timedwait(&self.ready_to_depart[side], guard, deadline);
                guard = next;
                if guard.departure_epoch[side] != my_epoch {
                    break;
                }
                if timed_out {
                    guard.cars_loaded[side] = 0;
                    guard.departure_epoch[side] = guard.departure_epoch[side].wrapping_add(1);
                    self.ready_to_depart[side].notify_all();
                    break;
                }
            }
        }

        sink.write_event(car_id, ConnectorType::Ferry, self.id, Action::StartPassing);
        drop(guard);
        std::thread::sleep(std::time::Duration::from_millis(self.travel_time_ms));
        let _guard = self.monitor.lock();
        sink.write_event(car_id, ConnectorType::Ferry, self.id, Action::FinishPassing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::output::testing::RecordingSink;
    use std::sync::Arc;

    #[test]
    fn full_load_departs_without_waiting_for_timeout() {
        let ferry = Arc::new(Ferry::new(0, 20, 5_000, 3));
        let sink = Arc::new(RecordingSink::new());

        let start = Instant::now();
        let handles: Vec<_> = (1..=3)
            .map(|id| {
                let f = Arc::clone(&ferry);
                let s = Arc::clone(&sink);
                std::thread::spawn(move || f.pass(id, 0, s.as_ref()))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(start.elapsed().as_millis() < 4_000);
        for id in 1..=3 {
            assert_eq!(
                sink.events_for_car(id),
                vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
            );
        }
    }

    #[test]
    fn partial_load_departs_after_timeout() {
        let ferry = Arc::new(Ferry::new(0, 10, 100, 3));
        let sink = Arc::new(RecordingSink::new());

        let handles: Vec<_> = (1..=2)
            .map(|id| {
                let f = Arc::clone(&ferry);
                let s = Arc::clone(&sink);
                std::thread::spawn(move || f.pass(id, 0, s.as_ref()))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for id in 1..=2 {
            assert_eq!(
                sink.events_for_car(id),
                vec![Action::Arrive, Action::StartPassing, Action::FinishPassing]
            );
        }
    }

    #[test]
    fn sides_are_independent() {
        let ferry = Arc::new(Ferry::new(0, 10, 100, 1));
        let sink = Arc::new(RecordingSink::new());

        let f1 = Arc::clone(&ferry);
        let s1 = Arc::clone(&sink);
        let t1 = std::thread::spawn(move || f1.pass(1, 0, s1.as_ref()));

        let f2 = Arc::clone(&ferry);
        let s2 = Arc::clone(&sink);
        let t2 = std::thread::spawn(move || f2.pass(2, 1, s2.as_ref()));

        t1.join().unwrap();
        t2.join().unwrap();

        assert_eq!(sink.events_for_car(1).len(), 3);
        assert_eq!(sink.events_for_car(2).len(), 3);
    }
}
