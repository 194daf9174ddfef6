//! The monitor primitive: a mutex bundled with named condition
//! variables that share its state, plus a scoped-lock idiom for entering a
//! monitored method.
//!
//! Each connector holds one [`Monitor<State>`] for its mutable state and a
//! handful of sibling [`Condvar`]s (one per direction/side) — the condition
//! variables themselves carry no state, so they don't need to live behind
//! the lock; only the FIFO queues, counters, and deadlines they guard do.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A mutex around monitored state `T`. `lock` is the scoped-acquisition
/// entry point every monitored method (`pass`) calls first; the returned
/// guard releases the mutex on every exit path, including panics.
pub struct Monitor<T> {
    state: Mutex<T>,
}

impl<T> Monitor<T> {
    pub fn new(initial: T) -> Self {
        Monitor {
            state: Mutex::new(initial),
        }
    }

    /// Acquire the monitor. A poisoned mutex (a prior panic while holding
    /// the lock) is treated as unrecoverable here, same as the rest of this
    /// simulation's "malformed state is undefined behavior" stance — there
    /// is no sensible way to keep simulating cars through state a panicking
    /// thread left half-updated.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Untimed wait: atomically release the monitor and suspend until
/// `notify`/`notify_all` wakes this thread, which reacquires the mutex
/// before returning.
pub fn wait<'a, T>(cv: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    cv.wait(guard).unwrap_or_else(|e| e.into_inner())
}

/// Timed wait against an absolute deadline. Returns the reacquired guard
/// and whether the deadline passed before a notification arrived.
///
/// `std::sync::Condvar` only accepts a relative `Duration`, so the absolute
/// deadline is converted to "time remaining from now" on every call — this
/// mirrors `clock_gettime`/`pthread_cond_timedwait`'s absolute-deadline
/// semantics while using the monotonic `Instant` clock.
pub fn timedwait<'a, T>(
    cv: &Condvar,
    guard: MutexGuard<'a, T>,
    deadline: Instant,
) -> (MutexGuard<'a, T>, bool) {
    let now = Instant::now();
    if deadline <= now {
        return (guard, true);
    }
    let (guard, result) = cv
        .wait_timeout(guard, deadline - now)
        .unwrap_or_else(|e| e.into_inner());
    (guard, result.timed_out())
}

/// Compute a fresh absolute deadline `now + wait_time_ms`.
pub fn deadline_from_now(wait_time_ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(wait_time_ms)
}
