//! Traffic Connector Core (TCC): a monitor-based simulation of cars
//! crossing shared connectors.
//!
//! Module dependency order (leaves first): [`monitor`] → [`narrow_bridge`],
//! [`ferry`], [`crossroad`] → [`car`] → [`scenario`].

pub mod car;
pub mod crossroad;
pub mod error;
pub mod ferry;
pub mod monitor;
pub mod narrow_bridge;
pub mod output;
pub mod scenario;

/// Fixed spacing delay between successive cars beginning to traverse the
/// same connector in the same direction.
pub const PASS_DELAY_MS: u64 = 50;
