//! The `write_output` collaborator: serializes the four event kinds to
//! stdout so concurrent car threads never interleave mid-line.

use std::io::Write;
use std::sync::Mutex;

/// The four observable event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Arrive,
    Travel,
    StartPassing,
    FinishPassing,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Arrive => "ARRIVE",
            Action::Travel => "TRAVEL",
            Action::StartPassing => "START_PASSING",
            Action::FinishPassing => "FINISH_PASSING",
        }
    }
}

/// A connector type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorType {
    NarrowBridge,
    Ferry,
    Crossroad,
}

impl ConnectorType {
    fn as_char(self) -> char {
        match self {
            ConnectorType::NarrowBridge => 'N',
            ConnectorType::Ferry => 'F',
            ConnectorType::Crossroad => 'C',
        }
    }
}

/// A single-writer sink for event lines, serialized behind its own mutex —
/// no other code path in the `connectors` binary writes to stdout.
pub trait OutputSink: Send + Sync {
    fn write_event(&self, car_id: u32, connector: ConnectorType, connector_id: u32, action: Action);
}

/// The production sink: one line per event on stdout.
pub struct StdoutSink {
    guard: Mutex<std::io::Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        StdoutSink {
            guard: Mutex::new(std::io::stdout()),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn write_event(&self, car_id: u32, connector: ConnectorType, connector_id: u32, action: Action) {
        let mut out = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(
            out,
            "{} {}{} {}",
            car_id,
            connector.as_char(),
            connector_id,
            action.as_str()
        );
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// An in-memory sink for unit tests: records every event in arrival
    /// order so tests can assert on the ordering invariants directly.
    #[derive(Default)]
    pub struct RecordingSink {
        events: StdMutex<Vec<(u32, ConnectorType, u32, Action)>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<(u32, ConnectorType, u32, Action)> {
            self.events.lock().unwrap().clone()
        }

        pub fn events_for_car(&self, car_id: u32) -> Vec<Action> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, ..)| *id == car_id)
                .map(|(_, _, _, action)| *action)
                .collect()
        }
    }

    impl OutputSink for RecordingSink {
        fn write_event(
            &self,
            car_id: u32,
            connector: ConnectorType,
            connector_id: u32,
            action: Action,
        ) {
            self.events
                .lock()
                .unwrap()
                .push((car_id, connector, connector_id, action));
        }
    }
}
