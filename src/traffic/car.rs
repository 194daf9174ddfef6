//! Car agent: walks a fixed route of connector hops.

use crate::traffic::output::{Action, ConnectorType, OutputSink};
use crate::traffic::scenario::Connectors;

/// One hop: which connector, and the direction/side fields the connector's
/// `pass` expects.
#[derive(Debug, Clone, Copy)]
pub struct PathSegment {
    pub connector: ConnectorType,
    pub id: u32,
    pub from: usize,
    pub to: usize,
}

pub struct Car {
    pub id: u32,
    pub travel_time_ms: u64,
    pub path: Vec<PathSegment>,
}

impl Car {
    /// Runs the car's entire route to completion, travelling then passing
    /// each connector in order. A car holds at most one connector at a time.
    pub fn operate(&self, connectors: &Connectors, sink: &dyn OutputSink) {
        for segment in &self.path {
            sink.write_event(self.id, segment.connector, segment.id, Action::Travel);
            std::thread::sleep(std::time::Duration::from_millis(self.travel_time_ms));

            match segment.connector {
                ConnectorType::Crossroad => {
                    connectors.crossroads[segment.id as usize].pass(self.id, segment.from, sink)
                }
                ConnectorType::Ferry => {
                    connectors.ferries[segment.id as usize].pass(self.id, segment.from, sink)
                }
                ConnectorType::NarrowBridge => {
                    connectors.narrow_bridges[segment.id as usize].pass(self.id, segment.to, sink)
                }
            }
        }
    }
}
