//! Scenario loader: reads the fixed whitespace-separated integer stream
//! from stdin and drives the simulation to completion.

use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::traffic::car::{Car, PathSegment};
use crate::traffic::crossroad::Crossroad;
use crate::traffic::error::Error;
use crate::traffic::ferry::Ferry;
use crate::traffic::narrow_bridge::NarrowBridge;
use crate::traffic::output::{ConnectorType, OutputSink, StdoutSink};

/// The three connector vectors a car's route indexes into. Wrapped in `Arc`
/// so every car thread shares one read-only view of the collection while
/// mutating per-connector state through each connector's own [`Monitor`].
pub struct Connectors {
    pub narrow_bridges: Vec<NarrowBridge>,
    pub ferries: Vec<Ferry>,
    pub crossroads: Vec<Crossroad>,
}

/// A token-at-a-time reader over the whole input, since the format freely
/// mixes counts and per-record fields across lines.
struct TokenReader {
    tokens: std::vec::IntoIter<String>,
}

impl TokenReader {
    fn new(input: &str) -> Self {
        TokenReader {
            tokens: input
                .split_whitespace()
                .map(str::to_owned)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }

    fn next_str(&mut self) -> String {
        self.tokens
            .next()
            .expect("scenario input ended before expected field")
    }

    fn next_u32(&mut self) -> u32 {
        self.next_str()
            .parse()
            .expect("scenario input field is not an integer")
    }

    fn next_u64(&mut self) -> u64 {
        self.next_str()
            .parse()
            .expect("scenario input field is not an integer")
    }

    fn next_usize(&mut self) -> usize {
        self.next_str()
            .parse()
            .expect("scenario input field is not an integer")
    }
}

fn read_connector_id(token: &str) -> (ConnectorType, u32) {
    let (tag, rest) = token.split_at(1);
    let connector = match tag {
        "N" => ConnectorType::NarrowBridge,
        "F" => ConnectorType::Ferry,
        "C" => ConnectorType::Crossroad,
        other => panic!("unknown connector type tag: {other}"),
    };
    let id: u32 = rest.parse().expect("connector id is not an integer");
    (connector, id)
}

fn load(reader: &mut TokenReader) -> (Connectors, Vec<Car>) {
    let n_bridges = reader.next_usize();
    let narrow_bridges: Vec<NarrowBridge> = (0..n_bridges)
        .map(|i| {
            let travel_time = reader.next_u64();
            let max_wait_time = reader.next_u64();
            NarrowBridge::new(i as u32, travel_time, max_wait_time)
        })
        .collect();

    let n_ferries = reader.next_usize();
    let ferries: Vec<Ferry> = (0..n_ferries)
        .map(|i| {
            let travel_time = reader.next_u64();
            let max_wait_time = reader.next_u64();
            let capacity = reader.next_u32();
            Ferry::new(i as u32, travel_time, max_wait_time, capacity)
        })
        .collect();

    let n_crossroads = reader.next_usize();
    let crossroads: Vec<Crossroad> = (0..n_crossroads)
        .map(|i| {
            let travel_time = reader.next_u64();
            let max_wait_time = reader.next_u64();
            Crossroad::new(i as u32, travel_time, max_wait_time)
        })
        .collect();

    debug!(n_bridges, n_ferries, n_crossroads, "connectors constructed");

    let n_cars = reader.next_usize();
    let cars: Vec<Car> = (0..n_cars)
        .map(|id| {
            let travel_time_ms = reader.next_u64();
            let path_length = reader.next_usize();
            let path = (0..path_length)
                .map(|_| {
                    let (connector, conn_id) = read_connector_id(&reader.next_str());
                    let from = reader.next_usize();
                    let to = reader.next_usize();
                    PathSegment {
                        connector,
                        id: conn_id,
                        from,
                        to,
                    }
                })
                .collect();
            Car {
                id: id as u32,
                travel_time_ms,
                path,
            }
        })
        .collect();

    debug!(n_cars, "cars constructed");

    (
        Connectors {
            narrow_bridges,
            ferries,
            crossroads,
        },
        cars,
    )
}

/// Reads the scenario from stdin, spawns one OS thread per car, and blocks
/// until every car has completed its route.
pub fn run() -> Result<(), Error> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let mut reader = TokenReader::new(&input);
    let (connectors, cars) = load(&mut reader);

    run_with(connectors, cars, Arc::new(StdoutSink::new()));
    Ok(())
}

fn run_with(connectors: Connectors, cars: Vec<Car>, sink: Arc<dyn OutputSink>) {
    let connectors = Arc::new(connectors);

    let handles: Vec<_> = cars
        .into_iter()
        .map(|car| {
            let connectors = Arc::clone(&connectors);
            let sink = Arc::clone(&sink);
            std::thread::spawn(move || car.operate(&connectors, sink.as_ref()))
        })
        .collect();

    for handle in handles {
        handle.join().expect("car thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::output::testing::RecordingSink;
    use crate::traffic::output::Action;

    #[test]
    fn one_bridge_two_cars_opposite_directions() {
        let input = "1\n10 200\n0\n0\n2\n5 1\nN0 0 0\n5 1\nN0 1 1\n";
        let mut reader = TokenReader::new(input);
        let (connectors, cars) = load(&mut reader);
        let sink = Arc::new(RecordingSink::new());

        run_with(connectors, cars, sink.clone());

        for id in 0..2 {
            assert_eq!(
                sink.events_for_car(id),
                vec![Action::Travel, Action::Arrive, Action::StartPassing, Action::FinishPassing]
            );
        }
    }

    #[test]
    fn single_crossroad_car_completes() {
        let input = "0\n0\n1\n15 200\n1\n5 1\nC0 2 2\n";
        let mut reader = TokenReader::new(input);
        let (connectors, cars) = load(&mut reader);
        let sink = Arc::new(RecordingSink::new());

        run_with(connectors, cars, sink.clone());

        assert_eq!(
            sink.events_for_car(0),
            vec![Action::Travel, Action::Arrive, Action::StartPassing, Action::FinishPassing]
        );
    }
}
