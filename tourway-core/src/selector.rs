//! Quickest-mode selection for direct queries.

use crate::edge::{BusStrategy, Mode, TransportNetwork};

/// Pick the quickest mode for a direct start→end hop.
///
/// Compares the direct edge duration across walking, driving, and the
/// quickest bus strategy. The minimum wins; ties fall to the earlier mode
/// in the fixed priority walk, drive, bus. Returns `None` when no mode has
/// the direct edge.
///
/// Only meaningful for direct queries — the comparison says nothing about
/// multi-stop orderings.
#[must_use]
pub fn fastest_mode(network: &TransportNetwork, from: &str, to: &str) -> Option<Mode> {
    let candidates = [
        (Mode::Walk, network.walk().lookup(from, to)),
        (Mode::Drive, network.drive().lookup(from, to)),
        (
            Mode::Bus,
            network
                .bus(BusStrategy::Quickest)
                .and_then(|index| index.lookup(from, to)),
        ),
    ];

    let mut best: Option<(Mode, u32)> = None;
    for (mode, edge) in candidates {
        let Some(edge) = edge else { continue };
        // Strict comparison keeps the higher-priority mode on ties.
        if best.is_none_or(|(_, duration)| edge.duration < duration) {
            best = Some((mode, edge.duration));
        }
    }
    best.map(|(mode, _)| mode)
}
