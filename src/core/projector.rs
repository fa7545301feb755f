use std::collections::BTreeMap;

use tracing::info;

use crate::core::engine::Matching;
use crate::models::{Orientation, PairReport};

/// Project a frozen matching as a map keyed by the requested side.
///
/// Every member of the keying side appears, with unmatched members mapped to
/// `None` rather than dropped. The map is ordered by label for deterministic
/// iteration.
pub fn project(matching: &Matching, orientation: Orientation) -> BTreeMap<String, Option<String>> {
    let mut pairs = BTreeMap::new();
    match orientation {
        Orientation::Proposer => {
            for (p, label) in matching.proposer_labels().iter().enumerate() {
                let partner = matching
                    .acceptor_of(p)
                    .map(|a| matching.acceptor_labels()[a].clone());
                pairs.insert(label.clone(), partner);
            }
        }
        Orientation::Acceptor => {
            for (a, label) in matching.acceptor_labels().iter().enumerate() {
                let partner = matching
                    .proposer_of(a)
                    .map(|p| matching.proposer_labels()[p].clone());
                pairs.insert(label.clone(), partner);
            }
        }
    }
    pairs
}

/// Flatten a matching into serializable rows: one per acceptor, then one per
/// unmatched proposer, so nobody is silently dropped in either direction
pub fn reports(matching: &Matching) -> Vec<PairReport> {
    let mut rows: Vec<PairReport> = matching
        .acceptor_labels()
        .iter()
        .enumerate()
        .map(|(a, label)| PairReport {
            proposer: matching
                .proposer_of(a)
                .map(|p| matching.proposer_labels()[p].clone()),
            acceptor: Some(label.clone()),
        })
        .collect();
    for (p, label) in matching.proposer_labels().iter().enumerate() {
        if matching.acceptor_of(p).is_none() {
            rows.push(PairReport {
                proposer: Some(label.clone()),
                acceptor: None,
            });
        }
    }
    rows
}

/// Log every pair (and every unmatched member) at info level
pub fn log_pairs(matching: &Matching) {
    for row in reports(matching) {
        match (&row.proposer, &row.acceptor) {
            (Some(p), Some(a)) => info!("{a} is paired with {p}"),
            (None, Some(a)) => info!("{a} is unpaired"),
            (Some(p), None) => info!("{p} is unpaired"),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::StablePairing;
    use crate::models::PreferenceTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_worked_example() -> StablePairing {
        let proposers = PreferenceTable::new(
            vec!["A1".into(), "A2".into()],
            vec![vec![1.0, 2.0, 3.0], vec![2.0, 1.0, 3.0]],
        )
        .unwrap();
        let acceptors = PreferenceTable::new(
            vec!["B1".into(), "B2".into(), "B3".into()],
            vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![1.0, 2.0]],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1234);
        let mut pairing = StablePairing::new(&proposers, &acceptors, &mut rng).unwrap();
        pairing.run();
        pairing
    }

    #[test]
    fn test_proposer_orientation() {
        let pairing = run_worked_example();
        let pairs = project(pairing.matching().unwrap(), Orientation::Proposer);

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs["A1"], Some("B1".to_string()));
        assert_eq!(pairs["A2"], Some("B2".to_string()));
    }

    #[test]
    fn test_acceptor_orientation_keeps_unmatched() {
        let pairing = run_worked_example();
        let pairs = project(pairing.matching().unwrap(), Orientation::Acceptor);

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs["B1"], Some("A1".to_string()));
        assert_eq!(pairs["B2"], Some("A2".to_string()));
        assert_eq!(pairs["B3"], None);
    }

    #[test]
    fn test_reports_cover_both_sides() {
        let pairing = run_worked_example();
        let rows = reports(pairing.matching().unwrap());

        // Three acceptor rows, no unmatched proposers
        assert_eq!(rows.len(), 3);
        assert!(rows
            .iter()
            .any(|r| r.acceptor.as_deref() == Some("B3") && r.proposer.is_none()));
    }
}
