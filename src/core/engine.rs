use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::normalize::{normalize_row, NormalizeError};
use crate::core::projector;
use crate::models::{Orientation, PreferenceTable};

/// Engine index reserved for "matched to nobody". Real proposers occupy
/// engine indices `1..=n`; public APIs use 0-based proposer indices.
const SENTINEL: usize = 0;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error(
        "proposer table is {n}x{m} but acceptor table is {rows}x{cols}; expected {m}x{n}"
    )]
    ShapeMismatch {
        n: usize,
        m: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid {side} preferences for {label} (row {row}): {source}")]
    Normalize {
        side: &'static str,
        row: usize,
        label: String,
        source: NormalizeError,
    },

    #[error("no matching available yet; call run() first")]
    NotYetRun,
}

/// The frozen outcome of a completed run
#[derive(Debug, Clone)]
pub struct Matching {
    matched_to: Vec<usize>,
    proposals: u64,
    proposer_labels: Vec<String>,
    acceptor_labels: Vec<String>,
}

impl Matching {
    /// Raw match state: entry `j` is the engine index of the proposer
    /// matched to acceptor `j`, 0 meaning unmatched
    pub fn matched_to(&self) -> &[usize] {
        &self.matched_to
    }

    /// Total proposals made during the run (diagnostic; bounded by n*m)
    pub fn proposals(&self) -> u64 {
        self.proposals
    }

    pub fn proposer_labels(&self) -> &[String] {
        &self.proposer_labels
    }

    pub fn acceptor_labels(&self) -> &[String] {
        &self.acceptor_labels
    }

    /// 0-based proposer matched to the given acceptor, if any
    pub fn proposer_of(&self, acceptor: usize) -> Option<usize> {
        self.matched_to
            .get(acceptor)
            .and_then(|&p| p.checked_sub(1))
    }

    /// Acceptor matched to the given 0-based proposer, if any. Injectivity
    /// of the match state makes the first hit the only hit.
    pub fn acceptor_of(&self, proposer: usize) -> Option<usize> {
        self.matched_to.iter().position(|&p| p == proposer + 1)
    }
}

/// Per-run mutable state, allocated fresh by the driver and frozen into a
/// `Matching` when the run ends
struct RunState {
    next_choice: Vec<usize>,
    matched_to: Vec<usize>,
    proposals: u64,
}

/// Proposer-optimal deferred-acceptance matching over two preference tables.
///
/// Pairs two unevenly-sized groups one-to-one; the larger group ends with
/// unmatched members. The proposer side (first table) receives the weakly
/// optimal stable matching, so its preferences carry more weight than the
/// acceptor side's wherever several stable matchings exist.
///
/// Construction validates shapes and normalizes both tables (ties broken by
/// the supplied seeded generator, proposer rows first); the rank matrices
/// are immutable afterwards. `run` executes the proposal/refusal protocol
/// and freezes the outcome.
#[derive(Debug, Clone)]
pub struct StablePairing {
    proposer_labels: Vec<String>,
    acceptor_labels: Vec<String>,
    /// n x m: rank (1 = best) proposer `i` assigns acceptor `j`
    proposer_rank: Vec<Vec<u32>>,
    /// n x m: `proposer_order[i][k]` is the acceptor proposer `i` ranks k+1-th
    proposer_order: Vec<Vec<usize>>,
    /// m x (n+1): rank acceptor `j` assigns each engine index; column 0 is
    /// the sentinel, ranked strictly worse than every real proposer
    acceptor_rank: Vec<Vec<u32>>,
    outcome: Option<Matching>,
}

impl StablePairing {
    /// Build an engine from raw preference tables.
    ///
    /// The proposer table must be `n x m` and the acceptor table `m x n`,
    /// with row `k` of one side referring to the same person as column `k`
    /// of the other (the caller's ordering contract).
    ///
    /// # Arguments
    /// * `proposers` - Preference table of the favored side (rows propose)
    /// * `acceptors` - Preference table of the other side
    /// * `rng` - Seeded generator for tie-breaking during normalization
    pub fn new(
        proposers: &PreferenceTable,
        acceptors: &PreferenceTable,
        rng: &mut impl Rng,
    ) -> Result<Self, PairingError> {
        let n = proposers.len();
        let m = proposers.width();
        if acceptors.len() != m || acceptors.width() != n {
            return Err(PairingError::ShapeMismatch {
                n,
                m,
                rows: acceptors.len(),
                cols: acceptors.width(),
            });
        }

        // Proposer rows are normalized before acceptor rows; the generator
        // is consumed in that order, which is the reproducibility contract.
        let mut proposer_rank = Vec::with_capacity(n);
        for (row, scores) in proposers.scores().iter().enumerate() {
            let ranks = normalize_row(scores, rng).map_err(|source| PairingError::Normalize {
                side: "proposer",
                row,
                label: proposers.labels()[row].clone(),
                source,
            })?;
            proposer_rank.push(ranks);
        }

        let mut acceptor_rank = Vec::with_capacity(m);
        for (row, scores) in acceptors.scores().iter().enumerate() {
            let ranks = normalize_row(scores, rng).map_err(|source| PairingError::Normalize {
                side: "acceptor",
                row,
                label: acceptors.labels()[row].clone(),
                source,
            })?;
            // Sentinel column: worse than any real rank, so the first real
            // proposal at any acceptor is always accepted
            let mut with_sentinel = Vec::with_capacity(n + 1);
            with_sentinel.push(n as u32 + 2);
            with_sentinel.extend(ranks);
            acceptor_rank.push(with_sentinel);
        }

        // Invert each rank row into a preference-order list so the proposal
        // loop can read "next acceptor to try" directly
        let proposer_order = proposer_rank
            .iter()
            .map(|ranks| {
                let mut order = vec![0usize; m];
                for (acceptor, &rank) in ranks.iter().enumerate() {
                    order[rank as usize - 1] = acceptor;
                }
                order
            })
            .collect();

        Ok(Self {
            proposer_labels: proposers.labels().to_vec(),
            acceptor_labels: acceptors.labels().to_vec(),
            proposer_rank,
            proposer_order,
            acceptor_rank,
            outcome: None,
        })
    }

    pub fn proposer_count(&self) -> usize {
        self.proposer_labels.len()
    }

    pub fn acceptor_count(&self) -> usize {
        self.acceptor_labels.len()
    }

    /// Run deferred acceptance, visiting proposers in index order.
    ///
    /// The final matching does not depend on the visitation order (a
    /// proposer cannot be displaced before its own first proposal), so this
    /// single monotonic pass is equivalent to the classical round-based
    /// algorithm.
    pub fn run(&mut self) -> &Matching {
        let order: Vec<usize> = (0..self.proposer_count()).collect();
        self.run_with_order(&order)
    }

    /// Run deferred acceptance with an explicit top-level visitation order
    /// of 0-based proposer indices. Any permutation yields the same final
    /// matching; this entry point exists so that callers (and tests) can
    /// assert exactly that. Re-running resets all run state first.
    pub fn run_with_order(&mut self, order: &[usize]) -> &Matching {
        let n = self.proposer_count();
        let m = self.acceptor_count();
        let mut state = RunState {
            next_choice: vec![0; n + 1],
            matched_to: vec![SENTINEL; m],
            proposals: 0,
        };

        for &proposer in order {
            self.propose_chain(&mut state, proposer + 1);
        }

        info!(
            proposers = n,
            acceptors = m,
            proposals = state.proposals,
            "pairing run complete"
        );

        let matching = Matching {
            matched_to: state.matched_to,
            proposals: state.proposals,
            proposer_labels: self.proposer_labels.clone(),
            acceptor_labels: self.acceptor_labels.clone(),
        };
        &*self.outcome.insert(matching)
    }

    /// One proposal/refusal chain, starting from the given engine index.
    ///
    /// Propose and Decide form a linear mutual recursion (each step issues
    /// at most one follow-up), so the chain runs as a loop over the current
    /// proposer: a rejected proposer retries its next choice, an accepted
    /// proposal hands the loop to whoever was displaced. Terminates because
    /// every step advances some proposer's choice counter, each capped at m.
    fn propose_chain(&self, state: &mut RunState, start: usize) {
        let m = self.acceptor_count();
        let mut proposer = start;
        loop {
            if proposer == SENTINEL || state.next_choice[proposer] == m {
                // Nobody left to propose, or this proposer has exhausted
                // its list and stays permanently unmatched
                return;
            }
            state.proposals += 1;
            let choice = state.next_choice[proposer];
            state.next_choice[proposer] += 1;
            let acceptor = self.proposer_order[proposer - 1][choice];

            let current = state.matched_to[acceptor];
            if self.acceptor_rank[acceptor][current] > self.acceptor_rank[acceptor][proposer] {
                // Acceptor trades up; its old match proposes next
                state.matched_to[acceptor] = proposer;
                debug!(
                    proposer = proposer - 1,
                    acceptor,
                    displaced = current,
                    "proposal accepted"
                );
                proposer = current;
            }
            // Rejected: the same proposer tries its next choice
        }
    }

    /// The frozen matching of the last completed run
    pub fn matching(&self) -> Result<&Matching, PairingError> {
        self.outcome.as_ref().ok_or(PairingError::NotYetRun)
    }

    /// Project the matching keyed by the requested side; unmatched members
    /// map to `None`
    pub fn pairs(
        &self,
        orientation: Orientation,
    ) -> Result<BTreeMap<String, Option<String>>, PairingError> {
        Ok(projector::project(self.matching()?, orientation))
    }

    /// Enumerate blocking pairs `(proposer, acceptor)` in the last run's
    /// matching: pairs who both prefer each other over their assignments.
    /// An empty result certifies stability.
    pub fn blocking_pairs(&self) -> Result<Vec<(usize, usize)>, PairingError> {
        let matching = self.matching()?;
        let m = self.acceptor_count();
        let mut pairs = Vec::new();
        for p in 0..self.proposer_count() {
            // An unmatched proposer prefers every acceptor on its list
            let current_rank = matching
                .acceptor_of(p)
                .map(|a| self.proposer_rank[p][a])
                .unwrap_or(m as u32 + 1);
            for a in 0..m {
                if self.proposer_rank[p][a] < current_rank {
                    let held = matching.matched_to[a];
                    if self.acceptor_rank[a][held] > self.acceptor_rank[a][p + 1] {
                        pairs.push((p, a));
                    }
                }
            }
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table(labels: &[&str], scores: Vec<Vec<f64>>) -> PreferenceTable {
        PreferenceTable::new(labels.iter().map(|s| s.to_string()).collect(), scores).unwrap()
    }

    /// The worked two-proposer, three-acceptor scenario: mutual first
    /// choices A1-B1 and A2-B2 pair up immediately, B3 stays unmatched.
    fn worked_example() -> StablePairing {
        let proposers = table(
            &["A1", "A2"],
            vec![vec![1.0, 2.0, 3.0], vec![2.0, 1.0, 3.0]],
        );
        let acceptors = table(
            &["B1", "B2", "B3"],
            vec![vec![1.0, 2.0], vec![2.0, 1.0], vec![1.0, 2.0]],
        );
        let mut rng = StdRng::seed_from_u64(1234);
        StablePairing::new(&proposers, &acceptors, &mut rng).unwrap()
    }

    #[test]
    fn test_worked_example_matching() {
        let mut pairing = worked_example();
        let matching = pairing.run();

        assert_eq!(matching.matched_to(), &[1, 2, 0]);
        assert_eq!(matching.proposer_of(0), Some(0)); // B1 - A1
        assert_eq!(matching.proposer_of(1), Some(1)); // B2 - A2
        assert_eq!(matching.proposer_of(2), None); // B3 unmatched
        assert_eq!(matching.acceptor_of(0), Some(0));
        assert_eq!(matching.acceptor_of(1), Some(1));
    }

    #[test]
    fn test_worked_example_is_stable() {
        let mut pairing = worked_example();
        pairing.run();
        assert!(pairing.blocking_pairs().unwrap().is_empty());
    }

    #[test]
    fn test_unequal_sizes_leave_larger_side_short() {
        let mut pairing = worked_example();
        let matching = pairing.run();

        let unmatched = matching.matched_to().iter().filter(|&&p| p == 0).count();
        assert_eq!(unmatched, 1);
        assert!(matching.acceptor_of(0).is_some());
        assert!(matching.acceptor_of(1).is_some());
    }

    #[test]
    fn test_displacement_chain() {
        // Both proposers want B1 first; B1 prefers A2, so A1 is displaced
        // onto its second choice
        let proposers = table(&["A1", "A2"], vec![vec![1.0, 2.0], vec![1.0, 2.0]]);
        let acceptors = table(&["B1", "B2"], vec![vec![2.0, 1.0], vec![1.0, 2.0]]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut pairing = StablePairing::new(&proposers, &acceptors, &mut rng).unwrap();
        let matching = pairing.run();

        assert_eq!(matching.proposer_of(0), Some(1)); // B1 - A2
        assert_eq!(matching.proposer_of(1), Some(0)); // B2 - A1
        assert_eq!(matching.proposals(), 3);
    }

    #[test]
    fn test_proposal_count_bounded() {
        let mut pairing = worked_example();
        let matching = pairing.run();
        assert!(matching.proposals() <= 2 * 3);
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let proposers = table(&["A1", "A2"], vec![vec![1.0, 2.0], vec![2.0, 1.0]]);
        let acceptors = table(&["B1"], vec![vec![1.0, 2.0]]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = StablePairing::new(&proposers, &acceptors, &mut rng).unwrap_err();
        assert!(matches!(err, PairingError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_degenerate_row_is_fatal_with_context() {
        let proposers = table(&["A1", "A2"], vec![vec![1.0, 2.0], vec![f64::NAN, 1.0]]);
        let acceptors = table(&["B1", "B2"], vec![vec![1.0, 2.0], vec![2.0, 1.0]]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = StablePairing::new(&proposers, &acceptors, &mut rng).unwrap_err();
        match err {
            PairingError::Normalize {
                side, row, label, ..
            } => {
                assert_eq!(side, "proposer");
                assert_eq!(row, 1);
                assert_eq!(label, "A2");
            }
            other => panic!("expected Normalize error, got {other:?}"),
        }
    }

    #[test]
    fn test_results_before_run_fail() {
        let pairing = worked_example();
        assert!(matches!(pairing.matching(), Err(PairingError::NotYetRun)));
        assert!(matches!(
            pairing.pairs(Orientation::Proposer),
            Err(PairingError::NotYetRun)
        ));
        assert!(matches!(
            pairing.blocking_pairs(),
            Err(PairingError::NotYetRun)
        ));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut pairing = worked_example();
        let first = pairing.run().matched_to().to_vec();
        let second = pairing.run().matched_to().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_invariance_on_worked_example() {
        let mut a = worked_example();
        let mut b = worked_example();
        let forward = a.run().matched_to().to_vec();
        let reversed = b.run_with_order(&[1, 0]).matched_to().to_vec();
        assert_eq!(forward, reversed);
    }
}
