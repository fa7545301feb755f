//! Synthetic preference generation for demos, tests and benchmarks.
//!
//! `reciprocal_preferences` mirrors the common mentorship-program situation
//! where only one side filled out a real ranking survey and the other side's
//! preferences have to be made up in a way that still respects the first
//! side's strong opinions.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{PreferenceTable, TableError};

/// Labels `{prefix}01`, `{prefix}02`, ... for a synthetic group
pub fn sequential_labels(prefix: &str, count: usize) -> Vec<String> {
    let width = count.to_string().len().max(2);
    (1..=count)
        .map(|i| format!("{prefix}{i:0width$}"))
        .collect()
}

/// Build a counterparty preference table from one side's table.
///
/// For each counterpart (a column of `table`), members who ranked that
/// counterpart better than `rank_cut` receive shuffled top ranks and everyone
/// else receives shuffled ranks below them. Low cuts make the result track
/// the original side's preferences closely; high cuts make it more random.
///
/// # Arguments
/// * `table` - One side's preferences (rows rank columns)
/// * `counterpart_labels` - Labels for the other side, one per column of `table`
/// * `rank_cut` - Scores strictly below this count as "highly ranked"
/// * `rng` - Seeded generator for the tier shuffles
///
/// # Returns
/// A table of shape `table.width() x table.len()`
pub fn reciprocal_preferences(
    table: &PreferenceTable,
    counterpart_labels: Vec<String>,
    rank_cut: f64,
    rng: &mut impl Rng,
) -> Result<PreferenceTable, TableError> {
    let rows = table.len();
    let cols = table.width();
    let mut out = vec![vec![0.0f64; rows]; cols];
    for c in 0..cols {
        let favored: Vec<usize> = (0..rows)
            .filter(|&r| table.scores()[r][c] < rank_cut)
            .collect();
        let others: Vec<usize> = (0..rows)
            .filter(|&r| table.scores()[r][c] >= rank_cut)
            .collect();

        let mut top: Vec<u32> = (1..=favored.len() as u32).collect();
        top.shuffle(rng);
        let mut low: Vec<u32> = (favored.len() as u32 + 1..=rows as u32).collect();
        low.shuffle(rng);

        for (k, &r) in favored.iter().enumerate() {
            out[c][r] = top[k] as f64;
        }
        for (k, &r) in others.iter().enumerate() {
            out[c][r] = low[k] as f64;
        }
    }
    PreferenceTable::new(counterpart_labels, out)
}

/// Random raw score table with ties, labels synthesized from `prefix`
pub fn random_preferences(
    count: usize,
    cols: usize,
    prefix: &str,
    rng: &mut impl Rng,
) -> Result<PreferenceTable, TableError> {
    let scores = (0..count)
        .map(|_| {
            (0..cols)
                .map(|_| rng.gen_range(1..=cols as u32) as f64)
                .collect()
        })
        .collect();
    PreferenceTable::new(sequential_labels(prefix, count), scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sequential_labels() {
        let labels = sequential_labels("mentee_", 3);
        assert_eq!(labels, vec!["mentee_01", "mentee_02", "mentee_03"]);
    }

    #[test]
    fn test_reciprocal_shape_and_totality() {
        let mut rng = StdRng::seed_from_u64(5);
        let side_a = random_preferences(4, 6, "a_", &mut rng).unwrap();
        let side_b =
            reciprocal_preferences(&side_a, sequential_labels("b_", 6), 3.0, &mut rng).unwrap();

        assert_eq!(side_b.len(), 6);
        assert_eq!(side_b.width(), 4);
        // Each synthesized row is already a permutation of 1..=4
        for row in side_b.scores() {
            let mut sorted: Vec<u32> = row.iter().map(|&v| v as u32).collect();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_reciprocal_favors_high_rankers() {
        // One member ranks the counterpart first, the others rank it last;
        // the favored member must land in the top tier
        let table = PreferenceTable::new(
            vec!["a1".into(), "a2".into(), "a3".into()],
            vec![vec![1.0], vec![9.0], vec![9.0]],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let recip =
            reciprocal_preferences(&table, vec!["b1".into()], 5.0, &mut rng).unwrap();

        assert_eq!(recip.scores()[0][0], 1.0);
        assert!(recip.scores()[0][1] > 1.0);
        assert!(recip.scores()[0][2] > 1.0);
    }
}
