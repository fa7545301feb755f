use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Errors for degenerate preference rows
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("preference row is empty")]
    EmptyRow,

    #[error("non-finite score at position {position}")]
    NonFinite { position: usize },
}

/// Normalize a row of raw preference scores into dense unique ranks.
///
/// The output is a permutation of `1..=row.len()` (1 = most preferred) that
/// preserves the relative order of distinct scores. Tied scores occupy a
/// block of consecutive rank slots; those slots are shuffled with the
/// caller's generator and handed to the tied positions in ascending index
/// order, so a fixed seed reproduces the row bit-for-bit.
///
/// An all-tied row therefore becomes a fully random permutation, and gaps
/// between raw values collapse (e.g. `[5, 10, 3, 3, 4, 3]` could become
/// `[5, 6, 2, 3, 4, 1]`).
///
/// # Arguments
/// * `row` - Raw scores, lower = more preferred; ties and gaps allowed
/// * `rng` - Seeded generator for tie-breaking, threaded explicitly
///
/// # Returns
/// Dense ranks, or an error for an empty row or non-finite scores
pub fn normalize_row(row: &[f64], rng: &mut impl Rng) -> Result<Vec<u32>, NormalizeError> {
    if row.is_empty() {
        return Err(NormalizeError::EmptyRow);
    }
    if let Some(position) = row.iter().position(|v| !v.is_finite()) {
        return Err(NormalizeError::NonFinite { position });
    }

    // Sorting positions by (score, index) visits tie groups in ascending
    // score order with members in array order
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));

    let mut ranks = vec![0u32; row.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && row[order[end]] == row[order[start]] {
            end += 1;
        }
        if end - start == 1 {
            ranks[order[start]] = (start + 1) as u32;
        } else {
            let mut slots: Vec<u32> = (start as u32 + 1..=end as u32).collect();
            slots.shuffle(rng);
            for (slot, &position) in slots.iter().zip(&order[start..end]) {
                ranks[position] = *slot;
            }
        }
        start = end;
    }
    Ok(ranks)
}

/// Normalize every row of a score matrix, consuming the generator in row
/// order (the whole-matrix reproducibility contract: fixed seed + fixed row
/// order = identical output)
pub fn normalize_rows(
    rows: &[Vec<f64>],
    rng: &mut impl Rng,
) -> Result<Vec<Vec<u32>>, NormalizeError> {
    rows.iter().map(|row| normalize_row(row, rng)).collect()
}
