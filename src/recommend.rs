use serde::Serialize;

use crate::types::{LayoutResult, Strategy};

/// Strategies whose internal waste is within this much of the best are
/// considered equally good on waste.
pub const WASTE_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pick {
    pub strategy: Strategy,
    pub internal_waste: f64,
    pub piece_count: usize,
}

impl Pick {
    fn from_result(result: &LayoutResult) -> Self {
        Self {
            strategy: result.strategy,
            internal_waste: result.internal_waste,
            piece_count: result.piece_count(),
        }
    }
}

/// Side-by-side verdict over a set of strategy results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Recommendation {
    pub least_waste: Pick,
    /// Fewest pieces among strategies close to the least waste.
    pub fewest_pieces: Pick,
    /// Most pieces among strategies close to the least waste.
    pub most_pieces: Pick,
}

/// Picks the strategies worth recommending.
///
/// Only successful results that placed at least one piece take part, unless
/// the catalog was empty, in which case every successful result does. Ties
/// go to the result that comes first in `results`.
pub fn recommend(results: &[LayoutResult], catalog_is_empty: bool) -> Option<Recommendation> {
    let candidates: Vec<&LayoutResult> = results
        .iter()
        .filter(|r| r.is_success() && (catalog_is_empty || !r.combination.is_empty()))
        .collect();

    let least_waste = candidates
        .iter()
        .copied()
        .min_by(|a, b| a.internal_waste.total_cmp(&b.internal_waste))?;

    let threshold = least_waste.internal_waste + WASTE_TOLERANCE;
    let similar: Vec<&LayoutResult> = candidates
        .iter()
        .copied()
        .filter(|r| r.internal_waste <= threshold)
        .collect();

    let fewest = similar
        .iter()
        .copied()
        .min_by_key(|r| r.piece_count())
        .unwrap_or(least_waste);
    // max_by_key keeps the last maximum; walk backwards so the first one wins.
    let most = similar
        .iter()
        .rev()
        .copied()
        .max_by_key(|r| r.piece_count())
        .unwrap_or(least_waste);

    Some(Recommendation {
        least_waste: Pick::from_result(least_waste),
        fewest_pieces: Pick::from_result(fewest),
        most_pieces: Pick::from_result(most),
    })
}
