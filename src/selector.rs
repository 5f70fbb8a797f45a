//! Piece selection: unbounded knapsack over integer capacities.
//!
//! Every selector returns the largest fill `<= capacity` it can find using
//! catalog lengths with repetition. The three DP selectors are exact and
//! agree on the filled length; they only differ in which equally-full
//! combination they return. The greedy selector is a heuristic.
//!
//! DP cells keep a backpointer (the last piece added) rather than the whole
//! combination, so tables are O(capacity).

use crate::types::{PieceCatalog, PieceLength, Selection, Strategy};

impl Strategy {
    /// Runs this strategy's selector. Non-positive capacity or an empty
    /// catalog yields an empty selection.
    pub fn select(&self, capacity: i64, catalog: &PieceCatalog) -> Selection {
        match self {
            Strategy::MinPieces => select_min_pieces(capacity, catalog),
            Strategy::LargePriority => select_large_priority(capacity, catalog),
            Strategy::Greedy => select_greedy(capacity, catalog),
            Strategy::MaxPieces => select_max_pieces(capacity, catalog),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CountPreference {
    Fewest,
    Most,
}

/// Best fill for a capacity; `last == 0` marks the empty combination.
#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    best: u64,
    count: u32,
    last: PieceLength,
}

fn table_len(capacity: i64, catalog: &PieceCatalog) -> Option<usize> {
    if capacity <= 0 || catalog.is_empty() {
        return None;
    }
    usize::try_from(capacity).ok()
}

/// Maximum fill, then fewest pieces. Lengths are tried largest first in
/// every cell; only strict improvements replace a cell.
pub fn select_min_pieces(capacity: i64, catalog: &PieceCatalog) -> Selection {
    let Some(target) = table_len(capacity, catalog) else {
        return Selection::empty();
    };
    let order: Vec<PieceLength> = catalog.descending().collect();
    select_by_count(target, &order, CountPreference::Fewest)
}

/// Maximum fill, then most pieces. Lengths are tried smallest first in
/// every cell; only strict improvements replace a cell.
pub fn select_max_pieces(capacity: i64, catalog: &PieceCatalog) -> Selection {
    let Some(target) = table_len(capacity, catalog) else {
        return Selection::empty();
    };
    let order: Vec<PieceLength> = catalog.ascending().collect();
    select_by_count(target, &order, CountPreference::Most)
}

fn select_by_count(target: usize, order: &[PieceLength], pref: CountPreference) -> Selection {
    let mut cells = vec![Cell::default(); target + 1];

    for i in 1..=target {
        for &piece in order {
            let p = piece as usize;
            if p > i {
                continue;
            }
            let prev = cells[i - p];
            let best = prev.best + piece as u64;
            let count = prev.count + 1;
            let cell = &mut cells[i];

            let improves = best > cell.best
                || (best == cell.best
                    && match pref {
                        CountPreference::Fewest => count < cell.count,
                        CountPreference::Most => count > cell.count,
                    });
            if improves {
                *cell = Cell {
                    best,
                    count,
                    last: piece,
                };
            }
        }
    }

    Selection::from_pieces(reconstruct(target, |i| cells[i].last))
}

/// Maximum fill with no secondary objective.
///
/// Classic piece-major unbounded knapsack: lengths in the outer loop, largest
/// first, capacities ascending in the inner loop, strict improvements only.
/// Among equally full combinations the one returned is whatever this
/// traversal order settles on, which tends to keep the large pieces found in
/// the first passes.
pub fn select_large_priority(capacity: i64, catalog: &PieceCatalog) -> Selection {
    let Some(target) = table_len(capacity, catalog) else {
        return Selection::empty();
    };

    let mut best = vec![0u64; target + 1];
    let mut last: Vec<PieceLength> = vec![0; target + 1];

    for piece in catalog.descending() {
        let p = piece as usize;
        for i in p..=target {
            let candidate = best[i - p] + piece as u64;
            if candidate > best[i] {
                best[i] = candidate;
                last[i] = piece;
            }
        }
    }

    Selection::from_pieces(reconstruct(target, |i| last[i]))
}

/// Takes the largest length that still fits, as many times as it fits, then
/// moves to the next smaller length. Fast but may leave space a DP selector
/// would fill: capacity 8 with {5, 4} fills 5, not 8.
pub fn select_greedy(capacity: i64, catalog: &PieceCatalog) -> Selection {
    if capacity <= 0 || catalog.is_empty() {
        return Selection::empty();
    }

    let mut remaining = capacity as u64;
    let mut pieces = Vec::new();
    for piece in catalog.descending() {
        let n = remaining / piece as u64;
        pieces.extend(std::iter::repeat_n(piece, n as usize));
        remaining -= n * piece as u64;
    }

    Selection::from_pieces(pieces)
}

/// Follows backpointers from `target` down to the empty cell.
fn reconstruct(target: usize, last_at: impl Fn(usize) -> PieceLength) -> Vec<PieceLength> {
    let mut pieces = Vec::new();
    let mut i = target;
    loop {
        let last = last_at(i);
        if last == 0 {
            break;
        }
        pieces.push(last);
        i -= last as usize;
    }
    pieces
}
