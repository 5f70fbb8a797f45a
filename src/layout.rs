//! Turns a strategy's selection into placement geometry.

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::types::{
    LayoutParams, LayoutResult, LayoutStatus, Segment, SummaryEntry, Strategy, WastePolicy,
    format_grouped,
};

/// Tolerance for the final `left + pieces + right == total` check.
const SPAN_EPSILON: f64 = 1e-9;

pub const METRIC_STRATEGY: &str = "Strategy";
pub const METRIC_EFFECTIVE_MARGIN: &str = "End margin (each, requested)";
pub const METRIC_USABLE_CAPACITY: &str = "Usable capacity";
pub const METRIC_FILLED_LENGTH: &str = "Total length of selected pieces";
pub const METRIC_INTERNAL_WASTE: &str = "Unfilled space within usable capacity";
pub const METRIC_FINAL_LEFT_MARGIN: &str = "Final left margin";
pub const METRIC_FINAL_RIGHT_MARGIN: &str = "Final right margin";
pub const METRIC_PIECE_COUNT: &str = "Pieces placed";
pub const METRIC_TOTAL_UNUSED: &str = "Total unused space";

/// Lays out one strategy's pieces between the end margins.
///
/// Margins that do not fit inside the total length produce a result with
/// [`LayoutStatus::Error`]; every other input, including an empty catalog,
/// succeeds.
pub fn layout(strategy: Strategy, params: &LayoutParams) -> LayoutResult {
    let total_length = params.total_length;
    let effective_margin = params.effective_margin();
    let usable_capacity = params.usable_capacity();

    let mut summary = vec![
        entry(METRIC_STRATEGY, strategy.title().to_string()),
        entry(METRIC_EFFECTIVE_MARGIN, format_grouped(effective_margin, 0)),
        entry(METRIC_USABLE_CAPACITY, format_grouped(usable_capacity, 1)),
    ];

    if usable_capacity < 0.0 {
        let err = LayoutError::MarginOverflow {
            required: format_grouped(2.0 * effective_margin, 0),
            total_length: format_grouped(total_length, 0),
        };
        warn!(%strategy, total_length, effective_margin, "{err}");
        return LayoutResult {
            strategy,
            status: LayoutStatus::Error,
            message: err.to_string(),
            final_left_margin: 0.0,
            final_right_margin: 0.0,
            internal_waste: 0.0,
            combination: Vec::new(),
            segments: vec![
                Segment::margin("Requested left margin", 0.0, effective_margin),
                Segment::margin(
                    "Requested right margin",
                    total_length - effective_margin,
                    effective_margin,
                ),
                Segment::limit("Total length limit", total_length),
            ],
            summary,
        };
    }

    let capacity = usable_capacity.floor() as i64;
    let selection = strategy.select(capacity, &params.catalog);
    let filled = selection.filled as f64;
    let internal_waste = usable_capacity - filled;

    let (mut left, mut right) = match params.waste_policy {
        WastePolicy::Even => (
            effective_margin + internal_waste / 2.0,
            effective_margin + internal_waste / 2.0,
        ),
        WastePolicy::RightOnly => (effective_margin, effective_margin + internal_waste),
    };
    left = left.max(0.0);
    right = right.max(0.0);

    let covered = left + filled + right;
    if (covered - total_length).abs() > SPAN_EPSILON {
        right = (right + (total_length - covered)).max(0.0);
    }

    let mut segments = Vec::with_capacity(selection.pieces.len() + 2);
    segments.push(Segment::margin("Left margin", 0.0, left));
    let mut pos = left;
    for &piece in &selection.pieces {
        let seg = Segment::piece(piece, pos);
        pos = seg.end;
        segments.push(seg);
    }
    segments.push(Segment {
        end: total_length,
        ..Segment::margin("Right margin", pos, right)
    });

    summary.extend([
        entry(METRIC_FILLED_LENGTH, format_grouped(filled, 0)),
        entry(METRIC_INTERNAL_WASTE, format_grouped(internal_waste, 1)),
        entry(METRIC_FINAL_LEFT_MARGIN, format_grouped(left, 1)),
        entry(METRIC_FINAL_RIGHT_MARGIN, format_grouped(right, 1)),
        entry(METRIC_PIECE_COUNT, selection.piece_count().to_string()),
        entry(METRIC_TOTAL_UNUSED, format_grouped(total_length - filled, 1)),
    ]);

    let message = if params.catalog.is_empty() {
        "No piece lengths selected; only the end margins are applied.".to_string()
    } else {
        String::new()
    };

    debug!(
        %strategy,
        capacity,
        filled = selection.filled,
        pieces = selection.piece_count(),
        internal_waste,
        left,
        right,
        "layout computed"
    );

    LayoutResult {
        strategy,
        status: LayoutStatus::Success,
        message,
        final_left_margin: left,
        final_right_margin: right,
        internal_waste,
        combination: selection.pieces,
        segments,
        summary,
    }
}

/// Runs every strategy against the same parameters, in [`Strategy::ALL`] order.
pub fn evaluate_all(params: &LayoutParams) -> Vec<LayoutResult> {
    evaluate(&Strategy::ALL, params)
}

pub fn evaluate(strategies: &[Strategy], params: &LayoutParams) -> Vec<LayoutResult> {
    strategies.iter().map(|&s| layout(s, params)).collect()
}

fn entry(metric: &'static str, value: String) -> SummaryEntry {
    SummaryEntry { metric, value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PieceCatalog, SegmentKind};

    const EPS: f64 = 1e-6;

    fn params(total_length: f64, lengths: &[u32], policy: WastePolicy) -> LayoutParams {
        LayoutParams {
            total_length,
            catalog: PieceCatalog::new(lengths.iter().copied()),
            base_margin: 300.0,
            margin_alpha: 0.0,
            waste_policy: policy,
        }
    }

    /// Segments of a successful layout must tile `[0, total]` with no gaps.
    fn assert_layout_complete(result: &LayoutResult, total_length: f64) {
        assert!(result.is_success(), "{}", result.message);
        let first = result.segments.first().unwrap();
        let last = result.segments.last().unwrap();
        assert_eq!(first.start, 0.0);
        assert_eq!(last.end, total_length);
        assert_eq!(first.kind, SegmentKind::Margin);
        assert_eq!(last.kind, SegmentKind::Margin);

        for pair in result.segments.windows(2) {
            assert!(
                (pair[0].end - pair[1].start).abs() < EPS,
                "gap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }

        let total: f64 = result.segments.iter().map(|s| s.length).sum();
        assert!(
            (total - total_length).abs() < EPS,
            "segments sum to {total}, expected {total_length}"
        );
    }

    #[test]
    fn test_even_policy_standard_span() {
        let p = params(9500.0, &[1829, 1524, 1219, 914, 610], WastePolicy::Even);
        let result = layout(Strategy::MinPieces, &p);

        assert_layout_complete(&result, 9500.0);
        assert_eq!(result.filled_length(), 8844);
        assert_eq!(result.piece_count(), 13);
        assert!((result.internal_waste - 56.0).abs() < EPS);
        assert!((result.final_left_margin - 328.0).abs() < EPS);
        assert!((result.final_right_margin - 328.0).abs() < EPS);
        assert_eq!(result.segments.len(), 15);
        assert_eq!(result.segments[1].label, "Piece (1524)");
        assert_eq!(result.segments[1].start, 328.0);

        assert_eq!(result.summary_value(METRIC_USABLE_CAPACITY), Some("8,900.0"));
        assert_eq!(result.summary_value(METRIC_FILLED_LENGTH), Some("8,844"));
        assert_eq!(result.summary_value(METRIC_INTERNAL_WASTE), Some("56.0"));
        assert_eq!(result.summary_value(METRIC_PIECE_COUNT), Some("13"));
        assert_eq!(result.summary_value(METRIC_TOTAL_UNUSED), Some("656.0"));
    }

    #[test]
    fn test_right_only_policy_keeps_left_margin() {
        let p = params(9500.0, &[1829, 1524, 1219, 914, 610], WastePolicy::RightOnly);
        let result = layout(Strategy::Greedy, &p);

        assert_layout_complete(&result, 9500.0);
        assert_eq!(result.filled_length(), 8840);
        assert_eq!(result.final_left_margin, 300.0);
        assert!((result.final_right_margin - 360.0).abs() < EPS);
    }

    #[test]
    fn test_fractional_usable_span_goes_to_waste() {
        let mut p = params(1000.5, &[100], WastePolicy::Even);
        p.base_margin = 0.25;
        let result = layout(Strategy::LargePriority, &p);

        assert_layout_complete(&result, 1000.5);
        assert_eq!(result.filled_length(), 1000);
        assert!((result.internal_waste - 0.0).abs() < EPS);
        assert!((result.final_left_margin - 0.25).abs() < EPS);
        assert!((result.final_right_margin - 0.25).abs() < EPS);

        p.total_length = 1000.9;
        let result = layout(Strategy::LargePriority, &p);
        assert_layout_complete(&result, 1000.9);
        assert!((result.internal_waste - 0.4).abs() < EPS);
    }

    #[test]
    fn test_margin_overflow_is_error_result() {
        let mut p = params(500.0, &[305], WastePolicy::Even);
        p.margin_alpha = 150.0;
        let result = layout(Strategy::MinPieces, &p);

        assert_eq!(result.status, LayoutStatus::Error);
        assert!(result.message.contains("900"), "{}", result.message);
        assert!(result.combination.is_empty());
        assert_eq!(result.summary_value(METRIC_USABLE_CAPACITY), Some("-400.0"));

        let kinds: Vec<SegmentKind> = result.segments.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SegmentKind::Margin, SegmentKind::Margin, SegmentKind::Limit]
        );
        assert_eq!(result.segments[0].end, 450.0);
        assert_eq!(result.segments[1].start, 50.0);
        assert_eq!(result.segments[1].end, 500.0);
        assert_eq!(result.segments[2].start, 500.0);
    }

    #[test]
    fn test_empty_catalog_is_all_margin() {
        let p = params(2000.0, &[], WastePolicy::Even);
        for result in evaluate_all(&p) {
            assert_layout_complete(&result, 2000.0);
            assert!(result.combination.is_empty());
            assert_eq!(result.segments.len(), 2);
            assert!(!result.message.is_empty());
            assert!((result.final_left_margin - 1000.0).abs() < EPS);
            assert!((result.final_right_margin - 1000.0).abs() < EPS);
        }
    }

    #[test]
    fn test_zero_usable_capacity_succeeds() {
        let p = params(600.0, &[305], WastePolicy::Even);
        let result = layout(Strategy::MaxPieces, &p);
        assert_layout_complete(&result, 600.0);
        assert!(result.combination.is_empty());
        assert_eq!(result.final_left_margin, 300.0);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let p = params(12345.6, &[1829, 1524, 1219, 914, 610, 305], WastePolicy::Even);
        for strategy in Strategy::ALL {
            assert_eq!(layout(strategy, &p), layout(strategy, &p));
        }
    }

    #[test]
    fn test_evaluate_all_strategies() {
        let p = params(9500.0, &[1829, 1524, 1219, 914, 610], WastePolicy::Even);
        let results = evaluate_all(&p);
        let order: Vec<Strategy> = results.iter().map(|r| r.strategy).collect();
        assert_eq!(order, Strategy::ALL.to_vec());

        for r in &results {
            assert_layout_complete(r, 9500.0);
        }
        let dp_fill: Vec<u64> = results
            .iter()
            .filter(|r| r.strategy != Strategy::Greedy)
            .map(|r| r.filled_length())
            .collect();
        assert!(dp_fill.iter().all(|&f| f == dp_fill[0]));
        let greedy = results.iter().find(|r| r.strategy == Strategy::Greedy).unwrap();
        assert!(greedy.filled_length() <= dp_fill[0]);
    }
}
