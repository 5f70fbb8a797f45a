use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Length of a standard piece, in integer units (mm).
pub type PieceLength = u32;

/// Master catalog of standard piece lengths, largest first.
pub const STANDARD_PIECE_LENGTHS: [PieceLength; 6] = [1829, 1524, 1219, 914, 610, 305];

/// Pieces selected when the caller does not choose any: the master catalog without 305.
pub const DEFAULT_PIECE_LENGTHS: [PieceLength; 5] = [1829, 1524, 1219, 914, 610];

/// Set of piece lengths available for a run. Supply of each length is unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PieceCatalog {
    lengths: BTreeSet<PieceLength>,
}

impl PieceCatalog {
    /// Builds a catalog, collapsing duplicates and dropping zero lengths.
    pub fn new<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = PieceLength>,
    {
        Self {
            lengths: lengths.into_iter().filter(|&len| len > 0).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_PIECE_LENGTHS)
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn contains(&self, len: PieceLength) -> bool {
        self.lengths.contains(&len)
    }

    pub fn ascending(&self) -> impl Iterator<Item = PieceLength> + '_ {
        self.lengths.iter().copied()
    }

    pub fn descending(&self) -> impl Iterator<Item = PieceLength> + '_ {
        self.lengths.iter().rev().copied()
    }
}

impl FromIterator<PieceLength> for PieceCatalog {
    fn from_iter<I: IntoIterator<Item = PieceLength>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Output of a piece selector: the filled length and the pieces achieving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub filled: u64,
    /// Sorted descending.
    pub pieces: Vec<PieceLength>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pieces(mut pieces: Vec<PieceLength>) -> Self {
        pieces.sort_unstable_by(|a, b| b.cmp(a));
        let filled = pieces.iter().map(|&p| p as u64).sum();
        Self { filled, pieces }
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }
}

/// One of the four piece selection policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Maximum fill, then fewest pieces.
    MinPieces,
    /// Maximum fill, ties left to DP traversal order with large pieces first.
    LargePriority,
    /// Largest piece that fits, repeatedly. Not guaranteed to reach maximum fill.
    Greedy,
    /// Maximum fill, then most pieces.
    MaxPieces,
}

impl Strategy {
    /// Canonical evaluation and display order.
    pub const ALL: [Strategy; 4] = [
        Strategy::MinPieces,
        Strategy::LargePriority,
        Strategy::Greedy,
        Strategy::MaxPieces,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Strategy::MinPieces => "min-pieces",
            Strategy::LargePriority => "large-priority",
            Strategy::Greedy => "greedy",
            Strategy::MaxPieces => "max-pieces",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Strategy::MinPieces => "Recommended (least waste, then fewest pieces)",
            Strategy::LargePriority => "Least waste (make the most of usable space)",
            Strategy::Greedy => "Fewest pieces (largest pieces first)",
            Strategy::MaxPieces => "Most pieces (favour small pieces)",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.id() == s)
            .ok_or_else(|| {
                format!(
                    "invalid strategy '{}', expected: min-pieces, large-priority, greedy, or max-pieces",
                    s
                )
            })
    }
}

/// How leftover space inside the usable capacity is moved into the end margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WastePolicy {
    /// Half to each end.
    #[default]
    Even,
    /// All to the right end; the left margin stays at the requested width.
    RightOnly,
}

impl std::str::FromStr for WastePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "even" => Ok(WastePolicy::Even),
            "right-only" => Ok(WastePolicy::RightOnly),
            _ => Err(format!(
                "invalid waste policy '{}', expected: even or right-only",
                s
            )),
        }
    }
}

/// Inputs of a single layout computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutParams {
    pub total_length: f64,
    pub catalog: PieceCatalog,
    pub base_margin: f64,
    pub margin_alpha: f64,
    pub waste_policy: WastePolicy,
}

impl LayoutParams {
    pub fn effective_margin(&self) -> f64 {
        self.base_margin + self.margin_alpha
    }

    pub fn usable_capacity(&self) -> f64 {
        self.total_length - 2.0 * self.effective_margin()
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            total_length: 9500.0,
            catalog: PieceCatalog::new(DEFAULT_PIECE_LENGTHS),
            base_margin: 300.0,
            margin_alpha: 0.0,
            waste_policy: WastePolicy::Even,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Margin,
    Piece,
    /// Zero-width boundary marker, only emitted by error layouts.
    Limit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub label: String,
    pub kind: SegmentKind,
    pub start: f64,
    pub end: f64,
    pub length: f64,
}

impl Segment {
    pub fn margin(label: &str, start: f64, length: f64) -> Self {
        Self {
            label: label.to_string(),
            kind: SegmentKind::Margin,
            start,
            end: start + length,
            length,
        }
    }

    pub fn piece(len: PieceLength, start: f64) -> Self {
        Self {
            label: format!("Piece ({})", len),
            kind: SegmentKind::Piece,
            start,
            end: start + len as f64,
            length: len as f64,
        }
    }

    pub fn limit(label: &str, at: f64) -> Self {
        Self {
            label: label.to_string(),
            kind: SegmentKind::Limit,
            start: at,
            end: at,
            length: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStatus {
    Success,
    Error,
}

/// One formatted metric of a layout summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub metric: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutResult {
    pub strategy: Strategy,
    pub status: LayoutStatus,
    pub message: String,
    pub final_left_margin: f64,
    pub final_right_margin: f64,
    pub internal_waste: f64,
    pub combination: Vec<PieceLength>,
    pub segments: Vec<Segment>,
    pub summary: Vec<SummaryEntry>,
}

impl LayoutResult {
    pub fn is_success(&self) -> bool {
        self.status == LayoutStatus::Success
    }

    pub fn piece_count(&self) -> usize {
        self.combination.len()
    }

    pub fn filled_length(&self) -> u64 {
        self.combination.iter().map(|&p| p as u64).sum()
    }

    /// Pieces grouped by length, largest first.
    pub fn piece_counts(&self) -> Vec<(PieceLength, usize)> {
        let mut counts: Vec<(PieceLength, usize)> = Vec::new();
        for &len in &self.combination {
            match counts.iter_mut().find(|(l, _)| *l == len) {
                Some((_, n)) => *n += 1,
                None => counts.push((len, 1)),
            }
        }
        counts.sort_by(|a, b| b.0.cmp(&a.0));
        counts
    }

    pub fn summary_value(&self, metric: &str) -> Option<&str> {
        self.summary
            .iter()
            .find(|e| e.metric == metric)
            .map(|e| e.value.as_str())
    }
}

/// Formats `value` with `decimals` fraction digits and comma thousands separators.
pub fn format_grouped(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(raw.len() + int_part.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Accepts a JSON number that holds a non-negative integer, including `1829.0`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    number_to_u32(value).map_err(serde::de::Error::custom)
}

/// Sequence form of [`deserialize_u32_from_number`].
pub fn deserialize_u32_seq_from_numbers<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<f64>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(number_to_u32)
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

fn number_to_u32(value: f64) -> Result<u32, String> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(format!("expected a non-negative integer, got {}", value));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_collapses_duplicates_and_zero() {
        let catalog = PieceCatalog::new([610, 1829, 610, 0, 914]);
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.contains(0));
        assert_eq!(catalog.descending().collect::<Vec<_>>(), vec![1829, 914, 610]);
        assert_eq!(catalog.ascending().collect::<Vec<_>>(), vec![610, 914, 1829]);
    }

    #[test]
    fn test_selection_sorted_descending() {
        let sel = Selection::from_pieces(vec![610, 1829, 914, 1829]);
        assert_eq!(sel.pieces, vec![1829, 1829, 914, 610]);
        assert_eq!(sel.filled, 5182);
        assert_eq!(sel.piece_count(), 4);
    }

    #[test]
    fn test_strategy_ids_round_trip_through_from_str() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.id().parse::<Strategy>(), Ok(strategy));
        }
        assert!("largest".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_uses_ids() {
        let json = serde_json::to_string(&Strategy::LargePriority).unwrap();
        assert_eq!(json, "\"large-priority\"");
        let policy: WastePolicy = serde_json::from_str("\"right-only\"").unwrap();
        assert_eq!(policy, WastePolicy::RightOnly);
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0, 1), "0.0");
        assert_eq!(format_grouped(450.0, 0), "450");
        assert_eq!(format_grouped(8900.0, 1), "8,900.0");
        assert_eq!(format_grouped(1234567.25, 2), "1,234,567.25");
        assert_eq!(format_grouped(-400.0, 1), "-400.0");
        assert_eq!(format_grouped(-1500.0, 0), "-1,500");
    }

    #[test]
    fn test_deserialize_u32_from_number() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_u32_from_number")]
            len: u32,
            #[serde(deserialize_with = "deserialize_u32_seq_from_numbers")]
            lens: Vec<u32>,
        }

        let w: Wrapper = serde_json::from_str(r#"{"len": 1829.0, "lens": [610, 914.0]}"#).unwrap();
        assert_eq!(w.len, 1829);
        assert_eq!(w.lens, vec![610, 914]);

        assert!(serde_json::from_str::<Wrapper>(r#"{"len": 1.5, "lens": []}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"len": -3, "lens": []}"#).is_err());
    }

    #[test]
    fn test_piece_counts_grouped_descending() {
        let result = LayoutResult {
            strategy: Strategy::MinPieces,
            status: LayoutStatus::Success,
            message: String::new(),
            final_left_margin: 0.0,
            final_right_margin: 0.0,
            internal_waste: 0.0,
            combination: vec![1829, 1829, 914, 610, 610, 610],
            segments: vec![],
            summary: vec![],
        };
        assert_eq!(result.piece_counts(), vec![(1829, 2), (914, 1), (610, 3)]);
        assert_eq!(result.filled_length(), 1829 * 2 + 914 + 610 * 3);
    }
}
