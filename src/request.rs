use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::layout::evaluate;
use crate::recommend::{Recommendation, recommend};
use crate::types::{
    DEFAULT_PIECE_LENGTHS, LayoutParams, LayoutResult, PieceCatalog, PieceLength,
    STANDARD_PIECE_LENGTHS, Strategy, WastePolicy, deserialize_u32_seq_from_numbers,
};

/// Upper bound on the total length; keeps DP tables to a few tens of MB.
pub const MAX_TOTAL_LENGTH: f64 = 1_000_000.0;

pub const DEFAULT_BASE_MARGIN: f64 = 300.0;

fn default_base_margin() -> f64 {
    DEFAULT_BASE_MARGIN
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizeRequest {
    pub total_length: f64,
    #[serde(deserialize_with = "deserialize_u32_seq_from_numbers")]
    pub pieces: Vec<PieceLength>,
    #[serde(default = "default_base_margin")]
    pub base_margin: f64,
    #[serde(default)]
    pub margin_alpha: f64,
    #[serde(default)]
    pub waste_policy: WastePolicy,
    /// Strategy identifiers to run; empty runs all of them.
    #[serde(default)]
    pub strategies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    pub results: Vec<LayoutResult>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub standard: Vec<PieceLength>,
    pub default: Vec<PieceLength>,
    pub strategies: Vec<StrategyInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub title: &'static str,
}

impl OptimizeRequest {
    pub fn to_params(&self) -> Result<LayoutParams, InputError> {
        build_params(
            self.total_length,
            &self.pieces,
            self.base_margin,
            self.margin_alpha,
            self.waste_policy,
        )
    }
}

/// Validates raw inputs and builds layout parameters.
pub fn build_params(
    total_length: f64,
    pieces: &[PieceLength],
    base_margin: f64,
    margin_alpha: f64,
    waste_policy: WastePolicy,
) -> Result<LayoutParams, InputError> {
    if !total_length.is_finite() || total_length <= 0.0 {
        return Err(InputError::InvalidTotalLength(total_length));
    }
    if total_length > MAX_TOTAL_LENGTH {
        return Err(InputError::TotalLengthTooLarge {
            value: total_length,
            max: MAX_TOTAL_LENGTH,
        });
    }
    for (name, value) in [("base margin", base_margin), ("margin alpha", margin_alpha)] {
        if !value.is_finite() || value < 0.0 {
            return Err(InputError::InvalidMargin { name, value });
        }
    }
    if pieces.contains(&0) {
        return Err(InputError::ZeroPieceLength);
    }

    Ok(LayoutParams {
        total_length,
        catalog: PieceCatalog::new(pieces.iter().copied()),
        base_margin,
        margin_alpha,
        waste_policy,
    })
}

/// Parses strategy identifiers, keeping their order and dropping repeats.
/// An empty list selects every strategy.
pub fn parse_strategies<S: AsRef<str>>(ids: &[S]) -> Result<Vec<Strategy>, InputError> {
    if ids.is_empty() {
        return Ok(Strategy::ALL.to_vec());
    }
    let mut strategies = Vec::with_capacity(ids.len());
    for id in ids {
        let strategy = id
            .as_ref()
            .parse::<Strategy>()
            .map_err(InputError::UnknownStrategy)?;
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    Ok(strategies)
}

/// Validates a request and runs the selected strategies.
pub fn optimize(req: &OptimizeRequest) -> Result<OptimizeResponse, InputError> {
    let params = req.to_params()?;
    let strategies = parse_strategies(&req.strategies)?;
    let results = evaluate(&strategies, &params);
    let recommendation = recommend(&results, params.catalog.is_empty());
    Ok(OptimizeResponse {
        results,
        recommendation,
    })
}

pub fn catalog_info() -> CatalogResponse {
    CatalogResponse {
        standard: STANDARD_PIECE_LENGTHS.to_vec(),
        default: DEFAULT_PIECE_LENGTHS.to_vec(),
        strategies: Strategy::ALL
            .iter()
            .map(|s| StrategyInfo {
                id: s.id(),
                title: s.title(),
            })
            .collect(),
    }
}
