use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use super::AppState;
use crate::{
    calculators::{Calculator, CellCostCalculator, PackCostCalculator},
    input::{effective_fields, EffectiveField},
};

#[derive(Debug, Serialize)]
pub struct FieldsResponse {
    pub cell: Vec<EffectiveField>,
    pub pack: Vec<EffectiveField>,
}

/// Handle `GET /v1/fields`: both input catalogues with preset defaults applied
pub async fn list_fields(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config.load();

    Json(FieldsResponse {
        cell: effective_fields(CellCostCalculator::fields(), &config.presets.cell),
        pack: effective_fields(PackCostCalculator::fields(), &config.presets.pack),
    })
}
