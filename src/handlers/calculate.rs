use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Map, Value};
use std::time::Instant;
use tracing::{debug, warn};

use super::AppState;
use crate::{
    calculators::Calculator,
    error::{error_type_name, AppError, InvalidInputError},
    metrics,
};

/// Handle `POST /v1/{cell,pack}-cost`
///
/// The body maps field names (canonical or alias) to numbers or numeric
/// strings. Omitted fields take the configured preset or catalogue default.
pub async fn calculate<C>(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<Value>, AppError>
where
    C: Calculator + 'static,
{
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let started = Instant::now();

    let outcome = field_entries(body).and_then(|entries| {
        let config = state.config.load();
        C::calculate(config.presets.for_calculator(C::NAME), entries)
    });
    metrics::record_duration(C::NAME, started.elapsed());

    match outcome {
        Ok(calculation) => {
            metrics::record_calculation(C::NAME, "ok");
            debug!(calculator = C::NAME, "Calculation completed");

            Ok(Json(json!({
                "calculator": C::NAME,
                "inputs": calculation.inputs,
                "result": calculation.result,
                "report": calculation.report,
            })))
        }
        Err(err) => {
            let err = AppError::InvalidInput(err);
            metrics::record_calculation(C::NAME, error_type_name(&err));
            warn!(calculator = C::NAME, error = %err, "Calculation rejected");
            Err(err)
        }
    }
}

/// Flatten a JSON object into raw field text
fn field_entries(body: Map<String, Value>) -> Result<Vec<(String, String)>, InvalidInputError> {
    body.into_iter()
        .map(|(name, value)| match value {
            Value::Number(n) => Ok((name, n.to_string())),
            Value::String(s) => Ok((name, s)),
            other => Err(InvalidInputError::NotANumber {
                field: name,
                raw: other.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::{CellCostCalculator, PackCostCalculator};
    use crate::config::Config;
    use axum::{http::StatusCode, response::IntoResponse};

    fn body(value: Value) -> Result<Json<Map<String, Value>>, JsonRejection> {
        match value {
            Value::Object(map) => Ok(Json(map)),
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_field_entries() {
        let Value::Object(map) = json!({"C": 10, "V": "3.2"}) else {
            unreachable!()
        };
        let mut entries = field_entries(map).unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                ("C".to_string(), "10".to_string()),
                ("V".to_string(), "3.2".to_string())
            ]
        );

        let Value::Object(map) = json!({"C": [1, 2]}) else {
            unreachable!()
        };
        assert!(field_entries(map).is_err());
    }

    #[tokio::test]
    async fn test_calculate_pack_defaults() {
        let state = AppState::new(Config::default());
        let Json(response) = calculate::<PackCostCalculator>(State(state), body(json!({})))
            .await
            .unwrap();

        assert_eq!(response["calculator"], "pack");
        assert_eq!(response["result"]["subtotal"], 8400.0);
    }

    #[tokio::test]
    async fn test_calculate_uses_presets() {
        let mut config = Config::default();
        config.presets.pack.insert("pack_capacity".to_string(), 100.0);
        let state = AppState::new(config);

        let Json(response) = calculate::<PackCostCalculator>(State(state), body(json!({})))
            .await
            .unwrap();
        assert_eq!(response["result"]["cell_total"], 10000.0);
    }

    #[tokio::test]
    async fn test_calculate_rejects_bad_input() {
        let state = AppState::new(Config::default());
        let err = calculate::<CellCostCalculator>(State(state), body(json!({"scrap_rate": 100})))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
