//! Cost calculators
//!
//! Both calculators are stateless: a call reads one complete input record
//! and returns one complete result or an [`InvalidInputError`]. They never
//! log, print, or touch shared state, so adapters may call them from any
//! thread without coordination.

pub mod cell;
pub mod pack;

pub use cell::{CellCostCalculator, CellCostInputs, CellCostResult};
pub use pack::{PackCostCalculator, PackCostInputs, PackCostResult};

use serde::Serialize;
use std::collections::HashMap;

use crate::error::InvalidInputError;
use crate::input::{FieldSpec, FieldValues};

/// Common surface the CLI and HTTP adapters drive a calculator through
pub trait Calculator {
    type Inputs: Serialize;
    type Output: Serialize;

    /// Short name used in routes, metrics labels, and preset sections
    const NAME: &'static str;

    /// Ordered input catalogue with built-in defaults
    fn fields() -> &'static [FieldSpec];

    /// Build a typed input record from resolved field text
    fn inputs_from_fields(values: &FieldValues) -> Result<Self::Inputs, InvalidInputError>;

    fn compute(inputs: &Self::Inputs) -> Result<Self::Output, InvalidInputError>;

    /// Human-readable multi-line report
    fn render(inputs: &Self::Inputs, output: &Self::Output) -> String;

    /// Resolve fields, compute, and render in one step
    fn calculate<I, K, V>(
        presets: &HashMap<String, f64>,
        entries: I,
    ) -> Result<Calculation<Self::Inputs, Self::Output>, InvalidInputError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = FieldValues::resolve(Self::fields(), presets, entries)?;
        let inputs = Self::inputs_from_fields(&values)?;
        let result = Self::compute(&inputs)?;
        let report = Self::render(&inputs, &result);

        Ok(Calculation {
            inputs,
            result,
            report,
        })
    }
}

/// Outcome of one user-initiated calculation
#[derive(Debug, Clone, Serialize)]
pub struct Calculation<I, O> {
    pub inputs: I,
    pub result: O,
    pub report: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_with_defaults() {
        let calc = PackCostCalculator::calculate(&HashMap::new(), Vec::<(String, String)>::new())
            .unwrap();
        assert_eq!(calc.inputs, PackCostInputs::default());
        assert!(calc.report.starts_with("Cell cost: $6,000.00"));
    }

    #[test]
    fn test_calculate_rejects_before_compute() {
        let err = CellCostCalculator::calculate(&HashMap::new(), [("V", "abc")]).unwrap_err();
        assert!(matches!(err, InvalidInputError::NotANumber { ref field, .. } if field == "voltage_v"));
    }

    #[test]
    fn test_names_are_distinct() {
        assert_ne!(CellCostCalculator::NAME, PackCostCalculator::NAME);
    }
}
