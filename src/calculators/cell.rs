//! Per-cell manufacturing cost
//!
//! # Formula
//! ```text
//! M    = sum of the seven material unit costs (usage factor 1 each)
//! S    = 1 / (1 - scrap_rate)
//! E    = capacity_ah * voltage_v / 1000            (kWh per cell)
//! base = ((M + F) * S + O) * E + E_D
//! ```
//! The warranty surcharge is then solved by a fixed five-step iteration
//! `W = warranty_rate * 1.5 * cost; cost = base + W` starting at
//! `cost = base`. The step count is fixed so results stay bit-identical
//! with previously published figures; it is not run to convergence.

use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::error::InvalidInputError;
use crate::input::{
    catalogue_default, ensure_finite_result, ensure_nonnegative, largest_field, FieldKind,
    FieldSpec, FieldValues,
};
use crate::report;

/// Number of warranty fixed-point iterations
pub const WARRANTY_ITERATIONS: usize = 5;

/// Replacement cost of a failed cell relative to its production cost
pub const WARRANTY_COST_MULTIPLIER: f64 = 1.5;

pub static CELL_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "cell_count",
        alias: "N",
        label: "Number of cells",
        kind: FieldKind::Amount,
        default: 1_000_000.0,
    },
    FieldSpec {
        key: "capacity_ah",
        alias: "C",
        label: "Cell capacity (Ah)",
        kind: FieldKind::Amount,
        default: 10.0,
    },
    FieldSpec {
        key: "voltage_v",
        alias: "V",
        label: "Nominal voltage (V)",
        kind: FieldKind::Amount,
        default: 3.2,
    },
    FieldSpec {
        key: "lithium_carbonate_cost",
        alias: "M_li",
        label: "Lithium carbonate cost ($/kg)",
        kind: FieldKind::Amount,
        default: 17.5,
    },
    FieldSpec {
        key: "iron_phosphate_cost",
        alias: "M_fe",
        label: "Iron phosphate cost ($/kg)",
        kind: FieldKind::Amount,
        default: 12.5,
    },
    FieldSpec {
        key: "graphite_cost",
        alias: "M_gr",
        label: "Graphite cost ($/kg)",
        kind: FieldKind::Amount,
        default: 12.5,
    },
    FieldSpec {
        key: "electrolyte_cost",
        alias: "M_el",
        label: "Electrolyte cost ($/kg)",
        kind: FieldKind::Amount,
        default: 12.5,
    },
    FieldSpec {
        key: "separator_cost",
        alias: "M_se",
        label: "Separator cost ($/m²)",
        kind: FieldKind::Amount,
        default: 1.5,
    },
    FieldSpec {
        key: "copper_foil_cost",
        alias: "M_cu",
        label: "Copper foil cost ($/kg)",
        kind: FieldKind::Amount,
        default: 17.5,
    },
    FieldSpec {
        key: "aluminum_foil_cost",
        alias: "M_al",
        label: "Aluminum foil cost ($/kg)",
        kind: FieldKind::Amount,
        default: 4.0,
    },
    FieldSpec {
        key: "manufacturing_cost_per_kwh",
        alias: "F",
        label: "Manufacturing cost ($/kWh)",
        kind: FieldKind::Amount,
        default: 12.5,
    },
    FieldSpec {
        key: "overhead_cost_per_kwh",
        alias: "O",
        label: "Overhead and R&D cost ($/kWh)",
        kind: FieldKind::Amount,
        default: 7.5,
    },
    FieldSpec {
        key: "engineering_cost_per_cell",
        alias: "E_D",
        label: "Engineering & Development cost per cell ($)",
        kind: FieldKind::Amount,
        default: 1.0,
    },
    FieldSpec {
        key: "scrap_rate",
        alias: "scrap_rate",
        label: "Scrap rate (%)",
        kind: FieldKind::Percent,
        default: 10.0,
    },
    FieldSpec {
        key: "warranty_rate",
        alias: "warranty_rate",
        label: "Warranty failure rate (%)",
        kind: FieldKind::Percent,
        default: 0.5,
    },
];

/// Cell cost parameters. Rates are fractions, not percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellCostInputs {
    pub cell_count: f64,
    pub capacity_ah: f64,
    pub voltage_v: f64,
    pub lithium_carbonate_cost: f64,
    pub iron_phosphate_cost: f64,
    pub graphite_cost: f64,
    pub electrolyte_cost: f64,
    pub separator_cost: f64,
    pub copper_foil_cost: f64,
    pub aluminum_foil_cost: f64,
    pub manufacturing_cost_per_kwh: f64,
    pub overhead_cost_per_kwh: f64,
    pub engineering_cost_per_cell: f64,
    pub scrap_rate: f64,
    pub warranty_rate: f64,
}

impl Default for CellCostInputs {
    fn default() -> Self {
        let default = |key: &str| catalogue_default(CELL_FIELDS, key);
        Self {
            cell_count: default("cell_count"),
            capacity_ah: default("capacity_ah"),
            voltage_v: default("voltage_v"),
            lithium_carbonate_cost: default("lithium_carbonate_cost"),
            iron_phosphate_cost: default("iron_phosphate_cost"),
            graphite_cost: default("graphite_cost"),
            electrolyte_cost: default("electrolyte_cost"),
            separator_cost: default("separator_cost"),
            copper_foil_cost: default("copper_foil_cost"),
            aluminum_foil_cost: default("aluminum_foil_cost"),
            manufacturing_cost_per_kwh: default("manufacturing_cost_per_kwh"),
            overhead_cost_per_kwh: default("overhead_cost_per_kwh"),
            engineering_cost_per_cell: default("engineering_cost_per_cell"),
            scrap_rate: default("scrap_rate"),
            warranty_rate: default("warranty_rate"),
        }
    }
}

impl CellCostInputs {
    /// Aggregate material cost `M`
    ///
    /// Costs quoted per kg and per m² are added as if each were per cell.
    pub fn material_cost(&self) -> f64 {
        self.lithium_carbonate_cost
            + self.iron_phosphate_cost
            + self.graphite_cost
            + self.electrolyte_cost
            + self.separator_cost
            + self.copper_foil_cost
            + self.aluminum_foil_cost
    }

    /// Energy stored per cell in kWh
    pub fn energy_kwh(&self) -> f64 {
        self.capacity_ah * self.voltage_v / 1000.0
    }

    fn amounts(&self) -> [(&'static str, f64); 15] {
        [
            ("cell_count", self.cell_count),
            ("capacity_ah", self.capacity_ah),
            ("voltage_v", self.voltage_v),
            ("lithium_carbonate_cost", self.lithium_carbonate_cost),
            ("iron_phosphate_cost", self.iron_phosphate_cost),
            ("graphite_cost", self.graphite_cost),
            ("electrolyte_cost", self.electrolyte_cost),
            ("separator_cost", self.separator_cost),
            ("copper_foil_cost", self.copper_foil_cost),
            ("aluminum_foil_cost", self.aluminum_foil_cost),
            ("manufacturing_cost_per_kwh", self.manufacturing_cost_per_kwh),
            ("overhead_cost_per_kwh", self.overhead_cost_per_kwh),
            ("engineering_cost_per_cell", self.engineering_cost_per_cell),
            ("scrap_rate", self.scrap_rate),
            ("warranty_rate", self.warranty_rate),
        ]
    }

    fn validate(&self) -> Result<(), InvalidInputError> {
        for (field, value) in self.amounts() {
            ensure_nonnegative(field, value)?;
        }

        if self.scrap_rate >= 1.0 {
            return Err(InvalidInputError::out_of_range(
                "scrap_rate",
                "must be below 100%",
            ));
        }

        if WARRANTY_COST_MULTIPLIER * self.warranty_rate >= 1.0 {
            return Err(InvalidInputError::out_of_range(
                "warranty_rate",
                format!(
                    "too high, warranty cost diverges at or above {:.2}%",
                    100.0 / WARRANTY_COST_MULTIPLIER
                ),
            ));
        }

        let energy_kwh = self.energy_kwh();
        if energy_kwh <= 0.0 {
            return Err(InvalidInputError::out_of_range(
                "capacity_ah",
                "capacity_ah * voltage_v must be greater than zero",
            ));
        }
        // Subnormal energy turns every per-kWh figure into infinity
        if !energy_kwh.is_normal() {
            return Err(InvalidInputError::out_of_range(
                "capacity_ah",
                "capacity_ah * voltage_v is out of range",
            ));
        }

        Ok(())
    }
}

/// Cell cost figures, including the intermediate terms
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellCostResult {
    pub material_cost: f64,
    pub scrap_factor: f64,
    pub energy_kwh: f64,
    pub base_cost: f64,
    /// Surcharge from the final warranty iteration
    pub warranty_cost: f64,
    pub cost_per_cell: f64,
    pub total_cost: f64,
    pub cost_per_kwh: f64,
}

pub struct CellCostCalculator;

impl CellCostCalculator {
    pub fn compute(inputs: &CellCostInputs) -> Result<CellCostResult, InvalidInputError> {
        inputs.validate()?;

        // Overflow is blamed on the largest contributing input
        let amounts = inputs.amounts();
        let materials = largest_field(&amounts[3..10]);
        let costs = largest_field(&amounts[1..13]);

        let material_cost =
            ensure_finite_result(materials, "material cost", inputs.material_cost())?;
        let scrap_factor = 1.0 / (1.0 - inputs.scrap_rate);
        let energy_kwh = inputs.energy_kwh();

        let base_cost = ensure_finite_result(
            costs,
            "base cost",
            ((material_cost + inputs.manufacturing_cost_per_kwh) * scrap_factor
                + inputs.overhead_cost_per_kwh)
                * energy_kwh
                + inputs.engineering_cost_per_cell,
        )?;

        let mut cost = base_cost;
        let mut warranty_cost = 0.0;
        for _ in 0..WARRANTY_ITERATIONS {
            warranty_cost = inputs.warranty_rate * WARRANTY_COST_MULTIPLIER * cost;
            cost = base_cost + warranty_cost;
        }
        let cost = ensure_finite_result(costs, "cost per cell", cost)?;
        let total_cost = ensure_finite_result("cell_count", "total cost", cost * inputs.cell_count)?;
        let cost_per_kwh = ensure_finite_result("capacity_ah", "cost per kWh", cost / energy_kwh)?;

        Ok(CellCostResult {
            material_cost,
            scrap_factor,
            energy_kwh,
            base_cost,
            warranty_cost,
            cost_per_cell: cost,
            total_cost,
            cost_per_kwh,
        })
    }
}

impl Calculator for CellCostCalculator {
    type Inputs = CellCostInputs;
    type Output = CellCostResult;

    const NAME: &'static str = "cell";

    fn fields() -> &'static [FieldSpec] {
        CELL_FIELDS
    }

    fn inputs_from_fields(values: &FieldValues) -> Result<CellCostInputs, InvalidInputError> {
        Ok(CellCostInputs {
            cell_count: values.value("cell_count")?,
            capacity_ah: values.value("capacity_ah")?,
            voltage_v: values.value("voltage_v")?,
            lithium_carbonate_cost: values.value("lithium_carbonate_cost")?,
            iron_phosphate_cost: values.value("iron_phosphate_cost")?,
            graphite_cost: values.value("graphite_cost")?,
            electrolyte_cost: values.value("electrolyte_cost")?,
            separator_cost: values.value("separator_cost")?,
            copper_foil_cost: values.value("copper_foil_cost")?,
            aluminum_foil_cost: values.value("aluminum_foil_cost")?,
            manufacturing_cost_per_kwh: values.value("manufacturing_cost_per_kwh")?,
            overhead_cost_per_kwh: values.value("overhead_cost_per_kwh")?,
            engineering_cost_per_cell: values.value("engineering_cost_per_cell")?,
            scrap_rate: values.value("scrap_rate")?,
            warranty_rate: values.value("warranty_rate")?,
        })
    }

    fn compute(inputs: &CellCostInputs) -> Result<CellCostResult, InvalidInputError> {
        CellCostCalculator::compute(inputs)
    }

    fn render(inputs: &CellCostInputs, output: &CellCostResult) -> String {
        report::render_cell(inputs, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_default_matches_catalogue() {
        let values = FieldValues::resolve(
            CELL_FIELDS,
            &HashMap::new(),
            Vec::<(String, String)>::new(),
        )
        .unwrap();
        let inputs = CellCostCalculator::inputs_from_fields(&values).unwrap();
        assert_eq!(inputs, CellCostInputs::default());
    }

    #[test]
    fn test_default_breakdown() {
        let result = CellCostCalculator::compute(&CellCostInputs::default()).unwrap();

        assert_eq!(result.material_cost, 78.0);
        assert!(approx(result.scrap_factor, 1.0 / 0.9, 1e-12));
        assert!(approx(result.energy_kwh, 0.032, 1e-12));
        assert!(approx(result.base_cost, 4.457_777_777_777_778, 1e-9));
        assert!(approx(result.cost_per_cell, 4.491_463_755_946_584, 1e-9));
        assert!(approx(result.cost_per_kwh, 140.358_242_373_330_7, 1e-6));
        assert!(approx(result.total_cost, 4_491_463.755_946_584, 1e-3));
    }

    #[test]
    fn test_warranty_iterates_exactly_five_times() {
        let inputs = CellCostInputs::default();
        let result = CellCostCalculator::compute(&inputs).unwrap();

        // Five steps from base is base * (1 + r + ... + r^5)
        let r = inputs.warranty_rate * WARRANTY_COST_MULTIPLIER;
        let truncated: f64 = (0..=5).map(|k| r.powi(k as i32)).sum::<f64>() * result.base_cost;
        assert!(approx(result.cost_per_cell, truncated, 1e-12));

        // and stays short of the closed-form fixed point
        let fixed_point = result.base_cost / (1.0 - r);
        assert!(result.cost_per_cell < fixed_point);
        assert!(approx(result.cost_per_cell, fixed_point, 1e-9));
    }

    #[test]
    fn test_zero_warranty_is_base() {
        let inputs = CellCostInputs {
            warranty_rate: 0.0,
            ..CellCostInputs::default()
        };
        let result = CellCostCalculator::compute(&inputs).unwrap();
        assert_eq!(result.cost_per_cell, result.base_cost);
        assert_eq!(result.warranty_cost, 0.0);
    }

    #[test]
    fn test_zero_scrap_factor_is_one() {
        let inputs = CellCostInputs {
            scrap_rate: 0.0,
            ..CellCostInputs::default()
        };
        let result = CellCostCalculator::compute(&inputs).unwrap();
        assert_eq!(result.scrap_factor, 1.0);
    }

    #[test]
    fn test_full_scrap_rejected() {
        for scrap_rate in [1.0, 1.5] {
            let inputs = CellCostInputs {
                scrap_rate,
                ..CellCostInputs::default()
            };
            let err = CellCostCalculator::compute(&inputs).unwrap_err();
            assert_eq!(err.field(), "scrap_rate");
        }
    }

    #[test]
    fn test_divergent_warranty_rejected() {
        let inputs = CellCostInputs {
            warranty_rate: 0.7,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert_eq!(err.field(), "warranty_rate");

        let inputs = CellCostInputs {
            warranty_rate: 0.6,
            ..CellCostInputs::default()
        };
        assert!(CellCostCalculator::compute(&inputs).is_ok());
    }

    #[test]
    fn test_zero_energy_rejected() {
        let inputs = CellCostInputs {
            voltage_v: 0.0,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert!(matches!(err, InvalidInputError::OutOfRange { .. }));
    }

    #[test]
    fn test_negative_and_nan_rejected() {
        let inputs = CellCostInputs {
            graphite_cost: -1.0,
            ..CellCostInputs::default()
        };
        assert_eq!(
            CellCostCalculator::compute(&inputs).unwrap_err(),
            InvalidInputError::Negative {
                field: "graphite_cost".to_string(),
                value: -1.0
            }
        );

        let inputs = CellCostInputs {
            cell_count: f64::NAN,
            ..CellCostInputs::default()
        };
        assert!(matches!(
            CellCostCalculator::compute(&inputs).unwrap_err(),
            InvalidInputError::NotFinite { .. }
        ));
    }

    #[test]
    fn test_subnormal_energy_rejected() {
        let inputs = CellCostInputs {
            capacity_ah: 1e-160,
            voltage_v: 1e-160,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert_eq!(err.field(), "capacity_ah");
        assert!(matches!(err, InvalidInputError::OutOfRange { .. }));

        let inputs = CellCostInputs {
            capacity_ah: 1e300,
            voltage_v: 1e300,
            ..CellCostInputs::default()
        };
        assert_eq!(CellCostCalculator::compute(&inputs).unwrap_err().field(), "capacity_ah");
    }

    #[test]
    fn test_overflowing_figures_rejected() {
        let inputs = CellCostInputs {
            lithium_carbonate_cost: 1e308,
            copper_foil_cost: 1.5e308,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::out_of_range("copper_foil_cost", "material cost is not a finite number")
        );

        let inputs = CellCostInputs {
            cell_count: 1e308,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert_eq!(err.field(), "cell_count");

        let inputs = CellCostInputs {
            cell_count: 1.0,
            engineering_cost_per_cell: 1e307,
            capacity_ah: 1e-300,
            voltage_v: 1e-2,
            ..CellCostInputs::default()
        };
        let err = CellCostCalculator::compute(&inputs).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::out_of_range("capacity_ah", "cost per kWh is not a finite number")
        );
    }

    #[test]
    fn test_default_reads_catalogue() {
        let inputs = CellCostInputs::default();
        assert_eq!(inputs.cell_count, 1_000_000.0);
        assert_eq!(inputs.aluminum_foil_cost, 4.0);
        assert_eq!(inputs.scrap_rate, 0.1);
        assert_eq!(inputs.warranty_rate, 0.005);
    }

    #[test]
    fn test_zero_cells_is_allowed() {
        let inputs = CellCostInputs {
            cell_count: 0.0,
            ..CellCostInputs::default()
        };
        let result = CellCostCalculator::compute(&inputs).unwrap();
        assert_eq!(result.total_cost, 0.0);
        assert!(result.cost_per_cell > 0.0);
    }
}
