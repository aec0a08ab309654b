//! Pack-level cost roll-up
//!
//! Per-kWh components are scaled by pack capacity, flat components are
//! added as-is, and overhead is applied as a fraction of the subtotal.

use serde::{Deserialize, Serialize};

use super::Calculator;
use crate::error::InvalidInputError;
use crate::input::{
    catalogue_default, ensure_finite_result, ensure_nonnegative, largest_field, FieldKind,
    FieldSpec, FieldValues,
};
use crate::report;

pub static PACK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "pack_capacity_kwh",
        alias: "pack_capacity",
        label: "Pack Capacity (kWh)",
        kind: FieldKind::Amount,
        default: 60.0,
    },
    FieldSpec {
        key: "cell_cost_per_kwh",
        alias: "cell_cost",
        label: "Cell Cost ($/kWh)",
        kind: FieldKind::Amount,
        default: 100.0,
    },
    FieldSpec {
        key: "bms_cost",
        alias: "bms_cost",
        label: "BMS Cost ($)",
        kind: FieldKind::Amount,
        default: 1000.0,
    },
    FieldSpec {
        key: "thermal_cost",
        alias: "thermal_cost",
        label: "Thermal Management Cost ($)",
        kind: FieldKind::Amount,
        default: 500.0,
    },
    FieldSpec {
        key: "housing_cost_per_kwh",
        alias: "housing_cost",
        label: "Housing Cost ($/kWh)",
        kind: FieldKind::Amount,
        default: 10.0,
    },
    FieldSpec {
        key: "assembly_cost_per_kwh",
        alias: "assembly_cost",
        label: "Assembly Cost ($/kWh)",
        kind: FieldKind::Amount,
        default: 5.0,
    },
    FieldSpec {
        key: "overhead_percent",
        alias: "overhead_percent",
        label: "Overhead and Profit (%)",
        kind: FieldKind::Percent,
        default: 15.0,
    },
];

/// Pack cost parameters. `overhead_percent` holds a fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackCostInputs {
    pub pack_capacity_kwh: f64,
    pub cell_cost_per_kwh: f64,
    pub bms_cost: f64,
    pub thermal_cost: f64,
    pub housing_cost_per_kwh: f64,
    pub assembly_cost_per_kwh: f64,
    pub overhead_percent: f64,
}

impl Default for PackCostInputs {
    fn default() -> Self {
        let default = |key: &str| catalogue_default(PACK_FIELDS, key);
        Self {
            pack_capacity_kwh: default("pack_capacity_kwh"),
            cell_cost_per_kwh: default("cell_cost_per_kwh"),
            bms_cost: default("bms_cost"),
            thermal_cost: default("thermal_cost"),
            housing_cost_per_kwh: default("housing_cost_per_kwh"),
            assembly_cost_per_kwh: default("assembly_cost_per_kwh"),
            overhead_percent: default("overhead_percent"),
        }
    }
}

impl PackCostInputs {
    fn amounts(&self) -> [(&'static str, f64); 7] {
        [
            ("pack_capacity_kwh", self.pack_capacity_kwh),
            ("cell_cost_per_kwh", self.cell_cost_per_kwh),
            ("bms_cost", self.bms_cost),
            ("thermal_cost", self.thermal_cost),
            ("housing_cost_per_kwh", self.housing_cost_per_kwh),
            ("assembly_cost_per_kwh", self.assembly_cost_per_kwh),
            ("overhead_percent", self.overhead_percent),
        ]
    }

    fn validate(&self) -> Result<(), InvalidInputError> {
        for (field, value) in self.amounts() {
            ensure_nonnegative(field, value)?;
        }

        if self.overhead_percent > 1.0 {
            return Err(InvalidInputError::out_of_range(
                "overhead_percent",
                "must not exceed 100%",
            ));
        }

        if self.pack_capacity_kwh <= 0.0 {
            return Err(InvalidInputError::out_of_range(
                "pack_capacity_kwh",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Pack cost broken down by component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackCostResult {
    pub cell_total: f64,
    pub bms_cost: f64,
    pub thermal_cost: f64,
    pub housing_total: f64,
    pub assembly_total: f64,
    pub subtotal: f64,
    pub overhead: f64,
    pub total_cost: f64,
    pub cost_per_kwh: f64,
}

pub struct PackCostCalculator;

impl PackCostCalculator {
    pub fn compute(inputs: &PackCostInputs) -> Result<PackCostResult, InvalidInputError> {
        inputs.validate()?;

        let capacity = inputs.pack_capacity_kwh;
        let cell_total = inputs.cell_cost_per_kwh * capacity;
        let housing_total = inputs.housing_cost_per_kwh * capacity;
        let assembly_total = inputs.assembly_cost_per_kwh * capacity;

        let subtotal =
            cell_total + inputs.bms_cost + inputs.thermal_cost + housing_total + assembly_total;
        let overhead = subtotal * inputs.overhead_percent;

        // Every other figure feeds into the total, so checking it covers them
        let total_cost = ensure_finite_result(
            largest_field(&inputs.amounts()),
            "total pack cost",
            subtotal + overhead,
        )?;
        let cost_per_kwh =
            ensure_finite_result("pack_capacity_kwh", "cost per kWh", total_cost / capacity)?;

        Ok(PackCostResult {
            cell_total,
            bms_cost: inputs.bms_cost,
            thermal_cost: inputs.thermal_cost,
            housing_total,
            assembly_total,
            subtotal,
            overhead,
            total_cost,
            cost_per_kwh,
        })
    }
}

impl Calculator for PackCostCalculator {
    type Inputs = PackCostInputs;
    type Output = PackCostResult;

    const NAME: &'static str = "pack";

    fn fields() -> &'static [FieldSpec] {
        PACK_FIELDS
    }

    fn inputs_from_fields(values: &FieldValues) -> Result<PackCostInputs, InvalidInputError> {
        Ok(PackCostInputs {
            pack_capacity_kwh: values.value("pack_capacity_kwh")?,
            cell_cost_per_kwh: values.value("cell_cost_per_kwh")?,
            bms_cost: values.value("bms_cost")?,
            thermal_cost: values.value("thermal_cost")?,
            housing_cost_per_kwh: values.value("housing_cost_per_kwh")?,
            assembly_cost_per_kwh: values.value("assembly_cost_per_kwh")?,
            overhead_percent: values.value("overhead_percent")?,
        })
    }

    fn compute(inputs: &PackCostInputs) -> Result<PackCostResult, InvalidInputError> {
        PackCostCalculator::compute(inputs)
    }

    fn render(_inputs: &PackCostInputs, output: &PackCostResult) -> String {
        report::render_pack(output)
    }
}
