use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder
///
/// Fails if a recorder is already installed in this process.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "battery_cost_calculations_total",
        "Total number of cost calculations by outcome"
    );
    describe_histogram!(
        "battery_cost_calculation_duration_seconds",
        "Calculation duration in seconds"
    );
    describe_gauge!(
        "battery_cost_info",
        "Estimator version and build information"
    );

    gauge!("battery_cost_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a finished calculation; `outcome` is `ok` or an error type name
pub fn record_calculation(calculator: &str, outcome: &str) {
    counter!(
        "battery_cost_calculations_total",
        "calculator" => calculator.to_string(),
        "outcome" => outcome.to_string(),
    )
    .increment(1);
}

pub fn record_duration(calculator: &str, duration: Duration) {
    histogram!(
        "battery_cost_calculation_duration_seconds",
        "calculator" => calculator.to_string(),
    )
    .record(duration.as_secs_f64());
}
