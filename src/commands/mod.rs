//! Command implementations for the CLI
//!
//! - calculate: Run the cell or pack calculator once and print the report
//! - fields: List input fields and effective defaults
//! - serve: Start the HTTP service
//! - config: Configuration display and validation

pub mod calculate;
pub mod config;
pub mod fields;
pub mod serve;
