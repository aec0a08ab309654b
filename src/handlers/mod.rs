//! HTTP handlers
//!
//! Each request is handled on its own; the only shared state is the
//! configuration snapshot, which is swapped atomically on reload.

pub mod calculate;
pub mod fields;
pub mod health;
pub mod metrics_handler;

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ArcSwap<Config>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }
}
