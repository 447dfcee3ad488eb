//! Revenue recognition and occupancy reconciliation for short-term rentals.
//!
//! Every operation is a pure function over caller-supplied bookings and
//! properties: the engine does no I/O and keeps no state between calls.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod schemas;
pub mod services;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use models::{Booking, BookingStatus, Platform, Property, Window};
pub use repository::snapshot::{BookingFilter, Snapshot};
pub use services::{
    conflicts::{detect_all_conflicts, detect_conflicts, Conflict, ConflictKind},
    kpi::{summarize, KpiSummary},
    occupancy::{aggregate_occupancy, compute_occupancy, AggregateOccupancy, OccupancyResult},
    platform_rules::{attribution_anchor, deferral_rule, AttributionAnchor},
    recognition::{
        recognize, recognize_from_config, RecognitionBucket, RecognitionQuery, RecognitionReport,
    },
    waterfall::{compute_breakdown, RevenueBreakdown, WaterfallTotals},
};

use tracing_subscriber::EnvFilter;

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` (default
/// `info`). Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init();
}
