pub mod config;
pub mod models;
pub mod pipeline;
pub mod pipeline_config;
pub mod review; // Reviewed values → saved lab results

pub use models::{LabResult, LabStatus, ValueSource};
pub use pipeline::lab_extraction::{
    candidates_to_json, extract_lab_values, CandidateValue, ExtractionReport, LabExtractionError,
    LabExtractor,
};
pub use pipeline_config::LabExtractionConfig;
pub use review::{finalize_reviewed_values, ReviewError, ReviewedLabValue};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` wins over the crate
/// default filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} v{} logging initialized", config::APP_NAME, config::APP_VERSION);
    }
}
