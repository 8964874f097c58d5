/// Application-level constants
pub const APP_NAME: &str = "clinic-labs";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding [`DEFAULT_MAX_INPUT_BYTES`].
pub const MAX_INPUT_BYTES_ENV: &str = "CLINIC_LABS_MAX_INPUT_BYTES";

/// Report text beyond this size is not scanned. A multi-page lab report
/// rarely exceeds 40 KB of text; the cap bounds work on pathological PDFs.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 256 * 1024;

/// Parameter labels shorter than this are treated as noise.
pub const MIN_PARAMETER_CHARS: usize = 2;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinic_labs=info"
}

/// Input cap from [`MAX_INPUT_BYTES_ENV`], falling back to the default when
/// unset, unparsable or zero.
pub fn max_input_bytes_from_env() -> usize {
    parse_max_input_bytes(std::env::var(MAX_INPUT_BYTES_ENV).ok().as_deref())
}

fn parse_max_input_bytes(raw: Option<&str>) -> usize {
    match raw.map(str::trim).map(str::parse::<usize>) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            tracing::warn!(
                var = MAX_INPUT_BYTES_ENV,
                "Ignoring invalid input cap, using default"
            );
            DEFAULT_MAX_INPUT_BYTES
        }
        None => DEFAULT_MAX_INPUT_BYTES,
    }
}
