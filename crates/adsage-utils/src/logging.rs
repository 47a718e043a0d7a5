//! Tracing setup for the adsage CLI.
//!
//! Library crates only emit `tracing` events; installing a subscriber is the
//! binary's job.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "adsage=debug,info"
    } else {
        "adsage=info,warn"
    }
}

/// Build the filter used by [`init_tracing`]. `RUST_LOG` takes precedence.
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the tracing subscriber.
///
/// Compact human-readable output goes to stderr so stdout stays free for
/// command results. With `json` set, every event is a single JSON line.
///
/// # Errors
///
/// Returns an error if a global subscriber was already installed.
pub fn init_tracing(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = env_filter(verbose);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}
