//! Tracing subscriber setup.
//!
//! Console output always goes to stderr. When a log directory is given, a
//! daily-rolling `holdscale.log` is written there as well through a
//! non-blocking writer; keep the returned guard alive until exit so the
//! file is flushed.

use std::path::Path;

use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use tracing_appender::non_blocking::WorkerGuard;

/// File name prefix of the rolling log.
pub const LOG_FILE_NAME: &str = "holdscale.log";

/// Default filter directive for a verbosity level.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "holdscale=debug,info"
    } else {
        "info"
    }
}

/// Build the filter, letting `RUST_LOG` override the default.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber.
///
/// Returns the file writer guard when file logging is enabled. Calling this
/// twice leaves the first subscriber in place.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Local offset lookup can fail on multi-threaded Unix processes.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(offset, Rfc3339);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(env_filter(verbose))
                .with(console)
                .with(file)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(env_filter(verbose))
                .with(console)
                .try_init();
            None
        }
    }
}
