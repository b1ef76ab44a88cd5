//! Log output for a run.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

/// HTTP internals are noisy at debug level.
const QUIET_DEPENDENCIES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,h2=warn,rustls=warn";

/// Install a subscriber for the current thread until the guard is dropped.
///
/// `RUST_LOG` takes precedence over `verbose`. Logs go to `log_file` when
/// given (appending), otherwise to stderr.
pub fn init(verbose: bool, log_file: Option<&Path>) -> std::io::Result<DefaultGuard> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", level, QUIET_DEPENDENCIES)));

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(log_file.is_none())
        .with_writer(writer)
        .finish();

    Ok(tracing::subscriber::set_default(subscriber))
}
