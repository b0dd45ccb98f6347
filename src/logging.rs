// src/logging.rs
//
// Process-wide logging bootstrap.
//
// Library code only talks to the `log` facade. The binary (or an embedding
// HTTP host) calls `init_logging` once; repeated calls with the same level
// are no-ops, a different level is rejected.

use flexi_logger::{Logger, LoggerHandle, WriteMode};
use log::info;
use once_cell::sync::OnceCell;

use crate::error::{AppError, AppResult};

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Start the stderr logger at `level`.
pub fn init_logging(level: &str) -> AppResult<()> {
    let normalized = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> AppResult<LoggingState> {
        let logger = Logger::try_with_str(normalized)
            .map_err(|e| AppError::Other(format!("invalid log level `{}`: {}", normalized, e)))?
            .log_to_stderr()
            .write_mode(WriteMode::Direct)
            .format(flexi_logger::detailed_format)
            .start()
            .map_err(|e| AppError::Other(format!("failed to start logger: {}", e)))?;

        info!(
            "event=logging_init module=logging status=ok level={} version={}",
            normalized,
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level: normalized,
            _logger: logger,
        })
    })?;

    if state.level != normalized {
        return Err(AppError::InvalidOperation(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, normalized
        )));
    }

    Ok(())
}

/// Active log level, if logging was initialized.
pub fn logging_level() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.level)
}

fn normalize_level(level: &str) -> AppResult<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(AppError::InvalidArgument(format!(
            "unsupported log level `{}`; expected trace|debug|info|warn|error",
            other
        ))),
    }
}
