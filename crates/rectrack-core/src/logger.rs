//! Process-wide log setup.
//!
//! Two backends read the same `RECTRACK_LOG` variable:
//! - [`init_from_env`] installs a small stderr [`log::Log`] that tags each
//!   line with the elapsed time and the emitting thread (the frame worker
//!   runs on its own named thread);
//! - with the `tracing` feature, [`init_tracing`] installs a `tracing`
//!   subscriber and forwards `log` records into it, so spans from the
//!   tracker, rectifier and session interleave with plain log lines.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log level (or, for [`init_tracing`],
/// a full `EnvFilter` directive such as `rectrack_tracker=debug,info`).
pub const LOG_ENV: &str = "RECTRACK_LOG";

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

impl FrameLogger {
    fn line(&self, record: &Record, thread: Option<&str>) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        match thread {
            Some(name) if name != "main" => format!(
                "[{elapsed:8.3}s {:>5} {} @{name}] {}",
                record.level(),
                record.target(),
                record.args()
            ),
            _ => format!(
                "[{elapsed:8.3}s {:>5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            ),
        }
    }
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let thread = std::thread::current();
        let line = self.line(record, thread.name());
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Parse a level name (`error`, `warn`, `info`, `debug`, `trace`, `off`),
/// falling back to `default` for a missing or unknown value.
pub fn parse_level(raw: Option<&str>, default: LevelFilter) -> LevelFilter {
    raw.and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or(default)
}

/// Install the stderr logger at `level`. Later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| FrameLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install the stderr logger at the level named in `RECTRACK_LOG`.
pub fn init_from_env(default: LevelFilter) -> Result<(), log::SetLoggerError> {
    let raw = std::env::var(LOG_ENV).ok();
    init_with_level(parse_level(raw.as_deref(), default))
}

/// Install a `tracing` subscriber on stderr filtered by `RECTRACK_LOG`
/// (default `default`), and route `log` records into it.
///
/// Returns `false` if a subscriber or logger was already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default: LevelFilter) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default.to_string().to_lowercase()));

    let bridged = tracing_log::LogTracer::init().is_ok();
    let installed = if json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init()
            .is_ok()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .with_thread_names(true)
            .finish()
            .try_init()
            .is_ok()
    };
    bridged && installed
}
