use crate::mapping::ClusterId;
use crate::util::DebugCheckedPanic;
use crate::{console, platform};

/// Every log line is attributed to this cluster until the scheduler grows
/// a notion of "current cluster" to read instead (see [`crate::sched`]).
const LOG_CLUSTER: ClusterId = ClusterId::from_index(0);

/// A logger that writes log messages to the shared console.
pub struct Logger;

impl log::Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        // Enable all log levels
        true
    }

    fn flush(&self) {}

    fn log(&self, record: &log::Record) {
        let level = record.level();
        let uptime = platform::uptime();
        let uptime_secs = uptime.as_secs();
        let uptime_subsec_nanos = uptime.subsec_nanos();

        let level_str = match level {
            log::Level::Error => "ERR",
            log::Level::Warn => "WRN",
            log::Level::Info => "INF",
            log::Level::Debug => "DBG",
            log::Level::Trace => "TRC",
        };
        let target = record.target().split("::").last().unwrap_or("??");
        let file = record.file().unwrap_or("??");
        let line = record.line().unwrap_or_default();

        console::_print(
            LOG_CLUSTER,
            format_args!(
                "[{}] [{}.{:09}] [{}:{}] {}\n",
                level_str,
                uptime_secs,
                uptime_subsec_nanos,
                if level <= log::Level::Warn { file } else { target },
                line,
                record.args(),
            ),
        );
    }
}

/// Initializes the logger by setting it as the global logger and configuring the log level.
pub fn init() {
    log::set_logger(&Logger).debug_checked_expect("failed to set logger");
    let level_env = match option_env!("MESH_LOG") {
        Some("trace") => log::LevelFilter::Trace,
        Some("debug") => log::LevelFilter::Debug,
        Some("warn") => log::LevelFilter::Warn,
        Some("error") => log::LevelFilter::Error,
        Some("off") => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    };
    log::set_max_level(level_env);
    log::info!("logger initialized");
}
