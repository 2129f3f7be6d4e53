use env_logger::{Builder, WriteStyle};
use log::{LevelFilter, SetLoggerError};
use steadytick_core::{Capability, Entity, EntityCtx, TickError, TickResult};

use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLoggerConfig {
    pub level: LevelFilter,
    pub colors: bool,
    /// Print the log target (`sched`, `collections`, ...) as a column.
    pub include_module: bool,
}

impl ConsoleLoggerConfig {
    /// Reads `STEADYTICK_LOG`, `STEADYTICK_LOG_COLORS` and `STEADYTICK_LOG_MODULE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup("STEADYTICK_LOG")
            .and_then(|v| v.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info);
        let colors = lookup("STEADYTICK_LOG_COLORS")
            .map(|v| v.trim() != "0")
            .unwrap_or(true);
        let include_module = lookup("STEADYTICK_LOG_MODULE")
            .map(|v| v.trim() != "0")
            .unwrap_or(true);

        Self {
            level,
            colors,
            include_module,
        }
    }
}

impl Default for ConsoleLoggerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Installs the process-wide console logger. Fails if any logger is already set.
pub fn init_console_logger(config: &ConsoleLoggerConfig) -> Result<(), SetLoggerError> {
    let mut builder = Builder::new();
    builder.filter_level(config.level);
    builder.write_style(if config.colors {
        WriteStyle::Auto
    } else {
        WriteStyle::Never
    });

    let include_module = config.include_module;
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        if include_module {
            writeln!(
                buf,
                "[{style}{:<5}{style:#}] {:<12} {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "[{style}{:<5}{style:#}] {}", record.level(), record.args())
        }
    });

    builder.try_init()
}

/// Scheduled entity that installs the console logger when it starts.
///
/// Ordered first so everything after it logs through the installed logger.
pub struct ConsoleLogger {
    config: ConsoleLoggerConfig,
    initialized: bool,
}

impl ConsoleLogger {
    pub const ID: &'static str = "console-logger";

    #[inline]
    pub fn new(config: ConsoleLoggerConfig) -> Self {
        Self {
            config,
            initialized: false,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new(ConsoleLoggerConfig::default())
    }
}

impl Entity for ConsoleLogger {
    fn id(&self) -> &str {
        Self::ID
    }

    fn order(&self) -> i32 {
        i32::MIN
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Logging]
    }

    fn start(&mut self, _ctx: &mut EntityCtx<'_>) -> TickResult<()> {
        // Runs again on every restart; the global logger can only be set once.
        if self.initialized {
            return Ok(());
        }

        init_console_logger(&self.config)
            .map_err(|e| TickError::Other(format!("logger init failed: {e}")))?;

        self.initialized = true;
        log::debug!(target: "logging", "console logger installed at {}", self.config.level);
        Ok(())
    }
}
