//! Bring-up Logging and Tracing
//!
//! Records configuration and barrier events for diagnostics. Everything is
//! forwarded to the `log` facade; the console and JSON outputs mirror what a
//! runtime prints with verbose logging on.
//!
//! Nothing here may be used from the access path: logging allocates and
//! takes a lock.
//!
//! Log Levels:
//! - ERROR: rejected configuration
//! - WARN: repeated bring-up steps
//! - INFO: policy and barrier installation
//! - DEBUG: barrier statistics

use std::collections::VecDeque;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

/// Log level for accessor events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        }
    }
}

/// Accessor event types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RefEvent {
    /// Encoding policy confirmed during bring-up
    PolicyInstalled {
        compressed: bool,
        heap_base: usize,
        reference_shift: u8,
    },

    /// Process write barrier hook installed
    BarrierInstalled { hook: usize },

    /// Bring-up step ran again after the singleton was initialized
    Reinitialized { reason: String },

    /// Configuration rejected during bring-up
    ConfigRejected { reason: String },

    /// Write barrier counters
    BarrierStats {
        total_invocations: u64,
        null_stores: u64,
        self_references: u64,
    },
}

impl RefEvent {
    /// Log level of this event
    pub fn level(&self) -> LogLevel {
        match self {
            RefEvent::ConfigRejected { .. } => LogLevel::Error,
            RefEvent::Reinitialized { .. } => LogLevel::Warn,
            RefEvent::PolicyInstalled { .. } | RefEvent::BarrierInstalled { .. } => LogLevel::Info,
            RefEvent::BarrierStats { .. } => LogLevel::Debug,
        }
    }

    fn human(&self) -> String {
        match self {
            RefEvent::PolicyInstalled {
                compressed,
                heap_base,
                reference_shift,
            } => {
                if *compressed {
                    format!(
                        "[REF] Compressed references: base={:#x}, shift={}",
                        heap_base, reference_shift
                    )
                } else {
                    "[REF] Uncompressed references".to_string()
                }
            },
            RefEvent::BarrierInstalled { hook } => {
                format!("[REF] Write barrier hook installed at {:#x}", hook)
            },
            RefEvent::Reinitialized { reason } => format!("[REF] Reinitialized: {}", reason),
            RefEvent::ConfigRejected { reason } => {
                format!("[REF] Configuration rejected: {}", reason)
            },
            RefEvent::BarrierStats {
                total_invocations,
                null_stores,
                self_references,
            } => format!(
                "[REF] Barrier: {} invocations, {} null stores, {} self references",
                total_invocations, null_stores, self_references
            ),
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct RefLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,
}

impl Default for RefLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: false,
            json: false,
            timestamps: true,
        }
    }
}

/// Events kept in memory; the oldest are dropped beyond this
pub const MAX_RECORDED_EVENTS: usize = 1024;

/// RefLogger - event log for accessor bring-up
pub struct RefLogger {
    config: RefLoggerConfig,
    events: Mutex<VecDeque<(Instant, RefEvent)>>,
}

impl RefLogger {
    pub fn new(config: RefLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn config(&self) -> &RefLoggerConfig {
        &self.config
    }

    /// Log an event
    pub fn log(&self, event: RefEvent) {
        let level = event.level();
        if level > self.config.level {
            return;
        }

        let facade_level: log::Level = level.into();
        log::log!(facade_level, "{}", event.human());

        if self.config.console {
            self.output_console(&event);
        }

        let mut events = self.events.lock();
        if events.len() == MAX_RECORDED_EVENTS {
            events.pop_front();
        }
        events.push_back((Instant::now(), event));
    }

    fn output_console(&self, event: &RefEvent) {
        let line = if self.config.json {
            match serde_json::to_string(event) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("failed to serialize event: {}", e);
                    return;
                },
            }
        } else {
            event.human()
        };

        if self.config.timestamps {
            let now = chrono::Local::now();
            println!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), line);
        } else {
            println!("{}", line);
        }
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, RefEvent)> {
        self.events.lock().iter().cloned().collect()
    }

    /// Clear all events
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Default for RefLogger {
    fn default() -> Self {
        Self::new(RefLoggerConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<RefLogger> = Mutex::new(RefLogger::default());
}

/// Log an event to the global logger
pub fn log_event(event: RefEvent) {
    GLOBAL_LOGGER.lock().log(event);
}

/// Replace the global logger configuration, keeping recorded events
pub fn configure_logger(config: RefLoggerConfig) {
    let mut logger = GLOBAL_LOGGER.lock();
    let events = std::mem::take(&mut *logger.events.lock());
    *logger = RefLogger::new(config);
    *logger.events.lock() = events;
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    GLOBAL_LOGGER.lock().event_count()
}

/// Snapshot of the events recorded by the global logger
pub fn get_events() -> Vec<RefEvent> {
    GLOBAL_LOGGER
        .lock()
        .get_events()
        .into_iter()
        .map(|(_, event)| event)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_basic() {
        let logger = RefLogger::default();

        logger.log(RefEvent::PolicyInstalled {
            compressed: true,
            heap_base: 0x1_0000_0000,
            reference_shift: 3,
        });

        assert_eq!(logger.event_count(), 1);
        logger.clear_events();
        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_logger_keeps_most_recent_events() {
        let logger = RefLogger::default();

        for i in 0..MAX_RECORDED_EVENTS + 10 {
            logger.log(RefEvent::Reinitialized {
                reason: i.to_string(),
            });
        }

        assert_eq!(logger.event_count(), MAX_RECORDED_EVENTS);
        let events = logger.get_events();
        assert_eq!(
            events[0].1,
            RefEvent::Reinitialized {
                reason: "10".to_string()
            }
        );
        assert_eq!(
            events[MAX_RECORDED_EVENTS - 1].1,
            RefEvent::Reinitialized {
                reason: (MAX_RECORDED_EVENTS + 9).to_string()
            }
        );
    }

    #[test]
    fn test_logger_level_filter() {
        let logger = RefLogger::default();

        logger.log(RefEvent::BarrierStats {
            total_invocations: 1,
            null_stores: 0,
            self_references: 0,
        });

        assert_eq!(logger.event_count(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let event = RefEvent::BarrierInstalled { hook: 0x1000 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "barrier_installed");
        assert_eq!(json["hook"], 0x1000);
    }

    #[test]
    fn test_human_format() {
        let event = RefEvent::PolicyInstalled {
            compressed: false,
            heap_base: 0,
            reference_shift: 0,
        };
        assert_eq!(event.human(), "[REF] Uncompressed references");
    }

    #[test]
    fn test_global_logger() {
        log_event(RefEvent::Reinitialized {
            reason: "test".to_string(),
        });

        assert!(get_event_count() > 0);
        assert!(get_events()
            .iter()
            .any(|e| matches!(e, RefEvent::Reinitialized { reason } if reason == "test")));
    }
}
