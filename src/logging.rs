//! Logger callback. Synchronous, may read but not mutate node state. The
//! default implementation forwards to the `log` crate.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
}

pub trait Logger {
    fn log(&self, level: LogLevel, message: &str);
}

pub(crate) fn default_log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Fatal | LogLevel::Error => log::error!("{message}"),
        LogLevel::Warn => log::warn!("{message}"),
        LogLevel::Info => log::info!("{message}"),
        LogLevel::Debug => log::debug!("{message}"),
        LogLevel::Verbose => log::trace!("{message}"),
    }
}
