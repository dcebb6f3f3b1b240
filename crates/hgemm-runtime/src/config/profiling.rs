use super::logger::{LogLevel, LoggerConfig};

/// Configuration for launch profiling.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProfilingConfig {
    /// Logger for launch timings.
    #[serde(default)]
    pub logger: LoggerConfig<ProfilingLogLevel>,
}

/// Log levels for profiling.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProfilingLogLevel {
    /// Profiling logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Kernel name and duration.
    #[serde(rename = "basic")]
    Basic,

    /// Kernel name, duration, cube count and cube dim.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for ProfilingLogLevel {
    fn enabled(&self) -> bool {
        !matches!(self, ProfilingLogLevel::Disabled)
    }
}
