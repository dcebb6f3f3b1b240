use super::GlobalConfig;
use core::fmt::Display;
use hashbrown::HashMap;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Sinks and verbosity of one logging category. Several sinks can be enabled together.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Append to the log file instead of truncating it. When two categories share a file, the
    /// first one registered decides.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Forward messages to the `log` facade at this level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// Verbosity of the category.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

/// Level used when forwarding to the `log` facade.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    #[default]
    #[serde(rename = "info")]
    Info,

    #[serde(rename = "debug")]
    Debug,

    #[serde(rename = "trace")]
    Trace,
}

fn append_default() -> bool {
    true
}

/// Verbosity of one logging category.
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
    /// Whether messages of this category are written anywhere.
    fn enabled(&self) -> bool;
}

/// Routes profiling and pipeline messages to their sinks.
///
/// Categories configured with the same file, standard stream or `log` level write through one
/// shared sink.
#[derive(Debug)]
pub struct Logger {
    sinks: Vec<LoggerKind>,
    profiling_index: Vec<usize>,
    pipeline_index: Vec<usize>,
}

#[derive(Hash, PartialEq, Eq)]
enum SinkId {
    File(PathBuf),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

#[derive(Default)]
struct SinkRegistry {
    sinks: Vec<LoggerKind>,
    ids: HashMap<SinkId, usize>,
}

impl SinkRegistry {
    /// Indices of the sinks a category writes to, opening the ones not seen yet.
    fn register<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        if !config.level.enabled() {
            return Vec::new();
        }

        let mut indices = Vec::new();
        if let Some(file) = &config.file {
            let append = config.append;
            indices.extend(self.resolve(SinkId::File(file.clone()), || {
                FileLogger::new(file, append).map(LoggerKind::File)
            }));
        }
        if config.stdout {
            indices.extend(self.resolve(SinkId::Stdout, || Some(LoggerKind::Stdout)));
        }
        if config.stderr {
            indices.extend(self.resolve(SinkId::Stderr, || Some(LoggerKind::Stderr)));
        }
        if let Some(level) = config.log {
            indices.extend(self.resolve(SinkId::Log(level), || Some(LoggerKind::Log(level))));
        }
        indices
    }

    fn resolve(
        &mut self,
        id: SinkId,
        open: impl FnOnce() -> Option<LoggerKind>,
    ) -> Option<usize> {
        if let Some(index) = self.ids.get(&id) {
            return Some(*index);
        }

        let sink = open()?;
        let index = self.sinks.len();
        self.sinks.push(sink);
        self.ids.insert(id, index);
        Some(index)
    }
}

impl Logger {
    /// Opens the sinks of every enabled category.
    pub fn from_config(config: &GlobalConfig) -> Self {
        let mut registry = SinkRegistry::default();
        let profiling_index = registry.register(&config.profiling.logger);
        let pipeline_index = registry.register(&config.pipeline.logger);

        Self {
            sinks: registry.sinks,
            profiling_index,
            pipeline_index,
        }
    }

    /// Writes a launch timing to the profiling sinks.
    pub fn log_profiling<S: Display>(&mut self, msg: &S) {
        broadcast(&mut self.sinks, &self.profiling_index, msg);
    }

    /// Writes a pipeline summary to the pipeline sinks.
    pub fn log_pipeline<S: Display>(&mut self, msg: &S) {
        broadcast(&mut self.sinks, &self.pipeline_index, msg);
    }
}

fn broadcast<S: Display>(sinks: &mut [LoggerKind], indices: &[usize], msg: &S) {
    match indices {
        [] => {}
        [index] => sinks[*index].log(msg),
        _ => {
            // Format once for every sink.
            let msg = msg.to_string();
            for index in indices {
                sinks[*index].log(&msg);
            }
        }
    }
}

/// On/off verbosity for categories without finer levels.
#[derive(Default, Copy, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {
    fn enabled(&self) -> bool {
        matches!(self, BinaryLogLevel::Full)
    }
}

#[derive(Debug)]
enum LoggerKind {
    File(FileLogger),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl LoggerKind {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            LoggerKind::File(file_logger) => file_logger.log(msg),
            LoggerKind::Stdout => println!("{msg}"),
            LoggerKind::Stderr => eprintln!("{msg}"),
            LoggerKind::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    fn new(path: &Path, append: bool) -> Option<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path);

        match file {
            Ok(file) => Some(Self {
                writer: BufWriter::new(file),
            }),
            Err(err) => {
                log::warn!("Can't open log file {}: {err}", path.display());
                None
            }
        }
    }

    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());

        if let Err(err) = result {
            log::warn!("Can't write to log file: {err}");
        }
    }
}
