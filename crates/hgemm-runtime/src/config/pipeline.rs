use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration of the staging pipelines.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Logger for pipeline summaries.
    #[serde(default)]
    pub logger: LoggerConfig<PipelineLogLevel>,

    /// Record every load, compute and barrier of each cube and reject launches whose staging
    /// order is hazardous.
    #[serde(default)]
    pub trace: bool,
}

/// Log level for the pipeline logger.
pub type PipelineLogLevel = BinaryLogLevel;
