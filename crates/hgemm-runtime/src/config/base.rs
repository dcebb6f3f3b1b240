use super::{
    device::DeviceConfig, pipeline::PipelineConfig, profiling::ProfilingConfig,
    scheduler::SchedulerConfig,
};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static HGEMM_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration, combining profiling, pipeline, scheduler and device
/// settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration for profiling kernel launches.
    #[serde(default)]
    pub profiling: ProfilingConfig,

    /// Configuration for the staging pipelines.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Configuration for the worker pool.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Limits of the simulated device.
    #[serde(default)]
    pub device: DeviceConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `hgemm.toml` or `HGEMM.toml` in the
    /// current directory or its parents. If no file is found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function is somewhat expensive, because of a global static lock. Read it once
    /// when creating long lived objects such as a compute client.
    pub fn get() -> Arc<Self> {
        let mut state = HGEMM_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(path, content)
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`. Attempting
    /// to set the configuration after it has been initialized will cause a panic.
    pub fn set(config: Self) {
        let mut state = HGEMM_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        use super::{pipeline::PipelineLogLevel, profiling::ProfilingLogLevel};

        if let Ok(val) = std::env::var("HGEMM_DEBUG_LOG") {
            self.profiling.logger.level = ProfilingLogLevel::Basic;
            self.pipeline.logger.level = PipelineLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.profiling.logger.stdout = true;
                    self.pipeline.logger.stdout = true;
                }
                "stderr" => {
                    self.profiling.logger.stderr = true;
                    self.pipeline.logger.stderr = true;
                }
                "1" | "true" => {
                    let file_path = default_log_file();
                    self.profiling.logger.file = Some(file_path.clone());
                    self.pipeline.logger.file = Some(file_path);
                }
                "0" | "false" => {
                    self.profiling.logger.level = ProfilingLogLevel::Disabled;
                    self.pipeline.logger.level = PipelineLogLevel::Disabled;
                }
                file_path => {
                    self.profiling.logger.file = Some(file_path.into());
                    self.pipeline.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("HGEMM_DEBUG_OPTION") {
            match val.as_str() {
                "debug" => {
                    self.profiling.logger.level = ProfilingLogLevel::Full;
                    self.pipeline.logger.level = PipelineLogLevel::Full;
                }
                "profile" => {
                    self.profiling.logger.level = ProfilingLogLevel::Basic;
                }
                "profile-full" => {
                    self.profiling.logger.level = ProfilingLogLevel::Full;
                }
                _ => {}
            }
        };

        if let Ok(val) = std::env::var("HGEMM_WORKERS") {
            match val.parse::<usize>() {
                Ok(workers) => self.scheduler.workers = workers,
                Err(_) => log::warn!("Ignoring HGEMM_WORKERS={val}, expected a number"),
            }
        }

        if let Ok(val) = std::env::var("HGEMM_PIPELINE_TRACE") {
            match val.as_str() {
                "1" | "true" => self.pipeline.trace = true,
                "0" | "false" => self.pipeline.trace = false,
                _ => {}
            }
        }

        self
    }

    // Loads configuration from `hgemm.toml` or `HGEMM.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is reached.
    // Returns a default configuration if no file is found.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            for name in ["hgemm.toml", "HGEMM.toml"] {
                match Self::from_file_path(dir.join(name)) {
                    Ok(config) => return config,
                    Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                        log::warn!("Ignoring {}: {err}", dir.join(name).display());
                    }
                    Err(_) => {}
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    /// Loads configuration from a specified file path.
    pub fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parses a configuration from TOML content.
    pub fn from_toml(content: &str) -> std::io::Result<Self> {
        toml::from_str(content).map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("The file provided doesn't have the right format => {err}"),
            )
        })
    }
}

fn default_log_file() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hgemm.log")
}

#[derive(Clone, Copy, Debug)]
/// How to format kernel type names.
pub enum TypeNameFormatLevel {
    /// No formatting apply, full information is included.
    Full,
    /// Most information is removed for a small formatted name.
    Short,
    /// Balanced info is kept.
    Balanced,
}

/// Format a type name with different options.
pub fn type_name_format(name: &str, level: TypeNameFormatLevel) -> String {
    match level {
        TypeNameFormatLevel::Full => name.to_string(),
        TypeNameFormatLevel::Short => {
            if let Some(val) = name.split("<").next() {
                val.split("::").last().unwrap_or(name).to_string()
            } else {
                name.to_string()
            }
        }
        TypeNameFormatLevel::Balanced => {
            let mut split = name.split("<");
            let before_generic = split.next();
            let after_generic = split.next();

            let before_generic = match before_generic {
                None => return name.to_string(),
                Some(val) => val
                    .split("::")
                    .last()
                    .unwrap_or(val)
                    .trim()
                    .replace(">", "")
                    .to_string(),
            };
            let inside_generic = match after_generic {
                None => return before_generic.to_string(),
                Some(val) => {
                    let mut val = val.to_string();
                    for s in split {
                        val += "<";
                        val += s;
                    }
                    val
                }
            };

            let inside = type_name_list_format(&inside_generic, level);

            format!("{before_generic}{inside}")
        }
    }
}

fn type_name_list_format(name: &str, level: TypeNameFormatLevel) -> String {
    let mut acc = String::new();
    let splits = name.split(", ");

    for a in splits {
        acc += " | ";
        acc += &type_name_format(a, level);
    }

    acc
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{pipeline::PipelineLogLevel, profiling::ProfilingLogLevel};
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn test_format_name() {
        let full_name = "hgemm_matmul::kernels::BlockMatmulKernel<hgemm_matmul::components::global::DoubleBufferPipeline<hgemm_matmul::components::global::load::CooperativeLoading<16>>, hgemm_matmul::components::global::write::StagedWriter, hgemm_matmul::components::tile::Wmma16x16x16>";
        let name = type_name_format(full_name, TypeNameFormatLevel::Balanced);

        assert_eq!(
            name,
            "BlockMatmulKernel | DoubleBufferPipeline | CooperativeLoading | 16 | StagedWriter | Wmma16x16x16"
        );
    }

    #[test]
    fn test_format_name_short() {
        let name = type_name_format(
            "hgemm_matmul::kernels::BlockMatmulKernel<A, B>",
            TypeNameFormatLevel::Short,
        );

        assert_eq!(name, "BlockMatmulKernel");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = GlobalConfig::from_toml("").unwrap();

        assert_eq!(config.device, DeviceConfig::default());
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert!(!config.pipeline.trace);
        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Disabled);
    }

    #[test]
    fn toml_sections_are_parsed() {
        let content = r#"
            [profiling.logger]
            level = "full"
            stdout = true

            [pipeline]
            trace = true

            [scheduler]
            workers = 3

            [device]
            max_shared_memory_size = 32768
        "#;
        let config = GlobalConfig::from_toml(content).unwrap();

        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Full);
        assert!(config.profiling.logger.stdout);
        assert!(config.pipeline.trace);
        assert_eq!(config.scheduler.num_workers(), 3);
        assert_eq!(config.device.max_shared_memory_size, 32768);
        assert_eq!(config.device.plane_dim, 32);
    }

    #[test]
    fn malformed_toml_is_invalid_data() {
        let err = GlobalConfig::from_toml("[scheduler]\nworkers = \"many\"").unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    #[serial]
    fn env_overrides_config() {
        // SAFETY: tests touching the environment are serialized.
        unsafe {
            std::env::set_var("HGEMM_DEBUG_LOG", "stderr");
            std::env::set_var("HGEMM_WORKERS", "2");
            std::env::set_var("HGEMM_PIPELINE_TRACE", "1");
        }

        let config = GlobalConfig::default().override_from_env();

        unsafe {
            std::env::remove_var("HGEMM_DEBUG_LOG");
            std::env::remove_var("HGEMM_WORKERS");
            std::env::remove_var("HGEMM_PIPELINE_TRACE");
        }

        assert!(config.profiling.logger.stderr);
        assert!(config.pipeline.logger.stderr);
        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Basic);
        assert!(matches!(config.pipeline.logger.level, PipelineLogLevel::Full));
        assert_eq!(config.scheduler.workers, 2);
        assert!(config.pipeline.trace);
    }

    #[test]
    #[serial]
    fn invalid_worker_count_is_ignored() {
        unsafe {
            std::env::set_var("HGEMM_WORKERS", "lots");
        }

        let config = GlobalConfig::default().override_from_env();

        unsafe {
            std::env::remove_var("HGEMM_WORKERS");
        }

        assert_eq!(config.scheduler.workers, 0);
    }

    fn override_with(key: &str, value: &str) -> GlobalConfig {
        // SAFETY: tests touching the environment are serialized.
        unsafe {
            std::env::set_var(key, value);
        }

        let config = GlobalConfig::default().override_from_env();

        unsafe {
            std::env::remove_var(key);
        }

        config
    }

    #[test]
    #[serial]
    fn debug_option_enables_both_categories() {
        let config = override_with("HGEMM_DEBUG_OPTION", "debug");

        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Full);
        assert!(matches!(config.pipeline.logger.level, PipelineLogLevel::Full));
    }

    #[test]
    #[serial]
    fn profile_option_only_touches_profiling() {
        let config = override_with("HGEMM_DEBUG_OPTION", "profile");

        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Basic);
        assert!(matches!(config.pipeline.logger.level, PipelineLogLevel::Disabled));

        let config = override_with("HGEMM_DEBUG_OPTION", "profile-full");

        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Full);
        assert!(matches!(config.pipeline.logger.level, PipelineLogLevel::Disabled));
    }

    #[test]
    #[serial]
    fn debug_log_path_targets_both_files() {
        let path = std::env::temp_dir().join("hgemm-debug.log");
        let config = override_with("HGEMM_DEBUG_LOG", &path.to_string_lossy());

        assert_eq!(config.profiling.logger.file.as_ref(), Some(&path));
        assert_eq!(config.pipeline.logger.file.as_ref(), Some(&path));
        assert!(!config.profiling.logger.stdout);
        assert_eq!(config.profiling.logger.level, ProfilingLogLevel::Basic);
        assert!(matches!(config.pipeline.logger.level, PipelineLogLevel::Full));
    }

    #[test]
    fn save_and_reload() {
        let dir = std::env::temp_dir().join(format!("hgemm-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("hgemm.toml");

        let mut config = GlobalConfig::default();
        config.scheduler.workers = 5;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = GlobalConfig::from_file_path(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(loaded.scheduler.workers, 5);
    }
}
