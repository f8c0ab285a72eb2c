//! Application configuration for QaStruct.
//!
//! User config lives at `~/.qastruct/qastruct.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QaStructError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "qastruct.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".qastruct";

// ---------------------------------------------------------------------------
// Config structs (matching qastruct.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline directories.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Batch behaviour.
    #[serde(default)]
    pub run: RunConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Marker-tagged transcripts waiting to be structured.
    #[serde(default = "default_structure_input")]
    pub structure_input: PathBuf,

    /// Structured documents and `_ERROR` diagnostics.
    #[serde(default = "default_structure_output")]
    pub structure_output: PathBuf,

    /// Structured documents waiting to be split by department.
    #[serde(default = "default_department_input")]
    pub department_input: PathBuf,

    /// Per-department documents, one sub-directory per run.
    #[serde(default = "default_department_output")]
    pub department_output: PathBuf,

    /// Run logs. Empty disables the log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            structure_input: default_structure_input(),
            structure_output: default_structure_output(),
            department_input: default_department_input(),
            department_output: default_department_output(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_structure_input() -> PathBuf {
    PathBuf::from("data/03_before_structured")
}
fn default_structure_output() -> PathBuf {
    PathBuf::from("data/04_after_structured")
}
fn default_department_input() -> PathBuf {
    PathBuf::from("data/05_before_department")
}
fn default_department_output() -> PathBuf {
    PathBuf::from("data/06_after_department")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

/// `[run]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Files processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Move successfully processed inputs into `<input>/done/`.
    #[serde(default = "default_true")]
    pub move_done: bool,

    /// Extension of input files (without the dot).
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            move_done: true,
            extension: default_extension(),
        }
    }
}

fn default_concurrency() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_extension() -> String {
    "txt".into()
}

// ---------------------------------------------------------------------------
// Batch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration of one batch stage, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for input files.
    pub input_dir: PathBuf,
    /// Directory receiving outputs.
    pub output_dir: PathBuf,
    /// Maximum files in flight.
    pub concurrency: u32,
    /// Move inputs to `<input_dir>/done/` after success.
    pub move_done: bool,
    /// Input file extension (without the dot).
    pub extension: String,
}

impl BatchConfig {
    /// The structuring stage (`structure_input` → `structure_output`).
    pub fn structure(config: &AppConfig) -> Self {
        Self::with_dirs(
            config,
            &config.paths.structure_input,
            &config.paths.structure_output,
        )
    }

    /// The department stage (`department_input` → `department_output`).
    pub fn department(config: &AppConfig) -> Self {
        Self::with_dirs(
            config,
            &config.paths.department_input,
            &config.paths.department_output,
        )
    }

    fn with_dirs(config: &AppConfig, input: &Path, output: &Path) -> Self {
        Self {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            concurrency: config.run.concurrency.max(1),
            move_done: config.run.move_done,
            extension: config.run.extension.clone(),
        }
    }

    /// Where processed inputs are moved.
    pub fn done_dir(&self) -> PathBuf {
        self.input_dir.join("done")
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.qastruct/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| QaStructError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.qastruct/qastruct.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| QaStructError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        QaStructError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.run.extension.trim().is_empty() {
        return Err(QaStructError::config("run.extension must not be empty"));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| QaStructError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| QaStructError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| QaStructError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("structure_input"));
        assert!(toml_str.contains("03_before_structured"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.run.concurrency, 4);
        assert!(parsed.run.move_done);
        assert_eq!(parsed.paths.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[paths]
structure_input = "/tmp/in"

[run]
move_done = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.structure_input, PathBuf::from("/tmp/in"));
        assert_eq!(
            config.paths.structure_output,
            PathBuf::from("data/04_after_structured")
        );
        assert!(!config.run.move_done);
        assert_eq!(config.run.extension, "txt");
    }

    #[test]
    fn batch_config_from_app_config() {
        let mut app = AppConfig::default();
        app.run.concurrency = 0;
        let structure = BatchConfig::structure(&app);
        assert_eq!(structure.concurrency, 1);
        assert_eq!(
            structure.done_dir(),
            PathBuf::from("data/03_before_structured/done")
        );

        let department = BatchConfig::department(&app);
        assert_eq!(
            department.output_dir,
            PathBuf::from("data/06_after_department")
        );
    }

    #[test]
    fn load_config_rejects_empty_extension() {
        let path = std::env::temp_dir().join(format!(
            "qastruct-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[run]\nextension = \"\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("run.extension"));
        let _ = std::fs::remove_file(&path);
    }
}
