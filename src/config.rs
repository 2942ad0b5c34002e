//! Configuration loading and validation.
//!
//! The whole pipeline is driven by one [`AppConfig`] loaded at process start
//! and handed to each component's constructor.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Raw `test_limit` value as written in the config file.
///
/// Kept unparsed so a bad value degrades to "no limit" with a warning
/// instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestLimit {
    Number(i64),
    Text(String),
    /// Any other value (float, bool, list...), always ignored.
    Other(serde_json::Value),
}

impl TestLimit {
    /// Resolve to a usable limit, or the reason it is ignored.
    pub fn resolve(&self) -> Result<usize, String> {
        let value = match self {
            TestLimit::Number(n) => *n,
            TestLimit::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("test_limit {:?} is not a valid integer", s))?,
            TestLimit::Other(v) => {
                return Err(format!("test_limit {} is not a valid integer", v));
            }
        };
        if value < 1 {
            return Err(format!("test_limit {} is less than 1", value));
        }
        Ok(value as usize)
    }
}

/// Input discovery and batch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessingConfig {
    /// Folder scanned recursively for documents.
    pub input_folder: PathBuf,
    /// JSON report destination, overwritten on each run.
    pub output_file: PathBuf,
    /// File extensions to pick up (e.g. `pdf`).
    pub supported_formats: Vec<String>,
    /// Documents OCR'd concurrently.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
    /// Only process the first N discovered files.
    #[serde(default)]
    pub test_limit: Option<TestLimit>,
}

fn default_max_concurrent_tasks() -> usize {
    4
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Tesseract language code.
    #[serde(default = "default_language")]
    pub language: String,
    /// Page render scale relative to 72 DPI.
    #[serde(default = "default_zoom_factor")]
    pub zoom_factor: f32,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_zoom_factor() -> f32 {
    2.0
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            zoom_factor: default_zoom_factor(),
        }
    }
}

/// Fields expected in structured (JSON) model responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub required_fields: Vec<String>,
}

impl ExtractionConfig {
    /// Required fields absent from a JSON response object.
    pub fn missing_fields(&self, response: &serde_json::Value) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|field| response.get(field.as_str()).is_none())
            .cloned()
            .collect()
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level name (`DEBUG`, `INFO`, `WARNING`, `ERROR`, `CRITICAL`).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Formatter: `full`, `compact` or `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Map the configured level name onto a tracing level directive.
    pub fn level_directive(&self) -> &'static str {
        match self.level.trim().to_ascii_uppercase().as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARNING" | "WARN" => "warn",
            "ERROR" | "CRITICAL" | "FATAL" => "error",
            _ => "info",
        }
    }

    /// Selected formatter, falling back to `Full` for unknown names.
    pub fn log_format(&self) -> LogFormat {
        LogFormat::from_str(&self.format).unwrap_or_default()
    }
}

/// Console formatter for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Some(Self::Full),
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Timezone used for report timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// IANA zone name, e.g. `America/Argentina/Buenos_Aires`.
    pub name: String,
}

impl TimezoneConfig {
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.name
            .parse::<Tz>()
            .map_err(|_| ConfigError::Invalid(format!("Unknown timezone: {}", self.name)))
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub file_processing: FileProcessingConfig,
    pub ollama: LlmConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub ocr: OcrSettings,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load, apply environment overrides and validate a config file.
    /// Supports YAML, TOML and JSON based on file extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        config.ollama = config.ollama.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Err(ConfigError::Invalid("Configuration file is empty".to_string()));
        }

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "YAML",
                message: e.to_string(),
            }),
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Check value ranges. Called by [`AppConfig::load`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        let fp = &self.file_processing;

        if fp.input_folder.as_os_str().is_empty() {
            return invalid("Input folder cannot be empty");
        }
        if fp.output_file.as_os_str().is_empty() {
            return invalid("Output file cannot be empty");
        }
        if fp.supported_formats.iter().all(|f| f.trim().is_empty()) {
            return invalid("Supported formats cannot be empty");
        }
        if fp.max_concurrent_tasks < 1 {
            return invalid("max_concurrent_tasks must be at least 1");
        }

        self.ollama.validate().map_err(ConfigError::Invalid)?;

        if self.extraction.required_fields.is_empty() {
            return invalid("Required fields list cannot be empty");
        }
        if !(self.ocr.zoom_factor > 0.0) {
            return invalid("OCR zoom factor must be positive");
        }

        self.timezone.tz()?;
        Ok(())
    }

    /// Base directory for resolving relative paths: the config file's folder.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a configured path against [`AppConfig::base_dir`].
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_YAML: &str = r#"
file_processing:
  input_folder: ./dataset
  output_file: ./output/dataset.json
  supported_formats: [pdf]
  max_concurrent_tasks: 3
  test_limit: 2
ollama:
  model: qwen3:8b
  temperature: 0.2
  top_k: 40
  top_p: 0.9
  format: ""
extraction:
  required_fields: [summary]
logging:
  level: WARNING
  format: compact
timezone:
  name: America/Argentina/Buenos_Aires
"#;

    fn sample() -> AppConfig {
        AppConfig::parse(SAMPLE_YAML, "yaml").unwrap()
    }

    #[test]
    fn test_parse_yaml() {
        let config = sample();
        assert_eq!(config.file_processing.max_concurrent_tasks, 3);
        assert_eq!(config.file_processing.test_limit, Some(TestLimit::Number(2)));
        assert_eq!(config.ollama.model, "qwen3:8b");
        assert_eq!(config.ollama.top_k, 40);
        assert_eq!(config.ocr.zoom_factor, 2.0);
        assert_eq!(config.ocr.language, "eng");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[file_processing]
input_folder = "in"
output_file = "out.json"
supported_formats = ["pdf"]
test_limit = "abc"

[ollama]
model = "llama3"
temperature = 1.0
top_k = 10
top_p = 0.5

[extraction]
required_fields = ["summary"]

[logging]
level = "DEBUG"

[timezone]
name = "UTC"
"#;
        let config = AppConfig::parse(toml, "toml").unwrap();
        assert_eq!(
            config.file_processing.test_limit,
            Some(TestLimit::Text("abc".to_string()))
        );
        assert_eq!(config.file_processing.max_concurrent_tasks, 4);
        assert_eq!(config.logging.level_directive(), "debug");
        assert_eq!(config.logging.log_format(), LogFormat::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_section_fails() {
        let yaml = SAMPLE_YAML.replace("timezone:\n  name: America/Argentina/Buenos_Aires\n", "");
        let err = AppConfig::parse(&yaml, "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: "YAML", .. }));
    }

    #[test]
    fn test_empty_file_fails() {
        assert!(matches!(
            AppConfig::parse("  \n", "yaml"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = sample();
        config.ollama.temperature = 2.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = sample();
        config.ollama.top_p = 1.1;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.ollama.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.extraction.required_fields.clear();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.file_processing.input_folder = PathBuf::new();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.timezone.name = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = AppConfig::load(&temp.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_sets_source_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, SAMPLE_YAML).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.base_dir().as_deref(), Some(temp.path()));
        assert_eq!(
            config.resolve_path(Path::new("data/in")),
            temp.path().join("data/in")
        );
        assert_eq!(
            config.resolve_path(Path::new("/srv/out.json")),
            PathBuf::from("/srv/out.json")
        );
    }

    #[test]
    fn test_non_integer_test_limit_loads() {
        for raw in ["2.5", "true", "[1]"] {
            let yaml = SAMPLE_YAML.replace("test_limit: 2", &format!("test_limit: {}", raw));
            let config = AppConfig::parse(&yaml, "yaml").unwrap();
            assert!(config.validate().is_ok());

            let limit = config.file_processing.test_limit.unwrap();
            assert!(matches!(limit, TestLimit::Other(_)), "{}: {:?}", raw, limit);
            assert!(limit.resolve().is_err());
        }
    }

    #[test]
    fn test_load_with_float_test_limit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, SAMPLE_YAML.replace("test_limit: 2", "test_limit: 2.5")).unwrap();

        let config = AppConfig::load(&path).unwrap();
        let err = config.file_processing.test_limit.unwrap().resolve().unwrap_err();
        assert!(err.contains("not a valid integer"));
    }

    #[test]
    fn test_resolve_test_limit() {
        assert_eq!(TestLimit::Number(2).resolve(), Ok(2));
        assert_eq!(TestLimit::Text(" 5 ".to_string()).resolve(), Ok(5));
        assert!(TestLimit::Number(0).resolve().is_err());
        assert!(TestLimit::Number(-3).resolve().is_err());
        assert!(TestLimit::Text("abc".to_string()).resolve().is_err());
    }

    #[test]
    fn test_level_directive_aliases() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.level_directive(), "info");
        logging.level = "critical".to_string();
        assert_eq!(logging.level_directive(), "error");
        logging.level = "Warning".to_string();
        assert_eq!(logging.level_directive(), "warn");
        logging.level = "verbose".to_string();
        assert_eq!(logging.level_directive(), "info");
    }

    #[test]
    fn test_missing_required_fields() {
        let extraction = ExtractionConfig {
            required_fields: vec!["numero".to_string(), "tema".to_string()],
        };
        let response = serde_json::json!({ "numero": "12/2024" });
        assert_eq!(extraction.missing_fields(&response), vec!["tema".to_string()]);
    }
}
