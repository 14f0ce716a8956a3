use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    domain::TrackerConfig,
    error::TrackerError,
    storage,
    time_format::parse_span,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Record log location; relative paths live in the data directory.
    pub record_file: PathBuf,
    /// Daily target as `H:MM:SS`.
    pub expected_span: String,
    pub refresh_ms: u64,
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub session: String,
    pub total: String,
    pub remain: String,
    pub back: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record_file: PathBuf::from(storage::RECORD_FILE_NAME),
            expected_span: "8:00:00".to_string(),
            refresh_ms: 100,
            colors: ColorConfig::default(),
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            session: "#D5D5D5".to_string(),
            total: "#BDF2BC".to_string(),
            remain: "#FACA8E".to_string(),
            back: "#000000".to_string(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults for a missing file or fields.
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let config = storage::read_json::<Config>(path)?.unwrap_or_default();
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Like `load`, but writes the defaults out when no config file exists
    /// yet so every setting is visible for editing. An existing file is
    /// never rewritten.
    pub fn load_or_init(path: &Path) -> Result<Self, TrackerError> {
        let exists = path.exists();
        let config = Self::load(path)?;
        if !exists {
            if let Err(e) = config.save(path) {
                warn!(path = %path.display(), "could not write config: {}", e);
            }
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), TrackerError> {
        storage::write_json_atomic(path, self)
    }

    pub fn tracker(&self, data_dir: &Path) -> Result<TrackerConfig, TrackerError> {
        let log_path = if self.record_file.is_absolute() {
            self.record_file.clone()
        } else {
            data_dir.join(&self.record_file)
        };

        Ok(TrackerConfig {
            log_path,
            expected_span: parse_span(&self.expected_span)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::SystemTime};

    use chrono::Duration;

    use super::*;

    fn unique_path(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}.json", prefix, now))
    }

    #[test]
    fn test_missing_config_is_default() {
        let config = Config::load(&unique_path("studytime_missing_config")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.refresh_ms, 100);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let path = unique_path("studytime_partial_config");
        fs::write(
            &path,
            r##"{ "expected-span": "6:30:00", "colors": { "back": "#101010" } }"##,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.expected_span, "6:30:00");
        assert_eq!(config.colors.back, "#101010");
        assert_eq!(config.colors.session, "#D5D5D5");
        assert_eq!(config.record_file, PathBuf::from("studyTimeRecord.txt"));

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_config_round_trip() {
        let path = unique_path("studytime_config_roundtrip");
        let config = Config {
            refresh_ms: 250,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_or_init_writes_only_missing_file() {
        let path = unique_path("studytime_init_config");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        let edited = r#"{ "refresh-ms": 500 }"#;
        fs::write(&path, edited).unwrap();
        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.refresh_ms, 500);
        assert_eq!(fs::read_to_string(&path).unwrap(), edited);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_tracker_config_resolves_relative_record_file() {
        let config = Config::default();
        let tracker = config.tracker(Path::new("/data")).unwrap();
        assert_eq!(tracker.log_path, Path::new("/data").join("studyTimeRecord.txt"));
        assert_eq!(tracker.expected_span, Duration::hours(8));

        let absolute = Config {
            record_file: std::env::temp_dir().join("log.txt"),
            ..Config::default()
        };
        assert_eq!(
            absolute.tracker(Path::new("/data")).unwrap().log_path,
            std::env::temp_dir().join("log.txt")
        );
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let config = Config {
            expected_span: "eight hours".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.tracker(Path::new(".")),
            Err(TrackerError::Config(_))
        ));
    }
}
