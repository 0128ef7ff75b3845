use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Runtime settings for a [`Dispatcher`](crate::dispatch::Dispatcher).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Worker pool size; `None` uses rayon's default.
    pub worker_threads: Option<usize>,
    pub thread_name_prefix: String,
    /// Log per-operation timings at `info` instead of `debug`.
    pub log_timings: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name_prefix: "cvmat-worker".to_string(),
            log_timings: false,
        }
    }
}

pub fn load_config(path: &Path) -> Result<BindingConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: BindingConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: BindingConfig = serde_json::from_str(r#"{ "worker_threads": 2 }"#).unwrap();
        assert_eq!(config.worker_threads, Some(2));
        assert_eq!(config.thread_name_prefix, "cvmat-worker");
        assert!(!config.log_timings);
    }

    #[test]
    fn load_config_reports_path_on_failure() {
        let path = Path::new("/nonexistent/cvmat.json");
        let err = load_config(path).unwrap_err();
        assert!(err.starts_with("Failed to read config /nonexistent/cvmat.json"));
    }

    #[test]
    fn load_config_reads_json_file() {
        let path = std::env::temp_dir().join(format!("cvmat-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "thread_name_prefix": "ops", "log_timings": true }"#).unwrap();
        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.thread_name_prefix, "ops");
        assert!(config.log_timings);
        assert_eq!(config.worker_threads, None);
    }
}
