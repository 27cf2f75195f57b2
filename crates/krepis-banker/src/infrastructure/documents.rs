//! JSON Documents
//!
//! ```text
//! scenario.json                      config.json
//! {                                  {
//!   "allocation": [[0,1,0], ...],      "max_requests_per_cycle": 3,
//!   "maximum":    [[7,5,3], ...],      "seed": 24301,
//!   "available":  [3,3,2]              "thresholds": { ... }
//! }                                  }
//! ```
//!
//! Missing config fields fall back to their defaults.

use crate::domain::{BankerError, BankerResult, Scenario, SimulationConfig};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read and decode a scenario document
///
/// # Errors
/// [`BankerError::Io`] when the file cannot be read,
/// [`BankerError::Scenario`] when it is not a valid scenario.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> BankerResult<Scenario> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&text)
        .map_err(|e| BankerError::Scenario(format!("{}: {}", path.display(), e)))?;
    debug!(
        path = %path.display(),
        processes = scenario.num_processes(),
        resources = scenario.num_resources(),
        "scenario loaded"
    );
    Ok(scenario)
}

/// Read, decode and validate a configuration document
pub fn load_config<P: AsRef<Path>>(path: P) -> BankerResult<SimulationConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let config = SimulationConfig::from_json_str(&text)?;
    debug!(path = %path.display(), seed = config.seed, "config loaded");
    Ok(config)
}

/// Write `scenario` as pretty-printed JSON
pub fn save_scenario<P: AsRef<Path>>(path: P, scenario: &Scenario) -> BankerResult<()> {
    let json = serde_json::to_string_pretty(scenario)
        .map_err(|e| BankerError::Scenario(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_save_then_load_scenario() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("classic.json");

        save_scenario(&path, &Scenario::classic()).unwrap();
        let loaded = load_scenario(&path).unwrap();
        assert_eq!(loaded, Scenario::classic());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_scenario(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BankerError::Io(_)));
    }

    #[test]
    fn test_malformed_scenario_names_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"allocation\": [[1]]}}").unwrap();

        let err = load_scenario(file.path()).unwrap_err();
        match err {
            BankerError::Scenario(msg) => assert!(msg.contains(&file.path().display().to_string())),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"seed\": 99, \"max_requests_per_cycle\": 5}}").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.seed, 99);
        assert_eq!(config.max_requests_per_cycle, 5);
        assert_eq!(config.max_processes, SimulationConfig::default().max_processes);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"overshoot_probability\": 2.0}}").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.is_configuration_error());
    }
}
