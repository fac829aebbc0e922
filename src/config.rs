/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ConfigError;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub elevator: ElevatorConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub n_elevators: usize,
    pub n_floors: u8,
    // Milliseconds spent at every floor stop
    pub stop_time: u64,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            n_elevators: 16,
            n_floors: 16,
            stop_time: 1000,
        }
    }
}

impl ElevatorConfig {
    pub fn stop_duration(&self) -> Duration {
        Duration::from_millis(self.stop_time)
    }

    pub fn is_valid_floor(&self, floor: u8) -> bool {
        floor < self.n_floors
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_elevators == 0 {
            return Err(ConfigError::Invalid("n_elevators must be at least 1".into()));
        }
        if self.n_floors == 0 {
            return Err(ConfigError::Invalid("n_floors must be at least 1".into()));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.elevator.validate()?;
    Ok(config)
}
