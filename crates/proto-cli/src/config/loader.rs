// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use proto_builder::Settings;
use proto_builder::settings::{Environment, SettingsSer, SystemEnvironment};
use serde::Deserialize;

use super::model::{Config, OutputConfig};

const DEFAULT_CONFIG_FILE: &str = "protogen.toml";

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSer {
    pub proto: Option<SettingsSer>,
    pub output: Option<OutputSer>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputSer {
    pub directory: Option<PathBuf>,
}

impl TryFrom<ConfigSer> for Config {
    type Error = anyhow::Error;

    fn try_from(config: ConfigSer) -> Result<Self, Self::Error> {
        Ok(Config {
            settings: config.proto.unwrap_or_default().try_into()?,
            output: config.output.map(OutputConfig::from).unwrap_or_default(),
        })
    }
}

impl From<OutputSer> for OutputConfig {
    fn from(output: OutputSer) -> Self {
        match output.directory {
            Some(directory) => OutputConfig { directory },
            None => OutputConfig::default(),
        }
    }
}

fn parse_config(toml_str: &str, path: &Path) -> Result<Config> {
    let config: ConfigSer = toml::from_str(toml_str)
        .map_err(|e| anyhow!("Failed to parse TOML file '{}': {}", path.display(), e))?;

    config.try_into()
}

fn load_config_from_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;

    parse_config(&toml_str, path)
}

fn load_config_with_env(path: Option<&Path>, env: &dyn Environment) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config_from_file(default_path)?
            } else {
                tracing::debug!("No {DEFAULT_CONFIG_FILE} found, using default settings");
                Config::default()
            }
        }
    };

    config.settings = config.settings.with_env_overrides(env)?;

    Ok(config)
}

/// Load the settings file (an explicit path must exist) and apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    load_config_with_env(path, &SystemEnvironment)
}

#[cfg(test)]
mod tests {
    use proto_builder::settings::{MapEnvironment, NameCase};

    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        parse_config(toml_str, Path::new("protogen.toml"))
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            [proto]
            version = 2
            maxchar_per_line = 100
            always_format = false
            name_case = "snake"

            [output]
            directory = "generated"
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            Config {
                settings: Settings {
                    version: 2,
                    maxchar_per_line: 100,
                    always_format: false,
                    name_case: NameCase::Snake,
                },
                output: OutputConfig {
                    directory: PathBuf::from("generated"),
                },
            }
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(parse("[proto]\nversion = 4").is_err());
        assert!(parse("[proto]\nindent = 4").is_err());
        assert!(parse("[unknown]").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protogen.toml");
        std::fs::write(&path, "[proto]\nversion = 2\n").unwrap();

        let env = MapEnvironment::from([("PROTOGEN_NAME_CASE", "pascal")]);
        let config = load_config_with_env(Some(&path), &env).unwrap();

        assert_eq!(config.settings.version, 2);
        assert_eq!(config.settings.name_case, NameCase::Pascal);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(load_config_with_env(Some(&path), &MapEnvironment::default()).is_err());
    }
}
