// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compilation settings.
//!
//! Settings come from the `[proto]` table of a TOML file and may be overridden through the
//! environment (`PROTOGEN_VERSION`, `PROTOGEN_MAXCHAR_PER_LINE`, `PROTOGEN_ALWAYS_FORMAT`,
//! `PROTOGEN_NAME_CASE`).

use std::collections::HashMap;
use std::str::FromStr;

use heck::{ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::Deserialize;
use thiserror::Error;

const MIN_CHARS_PER_LINE: usize = 20;

pub const VERSION_ENV: &str = "PROTOGEN_VERSION";
pub const MAXCHAR_PER_LINE_ENV: &str = "PROTOGEN_MAXCHAR_PER_LINE";
pub const ALWAYS_FORMAT_ENV: &str = "PROTOGEN_ALWAYS_FORMAT";
pub const NAME_CASE_ENV: &str = "PROTOGEN_NAME_CASE";

/// Naming strategy applied to every block, field and method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameCase {
    #[default]
    None,
    Snake,
    Camel,
    Pascal,
}

impl NameCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameCase::None => name.to_string(),
            NameCase::Snake => name.to_snake_case(),
            NameCase::Camel => name.to_lower_camel_case(),
            NameCase::Pascal => name.to_upper_camel_case(),
        }
    }
}

impl FromStr for NameCase {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(NameCase::None),
            "snake" => Ok(NameCase::Snake),
            "camel" => Ok(NameCase::Camel),
            "pascal" => Ok(NameCase::Pascal),
            _ => Err(SettingsError::InvalidNameCase(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Proto syntax version (`proto2` or `proto3`)
    pub version: u32,
    /// Width at which descriptions are wrapped
    pub maxchar_per_line: usize,
    /// Re-wrap descriptions that are already written as comments
    pub always_format: bool,
    pub name_case: NameCase,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 3,
            maxchar_per_line: 80,
            always_format: true,
            name_case: NameCase::None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Unsupported proto syntax version {0} (expected 2 or 3)")]
    InvalidVersion(u32),

    #[error("maxchar_per_line must be at least {MIN_CHARS_PER_LINE} (got {0})")]
    InvalidLineWidth(usize),

    #[error("Invalid name case '{0}' (expected none, snake, camel or pascal)")]
    InvalidNameCase(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnvValue { key: String, value: String },

    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SettingsFileSer {
    proto: Option<SettingsSer>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SettingsSer {
    pub version: Option<u32>,
    pub maxchar_per_line: Option<usize>,
    pub always_format: Option<bool>,
    pub name_case: Option<String>,
}

impl TryFrom<SettingsSer> for Settings {
    type Error = SettingsError;

    fn try_from(ser: SettingsSer) -> Result<Self, Self::Error> {
        let defaults = Settings::default();

        let settings = Settings {
            version: ser.version.unwrap_or(defaults.version),
            maxchar_per_line: ser.maxchar_per_line.unwrap_or(defaults.maxchar_per_line),
            always_format: ser.always_format.unwrap_or(defaults.always_format),
            name_case: ser
                .name_case
                .map(|name_case| name_case.parse())
                .transpose()?
                .unwrap_or(defaults.name_case),
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Settings {
    /// Parse settings from the `[proto]` table of a TOML document. An empty document yields
    /// the defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Settings, SettingsError> {
        let file: SettingsFileSer =
            toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;

        file.proto.unwrap_or_default().try_into()
    }

    pub fn with_env_overrides(mut self, env: &dyn Environment) -> Result<Settings, SettingsError> {
        if let Some(version) = env.get(VERSION_ENV) {
            self.version = parse_env(VERSION_ENV, &version)?;
        }
        if let Some(width) = env.get(MAXCHAR_PER_LINE_ENV) {
            self.maxchar_per_line = parse_env(MAXCHAR_PER_LINE_ENV, &width)?;
        }
        self.always_format = env.enabled(ALWAYS_FORMAT_ENV, self.always_format)?;
        if let Some(name_case) = env.get(NAME_CASE_ENV) {
            self.name_case = name_case.parse()?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !matches!(self.version, 2 | 3) {
            return Err(SettingsError::InvalidVersion(self.version));
        }
        if self.maxchar_per_line < MIN_CHARS_PER_LINE {
            return Err(SettingsError::InvalidLineWidth(self.maxchar_per_line));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidEnvValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Source of environment values for settings overrides.
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, SettingsError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                _ => Err(SettingsError::InvalidEnvValue {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapEnvironment(HashMap<String, String>);

impl Environment for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for MapEnvironment {
    fn from(values: [(&str, &str); N]) -> Self {
        Self(
            values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn empty_document_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[multiplatform_test]
    fn parse_proto_table() {
        let settings = Settings::from_toml_str(
            r#"
            [proto]
            maxchar_per_line = 100
            always_format = false
            name_case = "snake"
            "#,
        )
        .unwrap();

        assert_eq!(
            settings,
            Settings {
                version: 3,
                maxchar_per_line: 100,
                always_format: false,
                name_case: NameCase::Snake,
            }
        );
    }

    #[multiplatform_test]
    fn reject_invalid_settings() {
        assert_eq!(
            Settings::from_toml_str("[proto]\nversion = 4"),
            Err(SettingsError::InvalidVersion(4))
        );
        assert_eq!(
            Settings::from_toml_str("[proto]\nmaxchar_per_line = 5"),
            Err(SettingsError::InvalidLineWidth(5))
        );
        assert!(matches!(
            Settings::from_toml_str("[proto]\nname_case = \"kebab\""),
            Err(SettingsError::InvalidNameCase(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("[proto]\nunknown = 1"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[multiplatform_test]
    fn env_overrides() {
        let env = MapEnvironment::from([
            (NAME_CASE_ENV, "pascal"),
            (ALWAYS_FORMAT_ENV, "no"),
            (MAXCHAR_PER_LINE_ENV, "60"),
        ]);

        let settings = Settings::default().with_env_overrides(&env).unwrap();
        assert_eq!(settings.name_case, NameCase::Pascal);
        assert!(!settings.always_format);
        assert_eq!(settings.maxchar_per_line, 60);

        let env = MapEnvironment::from([(MAXCHAR_PER_LINE_ENV, "wide")]);
        assert!(matches!(
            Settings::default().with_env_overrides(&env),
            Err(SettingsError::InvalidEnvValue { .. })
        ));
    }

    #[multiplatform_test]
    fn name_cases() {
        assert_eq!(NameCase::None.apply("userId"), "userId");
        assert_eq!(NameCase::Snake.apply("userId"), "user_id");
        assert_eq!(NameCase::Camel.apply("user_id"), "userId");
        assert_eq!(NameCase::Pascal.apply("user_id"), "UserId");
    }
}
