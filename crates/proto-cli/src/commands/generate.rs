// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{ArgMatches, Command};
use colored::Colorize;
use proto_builder::{ProtoCompiler, ProtoOutput};

use crate::config::load_config;

use super::command::{CommandDefinition, config_arg, declarations_arg, get, get_required, output_arg};
use super::util::{load_declarations, report_failure};

pub struct GenerateCommandDefinition {}

impl CommandDefinition for GenerateCommandDefinition {
    fn command(&self) -> Command {
        Command::new("generate")
            .about("Generate .proto files from a declaration file")
            .arg(declarations_arg())
            .arg(output_arg())
            .arg(config_arg())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let declarations: PathBuf = get_required(matches, "declarations")?;
        let config_path: Option<PathBuf> = get(matches, "config");
        let config = load_config(config_path.as_deref())?;

        let output_dir = get::<PathBuf>(matches, "output").unwrap_or(config.output.directory);

        let registry = load_declarations(&declarations)?;
        let output = ProtoCompiler::new(config.settings)
            .make_protos(&registry)
            .map_err(report_failure)?;

        let written = write_output(&output, &output_dir)?;

        println!(
            "{}",
            format!("Generated {} file(s) in {}", written.len(), output_dir.display()).green()
        );

        Ok(())
    }
}

/// Write `{package}/{module}.proto` files (files without a package go to `output_dir` itself).
pub(crate) fn write_output(output: &ProtoOutput, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = vec![];

    for (package, modules) in output {
        let dir = if package.is_empty() {
            output_dir.to_path_buf()
        } else {
            output_dir.join(package)
        };
        create_dir_all(&dir)
            .map_err(|e| anyhow!("Could not create directory '{}': {}", dir.display(), e))?;

        for (module, text) in modules {
            let path = dir.join(format!("{module}.proto"));
            std::fs::write(&path, text)
                .map_err(|e| anyhow!("Could not write '{}': {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "Wrote proto file");
            written.push(path);
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_write_output() {
        let dir = tempfile::tempdir().unwrap();

        let mut output = ProtoOutput::new();
        output.insert(
            "account".to_string(),
            BTreeMap::from([("user".to_string(), "syntax = \"proto3\";\n".to_string())]),
        );
        output.insert(
            String::new(),
            BTreeMap::from([("common".to_string(), "syntax = \"proto3\";\n".to_string())]),
        );

        let written = write_output(&output, dir.path()).unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("common.proto"),
                dir.path().join("account").join("user.proto"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("account/user.proto")).unwrap(),
            "syntax = \"proto3\";\n"
        );
    }
}
