// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgMatches, Command};
use colored::Colorize;
use proto_builder::ProtoCompiler;

use crate::config::load_config;

use super::command::{CommandDefinition, config_arg, declarations_arg, get, get_required};
use super::util::{load_declarations, report_failure};

pub struct CheckCommandDefinition {}

impl CommandDefinition for CheckCommandDefinition {
    fn command(&self) -> Command {
        Command::new("check")
            .about("Validate a declaration file without generating anything")
            .arg(declarations_arg())
            .arg(config_arg())
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let declarations: PathBuf = get_required(matches, "declarations")?;
        let config_path: Option<PathBuf> = get(matches, "config");
        let config = load_config(config_path.as_deref())?;

        let registry = load_declarations(&declarations)?;
        ProtoCompiler::new(config.settings)
            .check(&registry)
            .map_err(report_failure)?;

        println!("{}", "Declarations are valid".green());
        Ok(())
    }
}
