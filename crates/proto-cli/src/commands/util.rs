// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::Path;

use anyhow::{Result, anyhow};
use colored::Colorize;
use proto_builder::{CompileReport, DeclarationRegistry, ProtoBuildError};

pub(super) fn load_declarations(path: &Path) -> Result<DeclarationRegistry> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;

    let registry = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => DeclarationRegistry::from_json_str(&content)?,
        Some("toml") => DeclarationRegistry::from_toml_str(&content)?,
        _ => {
            return Err(anyhow!(
                "Unsupported declaration file '{}' (expected a .json or .toml file)",
                path.display()
            ));
        }
    };

    tracing::debug!(
        messages = registry.messages.len(),
        enums = registry.enums.len(),
        services = registry.services.len(),
        "Loaded declarations"
    );

    Ok(registry)
}

fn print_report(report: &CompileReport) {
    eprintln!(
        "{} {}",
        "error:".red().bold(),
        format!("{} ({} error(s))", report.name, report.len()).bold()
    );
    for error in &report.errors {
        eprintln!(
            "  {} {}: {}",
            format!("[{}]", error.code).yellow(),
            error.location.purple(),
            error.message
        );
    }
}

/// Print every failing report of a compilation error, turning the error into a short summary.
pub(super) fn report_failure(err: ProtoBuildError) -> anyhow::Error {
    let reports = err.reports();
    if reports.is_empty() {
        return err.into();
    }

    for report in reports {
        print_report(report);
    }

    anyhow!("{} declaration(s) failed to compile", reports.len())
}
