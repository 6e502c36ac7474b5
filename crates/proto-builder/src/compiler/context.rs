// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::report::CompileReport;
use crate::settings::Settings;

/// Scratch state of one module (one output file) of the package being compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleState {
    /// Import paths required by the module, kept sorted
    pub imports: BTreeSet<String>,
}

/// Per-package state of a compilation run.
#[derive(Debug, Clone)]
pub struct CompilerContext {
    pub settings: Settings,
    pub package: String,
    reports: IndexMap<String, CompileReport>,
    modules: IndexMap<String, ModuleState>,
}

impl CompilerContext {
    pub fn new(package: impl Into<String>, settings: Settings) -> Self {
        Self {
            settings,
            package: package.into(),
            reports: IndexMap::new(),
            modules: IndexMap::new(),
        }
    }

    /// The report of a top-level block, created on first access.
    pub fn report(&mut self, block_name: &str) -> &mut CompileReport {
        self.reports
            .entry(block_name.to_string())
            .or_insert_with(|| CompileReport::new(block_name))
    }

    pub fn reports(&self) -> impl Iterator<Item = &CompileReport> {
        self.reports.values()
    }

    pub fn failing_reports(&self) -> Vec<CompileReport> {
        self.reports
            .values()
            .filter(|report| !report.is_empty())
            .cloned()
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.reports.values().any(|report| !report.is_empty())
    }

    /// Register a module of this package, keeping any state it already has.
    pub fn seed_module(&mut self, module: &str) {
        self.modules.entry(module.to_string()).or_default();
    }

    pub fn module_mut(&mut self, module: &str) -> &mut ModuleState {
        self.modules.entry(module.to_string()).or_default()
    }

    pub fn module(&self, module: &str) -> Option<&ModuleState> {
        self.modules.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &ModuleState)> {
        self.modules.iter()
    }
}
