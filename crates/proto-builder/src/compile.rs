// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::ast::Block;
use crate::builder::{PackageBlocks, build_blocks};
use crate::compiler::{CompileUnit, CompilerContext, run_pass_group};
use crate::declaration::DeclarationRegistry;
use crate::error::ProtoBuildError;
use crate::render::render_unit;
use crate::report::CompileReport;
use crate::setter::setters;
use crate::settings::Settings;
use crate::validator::{CustomCheck, KnownModules, validators};

/// Rendered files: package -> module -> file text.
pub type ProtoOutput = BTreeMap<String, BTreeMap<String, String>>;

/// Runs the validators, the setters and the renderer over a set of packages.
#[derive(Clone, Default)]
pub struct ProtoCompiler {
    settings: Settings,
    custom_checks: Vec<CustomCheck>,
}

impl ProtoCompiler {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            custom_checks: vec![],
        }
    }

    /// Register a host-specific check, run on every block after the built-in validators.
    pub fn with_custom_check(
        mut self,
        check: impl Fn(&Block, &mut CompileReport) + Send + Sync + 'static,
    ) -> Self {
        self.custom_checks.push(Arc::new(check));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn make_protos(&self, registry: &DeclarationRegistry) -> Result<ProtoOutput, ProtoBuildError> {
        self.compile(build_blocks(registry)?)
    }

    /// Validate the declarations without running the setters or rendering anything.
    pub fn check(&self, registry: &DeclarationRegistry) -> Result<(), ProtoBuildError> {
        let mut units = self.units(build_blocks(registry)?);
        self.validate(&mut units)
    }

    pub fn compile(&self, packages: Vec<PackageBlocks>) -> Result<ProtoOutput, ProtoBuildError> {
        let mut units = self.units(packages);
        self.process(&mut units)?;
        self.render(&units)
    }

    /// One unit per package, with a state placeholder for every module its blocks live in.
    pub fn units(&self, packages: Vec<PackageBlocks>) -> Vec<CompileUnit> {
        packages
            .into_iter()
            .map(|PackageBlocks { package, blocks }| {
                let mut context = CompilerContext::new(package, self.settings.clone());
                for block in &blocks {
                    context.seed_module(block.module());
                }
                CompileUnit { blocks, context }
            })
            .collect()
    }

    /// Validate, then (only if every report is empty) run the setters.
    pub fn process(&self, units: &mut [CompileUnit]) -> Result<(), ProtoBuildError> {
        self.validate(units)?;

        tracing::debug!(packages = units.len(), "Running setters");
        run_pass_group(&mut setters(), units)
    }

    fn validate(&self, units: &mut [CompileUnit]) -> Result<(), ProtoBuildError> {
        let known_modules = known_modules(units);

        tracing::debug!(
            packages = units.len(),
            modules = known_modules.len(),
            "Validating packages"
        );
        run_pass_group(&mut validators(known_modules, &self.custom_checks), units)
    }

    pub fn render(&self, units: &[CompileUnit]) -> Result<ProtoOutput, ProtoBuildError> {
        let mut output = ProtoOutput::new();

        for unit in units {
            for (module, text) in render_unit(unit)? {
                tracing::debug!(package = %unit.context.package, module = %module, "Rendered module");
                output
                    .entry(unit.context.package.clone())
                    .or_default()
                    .insert(module, text);
            }
        }

        tracing::info!(
            files = output.values().map(BTreeMap::len).sum::<usize>(),
            "Rendered proto files"
        );
        Ok(output)
    }
}

/// Every `(package, module)` pair that a reference may be imported from.
fn known_modules(units: &[CompileUnit]) -> KnownModules {
    let modules: BTreeSet<(String, String)> = units
        .iter()
        .flat_map(|unit| {
            unit.blocks
                .iter()
                .map(|block| (block.package().to_string(), block.module().to_string()))
        })
        .collect();

    Arc::new(modules)
}

pub fn make_protos(
    registry: &DeclarationRegistry,
    settings: Settings,
) -> Result<ProtoOutput, ProtoBuildError> {
    ProtoCompiler::new(settings).make_protos(registry)
}
