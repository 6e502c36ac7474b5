// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, TypeRef};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::{CompileReport, ErrorCode};

use super::KnownModules;

/// Every referenced message or enum must live in a module known to the compile run.
pub struct ImportValidator {
    known_modules: KnownModules,
}

impl ImportValidator {
    pub fn new(known_modules: KnownModules) -> Self {
        Self { known_modules }
    }

    fn check(&self, type_ref: &TypeRef, location: &str, report: &mut CompileReport) {
        // A missing file is a type error, reported by the type validator
        let Some(module) = type_ref.module() else {
            return;
        };

        let key = (type_ref.package.clone(), module.to_string());
        if !self.known_modules.contains(&key) {
            report.report(
                ErrorCode::ImportNotFound,
                location,
                format!(
                    "'{}' refers to module '{module}' of package '{}', which is not part of this build",
                    type_ref.name, type_ref.package
                ),
            );
        }
    }
}

impl CompilerPass for ImportValidator {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let block_name = block.name().to_string();
        let report = ctx.report(&block_name);

        for (location, field) in block.located_fields() {
            if let Some(ftype) = &field.ftype {
                for type_ref in ftype.type_refs() {
                    self.check(type_ref, &location, report);
                }
            }
        }

        if let Block::Service(service) = block {
            for method in &service.methods {
                let location = format!("{block_name}.{}", method.name());
                let request_refs = method.request_types.iter().flat_map(|r| r.ty.type_refs());
                let response_refs = method.response_type.iter().flat_map(|r| r.type_refs());

                for type_ref in request_refs.chain(response_refs) {
                    self.check(type_ref, &location, report);
                }
            }
        }
    }
}
