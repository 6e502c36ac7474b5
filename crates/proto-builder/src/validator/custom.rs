// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use crate::ast::Block;
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::CompileReport;

/// A host-supplied check, run on every top-level block after the built-in validators.
pub type CustomCheck = Arc<dyn Fn(&Block, &mut CompileReport) + Send + Sync>;

pub struct CustomValidator {
    checks: Vec<CustomCheck>,
}

impl CustomValidator {
    pub fn new(checks: Vec<CustomCheck>) -> Self {
        Self { checks }
    }
}

impl CompilerPass for CustomValidator {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let report = ctx.report(block.name());
        for check in &self.checks {
            check(block, report);
        }
    }
}
