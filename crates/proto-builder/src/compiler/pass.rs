// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The pass engine.
//!
//! A pass is one traversal over every top-level block of a package. Validators only read the
//! tree and append to reports; setters mutate it. Passes are run as a group over every package,
//! and the group fails only once all of them ran, so that every problem is reported at once.

use thiserror::Error;

use crate::ast::{Block, FieldNumber};
use crate::error::ProtoBuildError;
use crate::report::ErrorCode;

use super::context::CompilerContext;

pub trait CompilerPass {
    fn name(&self) -> &'static str;

    /// Called once per batch, before any block is visited.
    fn set_default(&mut self, _ctx: &CompilerContext) {}

    /// Called before each top-level block to clear per-block state.
    fn reset(&mut self) {}

    /// Called once after the whole batch.
    fn finish(&mut self, _ctx: &mut CompilerContext) {}

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext);

    fn execute(&mut self, blocks: &mut [Block], ctx: &mut CompilerContext) {
        self.set_default(ctx);

        for block in blocks.iter_mut() {
            self.reset();
            self.visit_block(block, ctx);
        }

        self.finish(ctx);
    }
}

/// The blocks of one package together with their compilation state.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    pub blocks: Vec<Block>,
    pub context: CompilerContext,
}

/// Run every pass over every unit, then fail with every non-empty report (if any).
pub fn run_pass_group(
    passes: &mut [Box<dyn CompilerPass>],
    units: &mut [CompileUnit],
) -> Result<(), ProtoBuildError> {
    for unit in units.iter_mut() {
        for pass in passes.iter_mut() {
            tracing::debug!(
                pass = pass.name(),
                package = %unit.context.package,
                "Running compiler pass"
            );
            pass.execute(&mut unit.blocks, &mut unit.context);
        }
    }

    let failing: Vec<_> = units
        .iter()
        .flat_map(|unit| unit.context.failing_reports())
        .collect();

    if failing.is_empty() {
        Ok(())
    } else {
        tracing::info!(reports = failing.len(), "Compilation failed");
        Err(ProtoBuildError::Compilation(failing))
    }
}

/// A failure of a setter on one field or method.
#[derive(Error, Debug, PartialEq)]
pub enum SetterError {
    #[error("Type '{0}' could not be resolved")]
    UnresolvedType(String),

    #[error("Type '{0}' does not report its declaring file")]
    MissingFile(String),

    #[error("'{name}' and '{other}' both normalize to '{normalized}'")]
    NameCollision {
        name: String,
        other: String,
        normalized: String,
    },

    #[error("'{name}' normalizes to the reserved name '{normalized}'")]
    ReservedCollision { name: String, normalized: String },

    #[error("No field number is left for '{field}' (numbers must be within {max})")]
    NumberExhausted { field: String, max: FieldNumber },

    #[error("{0}")]
    Generic(String),
}

/// Convert a setter failure into a diagnostic on the owning block, so that one bad node does
/// not abort the batch.
pub(crate) fn recover<T>(
    ctx: &mut CompilerContext,
    block_name: &str,
    location: &str,
    result: Result<T, SetterError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(location, "Setter failed: {err}");
            ctx.report(block_name)
                .report(ErrorCode::SetterPassError, location, err.to_string());
            None
        }
    }
}
