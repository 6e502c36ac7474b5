// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

mod model;
mod writer;

pub use model::{
    Definition, EnumDef, FieldDef, Header, MessageDef, MessageMember, MethodDef, OneOfDef,
    ProtoFile, ServiceDef,
};
pub use writer::ProtoWriter;

use crate::ast::Block;
use crate::compiler::CompileUnit;
use crate::error::ProtoBuildError;

/// Render every non-empty module of a compiled unit, in module registration order.
pub fn render_unit(unit: &CompileUnit) -> Result<Vec<(String, String)>, ProtoBuildError> {
    let ctx = &unit.context;
    let mut files = vec![];

    for (module, state) in ctx.modules() {
        let blocks: Vec<&Block> = unit
            .blocks
            .iter()
            .filter(|block| block.module() == module.as_str())
            .collect();

        if blocks.is_empty() {
            tracing::debug!(package = %ctx.package, module = %module, "Skipping empty module");
            continue;
        }

        let file = ProtoFile::build(
            ctx.settings.version,
            &ctx.package,
            module,
            &blocks,
            Some(state),
        )?;
        files.push((module.clone(), ProtoWriter::render(&file)));
    }

    Ok(files)
}
