// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, NO_PACKAGE, TypeRef};
use crate::compiler::pass::recover;
use crate::compiler::{CompilerContext, CompilerPass, SetterError};

/// Collects the imports each module needs into the module's state.
pub struct ImportSetter;

/// The import path needed by a module of `package` named `module` to use `type_ref`, if any.
pub(crate) fn import_path(
    package: &str,
    module: &str,
    type_ref: &TypeRef,
) -> Result<Option<String>, SetterError> {
    let target = type_ref
        .module()
        .ok_or_else(|| SetterError::MissingFile(type_ref.name.clone()))?;

    Ok(if type_ref.package != package {
        if type_ref.package == NO_PACKAGE {
            Some(format!("{target}.proto"))
        } else {
            Some(format!("{}/{target}.proto", type_ref.package))
        }
    } else if target != module {
        Some(format!("{target}.proto"))
    } else {
        None
    })
}

impl CompilerPass for ImportSetter {
    fn name(&self) -> &'static str {
        "imports"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let block_name = block.name().to_string();
        let package = block.package().to_string();
        let module = block.module().to_string();

        let mut references: Vec<(String, &TypeRef)> = vec![];

        for (location, field) in block.located_fields() {
            if let Some(ftype) = &field.ftype {
                for type_ref in ftype.type_refs() {
                    references.push((location.clone(), type_ref));
                }
            }
        }

        if let Block::Service(service) = &*block {
            for method in &service.methods {
                let location = format!("{block_name}.{}", method.name());
                let request_refs = method.request_types.iter().flat_map(|r| r.ty.type_refs());
                let response_refs = method.response_type.iter().flat_map(|r| r.type_refs());

                for type_ref in request_refs.chain(response_refs) {
                    references.push((location.clone(), type_ref));
                }
            }
        }

        for (location, type_ref) in references {
            let result = import_path(&package, &module, type_ref);
            if let Some(Some(path)) = recover(ctx, &block_name, &location, result) {
                ctx.module_mut(&module).imports.insert(path);
            }
        }
    }
}
