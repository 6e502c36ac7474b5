// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, FieldKind, OneOfBlock};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::{CompileReport, ErrorCode};

/// Members of a oneof group must be singular and carry the key of their group.
pub struct OneOfValidator;

impl CompilerPass for OneOfValidator {
    fn name(&self) -> &'static str {
        "oneof"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let name = block.name().to_string();
        let report = ctx.report(&name);

        match &*block {
            Block::Message(message) => {
                for oneof in message.oneofs() {
                    check_group(oneof, &format!("{name}.{}", oneof.base.node.name), report);
                }
            }
            Block::OneOf(oneof) => check_group(oneof, &name, report),
            Block::Enum(_) | Block::Service(_) => {}
        }
    }
}

fn check_group(oneof: &OneOfBlock, location: &str, report: &mut CompileReport) {
    let group = &oneof.base.node.name;

    for field in &oneof.fields {
        let field_location = format!("{location}.{}", field.name());

        if field.ftype.as_ref().is_some_and(|t| t.is_container()) {
            report.report(
                ErrorCode::OneOfRepeatedField,
                &field_location,
                "Oneof members cannot be lists or maps",
            );
        }

        match &field.kind {
            FieldKind::OneOf { key } if key == group => {}
            FieldKind::OneOf { key } => report.report(
                ErrorCode::OneOfKeyMismatch,
                &field_location,
                format!("Member of '{group}' carries the key '{key}'"),
            ),
            _ => report.report(
                ErrorCode::OneOfKeyMismatch,
                &field_location,
                format!("Member of '{group}' is not marked as a oneof field"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BlockBase, Field, MessageBlock, MessageChild, PrimitiveType, ResolvedType,
    };
    use crate::validator::test_util::run;
    use multiplatform_test::multiplatform_test;

    fn member(name: &str, key: &str, ftype: ResolvedType) -> Field {
        let mut field = Field::new(name, ftype);
        field.kind = FieldKind::OneOf {
            key: key.to_string(),
        };
        field
    }

    #[multiplatform_test]
    fn member_shapes() {
        let string = ResolvedType::Primitive(PrimitiveType::String);
        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("User", "pkg", "user"),
            children: vec![MessageChild::OneOf(OneOfBlock {
                base: BlockBase::new("contact", "pkg", "user"),
                fields: vec![
                    member("email", "contact", string.clone()),
                    member("phones", "contact", ResolvedType::list(string.clone())),
                    member("pager", "other", string.clone()),
                    Field::new("fax", string),
                ],
            })],
        })];

        assert_eq!(
            run(&mut OneOfValidator, &mut blocks, "User"),
            vec![
                ErrorCode::OneOfRepeatedField,
                ErrorCode::OneOfKeyMismatch,
                ErrorCode::OneOfKeyMismatch,
            ]
        );
    }
}
