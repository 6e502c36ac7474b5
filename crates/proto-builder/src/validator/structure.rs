// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, MessageChild, Node, OneOfBlock};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::{CompileReport, ErrorCode};

/// Structural completeness: enums and oneof groups must have members, and every child must name
/// its direct parent as its block.
pub struct StructureValidator;

impl CompilerPass for StructureValidator {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let name = block.name().to_string();
        let report = ctx.report(&name);

        match block {
            Block::Message(message) => {
                for child in &message.children {
                    match child {
                        MessageChild::Field(field) => check_link(&field.node, &name, &name, report),
                        MessageChild::OneOf(oneof) => check_oneof(oneof, &name, report),
                    }
                }
            }
            Block::Enum(e) => {
                if e.fields.is_empty() {
                    report.report(ErrorCode::EmptyEnum, &name, "Enum has no values");
                }
                for field in &e.fields {
                    check_link(&field.node, &name, &name, report);
                }
            }
            Block::OneOf(oneof) => check_oneof(oneof, &name, report),
            Block::Service(service) => {
                for method in &service.methods {
                    check_link(&method.node, &name, &name, report);
                }
            }
        }
    }
}

fn check_oneof(oneof: &OneOfBlock, parent: &str, report: &mut CompileReport) {
    let group = &oneof.base.node.name;
    let location = if group == parent {
        group.clone()
    } else {
        format!("{parent}.{group}")
    };

    if oneof.fields.is_empty() {
        report.report(ErrorCode::EmptyOneOf, &location, "Oneof group has no fields");
    }
    if group != parent {
        check_link(&oneof.base.node, parent, parent, report);
    }
    for field in &oneof.fields {
        check_link(&field.node, group, &location, report);
    }
}

fn check_link(node: &Node, parent: &str, location_prefix: &str, report: &mut CompileReport) {
    if node.block.as_deref() != Some(parent) {
        report.report(
            ErrorCode::FieldNotLinked,
            format!("{location_prefix}.{}", node.name),
            format!(
                "'{}' is declared in '{parent}' but linked to '{}'",
                node.name,
                node.block.as_deref().unwrap_or("nothing")
            ),
        );
    }
}
