// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use crate::ast::{Block, MessageChild};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::{CompileReport, ErrorCode};

use super::{is_identifier, is_reserved_word};

/// Report an illegal name. Returns `false` if the name was reported.
fn check_name(name: &str, location: &str, report: &mut CompileReport) -> bool {
    if !is_identifier(name) {
        report.report(
            ErrorCode::InvalidName,
            location,
            format!("'{name}' is not a valid identifier"),
        );
        false
    } else if is_reserved_word(name) {
        report.report(
            ErrorCode::ReservedName,
            location,
            format!("'{name}' is a reserved word"),
        );
        false
    } else {
        true
    }
}

/// Names of top-level blocks, unique across the whole batch. Nested oneof groups are checked for
/// legality but do not occupy the batch namespace.
#[derive(Default)]
pub struct BlockNameValidator {
    seen: HashSet<String>,
}

impl CompilerPass for BlockNameValidator {
    fn name(&self) -> &'static str {
        "block-names"
    }

    fn set_default(&mut self, _ctx: &CompilerContext) {
        self.seen.clear();
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let name = block.name().to_string();
        let report = ctx.report(&name);

        if check_name(&name, &name, report) && !self.seen.insert(name.clone()) {
            report.report(
                ErrorCode::DuplicateName,
                &name,
                format!("'{name}' is declared more than once in package '{}'", block.package()),
            );
        }

        if let Block::Message(message) = block {
            for oneof in message.oneofs() {
                let group = &oneof.base.node.name;
                check_name(group, &format!("{name}.{group}"), report);
            }
        }
    }
}

/// Names of fields (including oneof groups and their members) and methods, unique within their
/// block. Reserved names of the block count as taken.
#[derive(Default)]
pub struct FieldNameValidator {
    seen: HashSet<String>,
    reserved: HashSet<String>,
}

impl FieldNameValidator {
    fn check(&mut self, name: &str, location: String, report: &mut CompileReport) {
        if !check_name(name, &location, report) {
            return;
        }

        if self.reserved.contains(name) {
            report.report(
                ErrorCode::ReservedName,
                location,
                format!("'{name}' is a reserved name of this block"),
            );
        } else if !self.seen.insert(name.to_string()) {
            report.report(
                ErrorCode::DuplicateName,
                location,
                format!("'{name}' is already used in this block"),
            );
        }
    }

    /// Uniqueness only: a oneof group's legality belongs to the block-name check.
    fn claim(&mut self, name: &str, location: String, report: &mut CompileReport) {
        if !self.seen.insert(name.to_string()) {
            report.report(
                ErrorCode::DuplicateName,
                location,
                format!("'{name}' is already used in this block"),
            );
        }
    }
}

impl CompilerPass for FieldNameValidator {
    fn name(&self) -> &'static str {
        "field-names"
    }

    fn reset(&mut self) {
        self.seen.clear();
        self.reserved.clear();
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let name = block.name().to_string();
        let report = ctx.report(&name);

        self.reserved = block
            .base()
            .reserved_names()
            .map(str::to_string)
            .collect();

        match &*block {
            Block::Message(message) => {
                for child in &message.children {
                    match child {
                        MessageChild::Field(field) => {
                            self.check(field.name(), format!("{name}.{}", field.name()), report)
                        }
                        MessageChild::OneOf(oneof) => {
                            let group = &oneof.base.node.name;
                            self.claim(group, format!("{name}.{group}"), report);
                            for field in &oneof.fields {
                                self.check(
                                    field.name(),
                                    format!("{name}.{group}.{}", field.name()),
                                    report,
                                );
                            }
                        }
                    }
                }
            }
            Block::Enum(_) | Block::OneOf(_) => {
                for (location, field) in block.located_fields() {
                    self.check(field.name(), location, report);
                }
            }
            Block::Service(service) => {
                for method in &service.methods {
                    self.check(method.name(), format!("{name}.{}", method.name()), report);
                }
            }
        }
    }
}
