// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use crate::ast::block::PROTOCOL_RESERVED_RANGE;
use crate::ast::{Block, BlockKind, FieldNumber};
use crate::compiler::numbering::ReservedNumbers;
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::ErrorCode;

/// Explicit field numbers: legal for the block kind, outside reserved numbers and the protocol
/// band, and unique. Enums must end up with a value numbered 0.
#[derive(Default)]
pub struct IndexValidator {
    reserved: ReservedNumbers,
    used: HashSet<FieldNumber>,
}

impl CompilerPass for IndexValidator {
    fn name(&self) -> &'static str {
        "index"
    }

    fn reset(&mut self) {
        self.reserved = ReservedNumbers::default();
        self.used.clear();
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        if matches!(block, Block::Service(_)) {
            return;
        }

        let name = block.name().to_string();
        let report = ctx.report(&name);
        let range = block.number_range();
        self.reserved = ReservedNumbers::from_reserveds(&block.base().reserveds);

        let fields = block.located_fields();

        for (location, field) in &fields {
            let Some(number) = field.number() else {
                continue;
            };

            if self.reserved.contains(number) {
                report.report(
                    ErrorCode::ReservedIndex,
                    location,
                    format!("{number} is reserved in '{name}'"),
                );
            } else if self.used.contains(&number) {
                report.report(
                    ErrorCode::DuplicateIndex,
                    location,
                    format!("{number} is already used in '{name}'"),
                );
            } else if !range.contains(&number) {
                report.report(
                    ErrorCode::IndexOutOfRange,
                    location,
                    format!(
                        "{number} is outside of {}..={}",
                        range.start(),
                        range.end()
                    ),
                );
            } else if PROTOCOL_RESERVED_RANGE.contains(&number) {
                report.report(
                    ErrorCode::ProtocolReservedIndex,
                    location,
                    format!(
                        "{number} lies in the range {}..={} reserved by the protocol",
                        PROTOCOL_RESERVED_RANGE.start(),
                        PROTOCOL_RESERVED_RANGE.end()
                    ),
                );
            } else {
                self.used.insert(number);
            }
        }

        if block.kind() == BlockKind::Enum && !fields.is_empty() {
            let explicit_zero = fields.iter().any(|(_, field)| field.number() == Some(0));
            let implicit_zero =
                fields.iter().any(|(_, field)| field.number().is_none()) && !self.reserved.contains(0);

            if !explicit_zero && !implicit_zero {
                report.report(
                    ErrorCode::EnumMissingZero,
                    &name,
                    "No value of the enum is numbered 0",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BlockBase, EnumBlock, Field, MessageBlock, MessageChild, PrimitiveType, Reserved,
        ResolvedType,
    };
    use crate::validator::test_util::run;
    use multiplatform_test::multiplatform_test;

    fn enum_block(values: Vec<Field>, reserveds: Vec<Reserved>) -> Vec<Block> {
        let mut base = BlockBase::new("Role", "pkg", "role");
        base.reserveds = reserveds;
        vec![Block::Enum(EnumBlock {
            base,
            fields: values,
        })]
    }

    fn message(numbers: &[FieldNumber], reserveds: Vec<Reserved>) -> Vec<Block> {
        let mut base = BlockBase::new("User", "pkg", "user");
        base.reserveds = reserveds;
        let children = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| {
                MessageChild::Field(
                    Field::new(
                        format!("f{i}"),
                        ResolvedType::Primitive(PrimitiveType::Int32),
                    )
                    .with_number(*n),
                )
            })
            .collect();
        vec![Block::Message(MessageBlock { base, children })]
    }

    #[multiplatform_test]
    fn two_enum_zeros() {
        let mut blocks = enum_block(
            vec![
                Field::enum_value("UNKNOWN").with_number(0),
                Field::enum_value("DEFAULT").with_number(0),
            ],
            vec![],
        );

        assert_eq!(
            run(&mut IndexValidator::default(), &mut blocks, "Role"),
            vec![ErrorCode::DuplicateIndex]
        );
    }

    #[multiplatform_test]
    fn enum_zero_rule() {
        let mut implicit = enum_block(vec![Field::enum_value("A")], vec![]);
        assert!(run(&mut IndexValidator::default(), &mut implicit, "Role").is_empty());

        let mut missing = enum_block(vec![Field::enum_value("A").with_number(1)], vec![]);
        assert_eq!(
            run(&mut IndexValidator::default(), &mut missing, "Role"),
            vec![ErrorCode::EnumMissingZero]
        );

        let mut reserved_zero = enum_block(vec![Field::enum_value("A")], vec![Reserved::Number(0)]);
        assert_eq!(
            run(&mut IndexValidator::default(), &mut reserved_zero, "Role"),
            vec![ErrorCode::EnumMissingZero]
        );

        let mut negative = enum_block(
            vec![
                Field::enum_value("ZERO").with_number(0),
                Field::enum_value("NEG").with_number(-1),
            ],
            vec![],
        );
        assert!(run(&mut IndexValidator::default(), &mut negative, "Role").is_empty());
    }

    #[multiplatform_test]
    fn message_numbers() {
        let mut blocks = message(
            &[1, 1, 0, 536_870_912, 19_500, 4, 7],
            vec![Reserved::Range { start: 4, end: 5 }],
        );

        assert_eq!(
            run(&mut IndexValidator::default(), &mut blocks, "User"),
            vec![
                ErrorCode::DuplicateIndex,
                ErrorCode::IndexOutOfRange,
                ErrorCode::IndexOutOfRange,
                ErrorCode::ProtocolReservedIndex,
                ErrorCode::ReservedIndex,
            ]
        );
    }
}
