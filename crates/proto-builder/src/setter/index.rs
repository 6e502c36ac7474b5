// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, EnumBlock, Field, FieldNumber, MessageChild, OneOfBlock};
use crate::compiler::numbering::{NumberAllocator, ReservedNumbers};
use crate::compiler::pass::recover;
use crate::compiler::{CompilerContext, CompilerPass, SetterError};

/// Numbers every unnumbered field, then orders children for rendering.
///
/// Numbers are handed out in declaration order (descending into oneof groups), skipping reserved
/// numbers, explicitly used numbers and the protocol band. Children are then ordered by
/// `(number != 0, number)`, so an enum's zero value comes first.
pub struct IndexSetter;

impl CompilerPass for IndexSetter {
    fn name(&self) -> &'static str {
        "index"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        if matches!(block, Block::Service(_)) {
            return;
        }

        let block_name = block.name().to_string();
        let legal = block.number_range();

        let mut reserved = ReservedNumbers::from_reserveds(&block.base().reserveds);
        for field in block.fields() {
            if let Some(number) = field.number() {
                reserved.insert(number);
            }
        }

        let mut allocator = NumberAllocator::new(block.counter_start(), reserved);
        let mut exhausted = vec![];
        for field in block.fields_mut() {
            if field.node.number.is_some() {
                continue;
            }

            let number = allocator.next_number();
            if legal.contains(&number) {
                field.node.number = Some(number);
            } else {
                exhausted.push(field.name().to_string());
            }
        }

        for field in exhausted {
            let error = SetterError::NumberExhausted {
                field: field.clone(),
                max: *legal.end(),
            };
            recover::<()>(ctx, &block_name, &format!("{block_name}.{field}"), Err(error));
        }

        match block {
            Block::Message(message) => {
                for child in message.children.iter_mut() {
                    if let MessageChild::OneOf(oneof) = child {
                        sort_fields(&mut oneof.fields);
                    }
                }
                message.children.sort_by_key(|child| sort_key(child.index()));
            }
            Block::Enum(EnumBlock { fields, .. }) | Block::OneOf(OneOfBlock { fields, .. }) => {
                sort_fields(fields)
            }
            Block::Service(_) => {}
        }
    }
}

fn sort_key(number: Option<FieldNumber>) -> (u8, FieldNumber) {
    match number {
        Some(0) => (0, 0),
        Some(number) => (1, number),
        None => (1, FieldNumber::MAX),
    }
}

fn sort_fields(fields: &mut [Field]) {
    fields.sort_by_key(|field| sort_key(field.number()));
}
