// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, FieldNumber, Reserved};
use crate::compiler::{CompilerContext, CompilerPass};

/// Renders a block's reservations as compact `reserved` statement bodies: one for numbers
/// (adjacent and overlapping ranges merged), one for names.
pub struct ReservedSetter;

impl CompilerPass for ReservedSetter {
    fn name(&self) -> &'static str {
        "reserved"
    }

    fn visit_block(&mut self, block: &mut Block, _ctx: &mut CompilerContext) {
        let text = reserved_text(&block.base().reserveds);
        block.base_mut().node.projection.reserved_text = text;
    }
}

fn reserved_text(reserveds: &[Reserved]) -> Vec<String> {
    let mut ranges: Vec<(FieldNumber, FieldNumber)> = reserveds
        .iter()
        .filter_map(|reserved| match reserved {
            Reserved::Number(n) => Some((*n, *n)),
            Reserved::Range { start, end } => Some((*start, *end)),
            Reserved::Name(_) => None,
        })
        .collect();
    ranges.sort();

    let mut merged: Vec<(FieldNumber, FieldNumber)> = vec![];
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut names: Vec<&str> = vec![];
    for reserved in reserveds {
        if let Reserved::Name(name) = reserved
            && !names.contains(&name.as_str())
        {
            names.push(name);
        }
    }

    let mut text = vec![];
    if !merged.is_empty() {
        text.push(
            merged
                .iter()
                .map(|(start, end)| {
                    if start == end {
                        start.to_string()
                    } else {
                        format!("{start} to {end}")
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    if !names.is_empty() {
        text.push(
            names
                .iter()
                .map(|name| format!("\"{name}\""))
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    text
}
