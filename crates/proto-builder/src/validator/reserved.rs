// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::ast::{Block, FieldNumber, Reserved};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::ErrorCode;

use super::is_identifier;

/// Shape of a block's `reserved` declarations.
pub struct ReservedValidator;

impl CompilerPass for ReservedValidator {
    fn name(&self) -> &'static str {
        "reserved"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let name = block.name().to_string();
        let legal = block.number_range();
        let report = ctx.report(&name);

        let mut ranges: Vec<RangeInclusive<FieldNumber>> = vec![];
        let mut names = HashSet::new();

        for reserved in &block.base().reserveds {
            let (start, end) = match reserved {
                Reserved::Number(n) => (*n, *n),
                Reserved::Range { start, end } => (*start, *end),
                Reserved::Name(reserved_name) => {
                    if !is_identifier(reserved_name) {
                        report.report(
                            ErrorCode::InvalidReservedName,
                            &name,
                            format!("Reserved name '{reserved_name}' is not a valid identifier"),
                        );
                    } else if !names.insert(reserved_name.as_str()) {
                        report.report(
                            ErrorCode::DuplicateReserved,
                            &name,
                            format!("Name '{reserved_name}' is reserved more than once"),
                        );
                    }
                    continue;
                }
            };

            if start > end {
                report.report(
                    ErrorCode::InvalidReservedRange,
                    &name,
                    format!("Reserved range {start} to {end} is empty"),
                );
            } else if !legal.contains(&start) || !legal.contains(&end) {
                report.report(
                    ErrorCode::InvalidReservedRange,
                    &name,
                    format!(
                        "Reserved {start} to {end} is outside of {}..={}",
                        legal.start(),
                        legal.end()
                    ),
                );
            } else if ranges.iter().any(|r| start <= *r.end() && *r.start() <= end) {
                report.report(
                    ErrorCode::DuplicateReserved,
                    &name,
                    format!("Reserved {start} to {end} overlaps an earlier reservation"),
                );
            } else {
                ranges.push(start..=end);
            }
        }
    }
}
