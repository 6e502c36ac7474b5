// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Field-number bookkeeping shared by the index validator and the index setter.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::ast::block::PROTOCOL_RESERVED_RANGE;
use crate::ast::{FieldNumber, Reserved};

/// Numbers that may not be used: declared reserved numbers and ranges, plus any number
/// explicitly added. Ranges are kept as ranges, so wide reservations stay cheap.
#[derive(Debug, Clone, Default)]
pub struct ReservedNumbers {
    ranges: Vec<RangeInclusive<FieldNumber>>,
    numbers: HashSet<FieldNumber>,
}

impl ReservedNumbers {
    pub fn from_reserveds(reserveds: &[Reserved]) -> Self {
        let ranges = reserveds
            .iter()
            .filter_map(|reserved| match reserved {
                Reserved::Number(n) => Some(*n..=*n),
                Reserved::Range { start, end } => Some(*start..=*end),
                Reserved::Name(_) => None,
            })
            .collect();

        Self {
            ranges,
            numbers: HashSet::new(),
        }
    }

    pub fn contains(&self, number: FieldNumber) -> bool {
        self.numbers.contains(&number) || self.ranges.iter().any(|r| r.contains(&number))
    }

    pub fn insert(&mut self, number: FieldNumber) {
        self.numbers.insert(number);
    }

    /// The first number after the declared range containing `number`, if any.
    fn skip_range(&self, number: FieldNumber) -> Option<FieldNumber> {
        self.ranges
            .iter()
            .filter(|r| r.contains(&number))
            .map(|r| r.end() + 1)
            .max()
    }
}

/// Hands out the smallest free number at or above a monotonically increasing counter.
#[derive(Debug, Clone)]
pub struct NumberAllocator {
    counter: FieldNumber,
    reserved: ReservedNumbers,
}

impl NumberAllocator {
    pub fn new(start: FieldNumber, reserved: ReservedNumbers) -> Self {
        Self {
            counter: start,
            reserved,
        }
    }

    pub fn next_number(&mut self) -> FieldNumber {
        let mut candidate = self.counter;

        loop {
            if PROTOCOL_RESERVED_RANGE.contains(&candidate) {
                candidate = PROTOCOL_RESERVED_RANGE.end() + 1;
            } else if let Some(after) = self.reserved.skip_range(candidate) {
                candidate = after;
            } else if self.reserved.contains(candidate) {
                candidate += 1;
            } else {
                break;
            }
        }

        self.reserved.insert(candidate);
        self.counter = candidate + 1;
        candidate
    }
}
