// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{Block, OptionValue};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::ErrorCode;

// `deprecated`, `java_package`, `(my.ext)`, `(my.ext).field`
static OPTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*\)|[A-Za-z_][A-Za-z0-9_]*)(\.[A-Za-z_][A-Za-z0-9_]*)*$",
    )
    .unwrap()
});

static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*|-?[0-9]+(\.[0-9]+)?)$").unwrap()
});

/// Option names and values must be expressible in the IDL grammar.
pub struct OptionValidator;

impl CompilerPass for OptionValidator {
    fn name(&self) -> &'static str {
        "options"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let report = ctx.report(block.name());

        for (location, node) in block.nodes() {
            for (key, value) in &node.options {
                if !OPTION_NAME.is_match(key) {
                    report.report(
                        ErrorCode::InvalidOptionName,
                        &location,
                        format!("'{key}' is not a valid option name"),
                    );
                }

                match value {
                    OptionValue::Literal { literal } if !LITERAL.is_match(literal) => {
                        report.report(
                            ErrorCode::InvalidOptionValue,
                            &location,
                            format!("'{literal}' is not a valid literal for option '{key}'"),
                        )
                    }
                    OptionValue::String(s) if s.contains(['\n', '\r']) => report.report(
                        ErrorCode::InvalidOptionValue,
                        &location,
                        format!("Value of option '{key}' spans several lines"),
                    ),
                    _ => {}
                }
            }
        }
    }
}
