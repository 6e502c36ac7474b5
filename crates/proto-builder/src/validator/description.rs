// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::Block;
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::ErrorCode;

/// Descriptions must be embeddable in a block comment.
pub struct DescriptionValidator;

impl CompilerPass for DescriptionValidator {
    fn name(&self) -> &'static str {
        "description"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let report = ctx.report(block.name());

        for (location, node) in block.nodes() {
            let Some(description) = &node.description else {
                continue;
            };

            if comment_body(description).contains("*/") {
                report.report(
                    ErrorCode::InvalidDescription,
                    location,
                    "Description contains '*/'",
                );
            }
        }
    }
}

/// The text of a description, without the delimiters if it already is a `/* ... */` comment.
fn comment_body(description: &str) -> &str {
    let trimmed = description.trim();
    if trimmed.len() >= 4 && trimmed.starts_with("/*") && trimmed.ends_with("*/") {
        &trimmed[2..trimmed.len() - 2]
    } else {
        description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockBase, EnumBlock, Field};
    use crate::validator::test_util::run;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn comment_terminator() {
        let mut bad = Field::enum_value("ONE");
        bad.node.description = Some("ends */ early".to_string());
        let mut wrapped = Field::enum_value("TWO");
        wrapped.node.description = Some("/* already a comment */".to_string());
        let mut nested = Field::enum_value("THREE");
        nested.node.description = Some("/* a */ b */".to_string());

        let mut base = BlockBase::new("Role", "pkg", "role");
        base.node.description = Some("A role".to_string());

        let mut blocks = vec![Block::Enum(EnumBlock {
            base,
            fields: vec![Field::enum_value("ZERO"), bad, wrapped, nested],
        })];

        assert_eq!(
            run(&mut DescriptionValidator, &mut blocks, "Role"),
            vec![ErrorCode::InvalidDescription, ErrorCode::InvalidDescription]
        );
    }
}
