// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, Comment};
use crate::compiler::{CompilerContext, CompilerPass};

/// Turns descriptions into comments wrapped to the configured line width.
#[derive(Default)]
pub struct DescriptionSetter {
    width: usize,
    always_format: bool,
}

impl CompilerPass for DescriptionSetter {
    fn name(&self) -> &'static str {
        "description"
    }

    fn set_default(&mut self, ctx: &CompilerContext) {
        self.width = ctx.settings.maxchar_per_line;
        self.always_format = ctx.settings.always_format;
    }

    fn visit_block(&mut self, block: &mut Block, _ctx: &mut CompilerContext) {
        for node in block.nodes_mut() {
            node.projection.comment = node
                .description
                .as_deref()
                .and_then(|description| self.format(description));
        }
    }
}

impl DescriptionSetter {
    fn format(&self, description: &str) -> Option<Comment> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return None;
        }

        let text = if is_comment(trimmed) {
            if !self.always_format {
                return Some(Comment::Verbatim(
                    trimmed.lines().map(|l| l.trim_end().to_string()).collect(),
                ));
            }
            strip_comment(trimmed)
        } else {
            trimmed.to_string()
        };

        // `// ` and ` * ` both take three columns
        if !text.contains('\n') && text.chars().count() + 3 <= self.width {
            Some(Comment::Line(text))
        } else {
            Some(Comment::Block(wrap(&text, self.width.saturating_sub(3))))
        }
    }
}

fn is_comment(text: &str) -> bool {
    text.starts_with("//") || (text.starts_with("/*") && text.ends_with("*/") && text.len() >= 4)
}

/// The text of a `//` or `/* */` comment, without its markers.
fn strip_comment(comment: &str) -> String {
    let lines: Vec<&str> = if let Some(body) = comment.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        body.lines()
            .map(|line| {
                let line = line.trim();
                let line = line.strip_prefix('*').unwrap_or(line);
                line.strip_prefix(' ').unwrap_or(line)
            })
            .collect()
    } else {
        comment
            .lines()
            .map(|line| {
                let line = line.trim();
                let line = line.strip_prefix("//").unwrap_or(line);
                line.strip_prefix(' ').unwrap_or(line)
            })
            .collect()
    };

    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(0);
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |end| end + 1);

    lines[start..end.max(start)]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap. Line breaks of the input are kept; words longer than the width get a line
/// of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![];

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            }
        }

        lines.push(current);
    }

    lines
}
