// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, OptionValue};
use crate::compiler::{CompilerContext, CompilerPass};

pub struct OptionSetter;

impl CompilerPass for OptionSetter {
    fn name(&self) -> &'static str {
        "options"
    }

    fn visit_block(&mut self, block: &mut Block, _ctx: &mut CompilerContext) {
        for node in block.nodes_mut() {
            node.projection.options_text = node
                .options
                .iter()
                .map(|(key, value)| format!("{key} = {}", option_value(value)))
                .collect();
        }
    }
}

fn option_value(value: &OptionValue) -> String {
    match value {
        OptionValue::Bool(value) => value.to_string(),
        OptionValue::Literal { literal } => literal.clone(),
        OptionValue::String(value) => {
            format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}
