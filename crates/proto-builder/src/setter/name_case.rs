// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::{HashMap, HashSet};

use crate::ast::{Block, EnumBlock, FieldKind, MessageChild, Node, OneOfBlock, Reserved};
use crate::compiler::pass::recover;
use crate::compiler::{CompilerContext, CompilerPass, SetterError};
use crate::settings::NameCase;
use crate::validator::is_reserved_word;

/// Applies the configured name case to every block, field and method name, keeping the
/// `block` links (and oneof keys) in step with the renamed parents.
#[derive(Default)]
pub struct NameCaseSetter {
    case: NameCase,
    /// Normalized block name to the name it was derived from, across the batch
    block_names: HashMap<String, String>,
}

/// Normalize `name`, failing if another name of the same scope already normalized to the same.
fn normalize(
    scope: &mut HashMap<String, String>,
    case: NameCase,
    name: &str,
) -> Result<String, SetterError> {
    let normalized = case.apply(name);

    match scope.get(&normalized) {
        Some(other) if other != name => Err(SetterError::NameCollision {
            name: name.to_string(),
            other: other.clone(),
            normalized,
        }),
        _ => {
            scope.insert(normalized.clone(), name.to_string());
            Ok(normalized)
        }
    }
}

struct Renamer<'a> {
    case: NameCase,
    report: String,
    scope: HashMap<String, String>,
    /// Names the block reserves; a renamed member may not land on one
    reserved: HashSet<String>,
    ctx: &'a mut CompilerContext,
}

impl Renamer<'_> {
    fn rename(&mut self, node: &mut Node, parent: &str) {
        let location = format!("{parent}.{}", node.name);
        let result = normalize(&mut self.scope, self.case, &node.name).and_then(|normalized| {
            let renamed = normalized != node.name;
            if renamed && (is_reserved_word(&normalized) || self.reserved.contains(&normalized)) {
                Err(SetterError::ReservedCollision {
                    name: node.name.clone(),
                    normalized,
                })
            } else {
                Ok(normalized)
            }
        });
        if let Some(name) = recover(self.ctx, &self.report, &location, result) {
            node.name = name;
        }
        node.block = Some(parent.to_string());
    }
}

impl CompilerPass for NameCaseSetter {
    fn name(&self) -> &'static str {
        "name-case"
    }

    fn set_default(&mut self, ctx: &CompilerContext) {
        self.case = ctx.settings.name_case;
        self.block_names.clear();
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        if self.case == NameCase::None {
            return;
        }

        let original = block.name().to_string();
        let result = normalize(&mut self.block_names, self.case, &original);
        let Some(block_name) = recover(ctx, &original, &original, result) else {
            return;
        };
        block.base_mut().node.name = block_name.clone();

        let reserved = block
            .base()
            .reserveds
            .iter()
            .filter_map(|reserved| match reserved {
                Reserved::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect();

        let mut renamer = Renamer {
            case: self.case,
            report: original,
            scope: HashMap::new(),
            reserved,
            ctx,
        };

        match block {
            Block::Message(message) => {
                for child in message.children.iter_mut() {
                    match child {
                        MessageChild::Field(field) => renamer.rename(&mut field.node, &block_name),
                        MessageChild::OneOf(oneof) => {
                            renamer.rename(&mut oneof.base.node, &block_name);
                            let group = oneof.base.node.name.clone();
                            for field in oneof.fields.iter_mut() {
                                renamer.rename(&mut field.node, &group);
                                if let FieldKind::OneOf { key } = &mut field.kind {
                                    *key = group.clone();
                                }
                            }
                        }
                    }
                }
            }
            Block::Enum(EnumBlock { fields, .. }) | Block::OneOf(OneOfBlock { fields, .. }) => {
                for field in fields.iter_mut() {
                    renamer.rename(&mut field.node, &block_name);
                }
            }
            Block::Service(service) => {
                for method in service.methods.iter_mut() {
                    renamer.rename(&mut method.node, &block_name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockBase, Field, MessageBlock, PrimitiveType, ResolvedType};
    use crate::report::ErrorCode;
    use crate::settings::Settings;
    use multiplatform_test::multiplatform_test;

    fn settings(case: NameCase) -> Settings {
        Settings {
            name_case: case,
            ..Settings::default()
        }
    }

    fn field(name: &str, block: &str) -> Field {
        Field::new(name, ResolvedType::Primitive(PrimitiveType::Int32)).in_block(block)
    }

    #[multiplatform_test]
    fn renames_and_relinks() {
        let mut member = field("homePhone", "contactInfo");
        member.kind = FieldKind::OneOf {
            key: "contactInfo".to_string(),
        };
        let mut oneof = OneOfBlock {
            base: BlockBase::new("contactInfo", "pkg", "user"),
            fields: vec![member],
        };
        oneof.base.node.block = Some("UserProfile".to_string());

        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("UserProfile", "pkg", "user"),
            children: vec![
                MessageChild::Field(field("firstName", "UserProfile")),
                MessageChild::OneOf(oneof),
            ],
        })];

        let mut ctx = CompilerContext::new("pkg", settings(NameCase::Snake));
        NameCaseSetter::default().execute(&mut blocks, &mut ctx);

        assert!(!ctx.has_errors());
        let Block::Message(message) = &blocks[0] else {
            panic!("expected a message");
        };
        assert_eq!(message.base.node.name, "user_profile");

        let fields: Vec<_> = message
            .fields()
            .map(|f| (f.name(), f.node.block.as_deref()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("first_name", Some("user_profile")),
                ("home_phone", Some("contact_info"))
            ]
        );

        let oneof = message.oneofs().next().unwrap();
        assert_eq!(oneof.base.node.name, "contact_info");
        assert_eq!(
            oneof.fields[0].kind,
            FieldKind::OneOf {
                key: "contact_info".to_string()
            }
        );
    }

    #[multiplatform_test]
    fn collisions_are_reported() {
        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("User", "pkg", "user"),
            children: vec![
                MessageChild::Field(field("userId", "User")),
                MessageChild::Field(field("user_id", "User")),
            ],
        })];

        let mut ctx = CompilerContext::new("pkg", settings(NameCase::Snake));
        NameCaseSetter::default().execute(&mut blocks, &mut ctx);

        assert_eq!(
            ctx.report("User").codes(),
            vec![ErrorCode::SetterPassError]
        );
    }

    #[multiplatform_test]
    fn renaming_onto_a_reserved_name_is_reported() {
        let mut base = BlockBase::new("User", "pkg", "user");
        base.reserveds = vec![Reserved::Name("old_name".to_string())];
        let mut blocks = vec![Block::Message(MessageBlock {
            base,
            children: vec![
                MessageChild::Field(field("oldName", "User")),
                MessageChild::Field(field("Message", "User")),
                MessageChild::Field(field("current_name", "User")),
            ],
        })];

        let mut ctx = CompilerContext::new("pkg", settings(NameCase::Snake));
        NameCaseSetter::default().execute(&mut blocks, &mut ctx);

        let report = ctx.report("User");
        let locations: Vec<_> = report.errors.iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, vec!["User.oldName", "User.Message"]);
        assert_eq!(
            report.codes(),
            vec![ErrorCode::SetterPassError, ErrorCode::SetterPassError]
        );
    }

    #[multiplatform_test]
    fn none_leaves_names_alone() {
        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("UserProfile", "pkg", "user"),
            children: vec![MessageChild::Field(field("firstName", "UserProfile"))],
        })];
        let expected = blocks.clone();

        let mut ctx = CompilerContext::new("pkg", Settings::default());
        NameCaseSetter::default().execute(&mut blocks, &mut ctx);

        assert_eq!(blocks, expected);
    }
}
