// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The block tree: messages, enums, oneof groups and services.

use std::ops::RangeInclusive;

use super::node::{Field, FieldNumber, Method, Node, Reserved};
use super::types::module_name;

/// Legal numbers for message fields.
pub const FIELD_NUMBER_RANGE: RangeInclusive<FieldNumber> = 1..=536_870_911;
/// Legal numbers for enum values.
pub const ENUM_NUMBER_RANGE: RangeInclusive<FieldNumber> = -2_147_483_647..=2_147_483_647;
/// Numbers reserved by the protocol implementation.
pub const PROTOCOL_RESERVED_RANGE: RangeInclusive<FieldNumber> = 19_000..=19_999;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockBase {
    pub node: Node,
    pub protofile: String,
    pub package: String,
    pub reserveds: Vec<Reserved>,
}

impl BlockBase {
    pub fn new(name: impl Into<String>, package: impl Into<String>, protofile: impl Into<String>) -> Self {
        Self {
            node: Node::new(name),
            protofile: protofile.into(),
            package: package.into(),
            reserveds: vec![],
        }
    }

    pub fn module(&self) -> &str {
        module_name(&self.protofile)
    }

    pub fn reserved_names(&self) -> impl Iterator<Item = &str> {
        self.reserveds.iter().filter_map(|reserved| match reserved {
            Reserved::Name(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageChild {
    Field(Field),
    OneOf(OneOfBlock),
}

impl MessageChild {
    /// Number used to order children: a field's number, or a oneof group's index.
    pub fn index(&self) -> Option<FieldNumber> {
        match self {
            MessageChild::Field(field) => field.number(),
            MessageChild::OneOf(oneof) => oneof.index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageBlock {
    pub base: BlockBase,
    pub children: Vec<MessageChild>,
}

impl MessageBlock {
    /// Direct fields followed, in place, by the members of each oneof group.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.children.iter().flat_map(|child| match child {
            MessageChild::Field(field) => std::slice::from_ref(field).iter(),
            MessageChild::OneOf(oneof) => oneof.fields.iter(),
        })
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.children.iter_mut().flat_map(|child| match child {
            MessageChild::Field(field) => std::slice::from_mut(field).iter_mut(),
            MessageChild::OneOf(oneof) => oneof.fields.iter_mut(),
        })
    }

    pub fn oneofs(&self) -> impl Iterator<Item = &OneOfBlock> {
        self.children.iter().filter_map(|child| match child {
            MessageChild::OneOf(oneof) => Some(oneof),
            MessageChild::Field(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumBlock {
    pub base: BlockBase,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOfBlock {
    pub base: BlockBase,
    pub fields: Vec<Field>,
}

impl OneOfBlock {
    /// The smallest number among the members of this group.
    pub fn index(&self) -> Option<FieldNumber> {
        self.fields.iter().filter_map(Field::number).min()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceBlock {
    pub base: BlockBase,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Message,
    Enum,
    OneOf,
    Service,
}

impl BlockKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Message => "message",
            BlockKind::Enum => "enum",
            BlockKind::OneOf => "oneof",
            BlockKind::Service => "service",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Message(MessageBlock),
    Enum(EnumBlock),
    OneOf(OneOfBlock),
    Service(ServiceBlock),
}

impl Block {
    pub fn base(&self) -> &BlockBase {
        match self {
            Block::Message(b) => &b.base,
            Block::Enum(b) => &b.base,
            Block::OneOf(b) => &b.base,
            Block::Service(b) => &b.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut BlockBase {
        match self {
            Block::Message(b) => &mut b.base,
            Block::Enum(b) => &mut b.base,
            Block::OneOf(b) => &mut b.base,
            Block::Service(b) => &mut b.base,
        }
    }

    pub fn name(&self) -> &str {
        &self.base().node.name
    }

    pub fn package(&self) -> &str {
        &self.base().package
    }

    pub fn module(&self) -> &str {
        self.base().module()
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Message(_) => BlockKind::Message,
            Block::Enum(_) => BlockKind::Enum,
            Block::OneOf(_) => BlockKind::OneOf,
            Block::Service(_) => BlockKind::Service,
        }
    }

    /// First number handed out by the field-number allocator.
    pub fn counter_start(&self) -> FieldNumber {
        match self {
            Block::Enum(_) => 0,
            _ => 1,
        }
    }

    /// Legal numbers for the fields of this block.
    pub fn number_range(&self) -> RangeInclusive<FieldNumber> {
        match self {
            Block::Enum(_) => ENUM_NUMBER_RANGE,
            _ => FIELD_NUMBER_RANGE,
        }
    }

    /// Every numbered field of the block, descending into oneof groups.
    pub fn fields(&self) -> Vec<&Field> {
        match self {
            Block::Message(message) => message.fields().collect(),
            Block::Enum(e) => e.fields.iter().collect(),
            Block::OneOf(oneof) => oneof.fields.iter().collect(),
            Block::Service(_) => vec![],
        }
    }

    pub fn fields_mut(&mut self) -> Vec<&mut Field> {
        match self {
            Block::Message(message) => message.fields_mut().collect(),
            Block::Enum(e) => e.fields.iter_mut().collect(),
            Block::OneOf(oneof) => oneof.fields.iter_mut().collect(),
            Block::Service(_) => vec![],
        }
    }

    /// Every numbered field paired with its dotted location, in the order of `fields`.
    pub fn located_fields(&self) -> Vec<(String, &Field)> {
        let name = self.name();
        match self {
            Block::Message(message) => message
                .children
                .iter()
                .flat_map(|child| match child {
                    MessageChild::Field(field) => vec![(format!("{name}.{}", field.name()), field)],
                    MessageChild::OneOf(oneof) => oneof
                        .fields
                        .iter()
                        .map(|field| {
                            let location =
                                format!("{name}.{}.{}", oneof.base.node.name, field.name());
                            (location, field)
                        })
                        .collect(),
                })
                .collect(),
            Block::Enum(EnumBlock { fields, .. }) | Block::OneOf(OneOfBlock { fields, .. }) => {
                fields
                    .iter()
                    .map(|field| (format!("{name}.{}", field.name()), field))
                    .collect()
            }
            Block::Service(_) => vec![],
        }
    }

    /// Every node of the block (including the block itself) paired with a dotted location.
    pub fn nodes(&self) -> Vec<(String, &Node)> {
        let name = self.name();
        let mut nodes = vec![(name.to_string(), &self.base().node)];

        match self {
            Block::Message(message) => {
                for child in &message.children {
                    match child {
                        MessageChild::Field(field) => {
                            nodes.push((format!("{name}.{}", field.name()), &field.node))
                        }
                        MessageChild::OneOf(oneof) => {
                            let prefix = format!("{name}.{}", oneof.base.node.name);
                            nodes.push((prefix.clone(), &oneof.base.node));
                            push_fields(&prefix, &oneof.fields, &mut nodes);
                        }
                    }
                }
            }
            Block::Enum(EnumBlock { fields, .. }) | Block::OneOf(OneOfBlock { fields, .. }) => {
                push_fields(name, fields, &mut nodes)
            }
            Block::Service(service) => {
                for method in &service.methods {
                    nodes.push((format!("{name}.{}", method.name()), &method.node));
                }
            }
        }

        nodes
    }

    /// Mutable access to every node of the block, the block itself first.
    pub fn nodes_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Block::Message(message) => {
                let mut nodes = vec![&mut message.base.node];
                for child in message.children.iter_mut() {
                    match child {
                        MessageChild::Field(field) => nodes.push(&mut field.node),
                        MessageChild::OneOf(oneof) => {
                            nodes.push(&mut oneof.base.node);
                            nodes.extend(oneof.fields.iter_mut().map(|f| &mut f.node));
                        }
                    }
                }
                nodes
            }
            Block::Enum(EnumBlock { base, fields }) | Block::OneOf(OneOfBlock { base, fields }) => {
                let mut nodes = vec![&mut base.node];
                nodes.extend(fields.iter_mut().map(|f| &mut f.node));
                nodes
            }
            Block::Service(service) => {
                let mut nodes = vec![&mut service.base.node];
                nodes.extend(service.methods.iter_mut().map(|m| &mut m.node));
                nodes
            }
        }
    }
}

fn push_fields<'a>(prefix: &str, fields: &'a [Field], nodes: &mut Vec<(String, &'a Node)>) {
    for field in fields {
        nodes.push((format!("{prefix}.{}", field.name()), &field.node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::{PrimitiveType, ResolvedType};
    use multiplatform_test::multiplatform_test;

    fn int_field(name: &str) -> Field {
        Field::new(name, ResolvedType::Primitive(PrimitiveType::Int32))
    }

    #[multiplatform_test]
    fn oneof_index_is_min_member_number() {
        let oneof = OneOfBlock {
            base: BlockBase::new("choice", "", "file"),
            fields: vec![
                int_field("a").with_number(7),
                int_field("b"),
                int_field("c").with_number(4),
            ],
        };
        assert_eq!(oneof.index(), Some(4));

        let empty = OneOfBlock {
            base: BlockBase::new("choice", "", "file"),
            fields: vec![],
        };
        assert_eq!(empty.index(), None);
    }

    #[multiplatform_test]
    fn flattened_fields_descend_into_oneofs() {
        let block = Block::Message(MessageBlock {
            base: BlockBase::new("User", "", "user"),
            children: vec![
                MessageChild::Field(int_field("id")),
                MessageChild::OneOf(OneOfBlock {
                    base: BlockBase::new("contact", "", "user"),
                    fields: vec![int_field("phone"), int_field("pager")],
                }),
                MessageChild::Field(int_field("age")),
            ],
        });

        let names: Vec<_> = block.fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["id", "phone", "pager", "age"]);

        let locations: Vec<_> = block.nodes().into_iter().map(|(loc, _)| loc).collect();
        assert_eq!(
            locations,
            vec![
                "User",
                "User.id",
                "User.contact",
                "User.contact.phone",
                "User.contact.pager",
                "User.age"
            ]
        );
    }

    #[multiplatform_test]
    fn enum_counter_starts_at_zero() {
        let block = Block::Enum(EnumBlock {
            base: BlockBase::new("Status", "", "status"),
            fields: vec![],
        });
        assert_eq!(block.counter_start(), 0);
        assert_eq!(block.number_range(), ENUM_NUMBER_RANGE);
    }
}
