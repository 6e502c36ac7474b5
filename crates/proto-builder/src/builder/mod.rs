// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Builds the block tree from a [`DeclarationRegistry`].
//!
//! Types are resolved once here; the passes only ever see [`ResolvedType`]s.

use indexmap::IndexMap;

use crate::ast::{
    Block, BlockBase, EnumBlock, Field, FieldKind, FieldNumber, MessageBlock, MessageChild, Method,
    Node, OneOfBlock, Options, RequestType, ServiceBlock,
};
use crate::declaration::{
    DeclarationError, DeclarationRegistry, EnumDecl, MessageDecl, OneOfDecl, ServiceDecl,
};

mod inheritance;
mod resolve;

use inheritance::{MessagesByKey, flatten};
use resolve::TypeIndex;

/// The top-level blocks of one package, in declaration order.
#[derive(Debug, Clone)]
pub struct PackageBlocks {
    pub package: String,
    pub blocks: Vec<Block>,
}

pub fn build_blocks(registry: &DeclarationRegistry) -> Result<Vec<PackageBlocks>, DeclarationError> {
    let index = TypeIndex::new(registry)?;
    let messages: MessagesByKey = registry
        .messages
        .iter()
        .map(|m| ((m.package.clone(), m.name.clone()), m))
        .collect();

    let mut packages: IndexMap<String, Vec<Block>> = IndexMap::new();

    for message in &registry.messages {
        // Without a file the message can be referenced (and reported as such) but not rendered
        let Some(file) = &message.file else {
            tracing::warn!(name = %message.name, "Message does not report its file, skipping");
            continue;
        };
        let block = build_message(message, file, &messages, &index)?;
        packages.entry(message.package.clone()).or_default().push(block);
    }

    for enum_decl in &registry.enums {
        let Some(file) = &enum_decl.file else {
            tracing::warn!(name = %enum_decl.name, "Enum does not report its file, skipping");
            continue;
        };
        let block = build_enum(enum_decl, file);
        packages.entry(enum_decl.package.clone()).or_default().push(block);
    }

    for service in &registry.services {
        let block = build_service(service, &index)?;
        packages.entry(service.package.clone()).or_default().push(block);
    }

    Ok(packages
        .into_iter()
        .map(|(package, blocks)| PackageBlocks { package, blocks })
        .collect())
}

fn node(
    name: &str,
    number: Option<FieldNumber>,
    description: &Option<String>,
    options: &Options,
    block: Option<&str>,
) -> Node {
    Node {
        name: name.to_string(),
        number,
        description: description.clone(),
        options: options.clone(),
        block: block.map(str::to_string),
        ..Default::default()
    }
}

fn block_base(
    name: &str,
    package: &str,
    file: &str,
    description: &Option<String>,
    options: &Options,
) -> BlockBase {
    let mut base = BlockBase::new(name, package, file);
    base.node.description = description.clone();
    base.node.options = options.clone();
    base
}

fn build_message(
    message: &MessageDecl,
    file: &str,
    messages: &MessagesByKey,
    index: &TypeIndex,
) -> Result<Block, DeclarationError> {
    let flat = flatten(message, messages, index)?;

    let mut base = block_base(
        &message.name,
        &message.package,
        file,
        &message.description,
        &message.options,
    );
    base.reserveds = message.reserved.clone();

    let mut children: Vec<MessageChild> = vec![];
    let mut groups: IndexMap<String, usize> = IndexMap::new();

    for field in &flat.fields {
        let decl = &field.decl;
        let owner = format!("{}.{}", message.name, decl.name);
        let ftype = index.resolve(&decl.ty, &field.package, &owner)?;

        match &decl.oneof {
            None => children.push(MessageChild::Field(Field {
                node: node(
                    &decl.name,
                    decl.number,
                    &decl.description,
                    &decl.options,
                    Some(&message.name),
                ),
                kind: FieldKind::Plain,
                ftype: Some(ftype),
            })),
            Some(key) => {
                let member = Field {
                    node: node(
                        &decl.name,
                        decl.number,
                        &decl.description,
                        &decl.options,
                        Some(key),
                    ),
                    kind: FieldKind::OneOf { key: key.clone() },
                    ftype: Some(ftype),
                };

                let position = *groups.entry(key.clone()).or_insert_with(|| {
                    let oneof = oneof_block(key, message, file, &flat.oneofs);
                    children.push(MessageChild::OneOf(oneof));
                    children.len() - 1
                });

                if let MessageChild::OneOf(oneof) = &mut children[position] {
                    oneof.fields.push(member);
                }
            }
        }
    }

    Ok(Block::Message(MessageBlock { base, children }))
}

fn oneof_block(key: &str, message: &MessageDecl, file: &str, decls: &[OneOfDecl]) -> OneOfBlock {
    let decl = decls.iter().find(|d| d.name == key);
    let mut base = BlockBase::new(key, &message.package, file);
    base.node.block = Some(message.name.clone());
    if let Some(decl) = decl {
        base.node.description = decl.description.clone();
        base.node.options = decl.options.clone();
    }

    OneOfBlock {
        base,
        fields: vec![],
    }
}

fn build_enum(enum_decl: &EnumDecl, file: &str) -> Block {
    let mut base = block_base(
        &enum_decl.name,
        &enum_decl.package,
        file,
        &enum_decl.description,
        &enum_decl.options,
    );
    base.reserveds = enum_decl.reserved.clone();

    let fields = enum_decl
        .values
        .iter()
        .map(|value| Field {
            node: node(
                &value.name,
                value.number,
                &value.description,
                &value.options,
                Some(&enum_decl.name),
            ),
            kind: FieldKind::EnumValue,
            ftype: None,
        })
        .collect();

    Block::Enum(EnumBlock { base, fields })
}

fn build_service(service: &ServiceDecl, index: &TypeIndex) -> Result<Block, DeclarationError> {
    let base = block_base(
        &service.name,
        &service.package,
        &service.file,
        &service.description,
        &service.options,
    );

    let methods = service
        .methods
        .iter()
        .map(|method| {
            let owner = format!("{}.{}", service.name, method.name);

            let request_types = method
                .arguments
                .iter()
                .filter(|argument| !argument.injected)
                .map(|argument| {
                    let (ty, stream) = argument.ty.unwrap_stream();
                    Ok(RequestType {
                        ty: index.resolve(ty, &service.package, &owner)?,
                        stream,
                    })
                })
                .collect::<Result<Vec<_>, DeclarationError>>()?;

            let (response_type, response_stream) = match &method.returns {
                Some(returns) => {
                    let (ty, stream) = returns.unwrap_stream();
                    (Some(index.resolve(ty, &service.package, &owner)?), stream)
                }
                None => (None, false),
            };

            Ok(Method {
                node: node(
                    &method.name,
                    None,
                    &method.description,
                    &method.options,
                    Some(&service.name),
                ),
                request_types,
                response_type,
                response_stream,
                method_func: method.callable,
            })
        })
        .collect::<Result<Vec<_>, DeclarationError>>()?;

    Ok(Block::Service(ServiceBlock { base, methods }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CallableKind, PrimitiveType, ResolvedType, TypeRef};
    use crate::declaration::{
        ArgumentDecl, EnumValueDecl, FieldDecl, MethodDecl, TypeExpr,
    };
    use multiplatform_test::multiplatform_test;

    fn expr(s: &str) -> TypeExpr {
        s.parse().unwrap()
    }

    #[multiplatform_test]
    fn groups_blocks_by_package() {
        let mut registry = DeclarationRegistry::default();
        registry
            .add_message(MessageDecl::new("User", "account", "user"))
            .add_message(MessageDecl::new("Money", "common", "money"))
            .add_enum(EnumDecl::new("Role", "account", "user").value(EnumValueDecl::new("ADMIN")))
            .add_service(ServiceDecl::new("UserService", "account", "service"));

        let packages = build_blocks(&registry).unwrap();
        let layout: Vec<(&str, Vec<&str>)> = packages
            .iter()
            .map(|p| (p.package.as_str(), p.blocks.iter().map(Block::name).collect()))
            .collect();

        assert_eq!(
            layout,
            vec![
                ("account", vec!["User", "Role", "UserService"]),
                ("common", vec!["Money"])
            ]
        );
    }

    #[multiplatform_test]
    fn oneof_groups_take_the_place_of_their_first_member() {
        let mut registry = DeclarationRegistry::default();
        let mut user = MessageDecl::new("User", "account", "user")
            .field(FieldDecl::new("id", expr("int64")))
            .field(FieldDecl::new("email", expr("string")).in_oneof("contact"))
            .field(FieldDecl::new("age", expr("int32")))
            .field(FieldDecl::new("phone", expr("string")).in_oneof("contact"));
        user.oneofs.push(OneOfDecl {
            name: "contact".to_string(),
            description: Some("How to reach the user".to_string()),
            options: Default::default(),
        });
        registry.add_message(user);

        let packages = build_blocks(&registry).unwrap();
        let block = &packages[0].blocks[0];

        let locations: Vec<String> = block.nodes().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            locations,
            vec![
                "User",
                "User.id",
                "User.contact",
                "User.contact.email",
                "User.contact.phone",
                "User.age"
            ]
        );

        let Block::Message(message) = block else {
            panic!("expected a message");
        };
        let oneof = message.oneofs().next().unwrap();
        assert_eq!(oneof.base.node.block.as_deref(), Some("User"));
        assert_eq!(
            oneof.base.node.description.as_deref(),
            Some("How to reach the user")
        );
        assert_eq!(oneof.fields[0].node.block.as_deref(), Some("contact"));
    }

    #[multiplatform_test]
    fn service_signatures() {
        let mut registry = DeclarationRegistry::default();
        registry
            .add_message(MessageDecl::new("Event", "account", "event"))
            .add_message(MessageDecl::new("Filter", "account", "event"))
            .add_service(
                ServiceDecl::new("EventService", "account", "service").method(
                    MethodDecl::new("watch")
                        .argument(ArgumentDecl::new("filter", expr("stream<Filter>")))
                        .argument(ArgumentDecl::new("db", expr("Connection")).injected())
                        .returns(expr("stream<Event>"))
                        .callable(CallableKind::AsyncGenerator),
                ),
            );

        let packages = build_blocks(&registry).unwrap();
        let Block::Service(service) = &packages[0].blocks[2] else {
            panic!("expected a service");
        };
        let method = &service.methods[0];

        assert_eq!(
            method.request_types,
            vec![RequestType {
                ty: ResolvedType::Message(TypeRef::new("Filter", "account", "event")),
                stream: true
            }]
        );
        assert!(method.response_stream);
        assert_eq!(method.node.block.as_deref(), Some("EventService"));
    }

    #[multiplatform_test]
    fn fileless_messages_are_referenced_but_not_built() {
        let mut registry = DeclarationRegistry::default();
        let mut ghost = MessageDecl::new("Ghost", "account", "ghost");
        ghost.file = None;
        registry
            .add_message(ghost)
            .add_message(
                MessageDecl::new("User", "account", "user")
                    .field(FieldDecl::new("ghost", expr("Ghost")))
                    .field(FieldDecl::new("id", expr("int64"))),
            );

        let packages = build_blocks(&registry).unwrap();
        assert_eq!(packages[0].blocks.len(), 1);

        let fields = packages[0].blocks[0].fields();
        assert_eq!(
            fields[0].ftype,
            Some(ResolvedType::Message(TypeRef {
                name: "Ghost".to_string(),
                package: "account".to_string(),
                file: None
            }))
        );
        assert_eq!(
            fields[1].ftype,
            Some(ResolvedType::Primitive(PrimitiveType::Int64))
        );
    }

    #[multiplatform_test]
    fn stream_fields_are_rejected() {
        let mut registry = DeclarationRegistry::default();
        registry.add_message(
            MessageDecl::new("User", "account", "user")
                .field(FieldDecl::new("events", expr("stream<int32>"))),
        );

        assert_eq!(
            build_blocks(&registry).unwrap_err(),
            DeclarationError::UnexpectedStream("User.events".to_string())
        );
    }
}
