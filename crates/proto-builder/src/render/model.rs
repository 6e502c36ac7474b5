// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The render model: everything the writer needs, fully resolved.
//!
//! Built from the tree once every setter ran. A node whose projection was not filled in (which
//! a successful setter run rules out) is a render error.

use crate::ast::{
    Block, Comment, EnumBlock, Field, FieldKind, MessageBlock, MessageChild, Method, NO_PACKAGE,
    Node, OneOfBlock, ServiceBlock,
};
use crate::compiler::ModuleState;
use crate::error::ProtoBuildError;

#[derive(Debug, Clone, PartialEq)]
pub struct ProtoFile {
    pub version: u32,
    pub package: Option<String>,
    /// Sorted and deduplicated
    pub imports: Vec<String>,
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Message(MessageDef),
    Enum(EnumDef),
    Service(ServiceDef),
}

/// What every block renders before its members.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub comment: Option<Comment>,
    pub options: Vec<String>,
    pub reserved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDef {
    pub header: Header,
    pub members: Vec<MessageMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageMember {
    Field(FieldDef),
    OneOf(OneOfDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOfDef {
    pub header: Header,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub header: Header,
    pub values: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// `None` for enum values
    pub type_text: Option<String>,
    pub name: String,
    pub number: i64,
    pub options: Vec<String>,
    pub comment: Option<Comment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDef {
    pub header: Header,
    pub methods: Vec<MethodDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub request: String,
    pub response: String,
    pub options: Vec<String>,
    pub comment: Option<Comment>,
}

impl ProtoFile {
    pub fn build(
        version: u32,
        package: &str,
        module: &str,
        blocks: &[&Block],
        state: Option<&ModuleState>,
    ) -> Result<ProtoFile, ProtoBuildError> {
        let definitions = blocks
            .iter()
            .map(|block| convert_block(block, module))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProtoFile {
            version,
            package: (package != NO_PACKAGE).then(|| package.to_string()),
            imports: state
                .map(|state| state.imports.iter().cloned().collect())
                .unwrap_or_default(),
            definitions,
        })
    }
}

fn render_error(module: &str, message: String) -> ProtoBuildError {
    ProtoBuildError::Render {
        module: module.to_string(),
        message,
    }
}

fn header(node: &Node) -> Header {
    Header {
        name: node.name.clone(),
        comment: node.projection.comment.clone(),
        options: node.projection.options_text.clone(),
        reserved: node.projection.reserved_text.clone(),
    }
}

fn convert_block(block: &Block, module: &str) -> Result<Definition, ProtoBuildError> {
    match block {
        Block::Message(message) => convert_message(message, module).map(Definition::Message),
        Block::Enum(e) => convert_enum(e, module).map(Definition::Enum),
        Block::Service(service) => convert_service(service, module).map(Definition::Service),
        Block::OneOf(oneof) => Err(render_error(
            module,
            format!(
                "Oneof group '{}' must be declared inside a message",
                oneof.base.node.name
            ),
        )),
    }
}

fn convert_message(message: &MessageBlock, module: &str) -> Result<MessageDef, ProtoBuildError> {
    let members = message
        .children
        .iter()
        .map(|child| match child {
            MessageChild::Field(field) => convert_field(field, module).map(MessageMember::Field),
            MessageChild::OneOf(oneof) => convert_oneof(oneof, module).map(MessageMember::OneOf),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MessageDef {
        header: header(&message.base.node),
        members,
    })
}

fn convert_oneof(oneof: &OneOfBlock, module: &str) -> Result<OneOfDef, ProtoBuildError> {
    Ok(OneOfDef {
        header: header(&oneof.base.node),
        fields: convert_fields(&oneof.fields, module)?,
    })
}

fn convert_enum(e: &EnumBlock, module: &str) -> Result<EnumDef, ProtoBuildError> {
    Ok(EnumDef {
        header: header(&e.base.node),
        values: convert_fields(&e.fields, module)?,
    })
}

fn convert_fields(fields: &[Field], module: &str) -> Result<Vec<FieldDef>, ProtoBuildError> {
    fields.iter().map(|f| convert_field(f, module)).collect()
}

fn convert_field(field: &Field, module: &str) -> Result<FieldDef, ProtoBuildError> {
    let node = &field.node;

    let number = node
        .number
        .ok_or_else(|| render_error(module, format!("Field '{}' has no number", node.name)))?;

    let type_text = match field.kind {
        FieldKind::EnumValue => None,
        FieldKind::Plain | FieldKind::OneOf { .. } => Some(
            node.projection.type_text.clone().ok_or_else(|| {
                render_error(module, format!("Field '{}' has no type text", node.name))
            })?,
        ),
    };

    Ok(FieldDef {
        type_text,
        name: node.name.clone(),
        number,
        options: node.projection.options_text.clone(),
        comment: node.projection.comment.clone(),
    })
}

fn convert_service(service: &ServiceBlock, module: &str) -> Result<ServiceDef, ProtoBuildError> {
    Ok(ServiceDef {
        header: header(&service.base.node),
        methods: service
            .methods
            .iter()
            .map(|m| convert_method(m, module))
            .collect::<Result<Vec<_>, _>>()?,
    })
}

fn convert_method(method: &Method, module: &str) -> Result<MethodDef, ProtoBuildError> {
    let projection = &method.node.projection;
    let missing = |what: &str| {
        render_error(
            module,
            format!("Method '{}' has no {what} type text", method.name()),
        )
    };

    Ok(MethodDef {
        name: method.name().to_string(),
        request: projection.type_text.clone().ok_or_else(|| missing("request"))?,
        response: projection
            .response_text
            .clone()
            .ok_or_else(|| missing("response"))?,
        options: projection.options_text.clone(),
        comment: projection.comment.clone(),
    })
}
