// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::ResolvedType;

pub type FieldNumber = i64;

/// Value of a declared option.
///
/// Renders as `key = "string"`, `key = true` or `key = LITERAL` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Literal { literal: String },
    String(String),
}

/// Options keep their declaration order.
pub type Options = IndexMap<String, OptionValue>;

/// An entry of a block's `reserved` declarations. Ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reserved {
    Number(FieldNumber),
    Range { start: FieldNumber, end: FieldNumber },
    Name(String),
}

/// A formatted description, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment {
    /// `// text`
    Line(String),
    /// `/* ... */` with one entry per wrapped line
    Block(Vec<String>),
    /// A description that already was a comment and is rendered untouched
    Verbatim(Vec<String>),
}

/// Rendering-ready data derived from a node by the setter passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Field type, or the request type of a method (`repeated Foo`, `stream Bar`, ...)
    pub type_text: Option<String>,
    /// Response type of a method
    pub response_text: Option<String>,
    pub comment: Option<Comment>,
    /// One `key = value` entry per option
    pub options_text: Vec<String>,
    /// One body per `reserved` statement (numbers and names never share a statement)
    pub reserved_text: Vec<String>,
}

/// Data shared by every element of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub name: String,
    pub number: Option<FieldNumber>,
    pub description: Option<String>,
    pub options: Options,
    /// Name of the block this node was declared in. `None` for top-level blocks and detached nodes.
    pub block: Option<String>,
    pub projection: Projection,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Plain,
    /// An enum value; carries no payload type
    EnumValue,
    /// Member of the oneof group `key`
    OneOf { key: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub node: Node,
    pub kind: FieldKind,
    pub ftype: Option<ResolvedType>,
}

impl Field {
    pub fn new(name: impl Into<String>, ftype: ResolvedType) -> Self {
        Self {
            node: Node::new(name),
            kind: FieldKind::Plain,
            ftype: Some(ftype),
        }
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        Self {
            node: Node::new(name),
            kind: FieldKind::EnumValue,
            ftype: None,
        }
    }

    pub fn with_number(mut self, number: FieldNumber) -> Self {
        self.node.number = Some(number);
        self
    }

    pub fn in_block(mut self, block: impl Into<String>) -> Self {
        self.node.block = Some(block.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn number(&self) -> Option<FieldNumber> {
        self.node.number
    }
}

/// The kind of callable a method was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    #[default]
    Function,
    Coroutine,
    AsyncGenerator,
}

/// A candidate request type of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestType {
    pub ty: ResolvedType,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub node: Node,
    pub request_types: Vec<RequestType>,
    pub response_type: Option<ResolvedType>,
    pub response_stream: bool,
    pub method_func: CallableKind,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// The request type, once validation guaranteed there is exactly one.
    pub fn request(&self) -> Option<&RequestType> {
        match self.request_types.as_slice() {
            [request] => Some(request),
            _ => None,
        }
    }
}
