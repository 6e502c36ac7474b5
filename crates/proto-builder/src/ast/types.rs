// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolved field and argument types.
//!
//! Types are classified once, while blocks are being constructed from declarations. Every later
//! pass matches on [`ResolvedType`] instead of re-deriving what kind of type a field refers to.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Package name used by declarations that do not belong to any package.
pub const NO_PACKAGE: &str = "";

const PROTO_SUFFIX: &str = ".proto";

/// Strip the `.proto` suffix (if any) from a declaring file name.
pub fn module_name(file: &str) -> &str {
    file.strip_suffix(PROTO_SUFFIX).unwrap_or(file)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 15] = [
        PrimitiveType::Double,
        PrimitiveType::Float,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Uint32,
        PrimitiveType::Uint64,
        PrimitiveType::Sint32,
        PrimitiveType::Sint64,
        PrimitiveType::Fixed32,
        PrimitiveType::Fixed64,
        PrimitiveType::Sfixed32,
        PrimitiveType::Sfixed64,
        PrimitiveType::Bool,
        PrimitiveType::String,
        PrimitiveType::Bytes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Double => "double",
            PrimitiveType::Float => "float",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Sint32 => "sint32",
            PrimitiveType::Sint64 => "sint64",
            PrimitiveType::Fixed32 => "fixed32",
            PrimitiveType::Fixed64 => "fixed64",
            PrimitiveType::Sfixed32 => "sfixed32",
            PrimitiveType::Sfixed64 => "sfixed64",
            PrimitiveType::Bool => "bool",
            PrimitiveType::String => "string",
            PrimitiveType::Bytes => "bytes",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Whether this primitive may be used as the key of a `map<K, V>`.
    pub fn is_map_key(&self) -> bool {
        !matches!(
            self,
            PrimitiveType::Double | PrimitiveType::Float | PrimitiveType::Bytes
        )
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A reference to a declared message or enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub package: String,
    /// The file declaring the type. `None` when the declaration did not report one, which the
    /// type validator treats as an authoring error.
    pub file: Option<String>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            file: Some(file.into()),
        }
    }

    pub fn module(&self) -> Option<&str> {
        self.file.as_deref().map(module_name)
    }

    pub fn qualified_name(&self) -> String {
        if self.package == NO_PACKAGE {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(PrimitiveType),
    Message(TypeRef),
    Enum(TypeRef),
    List(Box<ResolvedType>),
    Map(Box<ResolvedType>, Box<ResolvedType>),
    /// A name that did not match any primitive or declared type
    Unresolved(String),
}

impl ResolvedType {
    pub fn list(element: ResolvedType) -> Self {
        ResolvedType::List(Box::new(element))
    }

    pub fn map(key: ResolvedType, value: ResolvedType) -> Self {
        ResolvedType::Map(Box::new(key), Box::new(value))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ResolvedType::List(_) | ResolvedType::Map(_, _))
    }

    /// Every message/enum reference reachable from this type (list elements, map keys and values).
    pub fn type_refs(&self) -> Vec<&TypeRef> {
        match self {
            ResolvedType::Message(r) | ResolvedType::Enum(r) => vec![r],
            ResolvedType::List(element) => element.type_refs(),
            ResolvedType::Map(key, value) => {
                let mut refs = key.type_refs();
                refs.extend(value.type_refs());
                refs
            }
            ResolvedType::Primitive(_) | ResolvedType::Unresolved(_) => vec![],
        }
    }
}

impl Display for ResolvedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedType::Primitive(p) => write!(f, "{p}"),
            ResolvedType::Message(r) | ResolvedType::Enum(r) => {
                write!(f, "{}", r.qualified_name())
            }
            ResolvedType::List(element) => write!(f, "list<{element}>"),
            ResolvedType::Map(key, value) => write!(f, "map<{key}, {value}>"),
            ResolvedType::Unresolved(name) => write!(f, "{name}"),
        }
    }
}
