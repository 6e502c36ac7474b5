// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Host-side declarations of messages, enums and services.
//!
//! This is the input of block construction. Declarations are plain data (loadable from JSON or
//! TOML); field and argument types are written as type expressions such as `int32`, `User`,
//! `account.User`, `list<User>`, `map<string, User>` or `stream<Event>`.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::ast::{CallableKind, FieldNumber, Options, Reserved};

static QUALIFIED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

#[derive(Error, Debug, PartialEq)]
pub enum DeclarationError {
    #[error("Invalid type expression '{0}'")]
    InvalidTypeExpression(String),

    #[error("Type '{name}' is declared more than once in package '{package}'")]
    DuplicateType { package: String, name: String },

    #[error("Message '{message}' extends unknown message '{base}'")]
    UnknownBase { message: String, base: String },

    #[error("Inheritance cycle through message '{0}'")]
    InheritanceCycle(String),

    #[error("'{0}' uses a stream type outside of a method signature")]
    UnexpectedStream(String),

    #[error("Failed to parse declarations: {0}")]
    Parse(String),
}

/// A type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeExpr {
    Named(String),
    List(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Stream(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// Unwrap a top-level `stream<T>`, reporting whether it was present.
    pub fn unwrap_stream(&self) -> (&TypeExpr, bool) {
        match self {
            TypeExpr::Stream(inner) => (inner, true),
            _ => (self, false),
        }
    }

    pub fn contains_stream(&self) -> bool {
        match self {
            TypeExpr::Named(_) => false,
            TypeExpr::Stream(_) => true,
            TypeExpr::List(element) => element.contains_stream(),
            TypeExpr::Map(key, value) => key.contains_stream() || value.contains_stream(),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = DeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DeclarationError::InvalidTypeExpression(s.to_string());

        if let Some(inner) = strip_wrapper(s, "list") {
            return Ok(TypeExpr::List(Box::new(inner.parse()?)));
        }
        if let Some(inner) = strip_wrapper(s, "stream") {
            return Ok(TypeExpr::Stream(Box::new(inner.parse()?)));
        }
        if let Some(inner) = strip_wrapper(s, "map") {
            let (key, value) = split_top_level_comma(inner).ok_or_else(invalid)?;
            return Ok(TypeExpr::Map(
                Box::new(key.parse()?),
                Box::new(value.parse()?),
            ));
        }

        if QUALIFIED_NAME.is_match(s) {
            Ok(TypeExpr::Named(s.to_string()))
        } else {
            Err(invalid())
        }
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = DeclarationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

fn strip_wrapper<'a>(s: &'a str, wrapper: &str) -> Option<&'a str> {
    s.strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

fn split_top_level_comma(s: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut split_at = None;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                if split_at.is_some() {
                    return None;
                }
                split_at = Some(i);
            }
            _ => {}
        }
    }

    split_at.map(|i| (&s[..i], &s[i + 1..]))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub number: Option<FieldNumber>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
    /// Name of the oneof group this field belongs to
    #[serde(default)]
    pub oneof: Option<String>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            number: None,
            description: None,
            options: Options::default(),
            oneof: None,
        }
    }

    pub fn with_number(mut self, number: FieldNumber) -> Self {
        self.number = Some(number);
        self
    }

    pub fn in_oneof(mut self, oneof: impl Into<String>) -> Self {
        self.oneof = Some(oneof.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Metadata attached to a oneof group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OneOfDecl {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDecl {
    pub name: String,
    /// Declaring file. A message that does not report one cannot be referenced.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub reserved: Vec<Reserved>,
    /// Base messages whose fields are inherited
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub oneofs: Vec<OneOfDecl>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl MessageDecl {
    pub fn new(name: impl Into<String>, package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: Some(file.into()),
            package: package.into(),
            description: None,
            options: Options::default(),
            reserved: vec![],
            extends: vec![],
            oneofs: vec![],
            fields: vec![],
        }
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.extends.push(base.into());
        self
    }

    pub fn reserved(mut self, reserved: Reserved) -> Self {
        self.reserved.push(reserved);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDecl {
    pub name: String,
    #[serde(default)]
    pub number: Option<FieldNumber>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
}

impl EnumValueDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: None,
            description: None,
            options: Options::default(),
        }
    }

    pub fn with_number(mut self, number: FieldNumber) -> Self {
        self.number = Some(number);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub reserved: Vec<Reserved>,
    #[serde(default)]
    pub values: Vec<EnumValueDecl>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>, package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: Some(file.into()),
            package: package.into(),
            description: None,
            options: Options::default(),
            reserved: vec![],
            values: vec![],
        }
    }

    pub fn value(mut self, value: EnumValueDecl) -> Self {
        self.values.push(value);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgumentDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    /// Injected arguments are resolved at serve time and are not part of the request
    #[serde(default)]
    pub injected: bool,
}

impl ArgumentDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            injected: false,
        }
    }

    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub arguments: Vec<ArgumentDecl>,
    #[serde(default)]
    pub returns: Option<TypeExpr>,
    #[serde(default)]
    pub callable: CallableKind,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            options: Options::default(),
            arguments: vec![],
            returns: None,
            callable: CallableKind::Function,
        }
    }

    pub fn argument(mut self, argument: ArgumentDecl) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn returns(mut self, ty: TypeExpr) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn callable(mut self, callable: CallableKind) -> Self {
        self.callable = callable;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDecl {
    pub name: String,
    pub file: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ServiceDecl {
    pub fn new(name: impl Into<String>, package: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            package: package.into(),
            description: None,
            options: Options::default(),
            methods: vec![],
        }
    }

    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// Every declaration of one compilation run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationRegistry {
    #[serde(default)]
    pub messages: Vec<MessageDecl>,
    #[serde(default)]
    pub enums: Vec<EnumDecl>,
    #[serde(default)]
    pub services: Vec<ServiceDecl>,
}

impl DeclarationRegistry {
    pub fn from_json_str(json: &str) -> Result<Self, DeclarationError> {
        serde_json::from_str(json).map_err(|e| DeclarationError::Parse(e.to_string()))
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, DeclarationError> {
        toml::from_str(toml_str).map_err(|e| DeclarationError::Parse(e.to_string()))
    }

    pub fn add_message(&mut self, message: MessageDecl) -> &mut Self {
        self.messages.push(message);
        self
    }

    pub fn add_enum(&mut self, enum_decl: EnumDecl) -> &mut Self {
        self.enums.push(enum_decl);
        self
    }

    pub fn add_service(&mut self, service: ServiceDecl) -> &mut Self {
        self.services.push(service);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OptionValue;
    use multiplatform_test::multiplatform_test;

    fn named(name: &str) -> Box<TypeExpr> {
        Box::new(TypeExpr::named(name))
    }

    #[multiplatform_test]
    fn parse_type_expressions() {
        assert_eq!("int32".parse(), Ok(TypeExpr::named("int32")));
        assert_eq!(" account.User ".parse(), Ok(TypeExpr::named("account.User")));
        assert_eq!("list<User>".parse(), Ok(TypeExpr::List(named("User"))));
        assert_eq!(
            "map<string, list<User>>".parse(),
            Ok(TypeExpr::Map(
                named("string"),
                Box::new(TypeExpr::List(named("User")))
            ))
        );
        assert_eq!(
            "stream<Event>".parse::<TypeExpr>().map(|t| t.contains_stream()),
            Ok(true)
        );
    }

    #[multiplatform_test]
    fn reject_malformed_type_expressions() {
        for bad in ["", "list<", "map<string>", "map<a, b, c>", "User-Info", "list<>", "1abc"] {
            assert!(bad.parse::<TypeExpr>().is_err(), "{bad} should not parse");
        }
    }

    #[multiplatform_test]
    fn load_json_registry() {
        let registry = DeclarationRegistry::from_json_str(
            r#"{
                "messages": [{
                    "name": "User",
                    "file": "user",
                    "package": "account",
                    "options": {"deprecated": true, "(my.opt)": {"literal": "FAST"}},
                    "reserved": [1, {"start": 3, "end": 5}, "legacy"],
                    "fields": [
                        {"name": "id", "type": "int64"},
                        {"name": "tags", "type": "list<string>", "number": 7}
                    ]
                }],
                "services": [{
                    "name": "UserService",
                    "file": "service",
                    "package": "account",
                    "methods": [{
                        "name": "watch",
                        "arguments": [{"name": "request", "type": "User"}],
                        "returns": "stream<User>",
                        "callable": "async_generator"
                    }]
                }]
            }"#,
        )
        .unwrap();

        let user = &registry.messages[0];
        assert_eq!(user.fields[1].ty, TypeExpr::List(named("string")));
        assert_eq!(user.fields[1].number, Some(7));
        assert_eq!(
            user.reserved,
            vec![
                Reserved::Number(1),
                Reserved::Range { start: 3, end: 5 },
                Reserved::Name("legacy".to_string())
            ]
        );
        assert_eq!(user.options["deprecated"], OptionValue::Bool(true));
        assert_eq!(
            user.options["(my.opt)"],
            OptionValue::Literal {
                literal: "FAST".to_string()
            }
        );

        let method = &registry.services[0].methods[0];
        assert_eq!(method.callable, CallableKind::AsyncGenerator);
        assert_eq!(method.returns, Some(TypeExpr::Stream(named("User"))));
    }

    #[multiplatform_test]
    fn bad_type_in_json_is_a_parse_error() {
        let result = DeclarationRegistry::from_json_str(
            r#"{"messages": [{"name": "User", "fields": [{"name": "id", "type": "list<"}]}]}"#,
        );
        assert!(matches!(result, Err(DeclarationError::Parse(_))));
    }
}
