// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, FieldKind, NO_PACKAGE, ResolvedType, TypeRef};
use crate::compiler::pass::recover;
use crate::compiler::{CompilerContext, CompilerPass, SetterError};
use crate::settings::NameCase;

/// Renders field and method types as IDL text.
///
/// Types of the package being compiled are written by bare name, other packages by qualified
/// name (`.Name` for types without a package).
#[derive(Default)]
pub struct TypeStringSetter {
    case: NameCase,
    package: String,
}

impl TypeStringSetter {
    fn type_name(&self, type_ref: &TypeRef) -> String {
        let name = self.case.apply(&type_ref.name);

        if type_ref.package == self.package {
            name
        } else if type_ref.package == NO_PACKAGE {
            format!(".{name}")
        } else {
            format!("{}.{name}", type_ref.package)
        }
    }

    fn render(&self, ftype: &ResolvedType) -> Result<String, SetterError> {
        match ftype {
            ResolvedType::Primitive(primitive) => Ok(primitive.name().to_string()),
            ResolvedType::Message(type_ref) | ResolvedType::Enum(type_ref) => {
                Ok(self.type_name(type_ref))
            }
            ResolvedType::List(element) if !element.is_container() => {
                Ok(format!("repeated {}", self.render(element)?))
            }
            ResolvedType::Map(key, value) if !value.is_container() => Ok(format!(
                "map<{}, {}>",
                self.render(key)?,
                self.render(value)?
            )),
            ResolvedType::List(_) | ResolvedType::Map(_, _) => Err(SetterError::Generic(format!(
                "Nested container type '{ftype}' cannot be rendered"
            ))),
            ResolvedType::Unresolved(name) => Err(SetterError::UnresolvedType(name.clone())),
        }
    }

    fn render_stream(&self, ftype: &ResolvedType, stream: bool) -> Result<String, SetterError> {
        let text = self.render(ftype)?;
        Ok(if stream { format!("stream {text}") } else { text })
    }
}

impl CompilerPass for TypeStringSetter {
    fn name(&self) -> &'static str {
        "type-string"
    }

    fn set_default(&mut self, ctx: &CompilerContext) {
        self.case = ctx.settings.name_case;
        self.package = ctx.package.clone();
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let block_name = block.name().to_string();

        for field in block.fields_mut() {
            if field.kind == FieldKind::EnumValue {
                continue;
            }

            let location = format!("{block_name}.{}", field.name());
            let result = match &field.ftype {
                Some(ftype) => self.render(ftype),
                None => Err(SetterError::Generic(format!(
                    "Field '{}' has no type",
                    field.name()
                ))),
            };

            field.node.projection.type_text = recover(ctx, &block_name, &location, result);
        }

        if let Block::Service(service) = block {
            for method in service.methods.iter_mut() {
                let location = format!("{block_name}.{}", method.name());

                let request = match method.request() {
                    Some(request) => self.render_stream(&request.ty, request.stream),
                    None => Err(SetterError::Generic(format!(
                        "Method '{}' does not have exactly one request type",
                        method.name()
                    ))),
                };
                let response = match &method.response_type {
                    Some(response) => self.render_stream(response, method.response_stream),
                    None => Err(SetterError::Generic(format!(
                        "Method '{}' has no response type",
                        method.name()
                    ))),
                };

                method.node.projection.type_text = recover(ctx, &block_name, &location, request);
                method.node.projection.response_text =
                    recover(ctx, &block_name, &location, response);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        BlockBase, CallableKind, Field, MessageBlock, MessageChild, Method, Node, PrimitiveType,
        RequestType, ServiceBlock,
    };
    use crate::report::ErrorCode;
    use crate::settings::Settings;
    use multiplatform_test::multiplatform_test;

    fn type_texts(block: &Block) -> Vec<Option<String>> {
        block
            .fields()
            .into_iter()
            .map(|f| f.node.projection.type_text.clone())
            .collect()
    }

    #[multiplatform_test]
    fn field_types() {
        let local = ResolvedType::Message(TypeRef::new("Address", "account", "address"));
        let remote = ResolvedType::Enum(TypeRef::new("Currency", "common", "money"));
        let global = ResolvedType::Message(TypeRef::new("Empty", NO_PACKAGE, "empty"));
        let string = ResolvedType::Primitive(PrimitiveType::String);

        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("User", "account", "user"),
            children: vec![
                MessageChild::Field(Field::new("name", string.clone())),
                MessageChild::Field(Field::new("address", local.clone())),
                MessageChild::Field(Field::new("currency", remote)),
                MessageChild::Field(Field::new("nothing", global)),
                MessageChild::Field(Field::new("past", ResolvedType::list(local.clone()))),
                MessageChild::Field(Field::new("by_name", ResolvedType::map(string, local))),
            ],
        })];

        let mut ctx = CompilerContext::new("account", Settings::default());
        TypeStringSetter::default().execute(&mut blocks, &mut ctx);

        assert!(!ctx.has_errors());
        assert_eq!(
            type_texts(&blocks[0]),
            vec![
                Some("string".to_string()),
                Some("Address".to_string()),
                Some("common.Currency".to_string()),
                Some(".Empty".to_string()),
                Some("repeated Address".to_string()),
                Some("map<string, Address>".to_string()),
            ]
        );
    }

    #[multiplatform_test]
    fn unresolved_type_becomes_a_diagnostic() {
        let mut blocks = vec![Block::Message(MessageBlock {
            base: BlockBase::new("User", "account", "user"),
            children: vec![
                MessageChild::Field(Field::new(
                    "ghost",
                    ResolvedType::Unresolved("Ghost".to_string()),
                )),
                MessageChild::Field(Field::new(
                    "id",
                    ResolvedType::Primitive(PrimitiveType::Int64),
                )),
            ],
        })];

        let mut ctx = CompilerContext::new("account", Settings::default());
        TypeStringSetter::default().execute(&mut blocks, &mut ctx);

        assert_eq!(
            ctx.report("User").codes(),
            vec![ErrorCode::SetterPassError]
        );
        assert_eq!(
            type_texts(&blocks[0]),
            vec![None, Some("int64".to_string())]
        );
    }

    #[multiplatform_test]
    fn method_types() {
        let request = ResolvedType::Message(TypeRef::new("GetUser", "account", "user"));
        let response = ResolvedType::Message(TypeRef::new("User", "account", "user"));

        let mut blocks = vec![Block::Service(ServiceBlock {
            base: BlockBase::new("UserService", "account", "service"),
            methods: vec![Method {
                node: Node::new("Watch"),
                request_types: vec![RequestType {
                    ty: request,
                    stream: true,
                }],
                response_type: Some(response),
                response_stream: true,
                method_func: CallableKind::AsyncGenerator,
            }],
        })];

        let mut ctx = CompilerContext::new("account", Settings::default());
        TypeStringSetter::default().execute(&mut blocks, &mut ctx);

        let Block::Service(service) = &blocks[0] else {
            panic!("expected a service");
        };
        let projection = &service.methods[0].node.projection;
        assert_eq!(projection.type_text.as_deref(), Some("stream GetUser"));
        assert_eq!(projection.response_text.as_deref(), Some("stream User"));
    }
}
