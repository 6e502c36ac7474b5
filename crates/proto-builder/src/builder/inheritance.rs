// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use crate::declaration::{DeclarationError, FieldDecl, MessageDecl, OneOfDecl};

use super::resolve::{TypeIndex, TypeKind};

/// A field together with the package its type expression is written in (a base message may
/// live in another package).
#[derive(Debug, Clone)]
pub(super) struct InheritedField {
    pub decl: FieldDecl,
    pub package: String,
}

#[derive(Debug, Default)]
pub(super) struct FlatMessage {
    pub fields: Vec<InheritedField>,
    pub oneofs: Vec<OneOfDecl>,
}

impl FlatMessage {
    fn merge(&mut self, message: &MessageDecl) {
        for decl in &message.fields {
            let field = InheritedField {
                decl: decl.clone(),
                package: message.package.clone(),
            };
            match self.fields.iter_mut().find(|f| f.decl.name == decl.name) {
                Some(existing) => *existing = field,
                None => self.fields.push(field),
            }
        }

        for oneof in &message.oneofs {
            match self.oneofs.iter_mut().find(|o| o.name == oneof.name) {
                Some(existing) => *existing = oneof.clone(),
                None => self.oneofs.push(oneof.clone()),
            }
        }
    }
}

pub(super) type MessagesByKey<'a> = IndexMap<(String, String), &'a MessageDecl>;

/// The fields of `message` with those of its bases: base fields first, in base order, and a
/// redeclared field replacing the inherited one in place.
pub(super) fn flatten(
    message: &MessageDecl,
    messages: &MessagesByKey,
    index: &TypeIndex,
) -> Result<FlatMessage, DeclarationError> {
    let mut flat = FlatMessage::default();
    flatten_into(message, messages, index, &mut vec![], &mut flat)?;
    Ok(flat)
}

fn flatten_into(
    message: &MessageDecl,
    messages: &MessagesByKey,
    index: &TypeIndex,
    stack: &mut Vec<(String, String)>,
    flat: &mut FlatMessage,
) -> Result<(), DeclarationError> {
    let key = (message.package.clone(), message.name.clone());
    if stack.contains(&key) {
        return Err(DeclarationError::InheritanceCycle(message.name.clone()));
    }
    stack.push(key);

    for base_name in &message.extends {
        let base = match index.lookup(base_name, &message.package) {
            Some((TypeKind::Message, type_ref)) => messages
                .get(&(type_ref.package.clone(), type_ref.name.clone()))
                .copied(),
            _ => None,
        }
        .ok_or_else(|| DeclarationError::UnknownBase {
            message: message.name.clone(),
            base: base_name.clone(),
        })?;

        flatten_into(base, messages, index, stack, flat)?;
    }

    flat.merge(message);
    stack.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DeclarationRegistry, TypeExpr};
    use multiplatform_test::multiplatform_test;

    fn field(name: &str, ty: &str) -> FieldDecl {
        FieldDecl::new(name, TypeExpr::named(ty))
    }

    fn flatten_named(registry: &DeclarationRegistry, name: &str) -> Result<FlatMessage, DeclarationError> {
        let index = TypeIndex::new(registry)?;
        let messages: MessagesByKey = registry
            .messages
            .iter()
            .map(|m| ((m.package.clone(), m.name.clone()), m))
            .collect();
        let message = registry.messages.iter().find(|m| m.name == name).unwrap();
        flatten(message, &messages, &index)
    }

    #[multiplatform_test]
    fn base_fields_first_and_overrides_in_place() {
        let mut registry = DeclarationRegistry::default();
        registry
            .add_message(
                MessageDecl::new("Base", "common", "base")
                    .field(field("id", "int64"))
                    .field(field("created", "int64")),
            )
            .add_message(
                MessageDecl::new("User", "account", "user")
                    .extends("common.Base")
                    .field(field("name", "string"))
                    .field(field("id", "string")),
            );

        let flat = flatten_named(&registry, "User").unwrap();
        let fields: Vec<_> = flat
            .fields
            .iter()
            .map(|f| (f.decl.name.as_str(), f.package.as_str()))
            .collect();

        assert_eq!(
            fields,
            vec![("id", "account"), ("created", "common"), ("name", "account")]
        );
        assert_eq!(flat.fields[0].decl.ty, TypeExpr::named("string"));
    }

    #[multiplatform_test]
    fn unknown_base() {
        let mut registry = DeclarationRegistry::default();
        registry.add_message(MessageDecl::new("User", "account", "user").extends("Missing"));

        assert_eq!(
            flatten_named(&registry, "User").unwrap_err(),
            DeclarationError::UnknownBase {
                message: "User".to_string(),
                base: "Missing".to_string()
            }
        );
    }

    #[multiplatform_test]
    fn cycles() {
        let mut registry = DeclarationRegistry::default();
        registry
            .add_message(MessageDecl::new("A", "pkg", "a").extends("B"))
            .add_message(MessageDecl::new("B", "pkg", "a").extends("A"));

        assert!(matches!(
            flatten_named(&registry, "A"),
            Err(DeclarationError::InheritanceCycle(_))
        ));
    }
}
