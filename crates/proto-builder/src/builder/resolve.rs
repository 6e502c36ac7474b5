// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use crate::ast::{NO_PACKAGE, PrimitiveType, ResolvedType, TypeRef};
use crate::declaration::{DeclarationError, DeclarationRegistry, TypeExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TypeKind {
    Message,
    Enum,
}

/// Every declared message and enum, keyed by `(package, name)`.
pub(super) struct TypeIndex {
    types: IndexMap<(String, String), (TypeKind, TypeRef)>,
}

impl TypeIndex {
    pub fn new(registry: &DeclarationRegistry) -> Result<Self, DeclarationError> {
        let messages = registry
            .messages
            .iter()
            .map(|m| (TypeKind::Message, &m.name, &m.package, &m.file));
        let enums = registry
            .enums
            .iter()
            .map(|e| (TypeKind::Enum, &e.name, &e.package, &e.file));

        let mut types = IndexMap::new();
        for (kind, name, package, file) in messages.chain(enums) {
            let type_ref = TypeRef {
                name: name.clone(),
                package: package.clone(),
                file: file.clone(),
            };
            let key = (package.clone(), name.clone());

            if types.insert(key, (kind, type_ref)).is_some() {
                return Err(DeclarationError::DuplicateType {
                    package: package.clone(),
                    name: name.clone(),
                });
            }
        }

        Ok(Self { types })
    }

    /// Find a declared type as seen from `package`.
    ///
    /// A qualified name (`pkg.Name`) must match exactly. A bare name is looked up in `package`,
    /// then among the types without a package, then by name if only one package declares it.
    pub fn lookup(&self, name: &str, package: &str) -> Option<&(TypeKind, TypeRef)> {
        if let Some((qualifier, short)) = name.rsplit_once('.') {
            return self.types.get(&(qualifier.to_string(), short.to_string()));
        }

        self.types
            .get(&(package.to_string(), name.to_string()))
            .or_else(|| self.types.get(&(NO_PACKAGE.to_string(), name.to_string())))
            .or_else(|| {
                let mut candidates = self.types.values().filter(|(_, r)| r.name == name);
                match (candidates.next(), candidates.next()) {
                    (Some(unique), None) => Some(unique),
                    _ => None,
                }
            })
    }

    fn resolve_name(&self, name: &str, package: &str) -> ResolvedType {
        if let Some(primitive) = PrimitiveType::from_name(name) {
            return ResolvedType::Primitive(primitive);
        }

        match self.lookup(name, package) {
            Some((TypeKind::Message, type_ref)) => ResolvedType::Message(type_ref.clone()),
            Some((TypeKind::Enum, type_ref)) => ResolvedType::Enum(type_ref.clone()),
            None => ResolvedType::Unresolved(name.to_string()),
        }
    }

    /// Resolve a type expression of a field or method signature. `owner` names the declaration
    /// for error messages. Stream wrappers must have been removed by the caller.
    pub fn resolve(
        &self,
        expr: &TypeExpr,
        package: &str,
        owner: &str,
    ) -> Result<ResolvedType, DeclarationError> {
        Ok(match expr {
            TypeExpr::Named(name) => self.resolve_name(name, package),
            TypeExpr::List(element) => ResolvedType::list(self.resolve(element, package, owner)?),
            TypeExpr::Map(key, value) => ResolvedType::map(
                self.resolve(key, package, owner)?,
                self.resolve(value, package, owner)?,
            ),
            TypeExpr::Stream(_) => return Err(DeclarationError::UnexpectedStream(owner.to_string())),
        })
    }
}
