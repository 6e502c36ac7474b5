// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Read-only passes. Each validator appends diagnostics to the report of the top-level block it
//! is visiting and never touches the tree.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::compiler::CompilerPass;

mod custom;
mod description;
mod imports;
mod index;
mod names;
mod oneof;
mod options;
mod reserved;
mod structure;
mod types;

pub use custom::{CustomCheck, CustomValidator};
pub use description::DescriptionValidator;
pub use imports::ImportValidator;
pub use index::IndexValidator;
pub use names::{BlockNameValidator, FieldNameValidator};
pub use oneof::OneOfValidator;
pub use options::OptionValidator;
pub use reserved::ReservedValidator;
pub use structure::StructureValidator;
pub use types::TypeValidator;

/// Every `(package, module)` pair declared anywhere in a compile run.
pub type KnownModules = Arc<BTreeSet<(String, String)>>;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()
});

/// Words that may not be used as a block, field or method name.
const RESERVED_WORDS: &[&str] = &[
    "syntax", "import", "weak", "public", "package", "option", "message", "enum", "service",
    "rpc", "returns", "stream", "oneof", "map", "repeated", "optional", "required", "reserved",
    "extensions", "extend", "to", "max", "group", "true", "false", "inf", "nan", "double",
    "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32", "fixed64",
    "sfixed32", "sfixed64", "bool", "string", "bytes",
];

pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub(crate) fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// The validator pass group, in execution order.
pub fn validators(
    known_modules: KnownModules,
    custom_checks: &[CustomCheck],
) -> Vec<Box<dyn CompilerPass>> {
    vec![
        Box::new(StructureValidator),
        Box::new(TypeValidator),
        Box::new(BlockNameValidator::default()),
        Box::new(FieldNameValidator::default()),
        Box::new(IndexValidator::default()),
        Box::new(ImportValidator::new(known_modules)),
        Box::new(DescriptionValidator),
        Box::new(OptionValidator),
        Box::new(OneOfValidator),
        Box::new(ReservedValidator),
        Box::new(CustomValidator::new(custom_checks.to_vec())),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn identifiers() {
        assert!(is_identifier("user_id"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("user-id"));
        assert!(!is_identifier(""));
    }

    #[multiplatform_test]
    fn reserved_words() {
        assert!(is_reserved_word("message"));
        assert!(is_reserved_word("int32"));
        assert!(!is_reserved_word("Message"));
    }
}
