// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Mutating passes. Setters run only on a tree that passed validation; they normalize names,
//! assign field numbers, collect imports and fill each node's rendering projection.

use crate::compiler::CompilerPass;

mod description;
mod imports;
mod index;
mod name_case;
mod options;
mod reserved;
mod type_string;

pub use description::DescriptionSetter;
pub use imports::ImportSetter;
pub use index::IndexSetter;
pub use name_case::NameCaseSetter;
pub use options::OptionSetter;
pub use reserved::ReservedSetter;
pub use type_string::TypeStringSetter;

/// The setter pass group, in execution order. Names are normalized before type strings are
/// derived from them.
pub fn setters() -> Vec<Box<dyn CompilerPass>> {
    vec![
        Box::new(NameCaseSetter::default()),
        Box::new(TypeStringSetter::default()),
        Box::new(IndexSetter),
        Box::new(ImportSetter),
        Box::new(DescriptionSetter::default()),
        Box::new(OptionSetter),
        Box::new(ReservedSetter),
    ]
}
