// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub mod block;
pub mod node;
pub mod types;

pub use block::{
    Block, BlockBase, BlockKind, EnumBlock, MessageBlock, MessageChild, OneOfBlock, ServiceBlock,
};
pub use node::{
    CallableKind, Comment, Field, FieldKind, FieldNumber, Method, Node, OptionValue, Options,
    Projection, RequestType, Reserved,
};
pub use types::{NO_PACKAGE, PrimitiveType, ResolvedType, TypeRef, module_name};
