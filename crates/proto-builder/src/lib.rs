// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Compiles message, enum and service declarations into protocol-buffer IDL files.
//!
//! Declarations are turned into a tree of blocks (one set per package), checked by a group of
//! validators, decorated by a group of setters and rendered as one file per module. Either
//! group fails the whole run with every non-empty report.

pub mod ast;
pub mod builder;
mod compile;
pub mod compiler;
pub mod declaration;
pub mod error;
pub mod render;
pub mod report;
pub mod setter;
pub mod settings;
pub mod validator;

pub use compile::{ProtoCompiler, ProtoOutput, make_protos};
pub use declaration::DeclarationRegistry;
pub use error::ProtoBuildError;
pub use report::{CompileError, CompileReport, ErrorCode};
pub use settings::Settings;
