// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::declaration::DeclarationError;
use crate::report::CompileReport;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum ProtoBuildError {
    // Don't include the reports, because callers display each of them
    #[error("Could not compile proto declarations ({} failing block(s))", .0.len())]
    Compilation(Vec<CompileReport>),

    #[error("{0}")]
    Declaration(#[from] DeclarationError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("Could not render module '{module}': {message}")]
    Render { module: String, message: String },
}

impl ProtoBuildError {
    /// The failing reports of a compilation error (empty for any other error).
    pub fn reports(&self) -> &[CompileReport] {
        match self {
            ProtoBuildError::Compilation(reports) => reports,
            _ => &[],
        }
    }
}
