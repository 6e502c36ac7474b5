// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Diagnostics collected while compiling blocks.
//!
//! Every top-level block owns one [`CompileReport`]. Passes never fail on bad input; they append
//! [`CompileError`]s to the report of the block being visited, so that a single run surfaces every
//! problem.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorFamily {
    Naming,
    Numbering,
    Structure,
    Description,
    Option,
    OneOf,
    Reserved,
    Import,
    Method,
    Setter,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Naming
    DuplicateName,
    InvalidName,
    ReservedName,

    // Field numbering
    DuplicateIndex,
    ReservedIndex,
    IndexOutOfRange,
    ProtocolReservedIndex,

    // Block structure
    EmptyEnum,
    EnumMissingZero,
    EmptyOneOf,
    FieldNotLinked,
    InvalidType,
    InvalidMapKey,

    // Description and options
    InvalidDescription,
    InvalidOptionName,
    InvalidOptionValue,

    // Oneof groups
    OneOfRepeatedField,
    OneOfKeyMismatch,

    // Reserved declarations
    InvalidReservedRange,
    InvalidReservedName,
    DuplicateReserved,

    // Import resolution
    ImportNotFound,

    // Method signatures
    MissingRequestType,
    DuplicateRequestType,
    MixedRequestType,
    InvalidRequestType,
    MissingResponseType,
    InvalidResponseType,
    ResponseNotGenerator,

    SetterPassError,
    Custom,
}

impl ErrorCode {
    pub fn id(&self) -> &'static str {
        match self {
            ErrorCode::DuplicateName => "DUPLICATE_NAME",
            ErrorCode::InvalidName => "INVALID_NAME",
            ErrorCode::ReservedName => "RESERVED_NAME",
            ErrorCode::DuplicateIndex => "DUPLICATE_INDEX",
            ErrorCode::ReservedIndex => "RESERVED_INDEX",
            ErrorCode::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            ErrorCode::ProtocolReservedIndex => "PROTOCOL_RESERVED_INDEX",
            ErrorCode::EmptyEnum => "EMPTY_ENUM",
            ErrorCode::EnumMissingZero => "ENUM_MISSING_ZERO",
            ErrorCode::EmptyOneOf => "EMPTY_ONEOF",
            ErrorCode::FieldNotLinked => "FIELD_NOT_LINKED",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidMapKey => "INVALID_MAP_KEY",
            ErrorCode::InvalidDescription => "INVALID_DESCRIPTION",
            ErrorCode::InvalidOptionName => "INVALID_OPTION_NAME",
            ErrorCode::InvalidOptionValue => "INVALID_OPTION_VALUE",
            ErrorCode::OneOfRepeatedField => "ONEOF_REPEATED_FIELD",
            ErrorCode::OneOfKeyMismatch => "ONEOF_KEY_MISMATCH",
            ErrorCode::InvalidReservedRange => "INVALID_RESERVED_RANGE",
            ErrorCode::InvalidReservedName => "INVALID_RESERVED_NAME",
            ErrorCode::DuplicateReserved => "DUPLICATE_RESERVED",
            ErrorCode::ImportNotFound => "IMPORT_NOT_FOUND",
            ErrorCode::MissingRequestType => "MISSING_REQUEST_TYPE",
            ErrorCode::DuplicateRequestType => "DUPLICATE_REQUEST_TYPE",
            ErrorCode::MixedRequestType => "MIXED_REQUEST_TYPE",
            ErrorCode::InvalidRequestType => "INVALID_REQUEST_TYPE",
            ErrorCode::MissingResponseType => "MISSING_RESPONSE_TYPE",
            ErrorCode::InvalidResponseType => "INVALID_RESPONSE_TYPE",
            ErrorCode::ResponseNotGenerator => "RESPONSE_NOT_GENERATOR",
            ErrorCode::SetterPassError => "SETTER_PASS_ERROR",
            ErrorCode::Custom => "CUSTOM",
        }
    }

    pub fn family(&self) -> ErrorFamily {
        match self {
            ErrorCode::DuplicateName | ErrorCode::InvalidName | ErrorCode::ReservedName => {
                ErrorFamily::Naming
            }
            ErrorCode::DuplicateIndex
            | ErrorCode::ReservedIndex
            | ErrorCode::IndexOutOfRange
            | ErrorCode::ProtocolReservedIndex => ErrorFamily::Numbering,
            ErrorCode::EmptyEnum
            | ErrorCode::EnumMissingZero
            | ErrorCode::EmptyOneOf
            | ErrorCode::FieldNotLinked
            | ErrorCode::InvalidType
            | ErrorCode::InvalidMapKey => ErrorFamily::Structure,
            ErrorCode::InvalidDescription => ErrorFamily::Description,
            ErrorCode::InvalidOptionName | ErrorCode::InvalidOptionValue => ErrorFamily::Option,
            ErrorCode::OneOfRepeatedField | ErrorCode::OneOfKeyMismatch => ErrorFamily::OneOf,
            ErrorCode::InvalidReservedRange
            | ErrorCode::InvalidReservedName
            | ErrorCode::DuplicateReserved => ErrorFamily::Reserved,
            ErrorCode::ImportNotFound => ErrorFamily::Import,
            ErrorCode::MissingRequestType
            | ErrorCode::DuplicateRequestType
            | ErrorCode::MixedRequestType
            | ErrorCode::InvalidRequestType
            | ErrorCode::MissingResponseType
            | ErrorCode::InvalidResponseType
            | ErrorCode::ResponseNotGenerator => ErrorFamily::Method,
            ErrorCode::SetterPassError => ErrorFamily::Setter,
            ErrorCode::Custom => ErrorFamily::Custom,
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub code: ErrorCode,
    /// Dotted path of the offending node (`Block.field`)
    pub location: String,
    pub message: String,
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.location, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Name of the top-level block this report belongs to
    pub name: String,
    pub errors: Vec<CompileError>,
}

impl CompileReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            errors: vec![],
        }
    }

    pub fn report(
        &mut self,
        code: ErrorCode,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(CompileError {
            code,
            location: location.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    pub fn count(&self, code: ErrorCode) -> usize {
        self.errors.iter().filter(|e| e.code == code).count()
    }
}

impl Display for CompileReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {} error(s)", self.name, self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}
