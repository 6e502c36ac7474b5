// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::{Block, CallableKind, FieldKind, Method, ResolvedType};
use crate::compiler::{CompilerContext, CompilerPass};
use crate::report::{CompileReport, ErrorCode};

/// Type legality of fields and method signatures.
pub struct TypeValidator;

impl CompilerPass for TypeValidator {
    fn name(&self) -> &'static str {
        "types"
    }

    fn visit_block(&mut self, block: &mut Block, ctx: &mut CompilerContext) {
        let block_name = block.name().to_string();
        let report = ctx.report(&block_name);

        for (location, field) in block.located_fields() {
            match (&field.kind, &field.ftype) {
                (FieldKind::EnumValue, Some(ftype)) => report.report(
                    ErrorCode::InvalidType,
                    location,
                    format!("Enum values carry no type, found '{ftype}'"),
                ),
                (FieldKind::EnumValue, None) => {}
                (_, None) => report.report(ErrorCode::InvalidType, location, "Field has no type"),
                (_, Some(ftype)) => check_field_type(ftype, &location, report),
            }
        }

        if let Block::Service(service) = block {
            for method in &service.methods {
                check_method(method, &format!("{block_name}.{}", method.name()), report);
            }
        }
    }
}

fn check_field_type(ftype: &ResolvedType, location: &str, report: &mut CompileReport) {
    match ftype {
        ResolvedType::List(element) => {
            if element.is_container() {
                report.report(
                    ErrorCode::InvalidType,
                    location,
                    format!("List elements cannot be containers, found '{element}'"),
                );
            } else {
                check_leaf_type(element, location, report);
            }
        }
        ResolvedType::Map(key, value) => {
            match key.as_ref() {
                ResolvedType::Primitive(primitive) if primitive.is_map_key() => {}
                _ => report.report(
                    ErrorCode::InvalidMapKey,
                    location,
                    format!("'{key}' cannot be used as a map key"),
                ),
            }
            if value.is_container() {
                report.report(
                    ErrorCode::InvalidType,
                    location,
                    format!("Map values cannot be containers, found '{value}'"),
                );
            } else {
                check_leaf_type(value, location, report);
            }
        }
        _ => check_leaf_type(ftype, location, report),
    }
}

fn check_leaf_type(ftype: &ResolvedType, location: &str, report: &mut CompileReport) {
    match ftype {
        ResolvedType::Primitive(_) => {}
        ResolvedType::Message(type_ref) | ResolvedType::Enum(type_ref) => {
            if type_ref.file.is_none() {
                report.report(
                    ErrorCode::InvalidType,
                    location,
                    format!("Type '{}' does not report its file", type_ref.name),
                );
            }
        }
        ResolvedType::Unresolved(name) => report.report(
            ErrorCode::InvalidType,
            location,
            format!("Unknown type '{name}'"),
        ),
        ResolvedType::List(_) | ResolvedType::Map(_, _) => report.report(
            ErrorCode::InvalidType,
            location,
            format!("Unexpected container type '{ftype}'"),
        ),
    }
}

fn is_message_with_file(ftype: &ResolvedType) -> bool {
    matches!(ftype, ResolvedType::Message(type_ref) if type_ref.file.is_some())
}

fn check_method(method: &Method, location: &str, report: &mut CompileReport) {
    match method.request_types.as_slice() {
        [] => report.report(
            ErrorCode::MissingRequestType,
            location,
            "Method has no request type",
        ),
        [request] => {
            if !is_message_with_file(&request.ty) {
                report.report(
                    ErrorCode::InvalidRequestType,
                    location,
                    format!("Request type '{}' is not a message", request.ty),
                );
            }
        }
        requests => {
            let streamed = requests.iter().filter(|r| r.stream).count();
            if streamed > 0 && streamed < requests.len() {
                report.report(
                    ErrorCode::MixedRequestType,
                    location,
                    "Method mixes streamed and plain request types",
                );
            } else {
                report.report(
                    ErrorCode::DuplicateRequestType,
                    location,
                    format!("Method has {} request types, expected one", requests.len()),
                );
            }
        }
    }

    match &method.response_type {
        None => report.report(
            ErrorCode::MissingResponseType,
            location,
            "Method has no response type",
        ),
        Some(response) => {
            if !is_message_with_file(response) {
                report.report(
                    ErrorCode::InvalidResponseType,
                    location,
                    format!("Response type '{response}' is not a message"),
                );
            }
            if method.response_stream && method.method_func != CallableKind::AsyncGenerator {
                report.report(
                    ErrorCode::ResponseNotGenerator,
                    location,
                    "Streamed responses require an async generator",
                );
            }
        }
    }
}
