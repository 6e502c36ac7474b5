// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use multiplatform_test::multiplatform_test;

use proto_builder::ast::{
    Block, BlockBase, Field, MessageBlock, MessageChild, Reserved, ResolvedType, TypeRef,
};
use proto_builder::builder::PackageBlocks;
use proto_builder::declaration::{
    ArgumentDecl, DeclarationError, EnumDecl, EnumValueDecl, FieldDecl, MessageDecl, MethodDecl,
    ServiceDecl, TypeExpr,
};
use proto_builder::settings::NameCase;
use proto_builder::{
    DeclarationRegistry, ErrorCode, ProtoBuildError, ProtoCompiler, Settings, make_protos,
};

fn field(name: &str, ty: &str) -> FieldDecl {
    FieldDecl::new(name, ty.parse::<TypeExpr>().unwrap())
}

fn failing(registry: &DeclarationRegistry) -> Vec<(String, Vec<ErrorCode>)> {
    failing_with(registry, Settings::default())
}

fn failing_with(registry: &DeclarationRegistry, settings: Settings) -> Vec<(String, Vec<ErrorCode>)> {
    match make_protos(registry, settings) {
        Err(ProtoBuildError::Compilation(reports)) => reports
            .into_iter()
            .map(|report| (report.name.clone(), report.codes()))
            .collect(),
        other => panic!("Expected a compilation failure, got {other:?}"),
    }
}

#[multiplatform_test]
fn two_enum_values_numbered_zero() {
    let mut registry = DeclarationRegistry::default();
    registry.add_enum(
        EnumDecl::new("Status", "orders", "status")
            .value(EnumValueDecl::new("UNKNOWN").with_number(0))
            .value(EnumValueDecl::new("PENDING").with_number(0)),
    );

    assert_eq!(
        failing(&registry),
        vec![("Status".to_string(), vec![ErrorCode::DuplicateIndex])]
    );
}

#[multiplatform_test]
fn keyword_field_name() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(
        MessageDecl::new("Envelope", "mail", "envelope").field(field("message", "string")),
    );

    assert_eq!(
        failing(&registry),
        vec![("Envelope".to_string(), vec![ErrorCode::ReservedName])]
    );
}

#[multiplatform_test]
fn reference_to_an_unknown_module() {
    let owner = Field::new(
        "owner",
        ResolvedType::Message(TypeRef::new("Owner", "ghost", "owner")),
    )
    .in_block("Order");

    let packages = vec![PackageBlocks {
        package: "shop".to_string(),
        blocks: vec![Block::Message(MessageBlock {
            base: BlockBase::new("Order", "shop", "order"),
            children: vec![MessageChild::Field(owner)],
        })],
    }];

    let err = ProtoCompiler::new(Settings::default())
        .compile(packages)
        .unwrap_err();

    let reports = err.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].name, "Order");
    assert_eq!(reports[0].codes(), vec![ErrorCode::ImportNotFound]);
    assert_eq!(reports[0].errors[0].location, "Order.owner");
}

#[multiplatform_test]
fn every_failing_block_is_reported() {
    let mut registry = DeclarationRegistry::default();
    registry
        .add_message(
            MessageDecl::new("Valid", "orders", "valid").field(field("id", "int64")),
        )
        .add_message(
            MessageDecl::new("Order", "orders", "order")
                .field(field("id", "int64").with_number(1))
                .field(field("code", "string").with_number(1)),
        )
        .add_message(
            MessageDecl::new("Invoice", "billing", "invoice")
                .field(field("total", "Unknown"))
                .field(field("lines", "list<list<string>>")),
        )
        .add_enum(EnumDecl::new("Empty", "billing", "invoice"));

    assert_eq!(
        failing(&registry),
        vec![
            ("Order".to_string(), vec![ErrorCode::DuplicateIndex]),
            (
                "Invoice".to_string(),
                vec![ErrorCode::InvalidType, ErrorCode::InvalidType]
            ),
            ("Empty".to_string(), vec![ErrorCode::EmptyEnum]),
        ]
    );
}

#[multiplatform_test]
fn duplicate_block_names_in_a_package() {
    let mut registry = DeclarationRegistry::default();
    registry
        .add_message(MessageDecl::new("Item", "shop", "item").field(field("id", "int64")))
        .add_service(ServiceDecl::new("Item", "shop", "item_service"));

    assert_eq!(
        failing(&registry),
        vec![("Item".to_string(), vec![ErrorCode::DuplicateName])]
    );
}

#[multiplatform_test]
fn method_signatures() {
    let mut registry = DeclarationRegistry::default();
    registry
        .add_message(MessageDecl::new("Query", "search", "search").field(field("text", "string")))
        .add_service(
            ServiceDecl::new("Search", "search", "search_service")
                .method(MethodDecl::new("Nothing").returns("Query".parse().unwrap()))
                .method(
                    MethodDecl::new("Scalar")
                        .argument(ArgumentDecl::new("text", "string".parse().unwrap()))
                        .returns("Query".parse().unwrap()),
                )
                .method(
                    MethodDecl::new("Live")
                        .argument(ArgumentDecl::new("query", "Query".parse().unwrap()))
                        .returns("stream<Query>".parse().unwrap()),
                ),
        );

    assert_eq!(
        failing(&registry),
        vec![(
            "Search".to_string(),
            vec![
                ErrorCode::MissingRequestType,
                ErrorCode::InvalidRequestType,
                ErrorCode::ResponseNotGenerator,
            ]
        )]
    );
}

#[multiplatform_test]
fn names_colliding_after_normalization() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(
        MessageDecl::new("User", "account", "user")
            .field(field("userName", "string"))
            .field(field("user_name", "string")),
    );

    let settings = Settings {
        name_case: NameCase::Snake,
        ..Settings::default()
    };

    assert_eq!(
        failing_with(&registry, settings),
        vec![("User".to_string(), vec![ErrorCode::SetterPassError])]
    );
}

#[multiplatform_test]
fn name_normalized_onto_a_reserved_name() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(
        MessageDecl::new("Profile", "account", "profile")
            .reserved(Reserved::Name("old_name".to_string()))
            .field(field("oldName", "string")),
    );

    let settings = Settings {
        name_case: NameCase::Snake,
        ..Settings::default()
    };

    assert_eq!(
        failing_with(&registry, settings),
        vec![("Profile".to_string(), vec![ErrorCode::SetterPassError])]
    );
}

#[multiplatform_test]
fn no_field_number_left_after_reservations() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(
        MessageDecl::new("Sparse", "events", "sparse")
            .reserved(Reserved::Range {
                start: 1,
                end: 536_870_911,
            })
            .field(field("late", "string")),
    );

    assert_eq!(
        failing(&registry),
        vec![("Sparse".to_string(), vec![ErrorCode::SetterPassError])]
    );
}

#[multiplatform_test]
fn declaration_errors() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(MessageDecl::new("Admin", "account", "admin").extends("Person"));

    assert!(matches!(
        make_protos(&registry, Settings::default()),
        Err(ProtoBuildError::Declaration(DeclarationError::UnknownBase { .. }))
    ));
}

#[multiplatform_test]
fn check_reports_without_rendering() {
    let mut registry = DeclarationRegistry::default();
    registry.add_message(
        MessageDecl::new("Envelope", "mail", "envelope").field(field("message", "string")),
    );

    let err = ProtoCompiler::new(Settings::default())
        .check(&registry)
        .unwrap_err();
    assert_eq!(err.reports().len(), 1);
}
