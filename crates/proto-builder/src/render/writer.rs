// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::ast::Comment;

use super::model::{
    Definition, EnumDef, FieldDef, Header, MessageDef, MessageMember, MethodDef, OneOfDef,
    ProtoFile, ServiceDef,
};

const INDENT: &str = "  ";

/// Writes IDL text, tracking indentation.
#[derive(Default)]
pub struct ProtoWriter {
    out: String,
    level: usize,
}

impl ProtoWriter {
    pub fn render(file: &ProtoFile) -> String {
        let mut writer = ProtoWriter::default();
        writer.file(file);

        let mut text = writer.out.trim_end().to_string();
        text.push('\n');
        text
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn block(&mut self, opener: &str, body: impl FnOnce(&mut Self)) {
        self.line(&format!("{opener} {{"));
        self.level += 1;
        body(self);
        self.level -= 1;
        self.line("}");
    }

    fn comment(&mut self, comment: &Comment) {
        match comment {
            Comment::Line(text) => self.line(&format!("// {text}")),
            Comment::Block(lines) => {
                self.line("/*");
                for line in lines {
                    if line.is_empty() {
                        self.line(" *");
                    } else {
                        self.line(&format!(" * {line}"));
                    }
                }
                self.line(" */");
            }
            Comment::Verbatim(lines) => {
                for line in lines {
                    self.line(line);
                }
            }
        }
    }

    fn file(&mut self, file: &ProtoFile) {
        self.line(&format!("syntax = \"proto{}\";", file.version));

        if let Some(package) = &file.package {
            self.blank();
            self.line(&format!("package {package};"));
        }

        if !file.imports.is_empty() {
            self.blank();
            for import in &file.imports {
                self.line(&format!("import \"{import}\";"));
            }
        }

        for definition in &file.definitions {
            self.blank();
            match definition {
                Definition::Message(message) => self.message(message),
                Definition::Enum(e) => self.enumeration(e),
                Definition::Service(service) => self.service(service),
            }
        }
    }

    /// Options and reserved statements of a block, each group followed by a blank line if
    /// members come after it.
    fn header_body(&mut self, header: &Header, has_members: bool) {
        let sections = [
            header
                .options
                .iter()
                .map(|option| format!("option {option};"))
                .collect::<Vec<_>>(),
            header
                .reserved
                .iter()
                .map(|reserved| format!("reserved {reserved};"))
                .collect(),
        ];

        let mut first = true;
        for section in sections.iter().filter(|s| !s.is_empty()) {
            if !first {
                self.blank();
            }
            first = false;
            for line in section {
                self.line(line);
            }
        }

        if !first && has_members {
            self.blank();
        }
    }

    fn open(
        &mut self,
        keyword: &str,
        header: &Header,
        has_members: bool,
        body: impl FnOnce(&mut Self),
    ) {
        if let Some(comment) = &header.comment {
            self.comment(comment);
        }
        self.block(&format!("{keyword} {}", header.name), |w| {
            w.header_body(header, has_members);
            body(w);
        });
    }

    fn message(&mut self, message: &MessageDef) {
        self.open("message", &message.header, !message.members.is_empty(), |w| {
            for member in &message.members {
                match member {
                    MessageMember::Field(field) => w.field(field),
                    MessageMember::OneOf(oneof) => w.oneof(oneof),
                }
            }
        });
    }

    fn oneof(&mut self, oneof: &OneOfDef) {
        self.open("oneof", &oneof.header, !oneof.fields.is_empty(), |w| {
            for field in &oneof.fields {
                w.field(field);
            }
        });
    }

    fn enumeration(&mut self, e: &EnumDef) {
        self.open("enum", &e.header, !e.values.is_empty(), |w| {
            for value in &e.values {
                w.field(value);
            }
        });
    }

    fn field(&mut self, field: &FieldDef) {
        let mut statement = match &field.type_text {
            Some(type_text) => format!("{type_text} {} = {}", field.name, field.number),
            None => format!("{} = {}", field.name, field.number),
        };
        if !field.options.is_empty() {
            statement.push_str(&format!(" [{}]", field.options.join(", ")));
        }
        statement.push(';');

        match &field.comment {
            Some(Comment::Line(text)) => self.line(&format!("{statement} // {text}")),
            Some(comment) => {
                self.comment(comment);
                self.line(&statement);
            }
            None => self.line(&statement),
        }
    }

    fn service(&mut self, service: &ServiceDef) {
        self.open("service", &service.header, !service.methods.is_empty(), |w| {
            for method in &service.methods {
                w.method(method);
            }
        });
    }

    fn method(&mut self, method: &MethodDef) {
        if let Some(comment) = &method.comment {
            self.comment(comment);
        }

        let signature = format!(
            "rpc {}({}) returns ({})",
            method.name, method.request, method.response
        );

        if method.options.is_empty() {
            self.line(&format!("{signature};"));
        } else {
            self.block(&signature, |w| {
                for option in &method.options {
                    w.line(&format!("option {option};"));
                }
            });
        }
    }
}
