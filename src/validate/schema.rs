//! Pass 2: schema validation.
//!
//! Every component, constraint, and motion is checked against the schema
//! registry: known type, required fields present, no unknown fields, and
//! value kinds matching the declared field types. A type the registry
//! does not know is only an error (E200) when no configured library
//! provides it either; otherwise the library pass owns the report.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, ErrorCollector, SourceSpan};
use crate::library::{LibraryRegistry, TypeCategory};
use crate::schema::{FieldType, SchemaRegistry, TypeSchema};

pub fn validate(
    ast: &AstFile,
    file: &str,
    schemas: &SchemaRegistry,
    libraries: &LibraryRegistry,
) -> Vec<Diagnostic> {
    let mut pass = SchemaPass {
        file,
        schemas,
        libraries,
        errors: ErrorCollector::new(),
    };
    pass.check_entities(&ast.entities);
    pass.check_constraints(&ast.constraints);
    pass.check_motions(&ast.motions);
    pass.errors.into_sorted()
}

struct SchemaPass<'a> {
    file: &'a str,
    schemas: &'a SchemaRegistry,
    libraries: &'a LibraryRegistry,
    errors: ErrorCollector,
}

impl SchemaPass<'_> {
    fn check_entities(&mut self, entities: &[AstEntity]) {
        for entity in entities {
            if !self.schemas.is_entity_kind(&entity.kind) {
                self.errors.add(
                    Diagnostic::new(
                        ErrorCode::UnknownEntityKind,
                        format!("Unknown entity kind '{}'", entity.kind),
                        entity.kind_span,
                        self.file,
                    )
                    .with_help(format!(
                        "valid kinds: {}",
                        self.schemas.entity_kinds().join(", ")
                    )),
                );
            }

            for component in &entity.components {
                match self.schemas.component(&component.name) {
                    Some(schema) => self.check_block(
                        schema,
                        &component.fields,
                        component.span,
                        &format!("component '{}'", component.name),
                    ),
                    None => self.unknown_type(
                        TypeCategory::Component,
                        &component.name,
                        component.span,
                        "component",
                    ),
                }
            }
        }
    }

    fn check_constraints(&mut self, constraints: &[AstConstraint]) {
        for constraint in constraints {
            match self.schemas.constraint(&constraint.constraint_type) {
                Some(schema) => self.check_block(
                    schema,
                    &constraint.fields,
                    constraint.span,
                    &format!("constraint '{}'", constraint.id),
                ),
                None => self.unknown_type(
                    TypeCategory::Constraint,
                    &constraint.constraint_type,
                    constraint.type_span,
                    "constraint",
                ),
            }
        }
    }

    fn check_motions(&mut self, motions: &[AstMotion]) {
        for motion in motions {
            match self.schemas.motion(&motion.motion_type) {
                Some(schema) => self.check_block(
                    schema,
                    &motion.fields,
                    motion.span,
                    &format!("motion '{}'", motion.id),
                ),
                None => self.unknown_type(
                    TypeCategory::Motion,
                    &motion.motion_type,
                    motion.type_span,
                    "motion",
                ),
            }
        }
    }

    // ── Shared checks ────────────────────────────────────────────

    /// E200 when neither the schema registry nor any configured library
    /// knows the type; otherwise the library pass reports the missing
    /// import with better help text.
    fn unknown_type(
        &mut self,
        category: TypeCategory,
        type_name: &str,
        span: SourceSpan,
        what: &str,
    ) {
        if !self.libraries.provides(category, type_name) {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::UnknownType,
                    format!("Unknown {what} type '{type_name}'"),
                    span,
                    self.file,
                )
                .with_help(format!("no configured library provides '{type_name}'")),
            );
        }
    }

    fn check_block(
        &mut self,
        schema: &TypeSchema,
        fields: &[AstField],
        block_span: SourceSpan,
        context: &str,
    ) {
        for spec in schema.fields.iter().filter(|f| f.required) {
            if !fields.iter().any(|f| f.name == spec.name) {
                self.errors.add(
                    Diagnostic::new(
                        ErrorCode::MissingRequiredField,
                        format!("Missing required field '{}' in {context}", spec.name),
                        block_span,
                        self.file,
                    )
                    .with_help(format!("add '{}: {}'", spec.name, spec.ty.describe())),
                );
            }
        }

        for field in fields {
            match schema.field(&field.name) {
                Some(spec) => self.check_value(&field.value, &spec.ty, &field.name),
                None => {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::UnknownField,
                        format!("Unknown field '{}' in {context}", field.name),
                        field.span,
                        self.file,
                    ));
                }
            }
        }
    }

    fn check_value(&mut self, value: &AstValue, expected: &FieldType, field_name: &str) {
        let matches = match expected {
            FieldType::Number => value.as_number().is_some(),
            FieldType::String => value.as_str().is_some(),
            FieldType::Identifier => value.as_identifier().is_some(),
            FieldType::Vector3 => value.as_vector().is_some(),
            FieldType::Boolean => {
                match value.as_identifier() {
                    Some("true") | Some("false") => true,
                    Some(other) => {
                        // An identifier in boolean position gets the more
                        // specific report.
                        self.errors.add(
                            Diagnostic::new(
                                ErrorCode::InvalidBoolean,
                                format!("Field '{field_name}' expects true or false, found '{other}'"),
                                value.span(),
                                self.file,
                            ),
                        );
                        return;
                    }
                    None => false,
                }
            }
            FieldType::Enum(values) => match value.as_identifier() {
                Some(id) => {
                    if values.iter().any(|v| v == id) {
                        true
                    } else {
                        self.errors.add(
                            Diagnostic::new(
                                ErrorCode::FieldTypeMismatch,
                                format!("Invalid value '{id}' for field '{field_name}'"),
                                value.span(),
                                self.file,
                            )
                            .with_help(format!("expected {}", expected.describe())),
                        );
                        return;
                    }
                }
                None => false,
            },
        };

        if !matches {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::FieldTypeMismatch,
                    format!(
                        "Invalid type for field '{field_name}': expected {}, found {}",
                        expected.describe(),
                        value.kind_name()
                    ),
                    value.span(),
                    self.file,
                ),
            );
        }
    }
}
