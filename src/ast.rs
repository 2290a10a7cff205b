//! AST node types. The tree mirrors the grammar and carries source spans
//! for diagnostics; no semantic interpretation happens here.

use crate::error::SourceSpan;

/// A complete parsed SDL file.
#[derive(Debug, Clone)]
pub struct AstFile {
    pub scene: AstScene,
    pub library_imports: AstLibraryImports,
    pub entities: Vec<AstEntity>,
    pub constraints: Vec<AstConstraint>,
    pub motions: Vec<AstMotion>,
    pub timelines: Vec<AstTimeline>,
    pub span: SourceSpan,
}

/// The mandatory scene header.
#[derive(Debug, Clone)]
pub struct AstScene {
    pub name: String,
    pub version: i64,
    pub ir_version: String,
    pub unit_system: String,
    pub span: SourceSpan,
    pub version_span: SourceSpan,
    pub ir_version_span: SourceSpan,
    pub unit_system_span: SourceSpan,
}

/// The mandatory `library_imports` section: ordered alias → library name.
#[derive(Debug, Clone)]
pub struct AstLibraryImports {
    pub imports: Vec<AstImport>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct AstImport {
    pub alias: String,
    pub library_name: String,
    pub span: SourceSpan,
}

/// `entity <id> { kind: <ident> components { ... } }`
#[derive(Debug, Clone)]
pub struct AstEntity {
    pub id: String,
    pub id_span: SourceSpan,
    pub kind: String,
    pub kind_span: SourceSpan,
    pub components: Vec<AstComponent>,
    pub span: SourceSpan,
}

impl AstEntity {
    pub fn component(&self, name: &str) -> Option<&AstComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// A typed component block within an entity's `components` section.
#[derive(Debug, Clone)]
pub struct AstComponent {
    pub name: String,
    pub fields: Vec<AstField>,
    pub span: SourceSpan,
}

impl AstComponent {
    pub fn field(&self, name: &str) -> Option<&AstField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `<name>: <value>`
#[derive(Debug, Clone)]
pub struct AstField {
    pub name: String,
    pub value: AstValue,
    pub span: SourceSpan,
}

/// A field value. `true`/`false` arrive as identifiers and are interpreted
/// as booleans at schema-check time.
#[derive(Debug, Clone)]
pub enum AstValue {
    Number(f64, SourceSpan),
    Str(String, SourceSpan),
    Identifier(String, SourceSpan),
    Vector(Vec<f64>, SourceSpan),
}

impl AstValue {
    pub fn span(&self) -> SourceSpan {
        match self {
            AstValue::Number(_, span)
            | AstValue::Str(_, span)
            | AstValue::Identifier(_, span)
            | AstValue::Vector(_, span) => *span,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AstValue::Number(n, _) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AstValue::Str(s, _) => Some(s),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            AstValue::Identifier(id, _) => Some(id),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            AstValue::Vector(v, _) => Some(v),
            _ => None,
        }
    }

    /// Human-readable value kind for type-mismatch messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstValue::Number(..) => "number",
            AstValue::Str(..) => "string",
            AstValue::Identifier(id, _) if id == "true" || id == "false" => "boolean",
            AstValue::Identifier(..) => "identifier",
            AstValue::Vector(..) => "vector",
        }
    }
}

/// `constraint <id> { type: <ident> ... }`. The `type` field is pulled out
/// by the parser; `fields` holds everything after it, in source order.
#[derive(Debug, Clone)]
pub struct AstConstraint {
    pub id: String,
    pub id_span: SourceSpan,
    pub constraint_type: String,
    pub type_span: SourceSpan,
    pub fields: Vec<AstField>,
    pub span: SourceSpan,
}

impl AstConstraint {
    pub fn field(&self, name: &str) -> Option<&AstField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `motion <id> { target: <ident> type: <ident> ... }`. `target` and
/// `type` are pulled out by the parser; the remaining fields are the
/// motion's parameters in the flat source form.
#[derive(Debug, Clone)]
pub struct AstMotion {
    pub id: String,
    pub id_span: SourceSpan,
    pub target: String,
    pub target_span: SourceSpan,
    pub motion_type: String,
    pub type_span: SourceSpan,
    pub fields: Vec<AstField>,
    pub span: SourceSpan,
}

impl AstMotion {
    pub fn field(&self, name: &str) -> Option<&AstField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `timeline <id> { event { ... } ... }`
#[derive(Debug, Clone)]
pub struct AstTimeline {
    pub id: String,
    pub id_span: SourceSpan,
    pub events: Vec<AstEvent>,
    pub span: SourceSpan,
}

/// `event { motion: <ident> start: <number> duration: <number> }`
#[derive(Debug, Clone)]
pub struct AstEvent {
    pub motion: String,
    pub motion_span: SourceSpan,
    pub start: f64,
    pub start_span: SourceSpan,
    pub duration: f64,
    pub duration_span: SourceSpan,
    pub span: SourceSpan,
}
