//! Diagnostics: error codes, source spans, and the collector shared by
//! every compiler stage.

use std::fmt;

use serde::Serialize;

/// A source location: byte offset + length, plus the 1-based line and
/// column of the first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub offset: usize,
    pub len: usize,
    pub line: usize,
    pub column: usize,
}

impl SourceSpan {
    pub fn new(offset: usize, len: usize, line: usize, column: usize) -> Self {
        Self { offset, len, line, column }
    }

    /// A zero-length span (used for EOF and synthetic positions).
    pub fn point(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, len: 0, line, column }
    }

    /// Extend this span to cover everything up to the end of `other`.
    pub fn to(self, other: SourceSpan) -> SourceSpan {
        let end = (other.offset + other.len).max(self.offset + self.len);
        SourceSpan {
            offset: self.offset,
            len: end - self.offset,
            line: self.line,
            column: self.column,
        }
    }
}

/// How a diagnostic affects compilation. Warnings are surfaced but never
/// fail a compile on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// Machine-readable diagnostic codes, grouped by pipeline stage:
/// E001-E099 lexical, E100-E199 syntax, E200-E299 schema, E300-E399
/// reference, E400-E499 unit, E500-E599 library. W-prefixed codes are
/// warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexical (E0xx)
    UnexpectedCharacter,
    UnterminatedString,

    // Syntax (E1xx) — parser
    UnexpectedToken,
    MissingSection,
    MalformedVector,
    // Syntax (E1xx) — structural validation
    InvalidSceneVersion,
    InvalidIrVersion,
    InvalidUnitSystem,
    DuplicateId,
    DuplicateComponent,
    EmptyEntity,
    DuplicateField,
    DuplicateImportAlias,
    NonFiniteNumber,
    InvalidMotionParam,
    NonPositiveDuration,
    NegativeStart,

    // Schema (E2xx)
    UnknownType,
    UnknownEntityKind,
    MissingRequiredField,
    UnknownField,
    FieldTypeMismatch,
    InvalidBoolean,

    // Reference (E3xx)
    UndefinedEntity,
    UndefinedMotion,
    ConstraintCycle,
    OverlappingEvents,

    // Unit (E4xx / W4xx)
    AxisNotNormalized,
    NonPositiveMass,
    MassOutOfRange,
    SuspiciousRotation,
    SuspiciousSpeed,
    NonFiniteValue,

    // Library (E5xx)
    UnknownLibrary,
    TypeNotImported,
}

impl ErrorCode {
    /// The numeric part of the code.
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::UnexpectedCharacter => 1,
            ErrorCode::UnterminatedString => 2,

            ErrorCode::UnexpectedToken => 100,
            ErrorCode::MissingSection => 101,
            ErrorCode::MalformedVector => 110,
            ErrorCode::InvalidSceneVersion => 120,
            ErrorCode::InvalidIrVersion => 121,
            ErrorCode::InvalidUnitSystem => 122,
            ErrorCode::DuplicateId => 130,
            ErrorCode::DuplicateComponent => 131,
            ErrorCode::EmptyEntity => 132,
            ErrorCode::DuplicateField => 133,
            ErrorCode::DuplicateImportAlias => 134,
            ErrorCode::NonFiniteNumber => 140,
            ErrorCode::InvalidMotionParam => 141,
            ErrorCode::NonPositiveDuration => 150,
            ErrorCode::NegativeStart => 151,

            ErrorCode::UnknownType => 200,
            ErrorCode::UnknownEntityKind => 201,
            ErrorCode::MissingRequiredField => 210,
            ErrorCode::UnknownField => 211,
            ErrorCode::FieldTypeMismatch => 220,
            ErrorCode::InvalidBoolean => 221,

            ErrorCode::UndefinedEntity => 300,
            ErrorCode::UndefinedMotion => 301,
            ErrorCode::ConstraintCycle => 310,
            ErrorCode::OverlappingEvents => 320,

            ErrorCode::AxisNotNormalized => 400,
            ErrorCode::NonPositiveMass => 410,
            ErrorCode::MassOutOfRange => 411,
            ErrorCode::SuspiciousRotation => 420,
            ErrorCode::SuspiciousSpeed => 421,
            ErrorCode::NonFiniteValue => 430,

            ErrorCode::UnknownLibrary => 500,
            ErrorCode::TypeNotImported => 510,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::SuspiciousRotation | ErrorCode::SuspiciousSpeed => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// The diagnostic category, shown in rendered output.
    pub fn category(self) -> &'static str {
        match self.code() {
            1..=99 => "lexical error",
            100..=199 => "syntax error",
            200..=299 => "schema error",
            300..=399 => "reference error",
            400..=499 => match self.severity() {
                Severity::Error => "unit error",
                Severity::Warning => "unit warning",
            },
            _ => "library error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity() {
            Severity::Error => 'E',
            Severity::Warning => 'W',
        };
        write!(f, "{}{:03}", prefix, self.code())
    }
}

/// A single compiler diagnostic with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub span: SourceSpan,
    pub file: String,
    pub help: Option<String>,
    /// Short text printed after the caret underline.
    pub label: Option<String>,
}

impl Diagnostic {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        span: SourceSpan,
        file: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            file: file.into(),
            help: None,
            label: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// The JSON wire form used by non-terminal clients.
    pub fn to_wire(&self) -> WireDiagnostic {
        WireDiagnostic {
            code: self.code.to_string(),
            message: self.message.clone(),
            file: self.file.clone(),
            line: self.span.line,
            column: self.span.column,
            help: self.help.clone(),
        }
    }

    /// Render the diagnostic with the source line and a caret underline:
    ///
    /// ```text
    /// E300: Undefined entity 'gearB'
    ///  --> scene.sdl:42:12
    ///   |
    /// 42|   driven: gearB
    ///   |           ^^^^^ entity not found in scope
    /// help: define 'gearB' before referencing it
    /// ```
    pub fn render(&self, source: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}: {}\n", self.code, self.message));
        out.push_str(&format!(
            " --> {}:{}:{}\n",
            self.file, self.span.line, self.span.column
        ));

        if let Some(line_text) = source.lines().nth(self.span.line.saturating_sub(1)) {
            let gutter = self.span.line.to_string();
            let pad = " ".repeat(gutter.len());
            out.push_str(&format!("{pad}|\n"));
            out.push_str(&format!("{gutter}| {line_text}\n"));

            // Clamp the underline to the visible line.
            let start = self.span.column.saturating_sub(1);
            let width = self
                .span
                .len
                .max(1)
                .min(line_text.len().saturating_sub(start).max(1));
            out.push_str(&format!("{pad}| {}{}", " ".repeat(start), "^".repeat(width)));
            match &self.label {
                Some(label) => out.push_str(&format!(" {label}\n")),
                None => out.push('\n'),
            }
        }

        if let Some(help) = &self.help {
            out.push_str(&format!("help: {help}\n"));
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}:{}:{})",
            self.code, self.message, self.file, self.span.line, self.span.column
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Serialized diagnostic shape for machine consumers.
#[derive(Debug, Clone, Serialize)]
pub struct WireDiagnostic {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Accumulates diagnostics in insertion order so a pass can report every
/// issue it finds before yielding.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain the collected diagnostics, sorted by source position.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|d| d.span.offset);
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(code: ErrorCode) -> Diagnostic {
        Diagnostic::new(code, "test", SourceSpan::point(0, 1, 1), "test.sdl")
    }

    #[test]
    fn code_numbering_matches_ranges() {
        assert_eq!(ErrorCode::UnexpectedCharacter.code(), 1);
        assert_eq!(ErrorCode::UnexpectedToken.code(), 100);
        assert_eq!(ErrorCode::MalformedVector.code(), 110);
        assert_eq!(ErrorCode::UnknownType.code(), 200);
        assert_eq!(ErrorCode::UndefinedEntity.code(), 300);
        assert_eq!(ErrorCode::AxisNotNormalized.code(), 400);
        assert_eq!(ErrorCode::UnknownLibrary.code(), 500);
    }

    #[test]
    fn warning_codes_use_w_prefix() {
        assert_eq!(ErrorCode::SuspiciousRotation.to_string(), "W420");
        assert_eq!(ErrorCode::SuspiciousSpeed.to_string(), "W421");
        assert_eq!(ErrorCode::UndefinedMotion.to_string(), "E301");
    }

    #[test]
    fn severity_split() {
        assert!(ErrorCode::NonPositiveMass.severity().is_error());
        assert!(!ErrorCode::SuspiciousRotation.severity().is_error());
    }

    #[test]
    fn collector_tracks_errors_vs_warnings() {
        let mut collector = ErrorCollector::new();
        collector.add(diag(ErrorCode::SuspiciousRotation));
        assert!(!collector.has_errors());

        collector.add(diag(ErrorCode::UndefinedEntity));
        assert!(collector.has_errors());
        assert_eq!(collector.diagnostics().len(), 2);
    }

    #[test]
    fn into_sorted_orders_by_offset() {
        let mut collector = ErrorCollector::new();
        collector.add(Diagnostic::new(
            ErrorCode::DuplicateId,
            "b",
            SourceSpan::new(40, 3, 4, 1),
            "test.sdl",
        ));
        collector.add(Diagnostic::new(
            ErrorCode::DuplicateId,
            "a",
            SourceSpan::new(10, 3, 2, 1),
            "test.sdl",
        ));
        let sorted = collector.into_sorted();
        assert_eq!(sorted[0].message, "a");
        assert_eq!(sorted[1].message, "b");
    }

    #[test]
    fn render_includes_source_line_and_caret() {
        let source = "scene {\n  driven: gearB\n}";
        let diagnostic = Diagnostic::new(
            ErrorCode::UndefinedEntity,
            "Undefined entity 'gearB'",
            SourceSpan::new(18, 5, 2, 11),
            "scene.sdl",
        )
        .with_label("entity not found in scope")
        .with_help("define 'gearB' before referencing it");

        let rendered = diagnostic.render(source);
        assert!(rendered.starts_with("E300: Undefined entity 'gearB'\n"));
        assert!(rendered.contains(" --> scene.sdl:2:11\n"));
        assert!(rendered.contains("2|   driven: gearB\n"));
        assert!(rendered.contains("^^^^^ entity not found in scope"));
        assert!(rendered.ends_with("help: define 'gearB' before referencing it\n"));
    }

    #[test]
    fn wire_form_serializes() {
        let wire = diag(ErrorCode::UndefinedEntity).to_wire();
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["code"], "E300");
        assert_eq!(json["line"], 1);
        assert!(json.get("help").is_none());
    }
}
