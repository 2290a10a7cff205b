//! Recursive-descent parser: token stream → AST.
//!
//! One token of lookahead, no backtracking, fail-fast on the first error.
//! The parser enforces the mandatory section order and per-block shape but
//! never interprets field semantics; that is the validators' job.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, SourceSpan};
use crate::lexer::{Token, TokenKind};

/// The mandatory top-level order, quoted in out-of-order diagnostics.
const BLOCK_ORDER_HELP: &str =
    "top-level blocks must appear in the order: scene, library_imports, entity, constraint, motion, timeline";

/// Parse a token stream into an [`AstFile`], or stop at the first syntax
/// error.
pub fn parse(tokens: Vec<Token>, file: &str) -> Result<AstFile, Diagnostic> {
    Parser::new(tokens, file).parse_file()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file: &'a str,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, file: &'a str) -> Self {
        Self { tokens, pos: 0, file }
    }

    fn parse_file(&mut self) -> Result<AstFile, Diagnostic> {
        let start_span = self.current_span();

        let scene = self.parse_scene()?;
        let library_imports = self.parse_library_imports()?;

        let mut entities = Vec::new();
        while matches!(self.peek(), TokenKind::Entity) {
            entities.push(self.parse_entity()?);
        }

        let mut constraints = Vec::new();
        while matches!(self.peek(), TokenKind::Constraint) {
            constraints.push(self.parse_constraint()?);
        }

        let mut motions = Vec::new();
        while matches!(self.peek(), TokenKind::Motion) {
            motions.push(self.parse_motion()?);
        }

        let mut timelines = Vec::new();
        while matches!(self.peek(), TokenKind::Timeline) {
            timelines.push(self.parse_timeline()?);
        }

        if !matches!(self.peek(), TokenKind::Eof) {
            return Err(self
                .err(format!("Unexpected {}", self.peek()))
                .with_help(BLOCK_ORDER_HELP));
        }

        let span = start_span.to(self.current_span());
        Ok(AstFile {
            scene,
            library_imports,
            entities,
            constraints,
            motions,
            timelines,
            span,
        })
    }

    // ── Sections ─────────────────────────────────────────────────

    fn parse_scene(&mut self) -> Result<AstScene, Diagnostic> {
        if !matches!(self.peek(), TokenKind::Scene) {
            return Err(Diagnostic::new(
                ErrorCode::MissingSection,
                "Missing required 'scene' section",
                self.current_span(),
                self.file,
            )
            .with_help("every file starts with a scene { ... } block"));
        }
        let start_span = self.advance_span();
        self.expect(TokenKind::LeftBrace)?;

        let mut name = None;
        let mut version: Option<(i64, SourceSpan)> = None;
        let mut ir_version: Option<(String, SourceSpan)> = None;
        let mut unit_system: Option<(String, SourceSpan)> = None;

        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            let (field, field_span) = self.expect_identifier("scene field name")?;
            self.expect(TokenKind::Colon)?;

            match field.as_str() {
                "name" => {
                    if name.is_some() {
                        return Err(self.err_at("Duplicate 'name' field in scene block", field_span));
                    }
                    name = Some(self.expect_string("scene 'name'")?.0);
                }
                "version" => {
                    if version.is_some() {
                        return Err(self.err_at("Duplicate 'version' field in scene block", field_span));
                    }
                    version = Some(self.expect_integer("scene 'version'")?);
                }
                "ir_version" => {
                    if ir_version.is_some() {
                        return Err(self.err_at("Duplicate 'ir_version' field in scene block", field_span));
                    }
                    ir_version = Some(self.expect_string("scene 'ir_version'")?);
                }
                "unit_system" => {
                    if unit_system.is_some() {
                        return Err(self.err_at("Duplicate 'unit_system' field in scene block", field_span));
                    }
                    unit_system = Some(self.expect_string("scene 'unit_system'")?);
                }
                _ => {
                    return Err(self
                        .err_at(format!("Unknown scene field '{field}'"), field_span)
                        .with_help("scene fields: name, version, ir_version, unit_system"));
                }
            }
        }
        let end_span = self.expect(TokenKind::RightBrace)?;
        let span = start_span.to(end_span);

        let missing = |what: &str| {
            Diagnostic::new(
                ErrorCode::UnexpectedToken,
                format!("Scene block is missing required field '{what}'"),
                span,
                self.file,
            )
        };
        let name = name.ok_or_else(|| missing("name"))?;
        let (version, version_span) = version.ok_or_else(|| missing("version"))?;
        let (ir_version, ir_version_span) = ir_version.ok_or_else(|| missing("ir_version"))?;
        let (unit_system, unit_system_span) = unit_system.ok_or_else(|| missing("unit_system"))?;

        Ok(AstScene {
            name,
            version,
            ir_version,
            unit_system,
            span,
            version_span,
            ir_version_span,
            unit_system_span,
        })
    }

    fn parse_library_imports(&mut self) -> Result<AstLibraryImports, Diagnostic> {
        if !matches!(self.peek(), TokenKind::LibraryImports) {
            return Err(Diagnostic::new(
                ErrorCode::MissingSection,
                "Missing required 'library_imports' section",
                self.current_span(),
                self.file,
            )
            .with_help("a library_imports { ... } block must follow the scene block"));
        }
        let start_span = self.advance_span();
        self.expect(TokenKind::LeftBrace)?;

        let mut imports = Vec::new();
        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            let (alias, alias_span) = self.expect_identifier("import alias")?;
            self.expect(TokenKind::Colon)?;
            let (library_name, name_span) = self.expect_string("library name")?;
            imports.push(AstImport {
                alias,
                library_name,
                span: alias_span.to(name_span),
            });
        }
        let end_span = self.expect(TokenKind::RightBrace)?;

        Ok(AstLibraryImports {
            imports,
            span: start_span.to(end_span),
        })
    }

    fn parse_entity(&mut self) -> Result<AstEntity, Diagnostic> {
        let start_span = self.advance_span(); // 'entity'
        let (id, id_span) = self.expect_identifier("entity id")?;
        self.expect(TokenKind::LeftBrace)?;

        if !matches!(self.peek(), TokenKind::Kind) {
            return Err(self.err(format!(
                "Expected 'kind:' as the first entry of entity '{id}', found {}",
                self.peek()
            )));
        }
        self.advance();
        self.expect(TokenKind::Colon)?;
        let (kind, kind_span) = self.expect_identifier("entity kind")?;

        if !matches!(self.peek(), TokenKind::Components) {
            return Err(self.err(format!(
                "Expected 'components' block in entity '{id}', found {}",
                self.peek()
            )));
        }
        self.advance();
        self.expect(TokenKind::LeftBrace)?;

        let mut components = Vec::new();
        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            components.push(self.parse_component()?);
        }
        self.expect(TokenKind::RightBrace)?; // close components
        let end_span = self.expect(TokenKind::RightBrace)?; // close entity

        Ok(AstEntity {
            id,
            id_span,
            kind,
            kind_span,
            components,
            span: start_span.to(end_span),
        })
    }

    fn parse_component(&mut self) -> Result<AstComponent, Diagnostic> {
        let (name, name_span) = self.expect_identifier("component type")?;
        self.expect(TokenKind::LeftBrace)?;
        let fields = self.parse_fields()?;
        let end_span = self.expect(TokenKind::RightBrace)?;

        Ok(AstComponent {
            name,
            fields,
            span: name_span.to(end_span),
        })
    }

    fn parse_constraint(&mut self) -> Result<AstConstraint, Diagnostic> {
        let start_span = self.advance_span(); // 'constraint'
        let (id, id_span) = self.expect_identifier("constraint id")?;
        self.expect(TokenKind::LeftBrace)?;

        // The type comes first so readers (and the schema pass) never have
        // to scan for it.
        let type_ok = matches!(self.peek(), TokenKind::Identifier(f) if f == "type");
        if !type_ok {
            return Err(self.err(format!(
                "Expected 'type:' as the first field of constraint '{id}', found {}",
                self.peek()
            )));
        }
        self.advance();
        self.expect(TokenKind::Colon)?;
        let (constraint_type, type_span) =
            self.expect_identifier("constraint type")?;

        let fields = self.parse_fields()?;
        if let Some(dup) = fields.iter().find(|f| f.name == "type") {
            return Err(self.err_at(
                format!("Duplicate 'type' field in constraint '{id}'"),
                dup.span,
            ));
        }
        let end_span = self.expect(TokenKind::RightBrace)?;

        Ok(AstConstraint {
            id,
            id_span,
            constraint_type,
            type_span,
            fields,
            span: start_span.to(end_span),
        })
    }

    fn parse_motion(&mut self) -> Result<AstMotion, Diagnostic> {
        let start_span = self.advance_span(); // 'motion'
        let (id, id_span) = self.expect_identifier("motion id")?;
        self.expect(TokenKind::LeftBrace)?;
        let all_fields = self.parse_fields()?;
        let end_span = self.expect(TokenKind::RightBrace)?;
        let span = start_span.to(end_span);

        // 'target' and 'type' are required, in either order; everything
        // else stays flat and becomes parameters at lowering.
        let mut target: Option<(String, SourceSpan)> = None;
        let mut motion_type: Option<(String, SourceSpan)> = None;
        let mut fields = Vec::new();

        for field in all_fields {
            match field.name.as_str() {
                "target" | "type" => {
                    let slot = if field.name == "target" { &mut target } else { &mut motion_type };
                    if slot.is_some() {
                        return Err(self.err_at(
                            format!("Duplicate '{}' field in motion '{id}'", field.name),
                            field.span,
                        ));
                    }
                    match field.value {
                        AstValue::Identifier(value, value_span) => {
                            *slot = Some((value, value_span));
                        }
                        other => {
                            return Err(self.err_at(
                                format!(
                                    "Motion '{}' must be an identifier, found {}",
                                    field.name,
                                    other.kind_name()
                                ),
                                other.span(),
                            ));
                        }
                    }
                }
                _ => fields.push(field),
            }
        }

        let (target, target_span) = target.ok_or_else(|| {
            Diagnostic::new(
                ErrorCode::UnexpectedToken,
                format!("Motion '{id}' is missing required field 'target'"),
                span,
                self.file,
            )
        })?;
        let (motion_type, type_span) = motion_type.ok_or_else(|| {
            Diagnostic::new(
                ErrorCode::UnexpectedToken,
                format!("Motion '{id}' is missing required field 'type'"),
                span,
                self.file,
            )
        })?;

        Ok(AstMotion {
            id,
            id_span,
            target,
            target_span,
            motion_type,
            type_span,
            fields,
            span,
        })
    }

    fn parse_timeline(&mut self) -> Result<AstTimeline, Diagnostic> {
        let start_span = self.advance_span(); // 'timeline'
        let (id, id_span) = self.expect_identifier("timeline id")?;
        self.expect(TokenKind::LeftBrace)?;

        let mut events = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Event => events.push(self.parse_event()?),
                TokenKind::RightBrace => break,
                other => {
                    return Err(self
                        .err(format!(
                            "Unexpected {other} in timeline '{id}': timelines may only contain event blocks"
                        )));
                }
            }
        }
        let end_span = self.expect(TokenKind::RightBrace)?;

        Ok(AstTimeline {
            id,
            id_span,
            events,
            span: start_span.to(end_span),
        })
    }

    fn parse_event(&mut self) -> Result<AstEvent, Diagnostic> {
        let start_span = self.advance_span(); // 'event'
        self.expect(TokenKind::LeftBrace)?;
        let fields = self.parse_fields()?;
        let end_span = self.expect(TokenKind::RightBrace)?;
        let span = start_span.to(end_span);

        let mut motion: Option<(String, SourceSpan)> = None;
        let mut start: Option<(f64, SourceSpan)> = None;
        let mut duration: Option<(f64, SourceSpan)> = None;

        for field in fields {
            match field.name.as_str() {
                "motion" => {
                    if motion.is_some() {
                        return Err(self.err_at("Duplicate 'motion' field in event", field.span));
                    }
                    match field.value {
                        AstValue::Identifier(id, value_span) => motion = Some((id, value_span)),
                        other => {
                            return Err(self.err_at(
                                format!("Event 'motion' must be an identifier, found {}", other.kind_name()),
                                other.span(),
                            ));
                        }
                    }
                }
                "start" | "duration" => {
                    let slot = if field.name == "start" { &mut start } else { &mut duration };
                    if slot.is_some() {
                        return Err(self.err_at(
                            format!("Duplicate '{}' field in event", field.name),
                            field.span,
                        ));
                    }
                    match field.value {
                        AstValue::Number(v, value_span) => *slot = Some((v, value_span)),
                        other => {
                            return Err(self.err_at(
                                format!(
                                    "Event '{}' must be a number, found {}",
                                    field.name,
                                    other.kind_name()
                                ),
                                other.span(),
                            ));
                        }
                    }
                }
                other => {
                    return Err(self
                        .err_at(format!("Unknown event field '{other}'"), field.span)
                        .with_help("event fields: motion, start, duration"));
                }
            }
        }

        let missing = |what: &str| {
            Diagnostic::new(
                ErrorCode::UnexpectedToken,
                format!("Event is missing required field '{what}'"),
                span,
                self.file,
            )
        };
        let (motion, motion_span) = motion.ok_or_else(|| missing("motion"))?;
        let (start, start_span) = start.ok_or_else(|| missing("start"))?;
        let (duration, duration_span) = duration.ok_or_else(|| missing("duration"))?;

        Ok(AstEvent {
            motion,
            motion_span,
            start,
            start_span,
            duration,
            duration_span,
            span,
        })
    }

    // ── Fields & values ──────────────────────────────────────────

    fn parse_fields(&mut self) -> Result<Vec<AstField>, Diagnostic> {
        let mut fields = Vec::new();

        while !matches!(self.peek(), TokenKind::RightBrace | TokenKind::Eof) {
            // 'motion' and 'kind' are keywords that also serve as field
            // names (event motions, entity kinds).
            let (name, name_span) = match self.peek() {
                TokenKind::Motion => ("motion".to_string(), self.advance_span()),
                TokenKind::Kind => ("kind".to_string(), self.advance_span()),
                _ => self.expect_identifier("field name")?,
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            let span = name_span.to(value.span());
            fields.push(AstField { name, value, span });
        }

        Ok(fields)
    }

    fn parse_value(&mut self) -> Result<AstValue, Diagnostic> {
        match self.peek().clone() {
            TokenKind::Integer(v) => Ok(AstValue::Number(v as f64, self.advance_span())),
            TokenKind::Number(v) => Ok(AstValue::Number(v, self.advance_span())),
            TokenKind::Str(s) => Ok(AstValue::Str(s, self.advance_span())),
            TokenKind::Identifier(id) => Ok(AstValue::Identifier(id, self.advance_span())),
            TokenKind::LeftBracket => self.parse_vector(),
            other => Err(self.err(format!(
                "Expected a value (number, string, identifier, or vector), found {other}"
            ))),
        }
    }

    fn parse_vector(&mut self) -> Result<AstValue, Diagnostic> {
        let start_span = self.advance_span(); // '['
        let mut components = Vec::new();

        if !matches!(self.peek(), TokenKind::RightBracket) {
            components.push(self.expect_number("vector component")?.0);
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                components.push(self.expect_number("vector component")?.0);
            }
        }
        let end_span = self.expect(TokenKind::RightBracket)?;
        let span = start_span.to(end_span);

        if components.len() != 3 {
            return Err(Diagnostic::new(
                ErrorCode::MalformedVector,
                format!(
                    "Malformed vector: expected 3 components, found {}",
                    components.len()
                ),
                span,
                self.file,
            )
            .with_help("vectors are written [x, y, z]"));
        }

        Ok(AstValue::Vector(components, span))
    }

    // ── Token helpers ────────────────────────────────────────────

    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn current_span(&self) -> SourceSpan {
        self.tokens
            .get(self.pos)
            .map_or(SourceSpan::point(0, 1, 1), |t| t.span)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    /// Consume the current token, returning its span.
    fn advance_span(&mut self) -> SourceSpan {
        let span = self.current_span();
        self.advance();
        span
    }

    fn expect(&mut self, kind: TokenKind) -> Result<SourceSpan, Diagnostic> {
        if *self.peek() == kind {
            Ok(self.advance_span())
        } else {
            Err(self.err(format!("Expected {kind}, found {}", self.peek())))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<(String, SourceSpan), Diagnostic> {
        match self.peek().clone() {
            TokenKind::Identifier(id) => Ok((id, self.advance_span())),
            other => Err(self.err(format!("Expected {what}, found {other}"))),
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<(String, SourceSpan), Diagnostic> {
        match self.peek().clone() {
            TokenKind::Str(s) => Ok((s, self.advance_span())),
            other => Err(self.err(format!("Expected string for {what}, found {other}"))),
        }
    }

    fn expect_integer(&mut self, what: &str) -> Result<(i64, SourceSpan), Diagnostic> {
        match self.peek().clone() {
            TokenKind::Integer(v) => Ok((v, self.advance_span())),
            other => Err(self.err(format!("Expected integer for {what}, found {other}"))),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<(f64, SourceSpan), Diagnostic> {
        match self.peek().clone() {
            TokenKind::Integer(v) => Ok((v as f64, self.advance_span())),
            TokenKind::Number(v) => Ok((v, self.advance_span())),
            other => Err(self.err(format!("Expected number for {what}, found {other}"))),
        }
    }

    fn err(&self, message: impl Into<String>) -> Diagnostic {
        self.err_at(message, self.current_span())
    }

    fn err_at(&self, message: impl Into<String>, span: SourceSpan) -> Diagnostic {
        Diagnostic::new(ErrorCode::UnexpectedToken, message, span, self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_src(source: &str) -> Result<AstFile, Diagnostic> {
        parse(lex(source, "test.sdl").unwrap(), "test.sdl")
    }

    const HEADER: &str = r#"
scene {
  name: "Test"
  version: 1
  ir_version: "0.1.0"
  unit_system: "SI"
}

library_imports {
  math: "core_mechanics"
}
"#;

    #[test]
    fn minimal_scene() {
        let ast = parse_src(HEADER).unwrap();
        assert_eq!(ast.scene.name, "Test");
        assert_eq!(ast.scene.version, 1);
        assert_eq!(ast.scene.ir_version, "0.1.0");
        assert_eq!(ast.scene.unit_system, "SI");
        assert_eq!(ast.library_imports.imports.len(), 1);
        assert_eq!(ast.library_imports.imports[0].alias, "math");
        assert!(ast.entities.is_empty());
    }

    #[test]
    fn empty_source_reports_missing_scene() {
        let err = parse_src("").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSection);
        assert!(err.message.contains("scene"));
    }

    #[test]
    fn missing_library_imports_section() {
        let source = r#"
scene {
  name: "T"
  version: 1
  ir_version: "0.1.0"
  unit_system: "SI"
}
"#;
        let err = parse_src(source).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingSection);
        assert!(err.message.contains("library_imports"));
    }

    #[test]
    fn scene_version_must_be_integer() {
        let source = r#"
scene {
  name: "T"
  version: 1.5
  ir_version: "0.1.0"
  unit_system: "SI"
}
library_imports { }
"#;
        let err = parse_src(source).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
        assert!(err.message.contains("integer"));
    }

    #[test]
    fn scene_missing_field() {
        let source = r#"
scene {
  name: "T"
  version: 1
}
library_imports { }
"#;
        let err = parse_src(source).unwrap_err();
        assert!(err.message.contains("ir_version"));
    }

    #[test]
    fn entity_with_components() {
        let source = format!(
            "{HEADER}
entity cube1 {{
  kind: solid
  components {{
    transform {{
      position: [0, 0, 0]
      rotation: [0, 0, 0]
      scale: [1, 1, 1]
    }}
    geometry {{
      primitive: cube
    }}
  }}
}}
"
        );
        let ast = parse_src(&source).unwrap();
        assert_eq!(ast.entities.len(), 1);
        let entity = &ast.entities[0];
        assert_eq!(entity.id, "cube1");
        assert_eq!(entity.kind, "solid");
        assert_eq!(entity.components.len(), 2);
        let transform = entity.component("transform").unwrap();
        assert_eq!(
            transform.field("position").unwrap().value.as_vector(),
            Some(&[0.0, 0.0, 0.0][..])
        );
    }

    #[test]
    fn vector_of_length_two_is_malformed() {
        let source = format!(
            "{HEADER}
entity e {{
  kind: solid
  components {{ transform {{ position: [0, 0] }} }}
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedVector);
        assert!(err.message.contains("found 2"));
    }

    #[test]
    fn vector_of_length_four_is_malformed() {
        let source = format!(
            "{HEADER}
entity e {{
  kind: solid
  components {{ transform {{ position: [0, 0, 0, 0] }} }}
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedVector);
    }

    #[test]
    fn constraint_type_must_come_first() {
        let source = format!(
            "{HEADER}
constraint c1 {{
  parent: a
  type: fixed_joint
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
        assert!(err.message.contains("type"));
    }

    #[test]
    fn constraint_fields_follow_type() {
        let source = format!(
            "{HEADER}
constraint attach {{
  type: fixed_joint
  parent: base
  child: arm
}}
"
        );
        let ast = parse_src(&source).unwrap();
        let constraint = &ast.constraints[0];
        assert_eq!(constraint.constraint_type, "fixed_joint");
        assert_eq!(constraint.fields.len(), 2);
        assert_eq!(constraint.field("parent").unwrap().value.as_identifier(), Some("base"));
    }

    #[test]
    fn motion_target_and_type_in_either_order() {
        let source = format!(
            "{HEADER}
motion spin {{
  type: rotation
  axis: [0, 1, 0]
  target: cube1
  speed: 1.5708
}}
"
        );
        let ast = parse_src(&source).unwrap();
        let motion = &ast.motions[0];
        assert_eq!(motion.target, "cube1");
        assert_eq!(motion.motion_type, "rotation");
        // target/type are extracted; axis and speed remain as parameters
        assert_eq!(motion.fields.len(), 2);
        assert!(motion.field("axis").is_some());
    }

    #[test]
    fn motion_missing_target() {
        let source = format!(
            "{HEADER}
motion spin {{
  type: rotation
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert!(err.message.contains("target"));
    }

    #[test]
    fn timeline_with_events() {
        let source = format!(
            "{HEADER}
motion spin {{ target: cube1 type: rotation }}
timeline main {{
  event {{
    motion: spin
    start: 0.0
    duration: 10.0
  }}
}}
"
        );
        let ast = parse_src(&source).unwrap();
        let timeline = &ast.timelines[0];
        assert_eq!(timeline.id, "main");
        assert_eq!(timeline.events.len(), 1);
        let event = &timeline.events[0];
        assert_eq!(event.motion, "spin");
        assert_eq!(event.start, 0.0);
        assert_eq!(event.duration, 10.0);
    }

    #[test]
    fn timeline_rejects_non_event_content() {
        let source = format!(
            "{HEADER}
timeline main {{
  wait: 1.0
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
        assert!(err.message.contains("event"));
    }

    #[test]
    fn event_rejects_unknown_field() {
        let source = format!(
            "{HEADER}
motion spin {{ target: c type: rotation }}
timeline main {{
  event {{ motion: spin start: 0 duration: 1 easing: smooth }}
}}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert!(err.message.contains("easing"));
    }

    #[test]
    fn blocks_out_of_order_are_rejected() {
        let source = format!(
            "{HEADER}
constraint c1 {{ type: fixed_joint }}
entity late {{ kind: solid components {{ }} }}
"
        );
        let err = parse_src(&source).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
        assert_eq!(err.help.as_deref(), Some(BLOCK_ORDER_HELP));
    }

    #[test]
    fn integer_values_parse_as_numbers_in_fields() {
        let source = format!(
            "{HEADER}
motion slide {{ target: c type: translation speed: 2 }}
"
        );
        let ast = parse_src(&source).unwrap();
        let speed = ast.motions[0].field("speed").unwrap();
        assert_eq!(speed.value.as_number(), Some(2.0));
    }
}
