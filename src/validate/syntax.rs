//! Pass 1: structural validation.
//!
//! Scene header sanity, id and field uniqueness, numeric finiteness, and
//! event timing bounds. Everything here is checkable without the schema
//! or library registries.

use std::collections::HashMap;

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, ErrorCollector, SourceSpan};

pub fn validate(ast: &AstFile, file: &str) -> Vec<Diagnostic> {
    let mut pass = SyntaxPass {
        file,
        errors: ErrorCollector::new(),
    };
    pass.check_scene(&ast.scene);
    pass.check_imports(&ast.library_imports);
    pass.check_entities(&ast.entities);
    pass.check_constraints(&ast.constraints);
    pass.check_motions(&ast.motions);
    pass.check_timelines(&ast.timelines);
    pass.errors.into_sorted()
}

struct SyntaxPass<'a> {
    file: &'a str,
    errors: ErrorCollector,
}

impl SyntaxPass<'_> {
    fn check_scene(&mut self, scene: &AstScene) {
        if scene.version < 1 {
            self.errors.add(Diagnostic::new(
                ErrorCode::InvalidSceneVersion,
                format!("Scene version must be >= 1, found {}", scene.version),
                scene.version_span,
                self.file,
            ));
        }

        if !is_valid_ir_version(&scene.ir_version) {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::InvalidIrVersion,
                    format!("Invalid ir_version '{}'", scene.ir_version),
                    scene.ir_version_span,
                    self.file,
                )
                .with_help("expected MAJOR.MINOR.PATCH with integer parts, e.g. \"0.1.0\""),
            );
        }

        if scene.unit_system != "SI" && scene.unit_system != "Imperial" {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::InvalidUnitSystem,
                    format!("Unknown unit system '{}'", scene.unit_system),
                    scene.unit_system_span,
                    self.file,
                )
                .with_help("valid unit systems: SI, Imperial"),
            );
        }
    }

    fn check_imports(&mut self, imports: &AstLibraryImports) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for import in &imports.imports {
            if let Some(&first_line) = seen.get(import.alias.as_str()) {
                self.errors.add(Diagnostic::new(
                    ErrorCode::DuplicateImportAlias,
                    format!(
                        "Duplicate import alias '{}' (first used at line {first_line})",
                        import.alias
                    ),
                    import.span,
                    self.file,
                ));
            } else {
                seen.insert(&import.alias, import.span.line);
            }
        }
    }

    fn check_entities(&mut self, entities: &[AstEntity]) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for entity in entities {
            self.check_duplicate_id("entity", &entity.id, entity.id_span, &mut seen);

            if entity.components.is_empty() {
                self.errors.add(
                    Diagnostic::new(
                        ErrorCode::EmptyEntity,
                        format!("Entity '{}' has no components", entity.id),
                        entity.span,
                        self.file,
                    )
                    .with_help("entities must carry at least one component"),
                );
            }

            let mut seen_components: HashMap<&str, usize> = HashMap::new();
            for component in &entity.components {
                if let Some(&first_line) = seen_components.get(component.name.as_str()) {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::DuplicateComponent,
                        format!(
                            "Duplicate component '{}' in entity '{}' (first defined at line {first_line})",
                            component.name, entity.id
                        ),
                        component.span,
                        self.file,
                    ));
                } else {
                    seen_components.insert(&component.name, component.span.line);
                }

                self.check_fields(&component.fields, &format!("component '{}'", component.name));
            }
        }
    }

    fn check_constraints(&mut self, constraints: &[AstConstraint]) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for constraint in constraints {
            self.check_duplicate_id("constraint", &constraint.id, constraint.id_span, &mut seen);
            self.check_fields(&constraint.fields, &format!("constraint '{}'", constraint.id));
        }
    }

    fn check_motions(&mut self, motions: &[AstMotion]) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for motion in motions {
            self.check_duplicate_id("motion", &motion.id, motion.id_span, &mut seen);
            self.check_fields(&motion.fields, &format!("motion '{}'", motion.id));

            if motion.motion_type == "rotation" {
                if let Some(axis) = motion.field("axis") {
                    if axis.value.as_vector().is_none() {
                        self.errors.add(Diagnostic::new(
                            ErrorCode::InvalidMotionParam,
                            format!(
                                "Rotation motion '{}' requires 'axis' to be a vector, found {}",
                                motion.id,
                                axis.value.kind_name()
                            ),
                            axis.value.span(),
                            self.file,
                        ));
                    }
                }
            }

            if motion.motion_type == "rotation" || motion.motion_type == "translation" {
                if let Some(speed) = motion.field("speed") {
                    if let Some(v) = speed.value.as_number() {
                        if !v.is_finite() {
                            self.errors.add(Diagnostic::new(
                                ErrorCode::InvalidMotionParam,
                                format!("Motion '{}' speed must be finite, found {v}", motion.id),
                                speed.value.span(),
                                self.file,
                            ));
                        }
                    }
                }
            }
        }
    }

    fn check_timelines(&mut self, timelines: &[AstTimeline]) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for timeline in timelines {
            self.check_duplicate_id("timeline", &timeline.id, timeline.id_span, &mut seen);

            for event in &timeline.events {
                if !(event.duration > 0.0) {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::NonPositiveDuration,
                        format!("Event duration must be > 0, found {}", event.duration),
                        event.duration_span,
                        self.file,
                    ));
                }
                if event.start < 0.0 {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::NegativeStart,
                        format!("Event start must be >= 0, found {}", event.start),
                        event.start_span,
                        self.file,
                    ));
                }
            }
        }
    }

    // ── Shared checks ────────────────────────────────────────────

    fn check_duplicate_id<'b>(
        &mut self,
        what: &str,
        id: &'b str,
        span: SourceSpan,
        seen: &mut HashMap<&'b str, usize>,
    ) {
        if let Some(&first_line) = seen.get(id) {
            self.errors.add(Diagnostic::new(
                ErrorCode::DuplicateId,
                format!("Duplicate {what} id '{id}' (first defined at line {first_line})"),
                span,
                self.file,
            ));
        } else {
            seen.insert(id, span.line);
        }
    }

    /// Duplicate field names plus the numeric walk: non-finite values and
    /// a defensive vector-length recheck.
    fn check_fields(&mut self, fields: &[AstField], context: &str) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for field in fields {
            if let Some(&first_line) = seen.get(field.name.as_str()) {
                self.errors.add(Diagnostic::new(
                    ErrorCode::DuplicateField,
                    format!(
                        "Duplicate field '{}' in {context} (first defined at line {first_line})",
                        field.name
                    ),
                    field.span,
                    self.file,
                ));
            } else {
                seen.insert(&field.name, field.span.line);
            }

            match &field.value {
                AstValue::Number(v, span) => {
                    if !v.is_finite() {
                        self.errors.add(Diagnostic::new(
                            ErrorCode::NonFiniteNumber,
                            format!("Field '{}' must be a finite number, found {v}", field.name),
                            *span,
                            self.file,
                        ));
                    }
                }
                AstValue::Vector(components, span) => {
                    if components.len() != 3 {
                        self.errors.add(Diagnostic::new(
                            ErrorCode::MalformedVector,
                            format!(
                                "Malformed vector: expected 3 components, found {}",
                                components.len()
                            ),
                            *span,
                            self.file,
                        ));
                    }
                    for (i, component) in components.iter().enumerate() {
                        if !component.is_finite() {
                            self.errors.add(Diagnostic::new(
                                ErrorCode::NonFiniteNumber,
                                format!(
                                    "Vector component {i} of field '{}' is not finite: {component}",
                                    field.name
                                ),
                                *span,
                                self.file,
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

fn is_valid_ir_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.parse::<u32>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn validate_src(source: &str) -> Vec<Diagnostic> {
        let ast = parse(lex(source, "test.sdl").unwrap(), "test.sdl").unwrap();
        validate(&ast, "test.sdl")
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    fn header(version: &str, ir_version: &str, unit_system: &str) -> String {
        format!(
            "scene {{\n  name: \"T\"\n  version: {version}\n  ir_version: \"{ir_version}\"\n  unit_system: \"{unit_system}\"\n}}\nlibrary_imports {{ math: \"core_mechanics\" }}\n"
        )
    }

    #[test]
    fn clean_header_passes() {
        assert!(validate_src(&header("1", "0.1.0", "SI")).is_empty());
    }

    #[test]
    fn version_zero_is_rejected() {
        let diagnostics = validate_src(&header("0", "0.1.0", "SI"));
        assert_eq!(codes(&diagnostics), vec![ErrorCode::InvalidSceneVersion]);
    }

    #[test]
    fn ir_version_format() {
        assert!(is_valid_ir_version("0.1.0"));
        assert!(is_valid_ir_version("10.20.30"));
        assert!(!is_valid_ir_version("1.2"));
        assert!(!is_valid_ir_version("1.2.3.4"));
        assert!(!is_valid_ir_version("a.b.c"));
        assert!(!is_valid_ir_version("1..3"));

        let diagnostics = validate_src(&header("1", "1.2", "SI"));
        assert_eq!(codes(&diagnostics), vec![ErrorCode::InvalidIrVersion]);
    }

    #[test]
    fn metric_unit_system_is_rejected() {
        let diagnostics = validate_src(&header("1", "0.1.0", "Metric"));
        assert_eq!(codes(&diagnostics), vec![ErrorCode::InvalidUnitSystem]);
        assert!(diagnostics[0].message.contains("Metric"));
    }

    #[test]
    fn duplicate_entity_ids() {
        let source = format!(
            "{}entity a {{ kind: solid components {{ geometry {{ primitive: cube }} }} }}\nentity a {{ kind: solid components {{ geometry {{ primitive: cube }} }} }}\n",
            header("1", "0.1.0", "SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::DuplicateId]);
        assert!(diagnostics[0].message.contains("first defined at line"));
        // Span points at the redefinition.
        assert_eq!(diagnostics[0].span.line, 9);
    }

    #[test]
    fn duplicate_component_in_entity() {
        let source = format!(
            "{}entity a {{ kind: solid components {{ geometry {{ primitive: cube }} geometry {{ primitive: sphere }} }} }}\n",
            header("1", "0.1.0", "SI")
        );
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::DuplicateComponent]);
    }

    #[test]
    fn entity_without_components() {
        let source = format!(
            "{}entity hollow {{ kind: solid components {{ }} }}\n",
            header("1", "0.1.0", "SI")
        );
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::EmptyEntity]);
    }

    #[test]
    fn duplicate_field_in_component() {
        let source = format!(
            "{}entity a {{ kind: solid components {{ physical {{ mass: 1.0 mass: 2.0 rigid: true }} }} }}\n",
            header("1", "0.1.0", "SI")
        );
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::DuplicateField]);
    }

    #[test]
    fn duplicate_import_alias() {
        let source = "scene {\n  name: \"T\"\n  version: 1\n  ir_version: \"0.1.0\"\n  unit_system: \"SI\"\n}\nlibrary_imports {\n  math: \"core_mechanics\"\n  math: \"basic_solids\"\n}\n";
        assert_eq!(codes(&validate_src(source)), vec![ErrorCode::DuplicateImportAlias]);
    }

    #[test]
    fn overflowed_literal_is_non_finite() {
        let source = format!(
            "{}entity a {{ kind: solid components {{ physical {{ mass: 1e999 rigid: true }} }} }}\n",
            header("1", "0.1.0", "SI")
        );
        let diagnostics = validate_src(&source);
        assert!(codes(&diagnostics).contains(&ErrorCode::NonFiniteNumber));
    }

    #[test]
    fn rotation_axis_must_be_vector() {
        let source = format!(
            "{}motion spin {{ target: a type: rotation axis: 1.0 }}\n",
            header("1", "0.1.0", "SI")
        );
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::InvalidMotionParam]);
    }

    #[test]
    fn translation_speed_must_be_finite() {
        let source = format!(
            "{}motion slide {{ target: a type: translation speed: 1e999 }}\n",
            header("1", "0.1.0", "SI")
        );
        let diagnostics = validate_src(&source);
        // The numeric walk and the motion-param check both catch it.
        assert!(codes(&diagnostics).contains(&ErrorCode::InvalidMotionParam));
    }

    #[test]
    fn event_timing_bounds() {
        let source = format!(
            "{}motion m {{ target: a type: rotation }}\ntimeline t {{\n  event {{ motion: m start: -1.0 duration: 0.0 }}\n}}\n",
            header("1", "0.1.0", "SI")
        );
        let diagnostics = validate_src(&source);
        let found = codes(&diagnostics);
        assert!(found.contains(&ErrorCode::NonPositiveDuration));
        assert!(found.contains(&ErrorCode::NegativeStart));
    }

    #[test]
    fn diagnostics_are_sorted_by_position() {
        let source = format!(
            "{}entity a {{ kind: solid components {{ }} }}\nentity a {{ kind: solid components {{ }} }}\n",
            header("0", "0.1.0", "SI")
        );
        let diagnostics = validate_src(&source);
        let offsets: Vec<usize> = diagnostics.iter().map(|d| d.span.offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }
}
