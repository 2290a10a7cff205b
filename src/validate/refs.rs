//! Pass 3: reference resolution.
//!
//! Symbol tables are built in one sweep over the whole file, then every
//! reference is resolved in a second sweep. Constraint relationships are
//! additionally checked for cycles, and each timeline's events for
//! per-motion interval overlaps.

use std::collections::{HashMap, HashSet};

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, ErrorCollector};
use crate::schema::SchemaRegistry;

pub fn validate(ast: &AstFile, file: &str, schemas: &SchemaRegistry) -> Vec<Diagnostic> {
    let mut pass = RefPass {
        file,
        schemas,
        errors: ErrorCollector::new(),
    };

    let entities: HashSet<&str> = ast.entities.iter().map(|e| e.id.as_str()).collect();
    let motions: HashSet<&str> = ast.motions.iter().map(|m| m.id.as_str()).collect();

    pass.check_constraint_refs(&ast.constraints, &entities);
    pass.check_motion_refs(&ast.motions, &entities);
    pass.check_event_refs(&ast.timelines, &motions);
    pass.check_cycles(ast, &entities);
    pass.check_overlaps(&ast.timelines);

    pass.errors.into_sorted()
}

struct RefPass<'a> {
    file: &'a str,
    schemas: &'a SchemaRegistry,
    errors: ErrorCollector,
}

impl RefPass<'_> {
    fn check_constraint_refs(&mut self, constraints: &[AstConstraint], entities: &HashSet<&str>) {
        for constraint in constraints {
            let Some(schema) = self.schemas.constraint(&constraint.constraint_type) else {
                continue; // unknown type, reported by the schema pass
            };
            for field in &constraint.fields {
                let is_ref = schema.field(&field.name).is_some_and(|spec| spec.entity_ref);
                if !is_ref {
                    continue;
                }
                if let AstValue::Identifier(target, span) = &field.value {
                    if !entities.contains(target.as_str()) {
                        self.errors.add(
                            Diagnostic::new(
                                ErrorCode::UndefinedEntity,
                                format!("Undefined entity '{target}'"),
                                *span,
                                self.file,
                            )
                            .with_label("entity not found in scope")
                            .with_help(format!("define '{target}' before referencing it")),
                        );
                    }
                }
            }
        }
    }

    fn check_motion_refs(&mut self, motions: &[AstMotion], entities: &HashSet<&str>) {
        for motion in motions {
            if !entities.contains(motion.target.as_str()) {
                self.errors.add(
                    Diagnostic::new(
                        ErrorCode::UndefinedEntity,
                        format!("Undefined entity '{}'", motion.target),
                        motion.target_span,
                        self.file,
                    )
                    .with_label("entity not found in scope")
                    .with_help(format!(
                        "motion '{}' targets an entity that does not exist",
                        motion.id
                    )),
                );
            }
        }
    }

    fn check_event_refs(&mut self, timelines: &[AstTimeline], motions: &HashSet<&str>) {
        for timeline in timelines {
            for event in &timeline.events {
                if !motions.contains(event.motion.as_str()) {
                    self.errors.add(
                        Diagnostic::new(
                            ErrorCode::UndefinedMotion,
                            format!("Undefined motion '{}'", event.motion),
                            event.motion_span,
                            self.file,
                        )
                        .with_label("motion not found in scope")
                        .with_help(format!(
                            "define motion '{}' before scheduling it in timeline '{}'",
                            event.motion, timeline.id
                        )),
                    );
                }
            }
        }
    }

    // ── Cycle detection ──────────────────────────────────────────

    /// Three-color DFS over the directed entity graph built from
    /// parent→child (fixed_joint) and driver→driven (gear_relation)
    /// relationships. A back-edge to a grey node closes a cycle; the
    /// diagnostic points at the constraint supplying that edge.
    fn check_cycles(&mut self, ast: &AstFile, entities: &HashSet<&str>) {
        let mut graph: HashMap<&str, Vec<(&str, &AstConstraint)>> = HashMap::new();

        for constraint in &ast.constraints {
            let from = constraint
                .field("parent")
                .or_else(|| constraint.field("driver"))
                .and_then(|f| f.value.as_identifier());
            let to = constraint
                .field("child")
                .or_else(|| constraint.field("driven"))
                .and_then(|f| f.value.as_identifier());

            if let (Some(from), Some(to)) = (from, to) {
                if entities.contains(from) && entities.contains(to) {
                    graph.entry(from).or_default().push((to, constraint));
                }
            }
        }

        let mut colors: HashMap<&str, Color> = HashMap::new();
        let mut stack: Vec<&str> = Vec::new();

        // Definition order keeps reports deterministic.
        for entity in &ast.entities {
            if !colors.contains_key(entity.id.as_str()) {
                self.dfs(entity.id.as_str(), &graph, &mut colors, &mut stack);
            }
        }
    }

    fn dfs<'b>(
        &mut self,
        node: &'b str,
        graph: &HashMap<&'b str, Vec<(&'b str, &'b AstConstraint)>>,
        colors: &mut HashMap<&'b str, Color>,
        stack: &mut Vec<&'b str>,
    ) {
        colors.insert(node, Color::Grey);
        stack.push(node);

        if let Some(edges) = graph.get(node) {
            for &(next, constraint) in edges {
                match colors.get(next).copied() {
                    None => self.dfs(next, graph, colors, stack),
                    Some(Color::Grey) => {
                        let cycle_start = stack.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle: Vec<&str> = stack[cycle_start..].to_vec();
                        cycle.push(next);
                        self.errors.add(
                            Diagnostic::new(
                                ErrorCode::ConstraintCycle,
                                format!(
                                    "Constraint '{}' closes a dependency cycle",
                                    constraint.id
                                ),
                                constraint.span,
                                self.file,
                            )
                            .with_help(format!("cycle: {}", cycle.join(" -> "))),
                        );
                    }
                    Some(Color::Black) => {}
                }
            }
        }

        stack.pop();
        colors.insert(node, Color::Black);
    }

    // ── Timeline overlap detection ───────────────────────────────

    /// Within a single timeline, two events driving the same motion must
    /// not overlap in `[start, start+duration)`. Events across different
    /// timelines never conflict.
    fn check_overlaps(&mut self, timelines: &[AstTimeline]) {
        for timeline in timelines {
            let mut by_motion: HashMap<&str, Vec<&AstEvent>> = HashMap::new();
            let mut order: Vec<&str> = Vec::new();
            for event in &timeline.events {
                let group = by_motion.entry(event.motion.as_str()).or_default();
                if group.is_empty() {
                    order.push(&event.motion);
                }
                group.push(event);
            }

            for motion in order {
                let mut events = by_motion.remove(motion).unwrap_or_default();
                events.sort_by(|a, b| {
                    a.start
                        .partial_cmp(&b.start)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                for pair in events.windows(2) {
                    let (prev, next) = (pair[0], pair[1]);
                    let prev_end = prev.start + prev.duration;
                    if next.start < prev_end {
                        self.errors.add(
                            Diagnostic::new(
                                ErrorCode::OverlappingEvents,
                                format!(
                                    "Overlapping events for motion '{motion}' in timeline '{}': [{}, {}) and [{}, {})",
                                    timeline.id,
                                    prev.start,
                                    prev_end,
                                    next.start,
                                    next.start + next.duration,
                                ),
                                next.span,
                                self.file,
                            )
                            .with_help("events for the same motion cannot overlap in time"),
                        );
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Grey,
    Black,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn validate_src(source: &str) -> Vec<Diagnostic> {
        let ast = parse(lex(source, "test.sdl").unwrap(), "test.sdl").unwrap();
        validate(&ast, "test.sdl", &SchemaRegistry::with_defaults())
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<ErrorCode> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    const HEADER: &str = "scene {\n  name: \"T\"\n  version: 1\n  ir_version: \"0.1.0\"\n  unit_system: \"SI\"\n}\nlibrary_imports { math: \"core_mechanics\" geo: \"basic_solids\" gears: \"gear_systems\" }\n";

    fn entity(id: &str) -> String {
        format!("entity {id} {{ kind: solid components {{ geometry {{ primitive: cube }} }} }}\n")
    }

    #[test]
    fn resolved_references_pass() {
        let source = format!(
            "{HEADER}{}{}constraint attach {{ type: fixed_joint parent: base child: arm }}\nmotion spin {{ target: base type: rotation }}\ntimeline t {{ event {{ motion: spin start: 0 duration: 1 }} }}\n",
            entity("base"),
            entity("arm"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn undefined_constraint_reference() {
        let source = format!(
            "{HEADER}{}constraint attach {{ type: fixed_joint parent: base child: ghost }}\n",
            entity("base"),
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UndefinedEntity]);
        assert!(diagnostics[0].message.contains("ghost"));
    }

    #[test]
    fn non_reference_fields_are_ignored() {
        // 'ratio' is a number, not an entity reference.
        let source = format!(
            "{HEADER}{}{}constraint g {{ type: gear_relation driver: a driven: b ratio: 2.0 }}\n",
            entity("a"),
            entity("b"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn undefined_motion_target() {
        let source = format!("{HEADER}motion spin {{ target: nobody type: rotation }}\n");
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UndefinedEntity]);
    }

    #[test]
    fn undefined_event_motion_points_at_the_name() {
        let source = format!(
            "{HEADER}{}motion spin {{ target: cube1 type: rotation }}\ntimeline t {{ event {{ motion: spiin start: 0 duration: 1 }} }}\n",
            entity("cube1"),
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::UndefinedMotion]);
        assert!(diagnostics[0].message.contains("spiin"));
        assert_eq!(diagnostics[0].span.len, "spiin".len());
    }

    #[test]
    fn two_joint_cycle_is_detected() {
        let source = format!(
            "{HEADER}{}{}constraint c1 {{ type: gear_relation driver: a driven: b }}\nconstraint c2 {{ type: gear_relation driver: b driven: a }}\n",
            entity("a"),
            entity("b"),
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::ConstraintCycle]);
        let help = diagnostics[0].help.as_deref().unwrap();
        assert!(help.contains("a -> b -> a"), "help was: {help}");
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let source = format!(
            "{HEADER}{}constraint c {{ type: fixed_joint parent: a child: a }}\n",
            entity("a"),
        );
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::ConstraintCycle]);
    }

    #[test]
    fn chain_without_cycle_passes() {
        let source = format!(
            "{HEADER}{}{}{}constraint c1 {{ type: fixed_joint parent: a child: b }}\nconstraint c2 {{ type: fixed_joint parent: b child: c }}\n",
            entity("a"),
            entity("b"),
            entity("c"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let source = format!(
            "{HEADER}{}{}{}constraint c1 {{ type: fixed_joint parent: a child: b }}\nconstraint c2 {{ type: fixed_joint parent: a child: c }}\nconstraint c3 {{ type: fixed_joint parent: b child: c }}\n",
            entity("a"),
            entity("b"),
            entity("c"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn overlapping_events_same_motion_same_timeline() {
        let source = format!(
            "{HEADER}{}motion spin {{ target: e type: rotation }}\ntimeline t {{\n  event {{ motion: spin start: 0 duration: 2 }}\n  event {{ motion: spin start: 1 duration: 1 }}\n}}\n",
            entity("e"),
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::OverlappingEvents]);
        assert!(diagnostics[0].message.contains("[0, 2)"));
        assert!(diagnostics[0].message.contains("[1, 2)"));
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        // [0, 2) and [2, 3): half-open intervals may touch.
        let source = format!(
            "{HEADER}{}motion spin {{ target: e type: rotation }}\ntimeline t {{\n  event {{ motion: spin start: 0 duration: 2 }}\n  event {{ motion: spin start: 2 duration: 1 }}\n}}\n",
            entity("e"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn different_motions_never_conflict() {
        let source = format!(
            "{HEADER}{}motion spin {{ target: e type: rotation }}\nmotion slide {{ target: e type: translation }}\ntimeline t {{\n  event {{ motion: spin start: 0 duration: 5 }}\n  event {{ motion: slide start: 1 duration: 1 }}\n}}\n",
            entity("e"),
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn same_motion_across_timelines_does_not_conflict() {
        let source = format!(
            "{HEADER}{}motion spin {{ target: e type: rotation }}\ntimeline t1 {{ event {{ motion: spin start: 0 duration: 5 }} }}\ntimeline t2 {{ event {{ motion: spin start: 1 duration: 5 }} }}\n",
            entity("e"),
        );
        assert!(validate_src(&source).is_empty());
    }
}
