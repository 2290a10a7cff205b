//! Pass 4: physical-unit sanity.
//!
//! Rotation axes must be unit vectors, masses must sit inside the bounds
//! of the scene's unit system, and suspiciously large angles or angular
//! speeds draw degree-vs-radian warnings. Non-finite scalars that slipped
//! past earlier passes are caught here as a backstop.

use std::f64::consts::PI;

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, ErrorCollector};

/// Tolerance for `|‖axis‖ - 1|`.
const AXIS_TOLERANCE: f64 = 1e-6;

/// Any rotation component beyond this is probably degrees, not radians.
const ROTATION_WARN_LIMIT: f64 = 4.0 * PI;

/// Angular speeds beyond this are probably deg/s, not rad/s.
const SPEED_WARN_LIMIT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitSystem {
    Si,
    Imperial,
}

impl UnitSystem {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "SI" => Some(UnitSystem::Si),
            "Imperial" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }

    /// Upper mass bound: 1e6 kg, or the same quantity in pounds.
    fn mass_bound(self) -> f64 {
        match self {
            UnitSystem::Si => 1e6,
            UnitSystem::Imperial => 2.204_622_6e6,
        }
    }

    fn mass_unit(self) -> &'static str {
        match self {
            UnitSystem::Si => "kg",
            UnitSystem::Imperial => "lb",
        }
    }
}

pub fn validate(ast: &AstFile, file: &str) -> Vec<Diagnostic> {
    let mut pass = UnitPass {
        file,
        // An invalid unit system is already E122; only the system-specific
        // bounds are skipped in that case.
        system: UnitSystem::parse(&ast.scene.unit_system),
        errors: ErrorCollector::new(),
    };
    pass.check_entities(&ast.entities);
    pass.check_motions(&ast.motions);
    pass.check_timelines(&ast.timelines);
    pass.errors.into_sorted()
}

struct UnitPass<'a> {
    file: &'a str,
    system: Option<UnitSystem>,
    errors: ErrorCollector,
}

impl UnitPass<'_> {
    fn check_entities(&mut self, entities: &[AstEntity]) {
        for entity in entities {
            if let Some(physical) = entity.component("physical") {
                if let Some(field) = physical.field("mass") {
                    if let Some(mass) = field.value.as_number() {
                        self.check_mass(mass, &entity.id, field);
                    }
                }
            }

            if let Some(transform) = entity.component("transform") {
                if let Some(field) = transform.field("rotation") {
                    if let Some(rotation) = field.value.as_vector() {
                        self.check_rotation_vector(rotation, &entity.id, field);
                    }
                }
            }
        }
    }

    fn check_mass(&mut self, mass: f64, entity_id: &str, field: &AstField) {
        if !mass.is_finite() {
            self.errors.add(Diagnostic::new(
                ErrorCode::NonFiniteValue,
                format!("Mass of entity '{entity_id}' is not finite: {mass}"),
                field.value.span(),
                self.file,
            ));
            return;
        }

        if mass <= 0.0 {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::NonPositiveMass,
                    format!("Mass must be positive, found {mass} in entity '{entity_id}'"),
                    field.value.span(),
                    self.file,
                )
                .with_help("mass is a physical quantity and must be > 0"),
            );
            return;
        }

        if let Some(system) = self.system {
            if mass > system.mass_bound() {
                self.errors.add(
                    Diagnostic::new(
                        ErrorCode::MassOutOfRange,
                        format!(
                            "Mass {mass} {} in entity '{entity_id}' exceeds the {} bound of {}",
                            system.mass_unit(),
                            system.mass_unit(),
                            system.mass_bound(),
                        ),
                        field.value.span(),
                        self.file,
                    )
                    .with_help("check whether the mass unit is correct"),
                );
            }
        }
    }

    fn check_rotation_vector(&mut self, rotation: &[f64], entity_id: &str, field: &AstField) {
        if let Some(component) = rotation
            .iter()
            .find(|c| c.is_finite() && c.abs() > ROTATION_WARN_LIMIT)
        {
            self.errors.add(
                Diagnostic::new(
                    ErrorCode::SuspiciousRotation,
                    format!(
                        "Rotation component {component} of entity '{entity_id}' exceeds 4\u{3c0} - degrees instead of radians?"
                    ),
                    field.value.span(),
                    self.file,
                )
                .with_help(format!(
                    "{component} degrees is {:.6} radians",
                    component * PI / 180.0
                )),
            );
        }
    }

    fn check_motions(&mut self, motions: &[AstMotion]) {
        for motion in motions {
            if motion.motion_type == "rotation" {
                if let Some(field) = motion.field("axis") {
                    if let Some(axis) = field.value.as_vector() {
                        self.check_axis(axis, &motion.id, field);
                    }
                }

                if let Some(field) = motion.field("speed") {
                    if let Some(speed) = field.value.as_number() {
                        if speed.is_finite() && speed.abs() > SPEED_WARN_LIMIT {
                            self.errors.add(
                                Diagnostic::new(
                                    ErrorCode::SuspiciousSpeed,
                                    format!(
                                        "Rotation speed {speed} of motion '{}' - degrees per second instead of radians per second?",
                                        motion.id
                                    ),
                                    field.value.span(),
                                    self.file,
                                )
                                .with_help(format!(
                                    "{speed} deg/s is {:.6} rad/s",
                                    speed * PI / 180.0
                                )),
                            );
                        }
                    }
                }
            }
        }
    }

    fn check_axis(&mut self, axis: &[f64], motion_id: &str, field: &AstField) {
        if axis.len() != 3 || axis.iter().any(|c| !c.is_finite()) {
            return; // malformed vectors are reported by earlier passes
        }

        let magnitude = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if (magnitude - 1.0).abs() > AXIS_TOLERANCE {
            let mut diagnostic = Diagnostic::new(
                ErrorCode::AxisNotNormalized,
                format!(
                    "Rotation axis of motion '{motion_id}' must be a unit vector, found magnitude {magnitude:.6}"
                ),
                field.value.span(),
                self.file,
            );
            diagnostic = if magnitude > 0.0 {
                diagnostic.with_help(format!(
                    "normalized: [{:.6}, {:.6}, {:.6}]",
                    axis[0] / magnitude,
                    axis[1] / magnitude,
                    axis[2] / magnitude
                ))
            } else {
                diagnostic.with_help("the zero vector has no direction")
            };
            self.errors.add(diagnostic);
        }
    }

    fn check_timelines(&mut self, timelines: &[AstTimeline]) {
        for timeline in timelines {
            for event in &timeline.events {
                if !event.start.is_finite() {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::NonFiniteValue,
                        format!("Event start is not finite: {}", event.start),
                        event.start_span,
                        self.file,
                    ));
                }
                if !event.duration.is_finite() {
                    self.errors.add(Diagnostic::new(
                        ErrorCode::NonFiniteValue,
                        format!("Event duration is not finite: {}", event.duration),
                        event.duration_span,
                        self.file,
                    ));
                }
            }
        }
    }
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

    fn header(unit_system: &str) -> String {
        format!(
            "scene {{\n  name: \"T\"\n  version: 1\n  ir_version: \"0.1.0\"\n  unit_system: \"{unit_system}\"\n}}\nlibrary_imports {{ math: \"core_mechanics\" }}\n"
        )
    }

    fn physical_entity(mass: &str) -> String {
        format!(
            "entity e {{ kind: solid components {{ physical {{ mass: {mass} rigid: true }} }} }}\n"
        )
    }

    #[test]
    fn zero_mass_is_rejected() {
        let source = format!("{}{}", header("SI"), physical_entity("0"));
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::NonPositiveMass]);
    }

    #[test]
    fn negative_mass_is_rejected() {
        let source = format!("{}{}", header("SI"), physical_entity("-1"));
        assert_eq!(codes(&validate_src(&source)), vec![ErrorCode::NonPositiveMass]);
    }

    #[test]
    fn huge_mass_exceeds_si_bound() {
        let source = format!("{}{}", header("SI"), physical_entity("1e7"));
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::MassOutOfRange]);
        assert!(diagnostics[0].message.contains("kg"));
    }

    #[test]
    fn imperial_bound_is_adjusted() {
        // The Imperial bound is ~2.2e6 lb: 2e6 lb passes, 1e7 lb does not.
        let ok = format!("{}{}", header("Imperial"), physical_entity("2e6"));
        assert!(validate_src(&ok).is_empty());

        let too_big = format!("{}{}", header("Imperial"), physical_entity("1e7"));
        assert_eq!(codes(&validate_src(&too_big)), vec![ErrorCode::MassOutOfRange]);
    }

    #[test]
    fn reasonable_mass_passes() {
        let source = format!("{}{}", header("SI"), physical_entity("10.5"));
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn unknown_unit_system_skips_bound_checks() {
        // E122 is the syntax pass's report; the unit pass still rejects
        // non-positive mass but cannot apply a bound.
        let source = format!("{}{}", header("Metric"), physical_entity("1e7"));
        assert!(validate_src(&source).is_empty());

        let negative = format!("{}{}", header("Metric"), physical_entity("-1"));
        assert_eq!(codes(&validate_src(&negative)), vec![ErrorCode::NonPositiveMass]);
    }

    #[test]
    fn zero_axis_is_not_normalized() {
        let source = format!(
            "{}motion spin {{ target: e type: rotation axis: [0, 0, 0] }}\n",
            header("SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::AxisNotNormalized]);
    }

    #[test]
    fn diagonal_axis_is_not_normalized() {
        let source = format!(
            "{}motion spin {{ target: e type: rotation axis: [1, 1, 0] }}\n",
            header("SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::AxisNotNormalized]);
        assert!(diagnostics[0].help.as_deref().unwrap().contains("0.707107"));
    }

    #[test]
    fn unit_axis_passes() {
        let source = format!(
            "{}motion spin {{ target: e type: rotation axis: [0, 1, 0] }}\n",
            header("SI")
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn translation_axis_is_not_checked() {
        // Only rotation motions require a normalized axis.
        let source = format!(
            "{}motion slide {{ target: e type: translation direction: [2, 0, 0] }}\n",
            header("SI")
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn large_rotation_component_warns() {
        let source = format!(
            "{}entity e {{ kind: solid components {{ transform {{ position: [0,0,0] rotation: [90, 0, 0] scale: [1,1,1] }} }} }}\n",
            header("SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::SuspiciousRotation]);
        assert!(!diagnostics[0].severity().is_error());
    }

    #[test]
    fn rotation_within_four_pi_is_silent() {
        let source = format!(
            "{}entity e {{ kind: solid components {{ transform {{ position: [0,0,0] rotation: [6.28, 0, 0] scale: [1,1,1] }} }} }}\n",
            header("SI")
        );
        assert!(validate_src(&source).is_empty());
    }

    #[test]
    fn fast_rotation_speed_warns() {
        let source = format!(
            "{}motion spin {{ target: e type: rotation axis: [0, 1, 0] speed: 360 }}\n",
            header("SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::SuspiciousSpeed]);
        assert!(!diagnostics[0].severity().is_error());
    }

    #[test]
    fn non_finite_event_times_are_caught() {
        let source = format!(
            "{}motion m {{ target: e type: rotation }}\ntimeline t {{ event {{ motion: m start: 1e999 duration: 1 }} }}\n",
            header("SI")
        );
        let diagnostics = validate_src(&source);
        assert_eq!(codes(&diagnostics), vec![ErrorCode::NonFiniteValue]);
    }
}
