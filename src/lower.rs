//! Lowering: validated AST → IR.
//!
//! A pure, infallible traversal. Value variants map one to one, the
//! boolean identifiers become `Boolean`, and a motion's flat parameter
//! fields are grouped under `parameters` with `target`/`type` promoted to
//! their own slots. If anything here could fail, validation has a bug.

use indexmap::IndexMap;

use crate::ast::*;
use crate::ir::*;

/// Lower a validated file to its IR.
pub fn lower(ast: &AstFile) -> IrScene {
    IrScene {
        metadata: IrMetadata {
            name: ast.scene.name.clone(),
            version: ast.scene.version,
            ir_version: ast.scene.ir_version.clone(),
            unit_system: ast.scene.unit_system.clone(),
        },
        library_imports: ast
            .library_imports
            .imports
            .iter()
            .map(|import| (import.alias.clone(), import.library_name.clone()))
            .collect(),
        entities: ast.entities.iter().map(lower_entity).collect(),
        constraints: ast.constraints.iter().map(lower_constraint).collect(),
        motions: ast.motions.iter().map(lower_motion).collect(),
        timelines: ast.timelines.iter().map(lower_timeline).collect(),
    }
}

fn lower_entity(entity: &AstEntity) -> IrEntity {
    let mut components = IndexMap::new();
    for component in &entity.components {
        components.insert(
            component.name.clone(),
            IrComponent {
                component_type: component.name.clone(),
                properties: lower_fields(&component.fields),
            },
        );
    }

    IrEntity {
        id: entity.id.clone(),
        kind: entity.kind.clone(),
        components,
    }
}

fn lower_constraint(constraint: &AstConstraint) -> IrConstraint {
    IrConstraint {
        id: constraint.id.clone(),
        constraint_type: constraint.constraint_type.clone(),
        parameters: lower_fields(&constraint.fields),
    }
}

fn lower_motion(motion: &AstMotion) -> IrMotion {
    IrMotion {
        id: motion.id.clone(),
        motion_type: motion.motion_type.clone(),
        target_entity: motion.target.clone(),
        parameters: lower_fields(&motion.fields),
    }
}

fn lower_timeline(timeline: &AstTimeline) -> IrTimeline {
    IrTimeline {
        id: timeline.id.clone(),
        events: timeline
            .events
            .iter()
            .map(|event| IrEvent {
                motion_id: event.motion.clone(),
                start_time: event.start,
                duration: event.duration,
            })
            .collect(),
    }
}

fn lower_fields(fields: &[AstField]) -> IndexMap<String, IrValue> {
    fields
        .iter()
        .map(|field| (field.name.clone(), lower_value(&field.value)))
        .collect()
}

fn lower_value(value: &AstValue) -> IrValue {
    match value {
        AstValue::Number(n, _) => IrValue::Number(*n),
        AstValue::Str(s, _) => IrValue::String(s.clone()),
        AstValue::Identifier(id, _) => match id.as_str() {
            "true" => IrValue::Boolean(true),
            "false" => IrValue::Boolean(false),
            _ => IrValue::Identifier(id.clone()),
        },
        AstValue::Vector(components, _) => {
            let component = |i: usize| components.get(i).copied().unwrap_or_default();
            IrValue::Vector3([component(0), component(1), component(2)])
        }
    }
}
