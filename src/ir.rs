//! Intermediate representation: the JSON-serializable tree handed to the
//! renderer. Owns all its data; spans do not survive into the IR.
//!
//! All mappings are `IndexMap`s so serialization order follows insertion
//! order and the emitted JSON is byte-stable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A fully validated, lowered scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrScene {
    pub metadata: IrMetadata,
    pub library_imports: IndexMap<String, String>,
    pub entities: Vec<IrEntity>,
    pub constraints: Vec<IrConstraint>,
    pub motions: Vec<IrMotion>,
    pub timelines: Vec<IrTimeline>,
}

impl IrScene {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrMetadata {
    pub name: String,
    pub version: i64,
    pub ir_version: String,
    pub unit_system: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrEntity {
    pub id: String,
    pub kind: String,
    pub components: IndexMap<String, IrComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrComponent {
    pub component_type: String,
    pub properties: IndexMap<String, IrValue>,
}

/// Tagged value variants. The externally tagged serde form (single-key
/// objects like `{"Vector3":[0,1,0]}`) lets consumers tell a string
/// literal from an identifier reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IrValue {
    Number(f64),
    String(String),
    Vector3([f64; 3]),
    Boolean(bool),
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrConstraint {
    pub id: String,
    pub constraint_type: String,
    pub parameters: IndexMap<String, IrValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrMotion {
    pub id: String,
    pub motion_type: String,
    pub target_entity: String,
    pub parameters: IndexMap<String, IrValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrTimeline {
    pub id: String,
    pub events: Vec<IrEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrEvent {
    pub motion_id: String,
    pub start_time: f64,
    pub duration: f64,
}
