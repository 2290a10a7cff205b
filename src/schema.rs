//! Schema registry: the single source of truth for which fields each
//! component, constraint, and motion type accepts. The schema pass and
//! the reference pass both read from here.

use indexmap::IndexMap;

/// Declared type of a schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Number,
    String,
    Identifier,
    Vector3,
    Boolean,
    /// Identifier restricted to a fixed set of values.
    Enum(Vec<String>),
}

impl FieldType {
    /// Human-readable description for type-mismatch messages.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Number => "a number".to_string(),
            FieldType::String => "a string".to_string(),
            FieldType::Identifier => "an identifier".to_string(),
            FieldType::Vector3 => "a vector [x, y, z]".to_string(),
            FieldType::Boolean => "true or false".to_string(),
            FieldType::Enum(values) => format!("one of: {}", values.join(", ")),
        }
    }
}

/// One field in a type schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    /// Identifier fields that must resolve to an entity id (constraint
    /// parent/child, driver/driven).
    pub entity_ref: bool,
}

impl FieldSpec {
    pub fn required(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            required: true,
            entity_ref: false,
        }
    }

    pub fn optional(name: &str, ty: FieldType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            required: false,
            entity_ref: false,
        }
    }

    pub fn entity_ref(mut self) -> Self {
        self.entity_ref = true;
        self
    }
}

/// Field schema for one component/constraint/motion type.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl TypeSchema {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All known type schemas plus the accepted entity kinds. Immutable during
/// compilation; hosts may register additions at startup.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    components: IndexMap<String, TypeSchema>,
    constraints: IndexMap<String, TypeSchema>,
    motions: IndexMap<String, TypeSchema>,
    entity_kinds: Vec<String>,
}

impl SchemaRegistry {
    /// The built-in schemas for the core mechanical vocabulary.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            components: IndexMap::new(),
            constraints: IndexMap::new(),
            motions: IndexMap::new(),
            entity_kinds: ["solid", "light", "camera", "particle_system"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        registry.register_component(TypeSchema::new(
            "transform",
            vec![
                FieldSpec::required("position", FieldType::Vector3),
                FieldSpec::required("rotation", FieldType::Vector3),
                FieldSpec::required("scale", FieldType::Vector3),
            ],
        ));
        registry.register_component(TypeSchema::new(
            "geometry",
            vec![FieldSpec::required(
                "primitive",
                FieldType::Enum(
                    ["cube", "sphere", "cylinder", "cone", "plane"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            )],
        ));
        registry.register_component(TypeSchema::new(
            "physical",
            vec![
                FieldSpec::required("mass", FieldType::Number),
                FieldSpec::required("rigid", FieldType::Boolean),
            ],
        ));

        registry.register_constraint(TypeSchema::new(
            "fixed_joint",
            vec![
                FieldSpec::required("parent", FieldType::Identifier).entity_ref(),
                FieldSpec::required("child", FieldType::Identifier).entity_ref(),
            ],
        ));
        registry.register_constraint(TypeSchema::new(
            "gear_relation",
            vec![
                FieldSpec::optional("driver", FieldType::Identifier).entity_ref(),
                FieldSpec::optional("driven", FieldType::Identifier).entity_ref(),
                FieldSpec::optional("ratio", FieldType::Number),
            ],
        ));

        registry.register_motion(TypeSchema::new(
            "rotation",
            vec![
                FieldSpec::optional("axis", FieldType::Vector3),
                FieldSpec::optional("speed", FieldType::Number),
            ],
        ));
        registry.register_motion(TypeSchema::new(
            "translation",
            vec![
                FieldSpec::optional("direction", FieldType::Vector3),
                FieldSpec::optional("speed", FieldType::Number),
            ],
        ));

        registry
    }

    pub fn register_component(&mut self, schema: TypeSchema) {
        self.components.insert(schema.name.clone(), schema);
    }

    pub fn register_constraint(&mut self, schema: TypeSchema) {
        self.constraints.insert(schema.name.clone(), schema);
    }

    pub fn register_motion(&mut self, schema: TypeSchema) {
        self.motions.insert(schema.name.clone(), schema);
    }

    pub fn add_entity_kind(&mut self, kind: &str) {
        self.entity_kinds.push(kind.to_string());
    }

    pub fn component(&self, name: &str) -> Option<&TypeSchema> {
        self.components.get(name)
    }

    pub fn constraint(&self, name: &str) -> Option<&TypeSchema> {
        self.constraints.get(name)
    }

    pub fn motion(&self, name: &str) -> Option<&TypeSchema> {
        self.motions.get(name)
    }

    pub fn is_entity_kind(&self, kind: &str) -> bool {
        self.entity_kinds.iter().any(|k| k == kind)
    }

    pub fn entity_kinds(&self) -> &[String] {
        &self.entity_kinds
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
