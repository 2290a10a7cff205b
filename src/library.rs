//! Library registry: which named library provides which component,
//! constraint, and motion types. Every type used in a scene must be
//! covered by at least one imported library.

use indexmap::IndexMap;

/// A named library and the type names it provides.
#[derive(Debug, Clone)]
pub struct Library {
    pub name: String,
    pub version: String,
    pub components: Vec<String>,
    pub constraints: Vec<String>,
    pub motions: Vec<String>,
}

impl Library {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            components: Vec::new(),
            constraints: Vec::new(),
            motions: Vec::new(),
        }
    }

    pub fn components(mut self, names: &[&str]) -> Self {
        self.components = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn constraints(mut self, names: &[&str]) -> Self {
        self.constraints = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn motions(mut self, names: &[&str]) -> Self {
        self.motions = names.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// What category a type name belongs to, for provider lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Component,
    Constraint,
    Motion,
}

/// The set of libraries available for import. Immutable during
/// compilation; hosts may register additions at startup.
#[derive(Debug, Clone)]
pub struct LibraryRegistry {
    libraries: IndexMap<String, Library>,
}

impl LibraryRegistry {
    /// The built-in library set.
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            libraries: IndexMap::new(),
        };

        registry.register(
            Library::new("core_mechanics", "1.0.0")
                .components(&["transform", "physical"])
                .constraints(&["fixed_joint", "hinge_joint"])
                .motions(&["rotation", "translation"]),
        );
        registry.register(Library::new("basic_solids", "1.0.0").components(&["geometry"]));
        registry.register(
            Library::new("gear_systems", "1.0.0").constraints(&["gear_relation", "belt_drive"]),
        );
        registry.register(
            Library::new("advanced_physics", "1.0.0")
                .components(&["collision", "material"])
                .constraints(&["spring", "damper"])
                .motions(&["oscillation"]),
        );

        registry
    }

    pub fn register(&mut self, library: Library) {
        self.libraries.insert(library.name.clone(), library);
    }

    pub fn get(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.libraries.keys().map(String::as_str)
    }

    /// Names of the libraries (in registration order) that provide the
    /// given type.
    pub fn providers(&self, category: TypeCategory, type_name: &str) -> Vec<&str> {
        self.libraries
            .values()
            .filter(|lib| {
                let provided = match category {
                    TypeCategory::Component => &lib.components,
                    TypeCategory::Constraint => &lib.constraints,
                    TypeCategory::Motion => &lib.motions,
                };
                provided.iter().any(|t| t == type_name)
            })
            .map(|lib| lib.name.as_str())
            .collect()
    }

    /// True if any configured library provides the type, imported or not.
    pub fn provides(&self, category: TypeCategory, type_name: &str) -> bool {
        !self.providers(category, type_name).is_empty()
    }

    /// The closest known library name by edit distance, for E500 help.
    pub fn closest_name(&self, name: &str) -> Option<&str> {
        self.libraries
            .keys()
            .map(|known| (edit_distance(name, known), known))
            .filter(|(distance, _)| *distance <= 3)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, known)| known.as_str())
    }
}

impl Default for LibraryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Levenshtein distance between two names.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}
