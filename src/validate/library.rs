//! Pass 5: library compatibility.
//!
//! Imports must name known libraries, and every type used in the scene
//! must be provided by at least one imported library. This pass runs last
//! so schema and reference reports for well-known types come first.

use crate::ast::*;
use crate::error::{Diagnostic, ErrorCode, ErrorCollector, SourceSpan};
use crate::library::{LibraryRegistry, TypeCategory};

pub fn validate(ast: &AstFile, file: &str, libraries: &LibraryRegistry) -> Vec<Diagnostic> {
    let mut pass = LibraryPass {
        file,
        libraries,
        errors: ErrorCollector::new(),
    };

    pass.check_imports(&ast.library_imports);

    let imported: Vec<&str> = ast
        .library_imports
        .imports
        .iter()
        .filter(|import| libraries.contains(&import.library_name))
        .map(|import| import.library_name.as_str())
        .collect();

    for entity in &ast.entities {
        for component in &entity.components {
            pass.check_usage(
                TypeCategory::Component,
                &component.name,
                component.span,
                &imported,
            );
        }
    }
    for constraint in &ast.constraints {
        pass.check_usage(
            TypeCategory::Constraint,
            &constraint.constraint_type,
            constraint.type_span,
            &imported,
        );
    }
    for motion in &ast.motions {
        pass.check_usage(
            TypeCategory::Motion,
            &motion.motion_type,
            motion.type_span,
            &imported,
        );
    }

    pass.errors.into_sorted()
}

struct LibraryPass<'a> {
    file: &'a str,
    libraries: &'a LibraryRegistry,
    errors: ErrorCollector,
}

impl LibraryPass<'_> {
    fn check_imports(&mut self, imports: &AstLibraryImports) {
        for import in &imports.imports {
            if self.libraries.contains(&import.library_name) {
                continue;
            }

            let mut help = match self.libraries.closest_name(&import.library_name) {
                Some(suggestion) => format!("did you mean '{suggestion}'? "),
                None => String::new(),
            };
            help.push_str(&format!(
                "available libraries: {}",
                self.libraries.names().collect::<Vec<_>>().join(", ")
            ));

            self.errors.add(
                Diagnostic::new(
                    ErrorCode::UnknownLibrary,
                    format!("Unknown library '{}'", import.library_name),
                    import.span,
                    self.file,
                )
                .with_help(help),
            );
        }
    }

    fn check_usage(
        &mut self,
        category: TypeCategory,
        type_name: &str,
        span: SourceSpan,
        imported: &[&str],
    ) {
        let covered = imported.iter().any(|library_name| {
            self.libraries
                .providers(category, type_name)
                .contains(library_name)
        });
        if covered {
            return;
        }

        let what = match category {
            TypeCategory::Component => "Component",
            TypeCategory::Constraint => "Constraint",
            TypeCategory::Motion => "Motion",
        };
        let providers = self.libraries.providers(category, type_name);
        let help = if providers.is_empty() {
            format!("no configured library provides '{type_name}'")
        } else {
            format!(
                "import {} to use '{type_name}'",
                providers
                    .iter()
                    .map(|p| format!("'{p}'"))
                    .collect::<Vec<_>>()
                    .join(" or ")
            )
        };

        self.errors.add(
            Diagnostic::new(
                ErrorCode::TypeNotImported,
                format!("{what} type '{type_name}' is not provided by any imported library"),
                span,
                self.file,
            )
            .with_help(help),
        );
    }
}
