//! The five validation passes.
//!
//! Each pass traverses the complete AST independently and collects every
//! diagnostic it can produce. Output ordering is deterministic: passes run
//! in the numbered order and each batch is sorted by source position.

pub mod library;
pub mod refs;
pub mod schema;
pub mod syntax;
pub mod units;

use crate::ast::AstFile;
use crate::error::Diagnostic;
use crate::library::LibraryRegistry;
use crate::schema::SchemaRegistry;

/// Run all passes over a parsed file and return the combined diagnostic
/// list: {syntax, schema, reference, unit, library}, each sorted by
/// ascending span offset.
pub fn run_all(
    ast: &AstFile,
    file: &str,
    schemas: &SchemaRegistry,
    libraries: &LibraryRegistry,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    diagnostics.extend(syntax::validate(ast, file));
    diagnostics.extend(schema::validate(ast, file, schemas, libraries));
    diagnostics.extend(refs::validate(ast, file, schemas));
    diagnostics.extend(units::validate(ast, file));
    diagnostics.extend(library::validate(ast, file, libraries));
    diagnostics
}
