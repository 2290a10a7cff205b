//! mechdsl: a compiler for a strict, declarative scene description
//! language for 3D mechanical scenes.
//!
//! The pipeline is linear and deterministic:
//!
//! ```text
//! source text
//!     -> lexer (lexer.rs)          tokens
//!     -> parser (parser.rs)        AST
//!     -> validators (validate/)    syntax, schema, reference, unit, library
//!     -> lowering (lower.rs)       IR
//! ```
//!
//! The lexer and parser fail fast with a single diagnostic; the validator
//! passes each collect everything they can find. Any error-severity
//! diagnostic fails the compile; warnings accompany a successful IR.
//!
//! # Example
//!
//! ```
//! use mechdsl::Compiler;
//!
//! let source = r#"
//! scene {
//!   name: "Example"
//!   version: 1
//!   ir_version: "0.1.0"
//!   unit_system: "SI"
//! }
//!
//! library_imports {
//!   math: "core_mechanics"
//! }
//! "#;
//!
//! let compiler = Compiler::new();
//! let output = compiler.compile(source, "example.sdl").expect("compiles");
//! assert_eq!(output.scene.metadata.name, "Example");
//! ```

pub mod api;
pub mod ast;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod library;
pub mod lower;
pub mod parser;
pub mod schema;
pub mod validate;

pub use ast::AstFile;
pub use error::{Diagnostic, ErrorCode, Severity, SourceSpan};
pub use ir::IrScene;
pub use library::{Library, LibraryRegistry};
pub use schema::{FieldSpec, FieldType, SchemaRegistry, TypeSchema};

/// A successful compilation: the IR plus any non-fatal warnings.
#[derive(Debug)]
pub struct CompileOutput {
    pub scene: IrScene,
    pub warnings: Vec<Diagnostic>,
}

/// The compiler: a pair of registries and the pipeline that reads them.
///
/// Registries are seeded with the built-in vocabulary and may be extended
/// by the host before compiling; a compile call never mutates them.
pub struct Compiler {
    schemas: SchemaRegistry,
    libraries: LibraryRegistry,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            schemas: SchemaRegistry::with_defaults(),
            libraries: LibraryRegistry::with_defaults(),
        }
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Startup-time extension point for host-defined schemas.
    pub fn schemas_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.schemas
    }

    pub fn libraries(&self) -> &LibraryRegistry {
        &self.libraries
    }

    /// Startup-time extension point for host-defined libraries.
    pub fn libraries_mut(&mut self) -> &mut LibraryRegistry {
        &mut self.libraries
    }

    /// Compile SDL source to IR.
    ///
    /// Returns either the IR (with any warnings) or the full ordered
    /// diagnostic list: lexer/parser failures are a single entry, while
    /// validation failures carry every diagnostic the passes produced,
    /// warnings included.
    pub fn compile(&self, source: &str, file_id: &str) -> Result<CompileOutput, Vec<Diagnostic>> {
        let tokens = lexer::lex(source, file_id).map_err(|e| vec![e])?;
        let ast = parser::parse(tokens, file_id).map_err(|e| vec![e])?;
        log::debug!(
            "{file_id}: parsed {} entities, {} constraints, {} motions, {} timelines",
            ast.entities.len(),
            ast.constraints.len(),
            ast.motions.len(),
            ast.timelines.len()
        );

        let diagnostics = validate::run_all(&ast, file_id, &self.schemas, &self.libraries);
        if diagnostics.iter().any(|d| d.severity().is_error()) {
            log::debug!("{file_id}: validation failed with {} diagnostics", diagnostics.len());
            return Err(diagnostics);
        }

        Ok(CompileOutput {
            scene: lower::lower(&ast),
            warnings: diagnostics,
        })
    }

    /// Lex and parse without validating. Useful for tooling.
    pub fn parse_only(&self, source: &str, file_id: &str) -> Result<AstFile, Diagnostic> {
        let tokens = lexer::lex(source, file_id)?;
        parser::parse(tokens, file_id)
    }

    /// Run the validator passes over an already parsed file.
    ///
    /// `Ok` carries the warnings (possibly empty); `Err` carries the full
    /// diagnostic list.
    pub fn validate_only(
        &self,
        ast: &AstFile,
        file_id: &str,
    ) -> Result<Vec<Diagnostic>, Vec<Diagnostic>> {
        let diagnostics = validate::run_all(ast, file_id, &self.schemas, &self.libraries);
        if diagnostics.iter().any(|d| d.severity().is_error()) {
            Err(diagnostics)
        } else {
            Ok(diagnostics)
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile source with the default registries.
pub fn compile_source(source: &str) -> Result<CompileOutput, Vec<Diagnostic>> {
    Compiler::new().compile(source, "input.sdl")
}
