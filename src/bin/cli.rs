// CLI binary — panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use mechdsl::{api, Compiler, Diagnostic};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "mechdsl", about = "Scene description language compiler", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a scene file and print the IR as JSON
    Compile {
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a scene file without emitting IR
    Check { file: PathBuf },
    /// Serve the HTTP compile API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { file, pretty } => {
            let (source, output) = run_compiler(&file);
            let json = if pretty {
                output.scene.to_json_pretty()
            } else {
                output.scene.to_json()
            }
            .expect("IR serialization cannot fail");
            report_warnings(&output.warnings, &source);
            println!("{json}");
        }
        Commands::Check { file } => {
            let (source, output) = run_compiler(&file);
            report_warnings(&output.warnings, &source);
            eprintln!(
                "✓ {}: {} entities, {} constraints, {} motions, {} timelines",
                file.display(),
                output.scene.entities.len(),
                output.scene.constraints.len(),
                output.scene.motions.len(),
                output.scene.timelines.len(),
            );
        }
        Commands::Serve { port } => {
            let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
            if let Err(e) = runtime.block_on(api::serve(Arc::new(Compiler::new()), port)) {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    }
}

/// Read and compile a file, exiting with rendered diagnostics on failure.
fn run_compiler(file: &PathBuf) -> (String, mechdsl::CompileOutput) {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", file.display());
            process::exit(1);
        }
    };

    match Compiler::new().compile(&source, &file.display().to_string()) {
        Ok(output) => (source, output),
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic.render(&source));
            }
            let errors = diagnostics.iter().filter(|d| d.severity().is_error()).count();
            eprintln!("✗ compilation failed with {errors} error(s)");
            process::exit(1);
        }
    }
}

fn report_warnings(warnings: &[Diagnostic], source: &str) {
    for warning in warnings {
        eprintln!("{}", warning.render(source));
    }
}
