//! HTTP boundary for the compiler: a thin axum layer over [`Compiler`].
//!
//! The compiler core stays purely functional; this module only shapes
//! requests and responses. Endpoints:
//!
//! - `GET  /api/compile/health`   liveness probe
//! - `POST /api/compile/validate` validation only: `{valid, errors, warnings}`
//! - `POST /api/compile/`         full compile: `{success, ir_scene?, errors?}`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Extension;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::error::Diagnostic;
use crate::ir::IrScene;
use crate::Compiler;

/// Requests are compiled under this synthetic file id.
const HTTP_FILE_ID: &str = "input.sdl";

// ── Payload types ────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub dsl_source: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Warnings never appear in `errors`; they are advisory.
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub dsl_source: String,
    /// Accepted for wire compatibility; optimization is currently a no-op
    /// and the flag is ignored.
    #[serde(default)]
    pub optimize: bool,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir_scene: Option<IrScene>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

fn split_by_severity(diagnostics: &[Diagnostic]) -> (Vec<String>, Vec<String>) {
    let (errors, warnings): (Vec<_>, Vec<_>) = diagnostics
        .iter()
        .partition(|d| d.severity().is_error());
    (
        errors.iter().map(|d| d.to_string()).collect(),
        warnings.iter().map(|d| d.to_string()).collect(),
    )
}

// ── Handlers ─────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn validate(
    Extension(compiler): Extension<Arc<Compiler>>,
    Json(request): Json<ValidateRequest>,
) -> impl IntoResponse {
    let response = match compiler.compile(&request.dsl_source, HTTP_FILE_ID) {
        Ok(output) => ValidateResponse {
            valid: true,
            errors: Vec::new(),
            warnings: output.warnings.iter().map(|d| d.to_string()).collect(),
        },
        Err(diagnostics) => {
            let (errors, warnings) = split_by_severity(&diagnostics);
            ValidateResponse {
                valid: false,
                errors,
                warnings,
            }
        }
    };
    Json(response)
}

async fn compile_scene(
    Extension(compiler): Extension<Arc<Compiler>>,
    Json(request): Json<CompileRequest>,
) -> impl IntoResponse {
    if request.optimize {
        log::debug!("optimize flag set; no optimizer is wired in, ignoring");
    }

    let response = match compiler.compile(&request.dsl_source, HTTP_FILE_ID) {
        Ok(output) => CompileResponse {
            success: true,
            ir_scene: Some(output.scene),
            errors: None,
            warnings: output.warnings.iter().map(|d| d.to_string()).collect(),
        },
        Err(diagnostics) => {
            let (errors, warnings) = split_by_severity(&diagnostics);
            CompileResponse {
                success: false,
                ir_scene: None,
                errors: Some(errors),
                warnings,
            }
        }
    };
    Json(response)
}

// ── Server startup ───────────────────────────────────────────────

/// Build the compile API router around a shared compiler.
pub fn router(compiler: Arc<Compiler>) -> Router {
    Router::new()
        .route("/api/compile/health", get(health))
        .route("/api/compile/validate", post(validate))
        .route("/api/compile/", post(compile_scene))
        .layer(CorsLayer::permissive())
        .layer(Extension(compiler))
}

/// Bind and serve the compile API on localhost. Runs until the process
/// exits.
pub async fn serve(compiler: Arc<Compiler>, port: u16) -> Result<(), String> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    log::info!("compile API listening on http://{addr}");

    axum::serve(listener, router(compiler))
        .await
        .map_err(|e| format!("API server error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, SourceSpan};

    #[test]
    fn compile_request_optimize_defaults_to_false() {
        let request: CompileRequest =
            serde_json::from_str(r#"{"dsl_source": "scene {}"}"#).unwrap();
        assert!(!request.optimize);

        let request: CompileRequest =
            serde_json::from_str(r#"{"dsl_source": "x", "optimize": true}"#).unwrap();
        assert!(request.optimize);
    }

    #[test]
    fn validate_response_separates_warnings_from_errors() {
        let diagnostics = vec![
            Diagnostic::new(
                ErrorCode::NonPositiveMass,
                "Mass must be positive",
                SourceSpan::point(0, 1, 1),
                HTTP_FILE_ID,
            ),
            Diagnostic::new(
                ErrorCode::SuspiciousRotation,
                "degrees?",
                SourceSpan::point(10, 2, 1),
                HTTP_FILE_ID,
            ),
        ];
        let (errors, warnings) = split_by_severity(&diagnostics);
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(errors[0].starts_with("E410:"));
        assert!(warnings[0].starts_with("W420:"));
    }

    #[test]
    fn failed_compile_response_shape() {
        let response = CompileResponse {
            success: false,
            ir_scene: None,
            errors: Some(vec!["E301: Undefined motion 'spiin' (input.sdl:12:5)".into()]),
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("ir_scene").is_none());
        assert!(json.get("warnings").is_none());
        assert_eq!(json["errors"][0], "E301: Undefined motion 'spiin' (input.sdl:12:5)");
    }
}
