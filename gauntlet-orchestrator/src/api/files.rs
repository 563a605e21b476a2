//! File download API Handler
//!
//! Serves raw bytes of run output files.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::error::ApiResult;
use crate::service::file_service;
use crate::state::AppState;

/// GET /files/{*path}
/// Download a file under the runs root; `path` is relative to the project root
pub async fn download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    tracing::debug!("Download requested: {}", path);

    let download = file_service::read(&state.config, &path).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download.file_name.replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.contents,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedRunner, TestBench};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_download_sets_attachment_headers() {
        let bench = TestBench::new(ScriptedRunner::default());
        std::fs::create_dir_all(bench.config.runs_dir.join("g")).unwrap();
        std::fs::write(bench.config.runs_dir.join("g").join("out.csv"), "a,b").unwrap();

        let response = download_file(State(bench.state()), Path("runs/g/out.csv".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"out.csv\""
        );
    }

    #[tokio::test]
    async fn test_escape_forbidden() {
        let bench = TestBench::new(ScriptedRunner::default());
        let err = download_file(State(bench.state()), Path("../etc/passwd".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }
}
