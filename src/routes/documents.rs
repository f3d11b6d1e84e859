use std::path::{Component, Path, PathBuf};

use actix_web::http::header;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::error;

use crate::routes::{bad_request, internal_error, not_found, AppContext};
use crate::SALE_API;

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub file: Option<String>,
}

/// Same-origin proxy for PDFs under the configured document root.
///
/// Traversal attempts are rejected lexically before any filesystem access,
/// so a hostile `file` value never reaches the disk.
#[get("/api/pdf")]
pub async fn serve_document(
    context: web::Data<AppContext>,
    query: web::Query<DocumentQuery>,
) -> HttpResponse {
    let file = match query.file.as_deref() {
        Some(file) if !file.is_empty() => file,
        _ => return bad_request("`file` query parameter is required"),
    };

    let relative = match sanitize_relative_path(file) {
        Ok(relative) => relative,
        Err(reason) => return bad_request(reason),
    };
    let path = context.document_root.join(relative);

    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) | Err(_) => return not_found("file not found"),
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(
                target: SALE_API,
                "Failed to read document {}: {}",
                path.display(),
                err
            );
            return internal_error();
        }
    };

    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((header::ACCEPT_RANGES, "bytes"))
        .insert_header((
            header::CACHE_CONTROL,
            "public, max-age=31536000, immutable",
        ))
        .body(bytes)
}

/// Accepts only plain relative paths: no root, no prefix, no `..`.
fn sanitize_relative_path(raw: &str) -> Result<PathBuf, &'static str> {
    let path = Path::new(raw);
    if path.is_absolute() {
        return Err("`file` must be a relative path");
    }
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err("`file` must stay within the document root"),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err("`file` query parameter is required");
    }
    Ok(clean)
}
