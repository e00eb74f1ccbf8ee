use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::acquisition::PageIdentity;
use crate::errors::{AppError, ExportError};
use crate::graph::NormalizedResponse;
use crate::profile::{convert_response, ProfileParseSummary};
use crate::resume::SchemaVersion;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ConvertRequest {
    pub response: NormalizedResponse,
    #[serde(default)]
    pub schema: SchemaVersion,
    pub locale: Option<String>,
    pub profile_id: Option<String>,
}

#[derive(Deserialize)]
pub struct ParseRequest {
    pub page_url: String,
    /// Captured page markup; its embedded payloads are tried before a live fetch.
    pub markup: Option<String>,
    pub locale: Option<String>,
    #[serde(default)]
    pub schema: SchemaVersion,
    #[serde(default)]
    pub force: bool,
}

#[derive(Deserialize)]
pub struct ResumeQuery {
    #[serde(default)]
    pub schema: SchemaVersion,
    pub locale: Option<String>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize)]
pub struct ExportResponse {
    pub summary: ProfileParseSummary,
    pub document: Value,
}

#[derive(Serialize)]
pub struct LocalesResponse {
    pub profile_id: String,
    pub locales: Vec<String>,
}

/// POST /api/v1/convert
pub async fn handle_convert(
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    if req.response.is_empty() {
        return Err(AppError::Validation(
            "response has neither a table of contents nor entities".to_string(),
        ));
    }
    let (summary, documents) =
        convert_response(req.response, req.profile_id, req.locale.as_deref());
    let document = documents
        .document(req.schema)
        .map_err(ExportError::from)?;
    Ok(Json(ExportResponse { summary, document }))
}

/// POST /api/v1/profiles/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ExportResponse>, AppError> {
    let page = PageIdentity::parse(&req.page_url)?;
    let exporter = state.exporter_for(&page).await;
    let mut exporter = exporter.lock().await;

    exporter.navigate(&req.page_url)?;
    if let Some(markup) = req.markup {
        exporter.use_page_markup(markup, req.force);
    }

    let summary = if req.force {
        exporter.force_reparse(req.locale.as_deref()).await
    } else {
        exporter.try_parse(req.locale.as_deref()).await
    };
    let document = exporter.output_document(req.schema)?;
    info!(profile = %page.profile_id, succeeded = summary.succeeded, "parse request served");
    Ok(Json(ExportResponse { summary, document }))
}

/// GET /api/v1/profiles/:profile_id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
    Query(params): Query<ResumeQuery>,
) -> Result<Json<ExportResponse>, AppError> {
    let page = PageIdentity::for_profile(&profile_id);
    let exporter = state.exporter_for(&page).await;
    let mut exporter = exporter.lock().await;

    let summary = if params.force {
        exporter.force_reparse(params.locale.as_deref()).await
    } else {
        exporter.try_parse(params.locale.as_deref()).await
    };
    if summary.raw_response.is_none() {
        let reason = summary
            .failure
            .unwrap_or_else(|| "no usable profile data".to_string());
        return Err(ExportError::AcquisitionFailure(reason).into());
    }
    let document = exporter.output_document(params.schema)?;
    Ok(Json(ExportResponse { summary, document }))
}

/// GET /api/v1/profiles/:profile_id/locales
pub async fn handle_get_locales(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<Json<LocalesResponse>, AppError> {
    let page = PageIdentity::for_profile(&profile_id);
    let exporter = state.exporter_for(&page).await;
    let mut exporter = exporter.lock().await;

    if exporter.summary().is_none() {
        let summary = exporter.try_parse(None).await;
        if !summary.succeeded {
            return Err(AppError::Upstream(
                summary
                    .failure
                    .unwrap_or_else(|| "profile could not be parsed".to_string()),
            ));
        }
    }
    Ok(Json(LocalesResponse {
        profile_id,
        locales: exporter.supported_locales(),
    }))
}

/// GET /api/v1/profiles/:profile_id/vcard
pub async fn handle_get_vcard(
    State(state): State<AppState>,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageIdentity::for_profile(&profile_id);
    let exporter = state.exporter_for(&page).await;
    let card = exporter.lock().await.generate_vcard().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/vcard; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{profile_id}.vcf\""),
            ),
        ],
        card,
    ))
}
