use anyhow::{Context, Result};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Settings;
use crate::ingest::csv::parse_csv_text;
use crate::ingest::scrape::{scrape_hh, scrape_zarplata};
use crate::pipeline::preview_records;
use crate::record::{PreviewItem, Record};
use crate::store::{write_records, TableClient};
use crate::vocab::Vocabulary;

#[derive(Deserialize)]
struct PreviewRequest {
    csv_text: Option<String>,
    // CSV content is accepted here too
    text: Option<String>,
}

#[derive(Serialize)]
struct PreviewResponse {
    version: &'static str,
    items: Vec<PreviewItem>,
}

#[derive(Deserialize)]
struct WriteRequest {
    records: Vec<Record>,
    table_id: String,
    rel_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScrapeSource {
    Zp,
    Hh,
}

#[derive(Deserialize)]
struct ScrapeRequest {
    source: ScrapeSource,
    query: String,
    hospital: Option<String>,
    pages: Option<u32>,
}

type ApiError = (StatusCode, String);

fn internal_error(err: anyhow::Error) -> ApiError {
    warn!("request failed: {:#}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Set up and run the agent API server.
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/preview", post(post_preview))
        .route("/write", post(post_write))
        .route("/scrape", post(post_scrape))
        .route("/config", get(get_config))
        .with_state(Arc::new(settings));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "kadra" }))
}

async fn post_preview(
    State(settings): State<Arc<Settings>>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let Some(csv_payload) = payload.csv_text.or(payload.text) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Provide 'csv_text' or 'text' with CSV content.".to_string(),
        ));
    };
    let records =
        parse_csv_text(&csv_payload).map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    let vocab = Vocabulary::load(&settings).map_err(internal_error)?;
    Ok(Json(PreviewResponse {
        version: "map-local",
        items: preview_records(records, &vocab),
    }))
}

async fn post_write(
    State(settings): State<Arc<Settings>>,
    Json(payload): Json<WriteRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.records.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No records provided".to_string()));
    }
    let vocab = Vocabulary::load(&settings).map_err(internal_error)?;
    let client = TableClient::from_settings(&settings).map_err(internal_error)?;
    let results = write_records(
        &client,
        payload.records,
        &payload.table_id,
        payload.rel_name.as_deref(),
        &vocab,
    )
    .await
    .map_err(internal_error)?;
    Ok(Json(json!({ "results": results })))
}

async fn post_scrape(
    State(settings): State<Arc<Settings>>,
    Json(payload): Json<ScrapeRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let pages = payload.pages.unwrap_or(settings.default_scrape_pages);
    let records = match payload.source {
        ScrapeSource::Zp => {
            scrape_zarplata(&settings, &payload.query, payload.hospital.as_deref(), pages)
        }
        ScrapeSource::Hh => scrape_hh(&settings, &payload.query, payload.hospital.as_deref(), pages),
    }
    .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;

    let vocab = Vocabulary::load(&settings).map_err(internal_error)?;
    Ok(Json(PreviewResponse {
        version: "map-local",
        items: preview_records(records, &vocab),
    }))
}

/// Safe dump of the behavior flags.
async fn get_config(State(settings): State<Arc<Settings>>) -> Json<Value> {
    Json(json!({
        "store_base": settings.store_base,
        "web_scrape_enabled": settings.web_scrape_enabled,
        "auto_write_enabled": settings.auto_write_enabled,
        "auto_write_threshold": settings.auto_write_threshold,
        "agent_map_path": settings.map_path,
        "aliases_file": settings.aliases_path,
    }))
}
