//! HTTP presentation of the stored snapshot.
//!
//! Handlers only read the store; extraction is the watch process's job.
//! Store access runs on the blocking pool with a read-only connection per
//! request; a missing database reads as no data.

use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::model::{PriceEntry, SnapshotRecord};
use crate::store::Store;
use crate::util::format_price;

#[derive(Clone)]
pub struct AppState {
    pub db_path: Option<PathBuf>,
    pub label: String,
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize)]
pub struct GamePrice {
    pub name: String,
    pub current: PriceEntry,
    pub previous: Option<PriceEntry>,
    pub updated_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index", get(index))
        .route("/api/prices", get(all_prices))
        .route("/api/prices/:name", get(game_price))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("serving prices on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn load(state: &AppState) -> Result<Option<SnapshotRecord>, ApiError> {
    let db_path = state.db_path.clone();
    let label = state.label.clone();

    tokio::task::spawn_blocking(move || match Store::open_read_only(db_path.as_deref())? {
        Some(store) => store.load(&label),
        None => Ok(None),
    })
        .await
        .map_err(|e| ApiError::Internal(format!("store task failed: {e}")))?
        .map_err(|e| {
            tracing::error!(error = %e, "could not read snapshot");
            ApiError::Internal(e.to_string())
        })
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let record = load(&state).await?;
    Ok(Html(render_page(record.as_ref())))
}

async fn all_prices(State(state): State<AppState>) -> Result<Json<SnapshotRecord>, ApiError> {
    load(&state)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no snapshot stored for '{}'", state.label)))
}

async fn game_price(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<GamePrice>, ApiError> {
    let record = load(&state)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no snapshot stored for '{}'", state.label)))?;

    let current = record
        .current
        .get(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("unknown game '{name}'")))?;

    Ok(Json(GamePrice {
        previous: record.previous_of(&name).filter(|p| !p.is_unknown()).cloned(),
        updated_at: record.updated_at_display(),
        name,
        current,
    }))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_page(record: Option<&SnapshotRecord>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Card prices</title></head>\n<body>\n<h1>Card prices</h1>\n",
    );

    match record {
        None => html.push_str("<p>No prices stored yet.</p>\n"),
        Some(record) => {
            html.push_str(&format!("<p>Updated {}</p>\n", escape(&record.updated_at_display())));
            html.push_str("<table>\n<tr><th>Game</th><th>Set</th><th>Current</th><th>Previous</th></tr>\n");
            for (name, entry) in &record.current {
                let previous = record
                    .previous_of(name)
                    .filter(|p| !p.is_unknown())
                    .map(|p| format_price(p.price))
                    .unwrap_or_else(|| "-".to_string());
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    escape(name),
                    entry.set_size,
                    format_price(entry.price),
                    previous
                ));
            }
            html.push_str("</table>\n");
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InventorySnapshot, TIMESTAMP_FORMAT};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDateTime;
    use tower::ServiceExt;

    fn seeded(dir: &tempfile::TempDir) -> AppState {
        let db_path = dir.path().join("cardex.db");
        let mut current = InventorySnapshot::new();
        current.insert("Tom & Jerry".to_string(), PriceEntry::new("1", 12, 6));
        current.insert("Portal".to_string(), PriceEntry::new("400", 6, 8));
        let mut previous = InventorySnapshot::new();
        previous.insert("Tom & Jerry".to_string(), PriceEntry::new("1", 10, 6));
        previous.insert("Portal".to_string(), PriceEntry::new("400", 0, 8));

        Store::open_at(&db_path)
            .unwrap()
            .save(&SnapshotRecord {
                label: "prices".to_string(),
                current,
                previous,
                updated_at: NaiveDateTime::parse_from_str("2024-07-01 09:30:00", TIMESTAMP_FORMAT).unwrap(),
            })
            .unwrap();

        AppState {
            db_path: Some(db_path),
            label: "prices".to_string(),
        }
    }

    async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn index_renders_table() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(seeded(&dir), "/index").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<td>Tom &amp; Jerry</td><td>6</td><td>0.12</td><td>0.10</td>"));
        assert!(body.contains("<td>Portal</td><td>8</td><td>0.06</td><td>-</td>"));
        assert!(body.contains("Updated 2024-07-01 09:30:00"));
    }

    #[tokio::test]
    async fn index_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            db_path: Some(dir.path().join("empty.db")),
            label: "prices".to_string(),
        };
        let (status, body) = get(state, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No prices stored yet."));
        assert!(!dir.path().join("empty.db").exists());
    }

    #[tokio::test]
    async fn api_returns_record() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(seeded(&dir), "/api/prices").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["current"]["Portal"]["price"], 6);
        assert_eq!(value["updated_at"], "2024-07-01 09:30:00");
    }

    #[tokio::test]
    async fn api_single_game_and_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let state = seeded(&dir);

        let (status, body) = get(state.clone(), "/api/prices/Portal").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["current"]["id"], "400");
        assert!(value["previous"].is_null());

        let (status, body) = get(state, "/api/prices/Half-Life%203").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("unknown game 'Half-Life 3'"));
    }

    #[tokio::test]
    async fn api_without_data_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            db_path: Some(dir.path().join("missing").join("empty.db")),
            label: "prices".to_string(),
        };
        let (status, _) = get(state.clone(), "/api/prices").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get(state, "/api/prices/Portal").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!dir.path().join("missing").exists());
    }
}
