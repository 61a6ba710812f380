//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storygraph_domain::{
    ChapterNumber, CharacterId, CharacterMemory, EventId, EventWindow, Profile, RecalledEvent,
    RelationshipCheckReport, UpcomingEvent,
};

use crate::app::App;
use crate::infrastructure::ports::StoredEvent;
use crate::use_cases::{
    parse_document, CommitSummary, EventLookupError, ExportError, ExportSummary, IngestError,
    ProfileError, DEFAULT_WINDOW_LIMIT,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route(
            "/api/chapters",
            post(commit_chapter).delete(clear_all_chapters),
        )
        .route("/api/chapters/bootstrap", post(load_bootstrap))
        .route("/api/chapters/{chapter}", delete(clear_chapter))
        .route(
            "/api/chapters/{chapter}/characters",
            get(list_chapter_characters),
        )
        .route(
            "/api/chapters/{chapter}/relationships/check",
            get(check_chapter_relationships),
        )
        .route(
            "/api/chapters/{chapter}/profiles/export",
            post(export_profiles),
        )
        .route("/api/characters/{id}/profile", get(get_profile))
        .route("/api/characters/{id}/memory", get(get_memory))
        .route("/api/characters/{id}/lookback", get(get_lookback))
        .route("/api/events/lookahead", get(get_lookahead))
        .route("/api/events/{id}", get(get_event))
        .route("/api/events/{id}/details", get(get_event_details))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct ChapterQuery {
    pub chapter: u32,
}

#[derive(Debug, Deserialize)]
pub struct LookbackQuery {
    pub chapter: u32,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LookaheadQuery {
    pub chapter: u32,
    pub end: u32,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EventDetails {
    pub event_id: EventId,
    pub details: String,
}

fn character_id(raw: String) -> Result<CharacterId, ApiError> {
    CharacterId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn event_id(raw: String) -> Result<EventId, ApiError> {
    EventId::new(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// Ingestion
// =============================================================================

async fn load_bootstrap(
    State(app): State<Arc<App>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CommitSummary>, ApiError> {
    let document = parse_document(body)?;
    let summary = app.use_cases.ingest.load_bootstrap(document).await?;
    Ok(Json(summary))
}

async fn commit_chapter(
    State(app): State<Arc<App>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<CommitSummary>, ApiError> {
    let document = parse_document(body)?;
    let summary = app.use_cases.ingest.commit_chapter(document).await?;
    Ok(Json(summary))
}

// =============================================================================
// Chapters
// =============================================================================

async fn clear_chapter(
    State(app): State<Arc<App>>,
    Path(chapter): Path<u32>,
) -> Result<(), ApiError> {
    app.use_cases
        .maintenance
        .clear_chapter(ChapterNumber::new(chapter))
        .await?;
    Ok(())
}

async fn clear_all_chapters(State(app): State<Arc<App>>) -> Result<(), ApiError> {
    app.use_cases.maintenance.clear_all_chapters().await?;
    Ok(())
}

async fn list_chapter_characters(
    State(app): State<Arc<App>>,
    Path(chapter): Path<u32>,
) -> Result<Json<Vec<CharacterId>>, ApiError> {
    let ids = app
        .use_cases
        .maintenance
        .list_chapter_characters(ChapterNumber::new(chapter))
        .await?;
    Ok(Json(ids))
}

async fn check_chapter_relationships(
    State(app): State<Arc<App>>,
    Path(chapter): Path<u32>,
) -> Result<Json<RelationshipCheckReport>, ApiError> {
    let report = app
        .use_cases
        .maintenance
        .check_chapter_relationships(ChapterNumber::new(chapter))
        .await?;
    Ok(Json(report))
}

async fn export_profiles(
    State(app): State<Arc<App>>,
    Path(chapter): Path<u32>,
) -> Result<Json<ExportSummary>, ApiError> {
    let summary = app
        .use_cases
        .export
        .save_profiles_for_chapter(ChapterNumber::new(chapter))
        .await?;
    Ok(Json(summary))
}

// =============================================================================
// Characters
// =============================================================================

async fn get_profile(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Query(query): Query<ChapterQuery>,
) -> Result<Json<Profile>, ApiError> {
    let id = character_id(id)?;
    let profile = app
        .use_cases
        .profile
        .profiles
        .get_profile(&id, ChapterNumber::new(query.chapter))
        .await?;
    Ok(Json(profile))
}

async fn get_memory(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Query(query): Query<ChapterQuery>,
) -> Result<Json<CharacterMemory>, ApiError> {
    let id = character_id(id)?;
    let memory = app
        .use_cases
        .profile
        .profiles
        .get_memory(&id, ChapterNumber::new(query.chapter))
        .await?;
    Ok(Json(memory))
}

async fn get_lookback(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Query(query): Query<LookbackQuery>,
) -> Result<Json<EventWindow<RecalledEvent>>, ApiError> {
    let id = character_id(id)?;
    let window = app
        .use_cases
        .profile
        .windows
        .lookback(
            &id,
            ChapterNumber::new(query.chapter),
            query.limit.unwrap_or(DEFAULT_WINDOW_LIMIT),
        )
        .await?;
    Ok(Json(window))
}

// =============================================================================
// Events
// =============================================================================

async fn get_lookahead(
    State(app): State<Arc<App>>,
    Query(query): Query<LookaheadQuery>,
) -> Result<Json<EventWindow<UpcomingEvent>>, ApiError> {
    let window = app
        .use_cases
        .profile
        .windows
        .lookahead(
            ChapterNumber::new(query.chapter),
            ChapterNumber::new(query.end),
            query.limit.unwrap_or(DEFAULT_WINDOW_LIMIT),
        )
        .await?;
    Ok(Json(window))
}

async fn get_event(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<StoredEvent>, ApiError> {
    let id = event_id(id)?;
    let event = app.use_cases.profile.events.get_event(&id).await?;
    Ok(Json(event))
}

async fn get_event_details(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<EventDetails>, ApiError> {
    let id = event_id(id)?;
    let details = app.use_cases.profile.events.get_event_details(&id).await?;
    Ok(Json(EventDetails {
        event_id: id,
        details,
    }))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Internal(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => {
                (axum::http::StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ApiError::BadRequest(msg) => {
                (axum::http::StatusCode::BAD_REQUEST, msg).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error",
                )
                    .into_response()
            }
        }
    }
}

impl From<crate::infrastructure::ports::RepoError> for ApiError {
    fn from(e: crate::infrastructure::ports::RepoError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Repo(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound { .. } => ApiError::NotFound,
            ProfileError::Repo(e) => e.into(),
        }
    }
}

impl From<EventLookupError> for ApiError {
    fn from(e: EventLookupError) -> Self {
        match e {
            EventLookupError::NotFound(_) | EventLookupError::NoDetails(_) => ApiError::NotFound,
            EventLookupError::Repo(e) => e.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::export::FileProfileSink;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = App::in_memory(Arc::new(FileProfileSink::new(dir.path())));
        (routes().with_state(Arc::new(app)), dir)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn initial_data() -> Value {
        json!({
            "title": "The Debt",
            "persons": [{"id": "p1", "name": "Lin"}, {"id": "p2", "name": "Mo"}],
            "relationships": [{"from_id": "p1", "to_id": "p2", "type": "DEBT", "intensity": 5}]
        })
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (router, _dir) = router();
        let response = router.oneshot(get("/api/health")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bootstrap_then_profile() {
        let (router, _dir) = router();

        let response = router
            .clone()
            .oneshot(post_json("/api/chapters/bootstrap", initial_data()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let summary = json_body(response).await;
        assert_eq!(summary["characters_written"], 2);

        let response = router
            .clone()
            .oneshot(post_json(
                "/api/chapters",
                json!({
                    "chapter": 1,
                    "relationships": [{"from_id": "p1", "to_id": "p2", "type": "ALLY"}]
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(get("/api/characters/p1/profile?chapter=1"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let profile = json_body(response).await;
        assert_eq!(profile["properties"]["name"], "Lin");
        assert_eq!(profile["relationships"][0]["type"], "ALLY");
        assert_eq!(profile["relationships"][0]["intensity"], 3);
    }

    #[tokio::test]
    async fn unknown_character_is_404() {
        let (router, _dir) = router();
        let response = router
            .oneshot(get("/api/characters/ghost/profile?chapter=3"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn document_missing_id_is_400() {
        let (router, _dir) = router();
        let response = router
            .oneshot(post_json(
                "/api/chapters",
                json!({"chapter": 1, "scenes": [{"name": "Harbor"}]}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chapter_zero_via_commit_is_400() {
        let (router, _dir) = router();
        let response = router
            .oneshot(post_json("/api/chapters", json!({"chapter": 0})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn event_details_and_lookahead() {
        let (router, _dir) = router();
        router
            .clone()
            .oneshot(post_json("/api/chapters/bootstrap", initial_data()))
            .await
            .expect("response");
        router
            .clone()
            .oneshot(post_json(
                "/api/chapters",
                json!({
                    "chapter": 1,
                    "events": [
                        {"id": "e1", "details": "Debt called in", "order": 1, "participants": ["p1"]},
                        {"id": "e2", "order": 2, "participants": ["p2"]}
                    ]
                }),
            ))
            .await
            .expect("response");

        let response = router
            .clone()
            .oneshot(get("/api/events/e1/details"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["details"], "Debt called in");

        let response = router
            .clone()
            .oneshot(get("/api/events/e2/details"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = router
            .oneshot(get("/api/events/lookahead?chapter=0&end=3&limit=1"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let window = json_body(response).await;
        assert_eq!(window["events"][0]["event_id"], "e1");
        assert_eq!(window["truncated"], 1);
    }

    #[tokio::test]
    async fn relationship_check_reports_pairs() {
        let (router, _dir) = router();
        router
            .clone()
            .oneshot(post_json("/api/chapters/bootstrap", initial_data()))
            .await
            .expect("response");

        let response = router
            .oneshot(get("/api/chapters/0/relationships/check"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["duplicate_count"], 0);
        assert_eq!(report["entries"][0]["count"], 1);
    }
}
