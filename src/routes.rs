use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{
        HeaderMap,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::{GroupRecord, PersonRecord},
    scoring::{decode_rows, group_scores, leaderboard},
    source::LEADERBOARD_RANGE,
    state::AppState,
};

pub const API_TITLE: &str = "Google Cloud Study Jam Leaderboard API";

#[derive(Serialize, Debug, Clone, Copy)]
pub struct Endpoint {
    pub name: &'static str,
    pub description: &'static str,
    pub method: &'static str,
    pub path: &'static str,
}

pub const ENDPOINTS: [Endpoint; 2] = [
    Endpoint {
        name: "Leaderboard",
        description: "Retrieve the leaderboard data.",
        method: "POST",
        path: "/leaderboard",
    },
    Endpoint {
        name: "Group Scores",
        description: "Retrieve group-wise scores.",
        method: "POST",
        path: "/group-scores",
    },
];

#[derive(Serialize)]
struct IndexInfo {
    message: String,
    endpoints: &'static [Endpoint],
}

/// Request body of the scoring endpoints. Anything that does not parse
/// into this shape is treated as a missing secret.
#[derive(Deserialize)]
struct SecretBody {
    secret: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(index_handler))
        .route("/leaderboard", post(leaderboard_handler).get(leaderboard_handler))
        .route("/group-scores", post(group_scores_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn index_handler(headers: HeaderMap) -> Response {
    let wants_json = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"));

    if wants_json {
        Json(IndexInfo {
            message: format!("{API_TITLE}!"),
            endpoints: &ENDPOINTS,
        })
        .into_response()
    } else {
        Html(index_html()).into_response()
    }
}

pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<PersonRecord>>, AppError> {
    state.gate.check(supplied_secret(&body).as_deref())?;

    let rows = state.source.fetch_rows(LEADERBOARD_RANGE).await?;
    let decoded = decode_rows(&rows);

    Ok(Json(leaderboard(&decoded.participants)))
}

pub async fn group_scores_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<GroupRecord>>, AppError> {
    state.gate.check(supplied_secret(&body).as_deref())?;

    let rows = state.source.fetch_rows(LEADERBOARD_RANGE).await?;
    let decoded = decode_rows(&rows);

    Ok(Json(group_scores(&decoded.participants)))
}

fn supplied_secret(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<SecretBody>(body)
        .ok()
        .and_then(|body| body.secret)
}

fn index_html() -> String {
    let items: String = ENDPOINTS
        .iter()
        .map(|endpoint| {
            format!(
                "      <li>\n        <strong>{}:</strong> {}\n        <br>Method: {}\n        <br>Path: {}\n      </li>\n",
                endpoint.name, endpoint.description, endpoint.method, endpoint.path
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>{API_TITLE}</title>
  <style>
    body {{
      font-family: Arial, sans-serif;
      background-color: #f0f0f0;
      display: flex;
      margin: 0;
      padding: 0;
      justify-content: center;
      align-items: center;
      min-height: 100vh;
    }}
    .container {{
      max-width: 800px;
      margin: 0 auto;
      padding: 20px;
      background-color: #fff;
      box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
    }}
    h1 {{ color: #333; }}
    p {{ font-size: 18px; }}
    ul {{ list-style-type: square; }}
  </style>
</head>
<body>
  <div class="container">
    <h1>{API_TITLE}!</h1>
    <p>Here are the available endpoints:</p>
    <ul>
{items}    </ul>
  </div>
</body>
</html>
"#
    )
}
