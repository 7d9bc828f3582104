use crate::AppState;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use lunchmenu_model::{MenuItem, Weekday};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub const INVALID_WEEKDAY_MESSAGE: &str =
    "Invalid weekday. Please use monday, tuesday, wednesday, thursday, or friday.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred while fetching the lunch menu.";

/// Body of a single-day response
#[derive(Debug, Serialize)]
struct DayMenuResponse {
    menu: Vec<MenuItem>,
}

pub fn create_app(state: AppState) -> Router {
    let menu_routes = Router::new()
        .route("/lunch-menu", get(handle_week_menu))
        .route("/lunch-menu/{day}", get(handle_day_menu));

    Router::new()
        .merge(menu_routes.clone())
        // Same routes under the prefix the service was first deployed with
        .nest("/api", menu_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_day_menu(State(state): State<AppState>, Path(day): Path<String>) -> Response {
    let weekday: Weekday = match day.parse() {
        Ok(weekday) => weekday,
        Err(e) => {
            warn!("Rejected lunch menu request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": INVALID_WEEKDAY_MESSAGE })),
            )
                .into_response();
        }
    };

    info!("📡 GET lunch menu for {}", weekday);
    match state.get_and_parse_day_menu(weekday).await {
        Ok(menu) => Json(DayMenuResponse { menu }).into_response(),
        Err(e) => {
            error!("❌ Error fetching lunch menu for {}: {}", weekday, e);
            internal_error()
        }
    }
}

async fn handle_week_menu(State(state): State<AppState>) -> Response {
    info!("📡 GET weekly lunch menu");
    match state.get_and_parse_weekly_menu().await {
        Ok(week) => Json(week).into_response(),
        Err(e) => {
            error!("❌ Error fetching weekly lunch menu: {}", e);
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}
