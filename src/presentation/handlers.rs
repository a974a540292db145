// HTTP request handlers
use crate::domain::card::{CardSummary, CardView};
use crate::infrastructure::http_response::{accepts_brotli, svg_response};
use crate::infrastructure::svg_document::svg_document;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::Utc;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TemperatureRequest {
    pub temperature: Option<f64>,
    pub steps: Option<i32>,
}

#[derive(Deserialize)]
pub struct ModeRequest {
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct TemperatureAccepted {
    pub temperature: f64,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all configured cards
pub async fn list_cards(State(state): State<Arc<AppState>>) -> Json<Vec<CardSummary>> {
    Json(state.card_service.list_cards())
}

pub async fn get_card(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CardView>, ApiError> {
    Ok(Json(state.card_service.card_view(&id).await?))
}

/// Current graph as JSON, 204 until the first fetch succeeds
pub async fn get_graph(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let (snapshot, _) = state.card_service.graph(&id)?;
    Ok(match snapshot {
        Some(snapshot) => Json(snapshot).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Current graph as an SVG document
pub async fn get_graph_svg(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let (snapshot, style) = state.card_service.graph(&id)?;
    let Some(snapshot) = snapshot else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    // Check if client accepts Brotli compression
    let compress = accepts_brotli(
        headers
            .get(header::ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok()),
    );

    let svg = svg_document(&id, &snapshot.paths, &style);
    Ok(match svg_response(svg, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    })
}

/// Server-sent events: the current graph, then one event per redraw
pub async fn stream_graph(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let mut rx = state.card_service.subscribe(&id)?;

    let stream = async_stream::stream! {
        loop {
            let snapshot = rx.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                match Event::default().event("graph").json_data(&*snapshot) {
                    Ok(event) => {
                        yield Ok::<_, Infallible>(event);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to encode graph event: {}", e);
                    }
                }
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Signal that the card's entity changed; the redraw happens in the background
pub async fn refresh_card(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    // Validate before detaching so unknown cards still get a 404
    state.card_service.graph(&id)?;

    let service = state.card_service.clone();
    tokio::spawn(async move {
        if let Err(e) = service.refresh(&id, Utc::now()).await {
            tracing::warn!("Refresh of card {} failed: {}", id, e);
        }
    });

    Ok(StatusCode::ACCEPTED)
}

pub async fn set_temperature(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<TemperatureRequest>,
) -> Result<(StatusCode, Json<TemperatureAccepted>), ApiError> {
    let temperature = match (request.temperature, request.steps) {
        (Some(value), _) => state.card_service.set_temperature(&id, value).await?,
        (None, Some(steps)) => state.card_service.adjust_temperature(&id, steps).await?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "expected `temperature` or `steps`".to_string(),
            ));
        }
    };

    Ok((StatusCode::ACCEPTED, Json(TemperatureAccepted { temperature })))
}

pub async fn set_hvac_mode(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> Result<StatusCode, ApiError> {
    state.card_service.set_hvac_mode(&id, &request.mode).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn set_fan_mode(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModeRequest>,
) -> Result<StatusCode, ApiError> {
    state.card_service.set_fan_mode(&id, &request.mode).await?;
    Ok(StatusCode::ACCEPTED)
}
