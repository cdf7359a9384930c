//! HTTP routes of the frame.

use std::sync::Arc;

use alloy::primitives::Address;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use auction_module::{FrameController, FrameResponse, FrameRoute, RequestContext};
use auction_types::TransactionError;

use crate::html::{render_frame, FrameUrls, BASE_PATH, IMAGE_PATH};
use crate::hub::{HubClient, HubError, VerifyMode};
use crate::image::render_status_svg;
use crate::payload::FrameActionPayload;

pub const INVALID_MESSAGE: &str = "Invalid frame message";

/// Shared state of the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub controller: FrameController,
    pub urls: FrameUrls,
    pub hub: Option<HubClient>,
    pub verify: VerifyMode,
}

impl AppState {
    pub fn new(controller: FrameController, urls: FrameUrls) -> Self {
        Self {
            controller,
            urls,
            hub: None,
            verify: VerifyMode::Off,
        }
    }

    pub fn with_hub(mut self, hub: HubClient, verify: VerifyMode) -> Self {
        self.hub = Some(hub);
        self.verify = verify;
        self
    }
}

type SharedState = Arc<AppState>;
type Payload = Result<Json<FrameActionPayload>, JsonRejection>;

/// Build the router serving every frame route under [`BASE_PATH`].
pub fn router(state: AppState) -> Router<()> {
    let mut app: Router<SharedState> = Router::new();

    for route in FrameRoute::ALL {
        let path = format!("{}{}", BASE_PATH, route.path().trim_end_matches('/'));
        app = if route.is_transaction() {
            app.route(
                &path,
                post(move |State(state): State<SharedState>, payload: Payload| async move {
                    transaction(&state, route, payload).await
                }),
            )
        } else {
            app.route(
                &path,
                get(move |State(state): State<SharedState>| async move {
                    card(&state, route, RequestContext::now(None)).await
                })
                .post(move |State(state): State<SharedState>, payload: Payload| async move {
                    card_action(&state, route, payload).await
                }),
            )
        };
    }

    app.route(IMAGE_PATH, get(image))
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state))
}

async fn card_action(state: &AppState, route: FrameRoute, payload: Payload) -> Response {
    match caller(state, payload).await {
        Ok(caller) => card(state, route, RequestContext::now(caller)).await,
        // The artwork does not depend on who pressed the button
        Err(_) if route == FrameRoute::Home => {
            card(state, route, RequestContext::now(None)).await
        }
        Err(_) => error_page(state),
    }
}

#[derive(Debug, Deserialize)]
struct ImageQuery {
    #[serde(default)]
    text: String,
}

async fn image(Query(query): Query<ImageQuery>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "max-age=10"),
        ],
        render_status_svg(&query.text),
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn card(state: &AppState, route: FrameRoute, ctx: RequestContext) -> Response {
    match state.controller.handle(route, &ctx).await {
        FrameResponse::Card(card) => {
            Html(render_frame(&card, &state.urls, &state.controller.config().title)).into_response()
        }
        other => {
            warn!(%route, "Card route answered with {:?}", other);
            error_page(state)
        }
    }
}

fn error_page(state: &AppState) -> Response {
    Html(render_frame(
        &auction_module::cards::error_card(),
        &state.urls,
        &state.controller.config().title,
    ))
    .into_response()
}

async fn transaction(state: &AppState, route: FrameRoute, payload: Payload) -> Response {
    let caller = match caller(state, payload).await {
        Ok(caller) => caller,
        Err(_) => return bad_request(TransactionError::new(INVALID_MESSAGE)),
    };

    match state.controller.handle(route, &RequestContext::now(caller)).await {
        FrameResponse::Transaction(tx) => {
            info!(%route, "Returning transaction");
            Json(tx).into_response()
        }
        FrameResponse::Error(e) => bad_request(e),
        FrameResponse::Card(_) => bad_request(TransactionError::new(
            auction_module::handlers::TRANSACTION_FAILED,
        )),
    }
}

fn bad_request(error: TransactionError) -> Response {
    (StatusCode::BAD_REQUEST, Json(error)).into_response()
}

/// Resolve the caller of a frame action, verifying it with the hub first.
async fn caller(state: &AppState, payload: Payload) -> Result<Option<Address>, HubError> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!("No frame payload: {}", rejection);
            return match state.verify {
                VerifyMode::Strict => Err(HubError::MissingMessage),
                _ => Ok(None),
            };
        }
    };
    let untrusted = payload.untrusted_address();

    let hub = match (&state.hub, state.verify) {
        (Some(hub), VerifyMode::Silent | VerifyMode::Strict) => hub,
        (None, VerifyMode::Strict) => return Err(HubError::MissingMessage),
        _ => return Ok(untrusted),
    };

    let verified = match payload.message_bytes() {
        Some(bytes) => hub.validate(bytes).await,
        None => Err(HubError::MissingMessage),
    };

    match verified {
        Ok(message) => Ok(message.address.or(untrusted)),
        Err(e) if state.verify == VerifyMode::Strict => {
            warn!("Rejected frame message: {}", e);
            Err(e)
        }
        Err(e) => {
            warn!("Frame message not verified: {}", e);
            Ok(untrusted)
        }
    }
}
