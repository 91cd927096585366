use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use drive_auth::{AuthError, GateOutcome, build_consent_url};

use crate::AuthState;
use crate::client::AuthorizedClient;
use crate::error::IntoResponseError;
use crate::session::session_id_from_headers;

/// Gate a request by the session cookie in `headers`. Exposed for handlers
/// that sit outside the middleware layers, like an index page that serves
/// both anonymous and signed-in users.
pub async fn authenticate_headers(
    state: &AuthState,
    headers: &http::HeaderMap,
) -> Result<GateOutcome, AuthError> {
    let session_id = session_id_from_headers(headers)?;
    state.gate.authenticate(session_id.as_deref()).await
}

async fn gate_request(state: &AuthState, headers: &http::HeaderMap) -> Result<GateOutcome, AuthError> {
    authenticate_headers(state, headers).await
}

fn unauthenticated_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "User is not authenticated."})),
    )
        .into_response()
}

/// Session gate with a 401 response for unauthenticated requests, for API
/// routes called from page scripts.
///
/// On success the handler finds an [`AuthorizedClient`] in the request
/// extensions. A pair refreshed while gating is written back after the
/// handler ran, whatever status the handler produced.
pub async fn authorize_401(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match gate_request(&state, req.headers()).await.into_response_error() {
        Ok(outcome) => outcome,
        Err((status, message)) => return (status, message).into_response(),
    };

    match outcome {
        GateOutcome::Proceed(ctx) => {
            req.extensions_mut().insert(AuthorizedClient::new(
                ctx.user_id.clone(),
                ctx.tokens.access_token.clone(),
            ));
            let response = next.run(req).await;
            if let Err(e) = state.gate.persist(&ctx).await {
                tracing::error!("Failed to persist refreshed tokens for {}: {e}", ctx.user_id);
            }
            response
        }
        GateOutcome::Unauthenticated => unauthenticated_response(),
    }
}

/// Session gate that sends unauthenticated user agents to the consent page,
/// for routes the browser navigates to directly.
pub async fn authorize_redirect(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = match gate_request(&state, req.headers()).await.into_response_error() {
        Ok(outcome) => outcome,
        Err((status, message)) => return (status, message).into_response(),
    };

    match outcome {
        GateOutcome::Proceed(ctx) => {
            req.extensions_mut().insert(AuthorizedClient::new(
                ctx.user_id.clone(),
                ctx.tokens.access_token.clone(),
            ));
            let response = next.run(req).await;
            if let Err(e) = state.gate.persist(&ctx).await {
                tracing::error!("Failed to persist refreshed tokens for {}: {e}", ctx.user_id);
            }
            response
        }
        GateOutcome::Unauthenticated => {
            Redirect::temporary(&build_consent_url("", "")).into_response()
        }
    }
}
