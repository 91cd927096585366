use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};

use drive_auth_axum::{
    AuthState, CallbackParams, GateOutcome, LaunchIntent, authenticate_headers,
    authorized_callback, build_consent_url, redirect_for_intent,
};

/// Root route. Drive sends both the OAuth2 callback and editor launches
/// here, so the handler dispatches on the query parameters:
/// a `code` or `error` means we are mid-handshake; otherwise serve the
/// editor to signed-in users and send everyone else off to consent.
pub(crate) async fn index(
    State(state): State<AuthState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    if params.code.is_some() || params.error.is_some() {
        return authorized_callback(State(state), Query(params)).await;
    }

    match authenticate_headers(&state, &headers).await {
        Ok(GateOutcome::Proceed(_)) => {
            match LaunchIntent::from_state(params.state.as_deref()) {
                Some(intent) => Redirect::to(&redirect_for_intent(Some(intent))).into_response(),
                None => Html(include_str!("../assets/index.html")).into_response(),
            }
        }
        Ok(GateOutcome::Unauthenticated) => {
            // Carry the launch state through consent so the intent survives
            // the round trip.
            let launch_state = params.state.as_deref().unwrap_or("");
            Redirect::temporary(&build_consent_url(launch_state, "")).into_response()
        }
        Err(e) => {
            tracing::error!("Session check failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
