use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use drive_auth::{AuthError, AuthOutcome, LaunchIntent};

use crate::AuthState;
use crate::error::IntoResponseError;
use crate::session::new_session_headers;

/// Query parameters the provider sends back to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// OAuth2 callback: run the code-for-tokens handshake, install a session
/// cookie, and send the browser to whatever the launch state asked for.
pub async fn authorized_callback(
    State(state): State<AuthState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = &params.error {
        // The user declined consent at the provider.
        tracing::info!("Consent declined: {error}");
        return (StatusCode::FORBIDDEN, "Access denied.").into_response();
    }

    let Some(code) = params.code.as_deref() else {
        return (StatusCode::BAD_REQUEST, "Required parameter missing.").into_response();
    };
    let launch_state = params.state.as_deref().unwrap_or("");

    match state.gate.handle_callback(code, launch_state).await {
        Ok(AuthOutcome::Authorized(credential)) => {
            let session_id = match state
                .gate
                .create_session(&credential.identity.id)
                .await
                .into_response_error()
            {
                Ok(session_id) => session_id,
                Err((status, message)) => return (status, message).into_response(),
            };
            let headers = match new_session_headers(&session_id).into_response_error() {
                Ok(headers) => headers,
                Err((status, message)) => return (status, message).into_response(),
            };
            tracing::debug!("Session established for {}", credential.identity.id);
            let target = redirect_for_intent(LaunchIntent::from_state(params.state.as_deref()));
            (headers, Redirect::to(&target)).into_response()
        }
        Ok(AuthOutcome::RedirectRequired(url)) => Redirect::temporary(&url).into_response(),
        Ok(AuthOutcome::Unauthenticated) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
        Err(AuthError::NoRefreshToken { consent_url }) => {
            Redirect::temporary(&consent_url).into_response()
        }
        Err(e) => {
            tracing::error!("Callback handshake failed: {e}");
            match Err::<(), _>(e).into_response_error() {
                Err((status, message)) => (status, message).into_response(),
                Ok(_) => unreachable!(),
            }
        }
    }
}

/// Map a decoded launch intent onto the editor's client-side routes.
pub fn redirect_for_intent(intent: Option<LaunchIntent>) -> String {
    match intent {
        Some(LaunchIntent::Open { file_id }) => {
            format!("/#/edit/{}", urlencoding::encode(&file_id))
        }
        Some(LaunchIntent::Create {
            folder_id: Some(folder_id),
        }) => format!("/#/create/{}", urlencoding::encode(&folder_id)),
        Some(LaunchIntent::Create { folder_id: None }) => "/#/create".to_string(),
        None => "/".to_string(),
    }
}
