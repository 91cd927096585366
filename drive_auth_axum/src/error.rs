use drive_auth::AuthError;
use http::StatusCode;

/// Helper trait for converting errors to a standard response error format.
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Maps token lifecycle failures to status codes. The message is the typed
/// error's display form; raw provider payloads and secrets never reach it.
impl<T> IntoResponseError<T> for Result<T, AuthError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                AuthError::CodeExchange(_) => StatusCode::BAD_REQUEST,
                AuthError::NoIdentity(_) => StatusCode::UNAUTHORIZED,
                AuthError::NoRefreshToken { .. } => StatusCode::UNAUTHORIZED,
                AuthError::TokenRefresh(_) => StatusCode::UNAUTHORIZED,
                AuthError::Transient(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
    }
}
