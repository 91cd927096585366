use drive_auth::{AuthError, SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
use http::header::{COOKIE, HeaderMap, SET_COOKIE};

/// Pull the session id out of the request's cookie header, if present.
pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    let Some(cookie_header) = headers.get(COOKIE) else {
        return Ok(None);
    };

    let cookie_str = cookie_header.to_str().map_err(|e| {
        tracing::error!("Invalid cookie header: {}", e);
        AuthError::Cookie("Invalid cookie header".to_string())
    })?;

    let cookie_name = SESSION_COOKIE_NAME.as_str();
    let session_id = cookie_str.split(';').map(|s| s.trim()).find_map(|s| {
        let mut parts = s.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(k), Some(v)) if k == cookie_name => Some(v.to_string()),
            _ => None,
        }
    });

    Ok(session_id)
}

/// Build the headers that install a session cookie on the browser.
pub(crate) fn new_session_headers(session_id: &str) -> Result<HeaderMap, AuthError> {
    let cookie = format!(
        "{}={}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={}",
        SESSION_COOKIE_NAME.as_str(),
        session_id,
        *SESSION_COOKIE_MAX_AGE,
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| AuthError::Cookie("Failed to build session cookie".to_string()))?,
    );
    Ok(headers)
}
