use std::{env, sync::LazyLock};

pub(crate) static GOOGLE_CLIENT_ID: LazyLock<String> =
    LazyLock::new(|| env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID must be set"));

pub(crate) static GOOGLE_CLIENT_SECRET: LazyLock<String> =
    LazyLock::new(|| env::var("GOOGLE_CLIENT_SECRET").expect("GOOGLE_CLIENT_SECRET must be set"));

pub(crate) static AUTH_REDIRECT_URI: LazyLock<String> = LazyLock::new(|| {
    env::var("DRIVE_AUTH_REDIRECT_URI").expect("DRIVE_AUTH_REDIRECT_URI must be set")
});

pub(crate) static AUTH_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("DRIVE_AUTH_AUTH_URL")
        .ok()
        .unwrap_or("https://accounts.google.com/o/oauth2/auth".to_string())
});

pub(crate) static TOKEN_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("DRIVE_AUTH_TOKEN_URL")
        .ok()
        .unwrap_or("https://accounts.google.com/o/oauth2/token".to_string())
});

pub(crate) static USERINFO_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("DRIVE_AUTH_USERINFO_URL")
        .ok()
        .unwrap_or("https://www.googleapis.com/oauth2/v2/userinfo".to_string())
});

// Space-joined; percent-encoded once when the consent URL is built.
pub(crate) static AUTH_SCOPES: LazyLock<String> = LazyLock::new(|| {
    env::var("DRIVE_AUTH_SCOPES").ok().unwrap_or(
        "https://www.googleapis.com/auth/drive.file \
         https://www.googleapis.com/auth/userinfo.email \
         https://www.googleapis.com/auth/userinfo.profile"
            .to_string(),
    )
});

// "__Host-" prefix makes the cookie host-only.
pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-DriveEditSid".to_string())
});

pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(86400) // Default to one day if not set or invalid
});
