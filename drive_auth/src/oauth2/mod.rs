mod core;
mod google;
mod provider;
mod types;

pub use self::core::{build_consent_url, get_or_refresh_credentials};
pub use google::GoogleProvider;
pub use provider::TokenProvider;
pub use types::{AuthOutcome, Credential, LaunchIntent, TokenPair, UserIdentity};
