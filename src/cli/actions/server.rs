use crate::api;
use anyhow::{Context, Result};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub frontend_base_url: Option<String>,
    pub session_ttl_seconds: i64,
    pub secure_cookies: bool,
    pub login_establishes_session: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the DSN is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    // Fail fast on a malformed DSN instead of at pool creation.
    Url::parse(&args.dsn).context("Invalid database DSN")?;

    let mut auth_config = api::handlers::auth::AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.secure_cookies)
        .with_login_establishes_session(args.login_establishes_session);

    if let Some(frontend_base_url) = args.frontend_base_url {
        auth_config = auth_config.with_frontend_base_url(frontend_base_url);
    }

    api::new(args.port, &args.dsn, auth_config).await
}
