//! Request authentication against the configured auth method.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use hagaki_core::config::{AuthMethod, Settings};

use super::Principal;
use super::password::verify_password;
use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Authenticate a request based on the configured authentication method.
///
/// - `single_user`: every request runs as the configured user, no
///   credentials required.
/// - `basic_auth`: HTTP Basic credentials are checked against the
///   configured users' Argon2 hashes.
///
/// ## Errors
/// Returns `NotAuthenticated` when credentials are missing or wrong, and
/// `InvalidConfiguration` when the configured method is incomplete.
#[tracing::instrument(skip(req, config), fields(path = %req.uri().path()))]
pub fn authenticate(req: &salvo::Request, config: &Settings) -> ServiceResult<Principal> {
    match config.auth.method {
        AuthMethod::SingleUser => {
            let single_user =
                config
                    .auth
                    .single_user
                    .as_ref()
                    .ok_or(ServiceError::InvalidConfiguration(
                        "Single user config is missing".to_string(),
                    ))?;

            Ok(Principal::new(single_user.name.clone()))
        }
        AuthMethod::BasicAuth => authenticate_basic(req, config),
    }
}

fn authenticate_basic(req: &salvo::Request, config: &Settings) -> ServiceResult<Principal> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(ServiceError::NotAuthenticated)?;

    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(ServiceError::NotAuthenticated)?;

    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_e| ServiceError::NotAuthenticated)?;
    let decoded = String::from_utf8(decoded).map_err(|_e| ServiceError::NotAuthenticated)?;

    let (name, password) = decoded
        .split_once(':')
        .ok_or(ServiceError::NotAuthenticated)?;

    let user = config
        .auth
        .users
        .iter()
        .find(|u| u.name == name)
        .ok_or(ServiceError::NotAuthenticated)?;

    verify_password(password, &user.password_hash)?;

    tracing::debug!(user = %name, "Basic auth succeeded");

    Ok(Principal::new(name))
}
