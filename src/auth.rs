//! The two-phase authentication flow.
//!
//! VTube Studio requires plugins to authenticate before issuing commands:
//! first obtain a one-time token with [`request_token`] (the user must approve
//! a pop-up in the app), then present it with [`authenticate`]. A fresh token
//! is requested on every call; tokens are never cached by this crate.

use crate::data::{AuthenticationRequest, AuthenticationTokenRequest};
use crate::error::Result;
use crate::service::{send_request, EnvelopeTransport};

/// Requests a new authentication token for the given plugin identity.
///
/// This triggers a permission pop-up in the VTube Studio app. Fails with a
/// [`Protocol`](crate::ErrorKind::Protocol) error if the reply does not carry
/// a token, and an [`Api`](crate::ErrorKind::Api) error if the user denied
/// the pop-up.
pub async fn request_token<T>(
    transport: &mut T,
    plugin: &AuthenticationTokenRequest,
) -> Result<String>
where
    T: EnvelopeTransport,
{
    let response = send_request(transport, plugin).await?;

    Ok(response.authentication_token)
}

/// Runs the full token-then-authenticate handshake.
///
/// Returns `Ok(true)` if the session is now authenticated and `Ok(false)` if
/// the server denied the credentials. A denial is a normal outcome, not an
/// error.
pub async fn authenticate<T>(
    transport: &mut T,
    plugin: &AuthenticationTokenRequest,
) -> Result<bool>
where
    T: EnvelopeTransport,
{
    let authentication_token = request_token(transport, plugin).await?;

    let request = AuthenticationRequest {
        plugin_name: plugin.plugin_name.clone(),
        plugin_developer: plugin.plugin_developer.clone(),
        authentication_token,
    };

    let response = send_request(transport, &request).await?;

    if !response.authenticated {
        tracing::warn!(reason = %response.reason, "authentication denied");
    }

    Ok(response.authenticated)
}
