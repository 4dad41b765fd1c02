//! The session facade.
//!
//! A [`Session`] owns one websocket connection and exposes the VTube Studio
//! commands as async methods. Every call locks the session for the full
//! send/receive round trip, so sharing a session between tasks serializes
//! their requests instead of interleaving frames on the wire.

use crate::auth;
use crate::data::{
    AuthenticationTokenRequest, AvailableModelsRequest, ExpressionActivationRequest, Hotkey,
    HotkeysInCurrentModelRequest, Model, ModelLoadRequest, MoveModelRequest, Request,
    RequestEnvelope, RequestId, ResponseEnvelope,
};
use crate::error::{Error, ErrorKind, Result};
use crate::observer::{Observer, TracingObserver};
use crate::service::{self, EnvelopeTransport};

use futures_util::SinkExt;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Animation duration applied by [`Session::move_model`] when the caller does
/// not specify one.
pub const DEFAULT_MOVE_SECONDS: f64 = 0.2;

/// Builder for [`Session`].
///
/// # Example
///
/// ```no_run
/// # async fn run() -> Result<(), vts_controller::Error> {
/// use vts_controller::session::SessionBuilder;
///
/// let session = SessionBuilder::new()
///     .url("ws://localhost:8001")
///     .plugin_name("MyPlugin")
///     .plugin_developer("Me")
///     .connect()
///     .await?;
///
/// let authenticated = session.authenticate().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionBuilder {
    url: String,
    plugin_name: Cow<'static, str>,
    plugin_developer: Cow<'static, str>,
    plugin_icon: Option<Cow<'static, str>>,
    observer: Arc<dyn Observer>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            url: String::new(),
            plugin_name: Cow::Borrowed(""),
            plugin_developer: Cow::Borrowed(""),
            plugin_icon: None,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("url", &self.url)
            .field("plugin_name", &self.plugin_name)
            .field("plugin_developer", &self.plugin_developer)
            .field("plugin_icon", &self.plugin_icon.is_some())
            .finish()
    }
}

impl SessionBuilder {
    /// Creates a new builder with no identity configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the websocket endpoint, e.g. `ws://localhost:8001`.
    pub fn url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the plugin name shown in the VTube Studio permission pop-up.
    pub fn plugin_name<S: Into<Cow<'static, str>>>(mut self, name: S) -> Self {
        self.plugin_name = name.into();
        self
    }

    /// Sets the plugin developer shown in the VTube Studio permission pop-up.
    pub fn plugin_developer<S: Into<Cow<'static, str>>>(mut self, developer: S) -> Self {
        self.plugin_developer = developer.into();
        self
    }

    /// Sets a Base64 encoded image to show in the permission pop-up.
    pub fn plugin_icon<S: Into<Cow<'static, str>>>(mut self, icon: S) -> Self {
        self.plugin_icon = Some(icon.into());
        self
    }

    /// Replaces the default [`TracingObserver`] with a custom [`Observer`].
    pub fn observer<O: Observer + 'static>(mut self, observer: O) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("url", self.url.as_str()),
            ("plugin_name", self.plugin_name.as_ref()),
            ("plugin_developer", self.plugin_developer.as_ref()),
        ] {
            if value.is_empty() {
                return Err(Error::new(ErrorKind::Configuration)
                    .with_source(MissingFieldError { field }));
            }
        }

        Ok(())
    }

    fn into_session<T>(self, transport: T) -> Session<T>
    where
        T: EnvelopeTransport,
    {
        Session {
            plugin: AuthenticationTokenRequest {
                plugin_name: self.plugin_name,
                plugin_developer: self.plugin_developer,
                plugin_icon: self.plugin_icon,
            },
            observer: self.observer,
            state: Mutex::new(State {
                transport: Some(transport),
                authenticated: false,
                model_id: None,
            }),
        }
    }

    /// Opens a websocket connection to the configured endpoint.
    ///
    /// Fails with a [`Configuration`](ErrorKind::Configuration) error if the
    /// URL, plugin name, or plugin developer is empty, and a
    /// [`Connection`](ErrorKind::Connection) error if the endpoint cannot be
    /// reached.
    #[cfg(feature = "tokio-tungstenite")]
    pub async fn connect(self) -> Result<Session<crate::transport::TungsteniteApiTransport>> {
        self.validate()?;

        let transport = crate::transport::TungsteniteApiTransport::connect(self.url.as_str()).await?;

        Ok(self.into_session(transport))
    }

    /// Creates a session over an already established transport.
    ///
    /// This is how non-default websocket libraries (via a custom
    /// [`MessageCodec`](crate::codec::MessageCodec)) are plugged in.
    pub fn build_with_transport<T>(self, transport: T) -> Result<Session<T>>
    where
        T: EnvelopeTransport,
    {
        self.validate()?;

        Ok(self.into_session(transport))
    }
}

/// Missing mandatory builder field.
#[derive(Debug, Clone, thiserror::Error)]
#[error("missing required field `{field}`")]
pub struct MissingFieldError {
    /// The name of the missing field.
    pub field: &'static str,
}

struct State<T> {
    transport: Option<T>,
    authenticated: bool,
    model_id: Option<String>,
}

/// A connected VTube Studio control session.
///
/// Created with [`SessionBuilder`]. All methods take `&self`; the connection
/// and session state live behind an internal async mutex held for each full
/// request/response round trip.
pub struct Session<T> {
    plugin: AuthenticationTokenRequest,
    observer: Arc<dyn Observer>,
    state: Mutex<State<T>>,
}

impl<T> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("plugin_name", &self.plugin.plugin_name)
            .field("plugin_developer", &self.plugin.plugin_developer)
            .finish()
    }
}

impl<T> State<T> {
    fn transport(&mut self) -> Result<&mut T> {
        self.transport
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::Connection).with_source(NotConnectedError))
    }
}

/// The session has no open connection (never connected, or already closed).
#[derive(Debug, Clone, thiserror::Error)]
#[error("session is not connected")]
pub struct NotConnectedError;

fn raw_request<Req: Request>(data: &Req) -> Result<RequestEnvelope> {
    Ok(RequestEnvelope::new(data)?.with_id(RequestId::from(Req::MESSAGE_TYPE.as_str())))
}

impl<T> Session<T>
where
    T: EnvelopeTransport,
{
    /// Runs the token-then-authenticate handshake for this session's plugin
    /// identity.
    ///
    /// Returns `Ok(false)` on denial. The session's authenticated flag is set
    /// only when the server accepts.
    pub async fn authenticate(&self) -> Result<bool> {
        let mut state = self.state.lock().await;

        let authenticated = auth::authenticate(state.transport()?, &self.plugin).await?;
        state.authenticated = authenticated;

        if authenticated {
            self.observer.info("authenticated with VTube Studio");
        } else {
            self.observer.warn("VTube Studio denied authentication");
        }

        Ok(authenticated)
    }

    /// Lists the models available in VTube Studio.
    ///
    /// An empty list is a normal result, not an error.
    pub async fn available_models(&self) -> Result<Vec<Model>> {
        let mut state = self.state.lock().await;

        let response =
            service::send_request(state.transport()?, &AvailableModelsRequest {}).await?;

        Ok(response.available_models)
    }

    /// Loads the model with the given ID.
    ///
    /// The raw response envelope is returned verbatim so callers can branch on
    /// `APIError` replies themselves. The session's current model is updated
    /// as soon as a reply arrives, whether or not the load succeeded.
    pub async fn load_model<S: Into<String>>(&self, model_id: S) -> Result<ResponseEnvelope> {
        let model_id = model_id.into();
        let mut state = self.state.lock().await;

        let request = raw_request(&ModelLoadRequest {
            model_id: model_id.clone(),
        })?;
        let response = service::exchange(state.transport()?, request).await?;

        state.model_id = Some(model_id);

        Ok(response)
    }

    /// Moves, rotates, or resizes the currently loaded model.
    ///
    /// Omitted components are left untouched by VTube Studio. The animation
    /// takes [`DEFAULT_MOVE_SECONDS`] and values are absolute; use
    /// [`move_model_request`](Self::move_model_request) for full control.
    /// Out-of-range values are forwarded as-is for the server to reject.
    pub async fn move_model(
        &self,
        position_x: Option<f64>,
        position_y: Option<f64>,
        rotation: Option<f64>,
        size: Option<f64>,
    ) -> Result<ResponseEnvelope> {
        self.move_model_request(MoveModelRequest {
            time_in_seconds: DEFAULT_MOVE_SECONDS,
            values_are_relative_to_model: false,
            position_x,
            position_y,
            rotation,
            size,
        })
        .await
    }

    /// Moves the model with explicit timing and relative/absolute control.
    pub async fn move_model_request(&self, request: MoveModelRequest) -> Result<ResponseEnvelope> {
        let mut state = self.state.lock().await;

        let request = raw_request(&request)?;

        service::exchange(state.transport()?, request).await
    }

    /// Lists the hotkeys of the given model, or of the session's current
    /// model when `model_id` is `None`.
    pub async fn hotkeys(&self, model_id: Option<String>) -> Result<Vec<Hotkey>> {
        let mut state = self.state.lock().await;

        let model_id = model_id.or_else(|| state.model_id.clone());
        let response = service::send_request(
            state.transport()?,
            &HotkeysInCurrentModelRequest { model_id },
        )
        .await?;

        Ok(response.available_hotkeys)
    }

    /// Activates the expression in the given expression file, e.g.
    /// `myExpression_1.exp3.json`.
    pub async fn activate_expression<S: Into<String>>(&self, file: S) -> Result<ResponseEnvelope> {
        self.set_expression(file.into(), true).await
    }

    /// Deactivates the expression in the given expression file.
    pub async fn deactivate_expression<S: Into<String>>(
        &self,
        file: S,
    ) -> Result<ResponseEnvelope> {
        self.set_expression(file.into(), false).await
    }

    async fn set_expression(&self, expression_file: String, active: bool) -> Result<ResponseEnvelope> {
        let mut state = self.state.lock().await;

        let request = raw_request(&ExpressionActivationRequest {
            expression_file,
            active,
        })?;

        service::exchange(state.transport()?, request).await
    }

    /// Closes the connection.
    ///
    /// The connection handle is released even if the websocket shutdown
    /// fails; a failure is reported through the observer, not the return
    /// value. Closing an already closed session is a no-op.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;

        state.authenticated = false;

        if let Some(mut transport) = state.transport.take() {
            if let Err(e) = transport.close().await {
                self.observer.warn(&format!("websocket close failed: {}", e));
            }
        }
    }

    /// Whether the most recent [`authenticate`](Self::authenticate) call
    /// succeeded on this connection.
    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.authenticated
    }

    /// The ID of the model most recently loaded through this session, if any.
    pub async fn current_model(&self) -> Option<String> {
        self.state.lock().await.model_id.clone()
    }
}
