//! Request/response correlation.
//!
//! The wire protocol has no reply routing: each connection carries at most one
//! outstanding request, and replies arrive in the order requests were sent.
//! [`exchange`] performs one such round trip. [`send_request`] is the typed
//! wrapper used by the session facade and the authenticator.

use crate::data::{Request, RequestEnvelope, RequestId, ResponseEnvelope};
use crate::error::{Error, ErrorKind, Result};

use futures_core::Stream;
use futures_sink::Sink;
use futures_util::{SinkExt, StreamExt};

/// Trait alias for a duplex envelope transport.
///
/// Implemented by anything that can send [`RequestEnvelope`]s and yield
/// [`ResponseEnvelope`]s, e.g. [`ApiTransport`](crate::transport::ApiTransport).
pub trait EnvelopeTransport:
    Sink<RequestEnvelope, Error = Error> + Stream<Item = Result<ResponseEnvelope>> + Unpin + Send
{
}

impl<T> EnvelopeTransport for T where
    T: Sink<RequestEnvelope, Error = Error> + Stream<Item = Result<ResponseEnvelope>> + Unpin + Send
{
}

/// Sends a single request and awaits the single reply paired with it.
///
/// An envelope without a message type is rejected with
/// [`InvalidArgument`](ErrorKind::InvalidArgument) before anything is written
/// to the transport. A stream that ends before a reply arrives is a
/// [`Connection`](ErrorKind::Connection) error.
///
/// There is no timeout here; callers needing bounded latency should wrap this
/// in [`tokio::time::timeout`](https://docs.rs/tokio/latest/tokio/time/fn.timeout.html).
pub async fn exchange<T>(transport: &mut T, request: RequestEnvelope) -> Result<ResponseEnvelope>
where
    T: EnvelopeTransport,
{
    if request.message_type.as_str().is_empty() {
        return Err(Error::new(ErrorKind::InvalidArgument));
    }

    tracing::debug!(message_type = %request.message_type, "sending request");

    transport.send(request).await?;

    match transport.next().await {
        Some(Ok(response)) => {
            tracing::debug!(message_type = %response.message_type(), "received response");
            Ok(response)
        }
        Some(Err(e)) => Err(e),
        None => Err(Error::new(ErrorKind::Connection)),
    }
}

/// Submits a typed request and parses the reply into its response type.
///
/// The request ID is stamped with the request's message type name, which
/// doubles as a human-readable correlation label on the wire.
pub async fn send_request<T, Req>(transport: &mut T, data: &Req) -> Result<Req::Response>
where
    T: EnvelopeTransport,
    Req: Request,
{
    let request =
        RequestEnvelope::new(data)?.with_id(RequestId::from(Req::MESSAGE_TYPE.as_str()));

    exchange(transport, request).await?.parse::<Req::Response>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AvailableModelsRequest, AvailableModelsResponse, EnumString, Model};
    use crate::transport::mock::MockTransport;

    type TestResult<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn exchange_pairs_one_request_with_one_reply() -> TestResult {
        let (mut transport, sent) = MockTransport::new();

        let reply = ResponseEnvelope::new(&AvailableModelsResponse::default())?
            .with_id("getModels".into());
        transport.enqueue(reply.clone());

        let request = RequestEnvelope::new(&AvailableModelsRequest {})?;
        let response = exchange(&mut transport, request).await?;

        assert_eq!(response, reply);
        assert_eq!(sent.lock().unwrap().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn empty_request_never_reaches_the_transport() {
        let (mut transport, sent) = MockTransport::new();

        let request = RequestEnvelope {
            message_type: EnumString::new_from_str(""),
            ..RequestEnvelope::default()
        };

        let error = exchange(&mut transport, request)
            .await
            .expect_err("expected rejection");

        assert_eq!(error.kind(), &ErrorKind::InvalidArgument);
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn closed_stream_is_a_connection_error() -> TestResult {
        let (mut transport, _sent) = MockTransport::new();

        let request = RequestEnvelope::new(&AvailableModelsRequest {})?;
        let error = exchange(&mut transport, request)
            .await
            .expect_err("expected connection error");

        assert_eq!(error.kind(), &ErrorKind::Connection);

        Ok(())
    }

    #[tokio::test]
    async fn send_request_parses_the_typed_reply() -> TestResult {
        let (mut transport, sent) = MockTransport::new();

        let data = AvailableModelsResponse {
            number_of_models: 1,
            available_models: vec![Model {
                model_id: "m1".into(),
                model_name: "Foo".into(),
                ..Model::default()
            }],
        };
        transport.enqueue(ResponseEnvelope::new(&data)?);

        let response = send_request(&mut transport, &AvailableModelsRequest {}).await?;
        assert_eq!(response, data);

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent[0].request_id.as_ref().map(|id| id.as_str().to_owned()),
            Some("AvailableModelsRequest".to_owned()),
        );

        Ok(())
    }

    #[tokio::test]
    async fn send_request_surfaces_api_errors() -> TestResult {
        use crate::data::{ApiError, ErrorId};

        let (mut transport, _sent) = MockTransport::new();

        let mut reply = ResponseEnvelope::default();
        reply.data = Err(ApiError {
            error_id: ErrorId::REQUEST_REQUIRES_AUTHENTICATION,
            message: "Not authenticated".into(),
        });
        transport.enqueue(reply);

        let error = send_request(&mut transport, &AvailableModelsRequest {})
            .await
            .expect_err("expected API error");

        assert_eq!(error.kind(), &ErrorKind::Api);
        assert!(error.is_unauthenticated_error());

        Ok(())
    }

    #[tokio::test]
    async fn receive_failures_propagate() -> TestResult {
        let (mut transport, _sent) = MockTransport::new();
        transport.enqueue_error(Error::new(ErrorKind::Connection));

        let request = RequestEnvelope::new(&AvailableModelsRequest {})?;
        let error = exchange(&mut transport, request)
            .await
            .expect_err("expected connection error");

        assert_eq!(error.kind(), &ErrorKind::Connection);

        Ok(())
    }
}
