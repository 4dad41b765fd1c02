//! The websocket transport layer.
//!
//! [`ApiTransport`] adapts any message-based websocket sink/stream into a
//! typed duplex connection: a [`Sink`] of [`RequestEnvelope`]s and a
//! [`Stream`] of [`ResponseEnvelope`]s, with one JSON text frame per message.

use crate::codec::MessageCodec;
use crate::data::{RequestEnvelope, ResponseEnvelope};
use crate::error::{Error, ErrorKind};

use futures_core::Stream;
use futures_sink::Sink;
use pin_project_lite::pin_project;
use std::error::Error as StdError;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// A typed envelope transport over an underlying websocket sink/stream.
    ///
    /// Non-text frames (pings, pongs, binary) are skipped on receive, as
    /// decided by the [`MessageCodec`].
    #[derive(Debug, Clone)]
    pub struct ApiTransport<T, C> {
        #[pin]
        transport: T,
        codec: C,
    }
}

impl<T, C> ApiTransport<T, C> {
    /// Creates a new [`ApiTransport`] wrapping a websocket sink/stream.
    pub fn new(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }

    /// Consumes `self`, returning the underlying websocket transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

fn connection<E>(error: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error::new(ErrorKind::Connection).with_source(error)
}

impl<T, C> Sink<RequestEnvelope> for ApiTransport<T, C>
where
    T: Sink<C::Message>,
    T::Error: StdError + Send + Sync + 'static,
    C: MessageCodec,
{
    type Error = Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.as_mut()
            .project()
            .transport
            .poll_ready(cx)
            .map_err(connection)
    }

    fn start_send(mut self: Pin<&mut Self>, item: RequestEnvelope) -> Result<(), Self::Error> {
        let json_str = serde_json::to_string(&item)?;
        self.as_mut()
            .project()
            .transport
            .start_send(C::encode(json_str))
            .map_err(connection)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.as_mut()
            .project()
            .transport
            .poll_flush(cx)
            .map_err(connection)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.as_mut()
            .project()
            .transport
            .poll_close(cx)
            .map_err(connection)
    }
}

impl<T, C, E> Stream for ApiTransport<T, C>
where
    T: Stream<Item = Result<C::Message, E>>,
    E: StdError + Send + Sync + 'static,
    C: MessageCodec,
{
    type Item = Result<ResponseEnvelope, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        Poll::Ready(loop {
            match futures_util::ready!(this.transport.as_mut().poll_next(cx)) {
                Some(Ok(msg)) => {
                    if let Some(s) = C::decode(msg) {
                        // A text frame that isn't a valid envelope counts as a
                        // malformed frame at the connection level.
                        break Some(serde_json::from_str(&s).map_err(connection));
                    }
                }
                Some(Err(e)) => break Some(Err(connection(e))),
                None => break None,
            }
        })
    }
}

#[cfg(feature = "tokio-tungstenite")]
mod tungstenite {
    use super::ApiTransport;
    use crate::codec::TungsteniteCodec;
    use crate::error::{Error, ErrorKind};

    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

    /// Type alias for a default [`tokio_tungstenite`] sink/stream.
    pub type TungsteniteTransport = WebSocketStream<MaybeTlsStream<TcpStream>>;

    /// Type alias for an [`ApiTransport`] that handles [`tokio_tungstenite`] messages.
    pub type TungsteniteApiTransport = ApiTransport<TungsteniteTransport, TungsteniteCodec>;

    impl TungsteniteApiTransport {
        /// Opens a websocket connection to the given endpoint.
        ///
        /// Fails with a [`Connection`](ErrorKind::Connection) error if the
        /// endpoint cannot be reached or the handshake is rejected.
        pub async fn connect<R>(request: R) -> Result<Self, Error>
        where
            R: IntoClientRequest + Send + Unpin,
        {
            let (transport, _resp) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| Error::new(ErrorKind::Connection).with_source(e))?;

            Ok(ApiTransport::new(transport, TungsteniteCodec))
        }
    }
}

#[cfg(feature = "tokio-tungstenite")]
pub use self::tungstenite::{TungsteniteApiTransport, TungsteniteTransport};


#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Shared record of the envelopes written to a [`MockTransport`].
    pub(crate) type SentLog = Arc<Mutex<Vec<RequestEnvelope>>>;

    /// In-memory transport with scripted replies, for exercising the
    /// correlator and session without a server.
    #[derive(Debug)]
    pub(crate) struct MockTransport {
        sent: SentLog,
        replies: VecDeque<Result<ResponseEnvelope, Error>>,
    }

    impl MockTransport {
        pub fn new() -> (Self, SentLog) {
            let sent: SentLog = Arc::new(Mutex::new(Vec::new()));
            let transport = Self {
                sent: Arc::clone(&sent),
                replies: VecDeque::new(),
            };

            (transport, sent)
        }

        /// Queues a reply to be yielded for the next receive.
        pub fn enqueue(&mut self, response: ResponseEnvelope) {
            self.replies.push_back(Ok(response));
        }

        /// Queues a receive failure.
        pub fn enqueue_error(&mut self, error: Error) {
            self.replies.push_back(Err(error));
        }
    }

    impl Sink<RequestEnvelope> for MockTransport {
        type Error = Error;

        fn poll_ready(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, item: RequestEnvelope) -> Result<(), Self::Error> {
            self.get_mut().sent.lock().unwrap().push(item);
            Ok(())
        }

        fn poll_flush(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    impl Stream for MockTransport {
        type Item = Result<ResponseEnvelope, Error>;

        fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Poll::Ready(self.get_mut().replies.pop_front())
        }
    }
}
