//! Transport collaborator contracts (§6): this crate is written against
//! these traits and never a concrete HTTP/websocket library, mirroring
//! `subxt-rpcs`'s `RpcClientT` trait object seam
//! (`rpcs/src/client/rpc_client_t.rs`). Production bodies are out of scope
//! (§ Non-goals) — callers supply their own `Arc<dyn HttpTransport>` /
//! `Box<dyn WebsocketTransport>`.

use crate::error::Error;
use async_trait::async_trait;

/// A JSON-RPC-over-HTTP collaborator. `icon_options` is the millisecond
/// timeout to send as the `Icon-Options` header on `…AndWait` calls (§6.1).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: serde_json::Value,
        icon_options: Option<u64>,
    ) -> Result<serde_json::Value, Error>;
}

/// A websocket collaborator carrying already-framed JSON text (§6.3).
#[async_trait]
pub trait WebsocketTransport: Send + Sync {
    async fn send_text(&self, frame: String) -> Result<(), Error>;
    async fn recv_text(&mut self) -> Result<Option<String>, Error>;
}

/// In-memory transports for unit tests, mirroring
/// `rpcs/src/client/mock_rpc_client.rs`.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed queue of responses to each `post`, recording what it
    /// was called with.
    pub struct MockHttpTransport {
        responses: Mutex<Vec<Result<serde_json::Value, Error>>>,
        pub calls: Mutex<Vec<(String, serde_json::Value, Option<u64>)>>,
    }

    impl MockHttpTransport {
        /// Responses are consumed in reverse; push them in call order.
        pub fn new(mut responses: Vec<Result<serde_json::Value, Error>>) -> Self {
            responses.reverse();
            MockHttpTransport {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for MockHttpTransport {
        async fn post(
            &self,
            url: &str,
            body: serde_json::Value,
            icon_options: Option<u64>,
        ) -> Result<serde_json::Value, Error> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body.clone(), icon_options));
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(Error::system_error("mock exhausted")))
        }
    }

    /// A websocket transport fed by a preloaded queue of inbound frames.
    pub struct MockWebsocketTransport {
        pub sent: Mutex<Vec<String>>,
        inbound: Mutex<Vec<String>>,
    }

    impl MockWebsocketTransport {
        pub fn new(inbound: Vec<String>) -> Self {
            let mut inbound = inbound;
            inbound.reverse();
            MockWebsocketTransport {
                sent: Mutex::new(Vec::new()),
                inbound: Mutex::new(inbound),
            }
        }
    }

    #[async_trait]
    impl WebsocketTransport for MockWebsocketTransport {
        async fn send_text(&self, frame: String) -> Result<(), Error> {
            self.sent.lock().unwrap().push(frame);
            Ok(())
        }

        async fn recv_text(&mut self) -> Result<Option<String>, Error> {
            Ok(self.inbound.lock().unwrap().pop())
        }
    }
}
