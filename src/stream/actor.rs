//! The stream's internal actor state and message loop (§4.5, §5: "Stream is
//! a single-owner actor"), grounded on the teacher's background-task-plus-
//! channel shape for `reconnecting_rpc_client`
//! (`rpcs/src/client/reconnecting_rpc_client*`).

use crate::identity::Identity;
use crate::stream::decode::{decode_block_form, decode_event_form, Tick};
use crate::stream::filter::{encode_filter, Filter};
use crate::value::Value;
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot};

/// Which wire shape inbound notifications take, and which filters were
/// registered at construction (§4.5: event form for a single-filter
/// stream, block form otherwise).
pub(crate) enum Shape {
    Event(Option<Filter>),
    Block(Vec<Filter>),
}

impl Shape {
    fn source(&self) -> &'static str {
        match self {
            Shape::Event(_) => "event",
            Shape::Block(_) => "block",
        }
    }
}

/// Whether a stream's starting height was resolved from `"latest"` or was a
/// caller-given number (§4.5: "The resulting `kind` is `latest`, otherwise
/// `past`.").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Latest,
    Past,
}

pub(crate) struct StreamState {
    pub(crate) identity: Identity,
    pub(crate) shape: Shape,
    pub(crate) kind: StreamKind,
    pub(crate) height: i128,
    pub(crate) max_buffer_size: usize,
    pub(crate) buffer: VecDeque<Tick>,
}

impl StreamState {
    fn put_one(&mut self, tick: Tick) {
        if self.buffer.back() == Some(&tick) {
            return;
        }
        self.buffer.push_back(tick);
    }

    fn put(&mut self, raw_events: Vec<Value>) -> Result<(), crate::error::Error> {
        for raw in &raw_events {
            let tick = match &self.shape {
                Shape::Event(_) => decode_event_form(raw)?,
                Shape::Block(_) => decode_block_form(raw)?,
            };
            self.put_one(tick);
        }
        Ok(())
    }

    fn pop(&mut self, n: usize) -> Vec<Tick> {
        let n = n.min(self.buffer.len());
        let popped: Vec<Tick> = self.buffer.drain(..n).collect();
        if let Some(last) = popped.last() {
            self.height = last.height + 1;
        }
        popped
    }

    fn is_full(&self) -> bool {
        self.buffer.len() >= self.max_buffer_size
    }

    /// `[0.0, 1.0]`, zero iff the buffer is at capacity (§8).
    fn check_space_left(&self) -> f64 {
        if self.max_buffer_size == 0 {
            return 0.0;
        }
        let left = self.max_buffer_size.saturating_sub(self.buffer.len());
        (left as f64 / self.max_buffer_size as f64).clamp(0.0, 1.0)
    }

    fn encode(&self) -> Result<String, crate::error::Error> {
        let mut body = serde_json::Map::new();
        body.insert("height".to_string(), serde_json::Value::String(format!("0x{:x}", self.height)));

        match &self.shape {
            Shape::Event(Some(filter)) => {
                let encoded: serde_json::Value = encode_filter(filter)?.into();
                if let serde_json::Value::Object(fields) = encoded {
                    for (k, v) in fields {
                        body.insert(k, v);
                    }
                }
            }
            Shape::Event(None) => {}
            Shape::Block(filters) if !filters.is_empty() => {
                let mut encoded = Vec::with_capacity(filters.len());
                for f in filters {
                    encoded.push(encode_filter(f)?.into());
                }
                body.insert("eventFilters".to_string(), serde_json::Value::Array(encoded));
            }
            Shape::Block(_) => {}
        }

        Ok(serde_json::to_string(&serde_json::Value::Object(body))?)
    }

    fn to_uri(&self) -> String {
        let node = self.identity.node();
        let scheme = if node.scheme() == "https" { "wss" } else { "ws" };
        let host = node.host_str().unwrap_or_default();
        let port = node.port().map(|p| format!(":{p}")).unwrap_or_default();
        format!("{scheme}://{host}{port}/api/v3/icon_dex/{}", self.shape.source())
    }
}

/// Operations the owning task accepts, one per public [`crate::stream::StreamHandle`]
/// method (§4.5 design note: actor, not a lock-protected struct).
pub(crate) enum StreamOp {
    Put(Vec<Value>, oneshot::Sender<Result<(), crate::error::Error>>),
    Pop(usize, oneshot::Sender<Vec<Tick>>),
    Encode(oneshot::Sender<Result<String, crate::error::Error>>),
    ToUri(oneshot::Sender<String>),
    IsFull(oneshot::Sender<bool>),
    CheckSpaceLeft(oneshot::Sender<f64>),
    Kind(oneshot::Sender<StreamKind>),
}

/// Spawn the owning task and return the channel its `StreamHandle` sends
/// operations through. Operations are serialized in submission order by the
/// mailbox (§5: "Operations are atomic with respect to each other").
pub(crate) fn spawn(mut state: StreamState) -> mpsc::Sender<StreamOp> {
    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(async move {
        while let Some(op) = rx.recv().await {
            match op {
                StreamOp::Put(events, reply) => {
                    let _ = reply.send(state.put(events));
                }
                StreamOp::Pop(n, reply) => {
                    let _ = reply.send(state.pop(n));
                }
                StreamOp::Encode(reply) => {
                    let _ = reply.send(state.encode());
                }
                StreamOp::ToUri(reply) => {
                    let _ = reply.send(state.to_uri());
                }
                StreamOp::IsFull(reply) => {
                    let _ = reply.send(state.is_full());
                }
                StreamOp::CheckSpaceLeft(reply) => {
                    let _ = reply.send(state.check_space_left());
                }
                StreamOp::Kind(reply) => {
                    let _ = reply.send(state.kind);
                }
            }
        }
    });
    tx
}
