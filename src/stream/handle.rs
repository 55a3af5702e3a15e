//! The public stream handle and its constructors (§4.5).

use crate::error::Error;
use crate::identity::Identity;
use crate::scalars::{Integer, Scalar};
use crate::stream::actor::{spawn, Shape, StreamKind, StreamOp, StreamState};
use crate::stream::decode::Tick;
use crate::stream::filter::{encode_filter, Filter};
use crate::transport::{HttpTransport, WebsocketTransport};
use crate::value::Value;
use tokio::sync::{mpsc, oneshot};

/// `from_height` as accepted by [`StreamOptions`] (§4.5).
#[derive(Clone, Debug)]
pub enum FromHeight {
    Height(i128),
    Latest,
}

/// Options shared by [`new_block_stream`] and [`new_event_stream`] (§4.5).
pub struct StreamOptions {
    pub identity: Identity,
    pub from_height: FromHeight,
    pub max_buffer_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            identity: Identity::anonymous(),
            from_height: FromHeight::Height(0),
            max_buffer_size: 1000,
        }
    }
}

/// A cloneable front to a running stream actor. Every method sends a
/// [`StreamOp`] down the owning task's mailbox and awaits its reply; there
/// is no lock shared with callers (§5).
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::Sender<StreamOp>,
}

impl StreamHandle {
    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> StreamOp) -> T {
        let (reply_tx, reply_rx) = oneshot::channel();
        // The owning task only stops when the handle (and every clone) is
        // dropped, so a send failure here would mean the caller kept no
        // handle alive at all — unreachable through the public API.
        self.tx
            .send(build(reply_tx))
            .await
            .unwrap_or_else(|_| panic!("stream actor task has stopped"));
        reply_rx.await.expect("stream actor task dropped its reply sender")
    }

    pub async fn put(&self, events: Vec<Value>) -> Result<(), Error> {
        self.call(|reply| StreamOp::Put(events, reply)).await
    }

    pub async fn pop(&self, n: usize) -> Vec<Tick> {
        self.call(|reply| StreamOp::Pop(n, reply)).await
    }

    pub async fn encode(&self) -> Result<String, Error> {
        self.call(StreamOp::Encode).await
    }

    pub async fn to_uri(&self) -> String {
        self.call(StreamOp::ToUri).await
    }

    pub async fn is_full(&self) -> bool {
        self.call(StreamOp::IsFull).await
    }

    pub async fn check_space_left(&self) -> f64 {
        self.call(StreamOp::CheckSpaceLeft).await
    }

    pub async fn kind(&self) -> StreamKind {
        self.call(StreamOp::Kind).await
    }
}

/// Drive a websocket collaborator into `handle`: send the registration frame
/// `handle.encode()` produces, then feed every inbound text frame to
/// `handle.put` until the transport's stream ends (§6.3). Runs until
/// `recv_text` returns `Ok(None)` or an error; callers that want to keep
/// listening alongside other work should spawn this on its own task.
pub async fn drive(handle: &StreamHandle, transport: &mut dyn WebsocketTransport) -> Result<(), Error> {
    let frame = handle.encode().await?;
    transport.send_text(frame).await?;
    while let Some(text) = transport.recv_text().await? {
        let json: serde_json::Value = serde_json::from_str(&text)?;
        handle.put(vec![json.into()]).await?;
    }
    Ok(())
}

async fn resolve_height(identity: &Identity, from_height: &FromHeight, transport: Option<&dyn HttpTransport>) -> Result<(i128, StreamKind), Error> {
    match from_height {
        FromHeight::Height(h) => Ok((*h, StreamKind::Past)),
        FromHeight::Latest => {
            let transport = transport.ok_or_else(|| {
                Error::from("from_height: latest requires a transport to resolve the current height")
            })?;
            let request = crate::goloop::get_last_block(identity)?;
            let body = request.to_json();
            let response = transport.post(&request.options.url, body, None).await?;
            let height_raw = response
                .get("result")
                .and_then(|r| r.get("height"))
                .cloned()
                .ok_or_else(|| Error::system_error("get_last_block response missing result.height"))?;
            let height_value: Value = height_raw.into();
            let loaded = Integer::load(&height_value).map_err(|_| Error::system_error("malformed height"))?;
            let height = loaded.as_int().expect("Integer::load always yields Value::Int");
            Ok((height, StreamKind::Latest))
        }
    }
}

/// A block stream, notified once per block with every registered filter's
/// matches merged into one `{tx -> [log...]}` map per tick.
pub async fn new_block_stream(
    filters: Vec<Filter>,
    opts: StreamOptions,
    transport: Option<&dyn HttpTransport>,
) -> Result<StreamHandle, Error> {
    for f in &filters {
        encode_filter(f)?;
    }
    let (height, kind) = resolve_height(&opts.identity, &opts.from_height, transport).await?;
    let state = StreamState {
        identity: opts.identity,
        shape: Shape::Block(filters),
        kind,
        height,
        max_buffer_size: opts.max_buffer_size,
        buffer: Default::default(),
    };
    Ok(StreamHandle { tx: spawn(state) })
}

/// An event stream, notified once per matching event log.
pub async fn new_event_stream(
    filter: Option<Filter>,
    opts: StreamOptions,
    transport: Option<&dyn HttpTransport>,
) -> Result<StreamHandle, Error> {
    if let Some(f) = &filter {
        encode_filter(f)?;
    }
    let (height, kind) = resolve_height(&opts.identity, &opts.from_height, transport).await?;
    let state = StreamState {
        identity: opts.identity,
        shape: Shape::Event(filter),
        kind,
        height,
        max_buffer_size: opts.max_buffer_size,
        buffer: Default::default(),
    };
    Ok(StreamHandle { tx: spawn(state) })
}
