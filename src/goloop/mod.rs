//! The "Method Library" (Glossary): one function per row of the method
//! table in SPEC_FULL.md §4.4, each a thin schema-declaration wrapper
//! around [`crate::request::Request`]. Grounded on `subxt`'s per-pallet
//! call-builder modules (e.g. `subxt/src/constants.rs`,
//! `subxt/src/storage/storage_client.rs`), which play the same "typed
//! constructor producing a validated, unsubmitted request" role.

mod query;
mod transaction;

pub use query::*;
pub use transaction::*;

use crate::error::Error;
use crate::identity::Identity;
use crate::request::{Request, RequestOptions};
use crate::scalars::ScalarTag;
use crate::schema::{record, scalar, Field, Schema, Type};
use crate::value::Value;
use rand::Rng;

/// Build `{node}/api/v3` or `{node}/api/v3d`, matching `identity.debug`.
fn url_for(identity: &Identity) -> String {
    identity.api_url()
}

/// Choose between a call's plain and `AndWait` method name depending on
/// whether a timeout was requested (§4.4 "Universal rule").
fn method_name(base: &str, timeout: Option<u64>) -> String {
    if timeout.is_some() {
        format!("{base}AndWait")
    } else {
        base.to_string()
    }
}

/// Compile `ty`, load `params` through it, and wrap the result in a
/// `Request`. Shared by every constructor in [`query`] and [`transaction`].
fn build_request(
    method: String,
    ty: Type,
    params: Value,
    identity: &Identity,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    let schema = Schema::compile(ty)?;
    // Load validates the caller's input and fills derived defaults; dump
    // immediately converts the result to wire form, since `Request.params`
    // is what actually gets serialized into the JSON-RPC body (§6.1).
    let loaded = schema.load(params)?;
    let wire = schema.dump(loaded)?;
    Ok(Request::new(
        method,
        wire,
        RequestOptions {
            url: url_for(identity),
            schema: Some(schema),
            identity: Some(identity.clone()),
            timeout,
        },
    ))
}

/// The common fields of every `icx_sendTransaction*` request: `version`
/// (default 3), `from`, `to` (caller supplied), `value` (optional),
/// `timestamp`, `nid`, `nonce`, and `signature` (filled later by
/// [`crate::request::sign`]). `extra` adds method-specific fields (e.g.
/// `dataType`/`data`).
///
/// `from`/`nid`/`timestamp`/`nonce` are declared here as plain required
/// fields with no schema default — every caller of this function resolves
/// them in Rust instead (see [`with_identity_defaults`]). A schema default
/// thunk that closed over a specific call's identity would be baked into
/// the `Arc<Type>` the process-wide compile cache returns for every other
/// call building this same structural shape, handing the *first* caller's
/// address/network id to every later caller (§9 "process-wide schema
/// cache"). `timestamp`/`nonce` read no per-call data even as thunks, so
/// they stay as thunks — only identity-bound defaults need to move out.
fn base_tx_fields(value_required: bool, extra: Vec<(&'static str, Field)>) -> Type {
    let timestamp_field = Field::new(scalar(ScalarTag::Timestamp))
        .required()
        .default_thunk(|_| Value::Int(crate::scalars::Timestamp::now_micros()));

    let nonce_field = Field::new(scalar(ScalarTag::PosInteger))
        .required()
        .default_thunk(|_| Value::Int(rand::thread_rng().gen_range(1..i64::MAX) as i128));

    let mut fields = vec![
        (
            "version",
            Field::new(scalar(ScalarTag::PosInteger))
                .required()
                .default_value(Value::Int(3)),
        ),
        ("from", Field::new(scalar(ScalarTag::Eoa)).required()),
        ("to", Field::new(scalar(ScalarTag::Address)).required()),
        (
            "value",
            if value_required {
                Field::new(scalar(ScalarTag::Loop)).required()
            } else {
                Field::new(scalar(ScalarTag::Loop))
            },
        ),
        ("timestamp", timestamp_field),
        ("nid", Field::new(scalar(ScalarTag::Integer)).required()),
        ("nonce", nonce_field),
        ("signature", Field::new(scalar(ScalarTag::Signature))),
    ];
    fields.extend(extra);

    record(fields)
}

/// Resolve `from`/`nid` directly into `params`, the same way
/// [`query::get_balance`] resolves its own identity-derived default
/// without a schema default — identity-bound values must never be routed
/// through a default thunk baked into the cached schema tree (see
/// [`base_tx_fields`]). Callers must have already checked
/// `identity.has_address()` (every transaction constructor calls
/// `require_address` first).
fn with_identity_defaults(identity: &Identity, params: Value) -> Value {
    let Value::Map(mut m) = params else {
        return params;
    };
    m.insert(
        "from".to_string(),
        Value::Str(identity.address().expect("caller checked require_address").to_string()),
    );
    m.insert("nid".to_string(), Value::Int(identity.network_id().hex() as i128));
    Value::Map(m)
}
