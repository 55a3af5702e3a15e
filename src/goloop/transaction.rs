//! Write (transaction) constructors. Every one of these requires a signing
//! identity and returns an unsigned `Request` — callers invoke
//! [`crate::request::sign`] themselves before submission, matching §4.4's
//! separation of `sign`/`verify` from the builder.

use super::{base_tx_fields, build_request, method_name, with_identity_defaults};
use crate::error::Error;
use crate::identity::Identity;
use crate::request::Request;
use crate::scalars::{BinaryData, ScalarTag, ZERO_SCORE_ADDRESS};
use crate::schema::{enum_of, record, scalar, Field, Type};
use crate::value::{map, Value};

fn require_address(identity: &Identity) -> Result<(), Error> {
    if identity.has_address() {
        Ok(())
    } else {
        Err(Error::InvalidIdentity)
    }
}

pub fn transfer(identity: &Identity, to: &str, value: i128, timeout: Option<u64>) -> Result<Request, Error> {
    require_address(identity)?;
    let ty = base_tx_fields(true, vec![]);
    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("value".to_string(), Value::Int(value)),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

pub fn send_message(identity: &Identity, to: &str, text: &str, timeout: Option<u64>) -> Result<Request, Error> {
    require_address(identity)?;
    let ty = base_tx_fields(
        false,
        vec![
            (
                "dataType",
                Field::new(enum_of(&["message"]))
                    .required()
                    .default_value(Value::Str("message".into())),
            ),
            ("data", Field::new(scalar(ScalarTag::BinaryData)).required()),
        ],
    );
    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("dataType".to_string(), Value::Str("message".to_string())),
            ("data".to_string(), BinaryData::dump_text(text)),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

/// Write-call: invoke a SCORE method that mutates state (§4.4
/// `transaction_call`).
pub fn transaction_call(
    identity: &Identity,
    to: &str,
    method: &str,
    params: Option<Value>,
    params_schema: Option<Type>,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    require_address(identity)?;
    let data_params_ty = params_schema.unwrap_or_else(|| record(vec![]));
    let ty = base_tx_fields(
        false,
        vec![
            (
                "dataType",
                Field::new(enum_of(&["call"]))
                    .required()
                    .default_value(Value::Str("call".into())),
            ),
            (
                "data",
                Field::new(record(vec![
                    ("method", Field::new(scalar(ScalarTag::StringScalar)).required()),
                    ("params", Field::new(data_params_ty)),
                ]))
                .required(),
            ),
        ],
    );

    let mut data = map([("method".to_string(), Value::Str(method.to_string()))]);
    if let (Value::Map(m), Some(p)) = (&mut data, params) {
        m.insert("params".to_string(), p);
    }

    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("dataType".to_string(), Value::Str("call".to_string())),
            ("data".to_string(), data),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

fn deploy(
    identity: &Identity,
    to: &str,
    content: &str,
    on_deploy_params: Option<Value>,
    on_deploy_schema: Option<Type>,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    require_address(identity)?;
    let params_ty = on_deploy_schema.unwrap_or_else(|| record(vec![]));
    let ty = base_tx_fields(
        false,
        vec![
            (
                "dataType",
                Field::new(enum_of(&["deploy"]))
                    .required()
                    .default_value(Value::Str("deploy".into())),
            ),
            (
                "data",
                Field::new(record(vec![
                    ("contentType", Field::new(scalar(ScalarTag::StringScalar)).required()),
                    ("content", Field::new(scalar(ScalarTag::BinaryData)).required()),
                    ("params", Field::new(params_ty)),
                ]))
                .required(),
            ),
        ],
    );

    let mut data = map([
        ("contentType".to_string(), Value::Str("application/zip".to_string())),
        ("content".to_string(), Value::Str(content.to_string())),
    ]);
    if let (Value::Map(m), Some(p)) = (&mut data, on_deploy_params) {
        m.insert("params".to_string(), p);
    }

    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("dataType".to_string(), Value::Str("deploy".to_string())),
            ("data".to_string(), data),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

/// Install a new SCORE: `to` is fixed to the zero SCORE address (§4.4).
pub fn install_score(
    identity: &Identity,
    content: &str,
    on_install_params: Option<Value>,
    on_install_schema: Option<Type>,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    deploy(identity, ZERO_SCORE_ADDRESS, content, on_install_params, on_install_schema, timeout)
}

pub fn update_score(
    identity: &Identity,
    to: &str,
    content: &str,
    on_update_params: Option<Value>,
    on_update_schema: Option<Type>,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    deploy(identity, to, content, on_update_params, on_update_schema, timeout)
}

pub fn deposit_shared_fee(identity: &Identity, to: &str, value: i128, timeout: Option<u64>) -> Result<Request, Error> {
    require_address(identity)?;
    let ty = base_tx_fields(
        true,
        vec![
            (
                "dataType",
                Field::new(enum_of(&["deposit"]))
                    .required()
                    .default_value(Value::Str("deposit".into())),
            ),
            (
                "data",
                Field::new(record(vec![(
                    "action",
                    Field::new(enum_of(&["add"])).required().default_value(Value::Str("add".into())),
                )]))
                .required(),
            ),
        ],
    );

    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("value".to_string(), Value::Int(value)),
            ("dataType".to_string(), Value::Str("deposit".to_string())),
            ("data".to_string(), map([("action".to_string(), Value::Str("add".to_string()))])),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

/// Either an `amount` to withdraw or a `hash` naming a specific deposit
/// (§4.4: "discriminator on value shape"), or neither to withdraw in full.
pub enum WithdrawTarget {
    Amount(i128),
    Hash(String),
    All,
}

pub fn withdraw_shared_fee(
    identity: &Identity,
    to: &str,
    target: WithdrawTarget,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    require_address(identity)?;

    // The target's shape (amount|hash|neither) is already known here, from
    // the caller's choice of `WithdrawTarget` variant, so the `data` schema
    // is picked directly rather than expressed as a runtime-discriminated
    // `{any,...}` — there is no wire sibling field to discriminate on.
    let (data_fields, payload): (Vec<(&'static str, Field)>, Value) = match &target {
        WithdrawTarget::Amount(amount) => (
            vec![("amount", Field::new(scalar(ScalarTag::Loop)).required())],
            map([("amount".to_string(), Value::Int(*amount))]),
        ),
        WithdrawTarget::Hash(hash) => (
            vec![("hash", Field::new(scalar(ScalarTag::Hash)).required())],
            map([("hash".to_string(), Value::Str(hash.clone()))]),
        ),
        WithdrawTarget::All => (vec![], map([])),
    };

    let mut action_data_fields = vec![(
        "action",
        Field::new(enum_of(&["withdraw"])).required().default_value(Value::Str("withdraw".into())),
    )];
    action_data_fields.extend(data_fields);

    let ty = base_tx_fields(
        false,
        vec![
            (
                "dataType",
                Field::new(enum_of(&["deposit"]))
                    .required()
                    .default_value(Value::Str("deposit".into())),
            ),
            ("data", Field::new(record(action_data_fields)).required()),
        ],
    );

    let mut data = map([("action".to_string(), Value::Str("withdraw".to_string()))]);
    if let (Value::Map(m), Value::Map(p)) = (&mut data, payload) {
        m.extend(p);
    }

    let params = with_identity_defaults(
        identity,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("dataType".to_string(), Value::Str("deposit".to_string())),
            ("data".to_string(), data),
        ]),
    );
    build_request(method_name("icx_sendTransaction", timeout), ty, params, identity, timeout)
}

/// Generic escape hatch (§4.4 `send_transaction`): the caller supplies the
/// full params schema and value, bypassing every other constructor.
pub struct SendTransactionOptions {
    pub method: String,
    pub schema: Type,
    pub params: Value,
    pub timeout: Option<u64>,
}

pub fn send_transaction(identity: &Identity, opts: SendTransactionOptions) -> Result<Request, Error> {
    require_address(identity)?;
    build_request(
        method_name(&opts.method, opts.timeout),
        opts.schema,
        opts.params,
        identity,
        opts.timeout,
    )
}
