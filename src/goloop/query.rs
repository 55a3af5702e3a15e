//! Read-only constructors: no signing, not affected by the `AndWait` rule
//! except `get_transaction_result`, which the method table marks with its
//! own wait variant.

use super::build_request;
use crate::error::Error;
use crate::identity::Identity;
use crate::request::Request;
use crate::scalars::ScalarTag;
use crate::schema::{record, scalar, Field, Type};
use crate::value::{map, Value};

pub fn get_last_block(identity: &Identity) -> Result<Request, Error> {
    build_request(
        "icx_getLastBlock".to_string(),
        record(vec![]),
        map([]),
        identity,
        None,
    )
}

pub fn get_block_by_height(identity: &Identity, height: i128) -> Result<Request, Error> {
    build_request(
        "icx_getBlockByHeight".to_string(),
        record(vec![("height", Field::new(scalar(ScalarTag::Integer)).required())]),
        map([("height".to_string(), Value::Int(height))]),
        identity,
        None,
    )
}

pub fn get_block_by_hash(identity: &Identity, hash: &str) -> Result<Request, Error> {
    build_request(
        "icx_getBlockByHash".to_string(),
        record(vec![("hash", Field::new(scalar(ScalarTag::Hash)).required())]),
        map([("hash".to_string(), Value::Str(hash.to_string()))]),
        identity,
        None,
    )
}

/// `address` defaults to the identity's own address when omitted.
pub fn get_balance(identity: &Identity, address: Option<&str>) -> Result<Request, Error> {
    let address = match address.map(str::to_string).or_else(|| identity.address().map(str::to_string)) {
        Some(a) => a,
        None => return Err(Error::InvalidIdentity),
    };
    build_request(
        "icx_getBalance".to_string(),
        record(vec![("address", Field::new(scalar(ScalarTag::Address)).required())]),
        map([("address".to_string(), Value::Str(address))]),
        identity,
        None,
    )
}

pub fn get_score_api(identity: &Identity, address: &str) -> Result<Request, Error> {
    build_request(
        "icx_getScoreApi".to_string(),
        record(vec![("address", Field::new(scalar(ScalarTag::Score)).required())]),
        map([("address".to_string(), Value::Str(address.to_string()))]),
        identity,
        None,
    )
}

pub fn get_total_supply(identity: &Identity) -> Result<Request, Error> {
    build_request(
        "icx_getTotalSupply".to_string(),
        record(vec![]),
        map([]),
        identity,
        None,
    )
}

/// A non-null `timeout` selects `icx_waitTransactionResult` (§4.4 universal
/// rule).
pub fn get_transaction_result(
    identity: &Identity,
    tx_hash: &str,
    timeout: Option<u64>,
) -> Result<Request, Error> {
    let method = if timeout.is_some() {
        "icx_waitTransactionResult"
    } else {
        "icx_getTransactionResult"
    };
    build_request(
        method.to_string(),
        record(vec![("txHash", Field::new(scalar(ScalarTag::Hash)).required())]),
        map([("txHash".to_string(), Value::Str(tx_hash.to_string()))]),
        identity,
        timeout,
    )
}

pub fn get_transaction_by_hash(identity: &Identity, tx_hash: &str) -> Result<Request, Error> {
    build_request(
        "icx_getTransactionByHash".to_string(),
        record(vec![("txHash", Field::new(scalar(ScalarTag::Hash)).required())]),
        map([("txHash".to_string(), Value::Str(tx_hash.to_string()))]),
        identity,
        None,
    )
}

/// Read-only contract invocation. `params`/`schema` describe the SCORE
/// method's own argument shape, nested under `data.params` (§4.4 `call`).
pub fn call(
    identity: &Identity,
    to: &str,
    method: &str,
    params: Option<Value>,
    params_schema: Option<Type>,
) -> Result<Request, Error> {
    let data_params_ty = params_schema.unwrap_or_else(|| record(vec![]));
    let ty = record(vec![
        ("to", Field::new(scalar(ScalarTag::Score)).required()),
        (
            "dataType",
            Field::new(crate::schema::enum_of(&["call"]))
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
    ]);

    let mut data = map([("method".to_string(), Value::Str(method.to_string()))]);
    if let (Value::Map(m), Some(p)) = (&mut data, params) {
        m.insert("params".to_string(), p);
    }

    build_request(
        "icx_call".to_string(),
        ty,
        map([
            ("to".to_string(), Value::Str(to.to_string())),
            ("dataType".to_string(), Value::Str("call".to_string())),
            ("data".to_string(), data),
        ]),
        identity,
        None,
    )
}
