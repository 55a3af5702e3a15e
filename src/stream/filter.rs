//! Event filter encoding (§6.3): dispatches `indexed`/`data` values through
//! the scalar named by the matching position in the event signature's
//! parenthesized type list.

use crate::error::Error;
use crate::scalars::{Address, Boolean, BinaryData, Integer, Scalar, StringScalar};
use crate::value::{map, Value};

/// One subscription filter. `indexed`/`data` entries are `None` for
/// "match any" (§6.3: "a `null` entry... passes through unchanged").
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub event: String,
    pub addr: Option<String>,
    pub indexed: Vec<Option<Value>>,
    pub data: Vec<Option<Value>>,
}

impl Filter {
    pub fn new(event: impl Into<String>) -> Self {
        Filter {
            event: event.into(),
            addr: None,
            indexed: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn with_indexed(mut self, indexed: Vec<Option<Value>>) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn with_data(mut self, data: Vec<Option<Value>>) -> Self {
        self.data = data;
        self
    }
}

/// Parse the comma-separated type list out of `"Transfer(Address,int,bytes)"`.
fn parameter_types(event: &str) -> Result<Vec<String>, Error> {
    let open = event.find('(').ok_or(Error::FilterMissingEvent)?;
    let close = event.rfind(')').ok_or(Error::FilterMissingEvent)?;
    if close < open {
        return Err(Error::FilterMissingEvent);
    }
    let inner = &event[open + 1..close];
    if inner.is_empty() {
        return Ok(Vec::new());
    }
    Ok(inner.split(',').map(|s| s.trim().to_string()).collect())
}

fn dump_by_type(type_name: &str, value: &Value) -> Result<Value, Error> {
    let dumped = match type_name {
        "int" => Integer::dump(value),
        "str" => StringScalar::dump(value),
        "bytes" => BinaryData::dump(value),
        "bool" => Boolean::dump(value),
        "Address" => Address::dump(value),
        other => return Err(Error::InvalidSchema(format!("unknown event parameter type {other}"))),
    };
    dumped.map_err(|_| Error::invalid_params(format!("event parameter of type {type_name} is invalid")))
}

/// Encode a [`Filter`] to its wire form (§6.3), validating it has a
/// non-empty `event` signature (§4.5: "rejecting filters lacking event").
pub fn encode_filter(filter: &Filter) -> Result<Value, Error> {
    if filter.event.is_empty() {
        return Err(Error::FilterMissingEvent);
    }
    let types = parameter_types(&filter.event)?;

    let dump_list = |values: &[Option<Value>]| -> Result<Value, Error> {
        let mut out = Vec::with_capacity(values.len());
        for (i, entry) in values.iter().enumerate() {
            match entry {
                None => out.push(Value::Null),
                Some(v) => {
                    let ty = types.get(i).ok_or_else(|| {
                        Error::InvalidSchema(format!("filter has more values than event parameters: {}", filter.event))
                    })?;
                    out.push(dump_by_type(ty, v)?);
                }
            }
        }
        Ok(Value::List(out))
    };

    let mut fields = vec![("event".to_string(), Value::Str(filter.event.clone()))];
    if let Some(addr) = &filter.addr {
        fields.push(("addr".to_string(), Value::Str(addr.clone())));
    }
    fields.push(("indexed".to_string(), dump_list(&filter.indexed)?));
    fields.push(("data".to_string(), dump_list(&filter.data)?));

    Ok(map(fields))
}
