use super::{Scalar, ScalarError};
use crate::value::{map, Value};

/// `{score_address, header, indexed[], data[]}` on the host side, folding
/// down to `{scoreAddress, indexed: [header, ...indexed], data}` on the
/// wire — the event header is indexed[0] inline with the rest of the
/// indexed topics.
pub struct EventLog;

impl Scalar for EventLog {
    const NAME: &'static str = "EventLog";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let m = wire.as_map().ok_or(ScalarError)?;
        let score_address = m.get("scoreAddress").cloned().ok_or(ScalarError)?;
        let indexed = m.get("indexed").and_then(Value::as_list).ok_or(ScalarError)?;
        let (header, rest) = indexed.split_first().ok_or(ScalarError)?;
        let data = m.get("data").cloned().unwrap_or(Value::List(vec![]));

        Ok(map([
            ("score_address".to_string(), score_address),
            ("header".to_string(), header.clone()),
            ("indexed".to_string(), Value::List(rest.to_vec())),
            ("data".to_string(), data),
        ]))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        let m = host.as_map().ok_or(ScalarError)?;
        let score_address = m.get("score_address").cloned().ok_or(ScalarError)?;
        let header = m.get("header").cloned().ok_or(ScalarError)?;
        let indexed = m.get("indexed").and_then(Value::as_list).ok_or(ScalarError)?;
        let data = m.get("data").cloned().unwrap_or(Value::List(vec![]));

        let mut wire_indexed = Vec::with_capacity(indexed.len() + 1);
        wire_indexed.push(header);
        wire_indexed.extend_from_slice(indexed);

        Ok(map([
            ("scoreAddress".to_string(), score_address),
            ("indexed".to_string(), Value::List(wire_indexed)),
            ("data".to_string(), data),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_splits_header_from_indexed() {
        let wire = map([
            ("scoreAddress".to_string(), Value::Str("cxabc".into())),
            (
                "indexed".to_string(),
                Value::List(vec![
                    Value::Str("Transfer(Address,Address,int)".into()),
                    Value::Str("hx1".into()),
                    Value::Str("hx2".into()),
                ]),
            ),
            ("data".to_string(), Value::List(vec![Value::Str("0x1".into())])),
        ]);
        let host = EventLog::load(&wire).unwrap();
        let m = host.as_map().unwrap();
        assert_eq!(
            m.get("header").unwrap(),
            &Value::Str("Transfer(Address,Address,int)".into())
        );
        assert_eq!(
            m.get("indexed").unwrap().as_list().unwrap().len(),
            2
        );
    }

    #[test]
    fn dump_inverts_load() {
        let wire = map([
            ("scoreAddress".to_string(), Value::Str("cxabc".into())),
            (
                "indexed".to_string(),
                Value::List(vec![
                    Value::Str("Transfer(Address,Address,int)".into()),
                    Value::Str("hx1".into()),
                ]),
            ),
            ("data".to_string(), Value::List(vec![])),
        ]);
        let host = EventLog::load(&wire).unwrap();
        let back = EventLog::dump(&host).unwrap();
        assert_eq!(back, wire);
    }
}
