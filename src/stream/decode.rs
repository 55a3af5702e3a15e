//! Inbound notification decoding (§4.5 `put`, §6.3's "Decoding contract for
//! block events").

use crate::error::Error;
use crate::scalars::{Integer, Scalar};
use crate::value::Value;
use std::collections::BTreeMap;

/// A decoded stream notification (Glossary: "Block tick").
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub height: i128,
    pub hash: String,
    /// `tx_index -> [log_index...]`, merged across filters and de-duplicated
    /// while preserving first-seen order.
    pub events: BTreeMap<i128, Vec<i128>>,
}

fn parse_int(v: &Value) -> Result<i128, Error> {
    Integer::load(v)
        .map_err(|_| Error::MalformedFrame("expected an integer".to_string()))
        .map(|loaded| loaded.as_int().expect("Integer::load always yields Value::Int"))
}

fn as_list<'a>(m: &'a BTreeMap<String, Value>, key: &str) -> Result<&'a [Value], Error> {
    m.get(key)
        .and_then(Value::as_list)
        .ok_or_else(|| Error::MalformedFrame(format!("missing or non-list field {key}")))
}

/// Decode a single-filter (event stream) notification: `{height, hash,
/// index, events: [non_neg_integer...]}`.
pub fn decode_event_form(raw: &Value) -> Result<Tick, Error> {
    let m = raw
        .as_map()
        .ok_or_else(|| Error::MalformedFrame("expected an object".to_string()))?;

    let height = parse_int(m.get("height").ok_or_else(|| Error::MalformedFrame("missing height".to_string()))?)?;
    let hash = m.get("hash").and_then(Value::as_str).unwrap_or("").to_string();
    let index = parse_int(m.get("index").ok_or_else(|| Error::MalformedFrame("missing index".to_string()))?)?;

    let mut logs = Vec::new();
    for v in as_list(m, "events")? {
        let log = parse_int(v)?;
        if !logs.contains(&log) {
            logs.push(log);
        }
    }

    let mut events = BTreeMap::new();
    events.insert(index, logs);
    Ok(Tick { height, hash, events })
}

/// Decode a multi-filter (block stream) notification: `{height, hash,
/// indexes: [[tx_idx...]...], events: [[[log_idx...]...]...]}`, merging
/// `indexes[i][j] -> events[i][j]` across `i` into one `tx -> [log...]` map.
pub fn decode_block_form(raw: &Value) -> Result<Tick, Error> {
    let m = raw
        .as_map()
        .ok_or_else(|| Error::MalformedFrame("expected an object".to_string()))?;

    let height = parse_int(m.get("height").ok_or_else(|| Error::MalformedFrame("missing height".to_string()))?)?;
    let hash = m.get("hash").and_then(Value::as_str).unwrap_or("").to_string();

    let indexes = as_list(m, "indexes")?;
    let events = as_list(m, "events")?;
    if indexes.len() != events.len() {
        return Err(Error::MalformedFrame("indexes/events filter count mismatch".to_string()));
    }

    let mut merged: BTreeMap<i128, Vec<i128>> = BTreeMap::new();
    for (filter_txs, filter_logs) in indexes.iter().zip(events.iter()) {
        let filter_txs = filter_txs
            .as_list()
            .ok_or_else(|| Error::MalformedFrame("indexes entry must be a list".to_string()))?;
        let filter_logs = filter_logs
            .as_list()
            .ok_or_else(|| Error::MalformedFrame("events entry must be a list".to_string()))?;
        if filter_txs.len() != filter_logs.len() {
            return Err(Error::MalformedFrame("tx/log index count mismatch within a filter".to_string()));
        }

        for (tx_raw, logs_raw) in filter_txs.iter().zip(filter_logs.iter()) {
            let tx = parse_int(tx_raw)?;
            let logs_raw = logs_raw
                .as_list()
                .ok_or_else(|| Error::MalformedFrame("log indexes entry must be a list".to_string()))?;
            let entry = merged.entry(tx).or_default();
            for log_raw in logs_raw {
                let log = parse_int(log_raw)?;
                if !entry.contains(&log) {
                    entry.push(log);
                }
            }
        }
    }

    Ok(Tick { height, hash, events: merged })
}
