//! The schema engine (SPEC_FULL.md §4.2): compiles a type tree once,
//! caches it process-wide by content hash, and applies load/dump passes
//! against a params map, producing structured errors with dotted paths.

pub mod apply;
pub mod compile;
pub mod state;
pub mod types;

pub use apply::{apply, project_into};
pub use compile::generate;
pub use state::{Direction, SchemaState};
pub use types::{any, enum_of, list, record, scalar, Field, Type};

use crate::error::Error;
use crate::value::Value;
use std::sync::Arc;

/// A compiled schema, ready to load caller input or dump host data to wire
/// form. Cheaply cloneable (an `Arc` underneath).
#[derive(Clone)]
pub struct Schema(Arc<Type>);

impl Schema {
    /// Compile `ty`, consulting the process-wide cache.
    pub fn compile(ty: Type) -> Result<Self, Error> {
        Ok(Schema(generate(ty)?))
    }

    pub fn load(&self, params: Value) -> Result<Value, Error> {
        apply(self.0.clone(), params, Direction::Load)
    }

    pub fn dump(&self, data: Value) -> Result<Value, Error> {
        apply(self.0.clone(), data, Direction::Dump)
    }

    pub fn inner(&self) -> &Arc<Type> {
        &self.0
    }
}
