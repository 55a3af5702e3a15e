//! The compiled type tree (§9 design note: "tagged variant plus dispatch
//! table" in place of runtime reflection over module identity).

use crate::scalars::ScalarTag;
use crate::schema::state::SchemaState;
use crate::value::Value;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A field's declared type.
#[derive(Clone)]
pub enum Type {
    Scalar(ScalarTag),
    Enum(Vec<String>),
    List(Box<Type>),
    /// Discriminated union: `(tag, Type)` choices plus the name of the
    /// sibling field whose loaded value selects among them.
    Any(Vec<(String, Type)>, String),
    /// A nested record, field name -> [`Field`], insertion order preserved
    /// (it matters for deterministic error ordering and for `into`
    /// projection).
    Record(Vec<(String, Field)>),
}

/// Per-field validation/default options (§3: `{required, default, nullable}`).
#[derive(Clone)]
pub struct Field {
    pub ty: Type,
    pub required: bool,
    pub default: Option<Default>,
    pub nullable: bool,
}

impl Field {
    pub fn new(ty: Type) -> Self {
        Field {
            ty,
            required: false,
            default: None,
            nullable: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, v: Value) -> Self {
        self.default = Some(Default::Literal(v));
        self
    }

    pub fn default_thunk(mut self, f: impl Fn(&SchemaState) -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(Default::Thunk(Arc::new(f)));
        self
    }
}

/// A field's default value: either a literal, or a thunk evaluated against
/// the current [`SchemaState`] (§9 design note: "default values as
/// late-bound thunks"), e.g. `timestamp = now`, `nonce = random`.
#[derive(Clone)]
pub enum Default {
    Literal(Value),
    Thunk(Arc<dyn Fn(&SchemaState) -> Value + Send + Sync>),
}

impl Default {
    pub fn resolve(&self, state: &SchemaState) -> Value {
        match self {
            Default::Literal(v) => v.clone(),
            Default::Thunk(f) => f(state),
        }
    }
}

/// Helper constructors for authoring schemas in Rust, used throughout
/// [`crate::goloop`].
pub fn scalar(tag: ScalarTag) -> Type {
    Type::Scalar(tag)
}

pub fn list(ty: Type) -> Type {
    Type::List(Box::new(ty))
}

pub fn record(fields: Vec<(&str, Field)>) -> Type {
    Type::Record(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

pub fn any(choices: Vec<(&str, Type)>, discriminant: &str) -> Type {
    Type::Any(
        choices.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        discriminant.to_string(),
    )
}

pub fn enum_of(tags: &[&str]) -> Type {
    Type::Enum(tags.iter().map(|s| s.to_string()).collect())
}

/// Structural content hash used by the process-wide compile cache
/// (SPEC_FULL.md §4.2, grounded on `HashCache::get_or_insert` in the
/// teacher's `subxt/src/metadata/hash_cache.rs`). Closures inside
/// [`Default::Thunk`] are not hashable, so thunks contribute only a tag —
/// two schemas differing only in *which* thunk a default uses (but not
/// whether one is present) are treated as structurally equal, which is
/// intentional: the compiled shape a thunked default implies is the same.
pub fn content_hash(ty: &Type) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    hash_type(ty, &mut hasher);
    hasher.finish()
}

fn hash_type(ty: &Type, h: &mut impl Hasher) {
    match ty {
        Type::Scalar(tag) => {
            0u8.hash(h);
            tag.hash(h);
        }
        Type::Enum(tags) => {
            1u8.hash(h);
            tags.hash(h);
        }
        Type::List(inner) => {
            2u8.hash(h);
            hash_type(inner, h);
        }
        Type::Any(choices, discriminant) => {
            3u8.hash(h);
            discriminant.hash(h);
            for (tag, inner) in choices {
                tag.hash(h);
                hash_type(inner, h);
            }
        }
        Type::Record(fields) => {
            4u8.hash(h);
            for (name, field) in fields {
                name.hash(h);
                hash_field(field, h);
            }
        }
    }
}

fn hash_field(field: &Field, h: &mut impl Hasher) {
    hash_type(&field.ty, h);
    field.required.hash(h);
    field.nullable.hash(h);
    match &field.default {
        None => 0u8.hash(h),
        Some(Default::Literal(v)) => {
            1u8.hash(h);
            stable_repr(v).hash(h);
        }
        Some(Default::Thunk(_)) => 2u8.hash(h),
    }
}

fn stable_repr(v: &Value) -> String {
    let mut s = String::new();
    write!(s, "{v}").expect("writing to a String cannot fail");
    s
}
