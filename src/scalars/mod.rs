//! Scalar codecs — the leaf `(load, dump)` pairs from SPEC_FULL.md §4.1.
//!
//! Each scalar is a unit type implementing [`Scalar`], converting between a
//! host-side [`Value`] and ICON's wire hex/string representation. Codecs
//! never produce a path — that's added by [`crate::schema`] once it knows
//! which field is being validated.

mod address;
mod binary;
mod boolean;
mod event_log;
mod integer;
mod signature;
mod string;
mod timestamp;

pub use address::{Address, Eoa, Score, ZERO_SCORE_ADDRESS};
pub use binary::BinaryData;
pub use boolean::Boolean;
pub use event_log::EventLog;
pub use integer::{Integer, Loop, NegInteger, NonNegInteger, NonPosInteger, PosInteger};
pub use signature::Signature;
pub use string::StringScalar;
pub use timestamp::Timestamp;

use crate::value::Value;

/// Marker error for a codec failure; the schema layer decorates this with a
/// dotted field path and the §6.4 `invalid_params` reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarError;

/// A bidirectional scalar codec between a host [`Value`] and ICON's wire form.
///
/// `load`/`dump` both operate on [`Value`] rather than a typed host value:
/// most scalars here (addresses, hex, booleans) are represented on the host
/// side as the same thing they look like written down (a `Str` or an
/// `Int`), so a single `Value` round-trips both directions without a
/// parallel set of native Rust types to shuttle through.
pub trait Scalar {
    /// Name used in schema error paths, e.g. `"Address"`.
    const NAME: &'static str;

    /// Parse a wire value into its host form.
    fn load(wire: &Value) -> Result<Value, ScalarError>;

    /// Render a host value into its wire form.
    fn dump(host: &Value) -> Result<Value, ScalarError>;
}

/// Every scalar tag recognized by the schema engine (§3, §9 design note:
/// "tagged union plus dispatch table" in place of runtime reflection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Address,
    Eoa,
    Score,
    Hash,
    Signature,
    BinaryData,
    Boolean,
    Integer,
    PosInteger,
    NegInteger,
    NonNegInteger,
    NonPosInteger,
    Loop,
    StringScalar,
    Timestamp,
    EventLog,
}

impl ScalarTag {
    pub fn load(self, wire: &Value) -> Result<Value, ScalarError> {
        match self {
            ScalarTag::Address => Address::load(wire),
            ScalarTag::Eoa => Eoa::load(wire),
            ScalarTag::Score => Score::load(wire),
            ScalarTag::Hash => address::Hash::load(wire),
            ScalarTag::Signature => Signature::load(wire),
            ScalarTag::BinaryData => BinaryData::load(wire),
            ScalarTag::Boolean => Boolean::load(wire),
            ScalarTag::Integer => Integer::load(wire),
            ScalarTag::PosInteger => PosInteger::load(wire),
            ScalarTag::NegInteger => NegInteger::load(wire),
            ScalarTag::NonNegInteger => NonNegInteger::load(wire),
            ScalarTag::NonPosInteger => NonPosInteger::load(wire),
            ScalarTag::Loop => Loop::load(wire),
            ScalarTag::StringScalar => StringScalar::load(wire),
            ScalarTag::Timestamp => Timestamp::load(wire),
            ScalarTag::EventLog => EventLog::load(wire),
        }
    }

    pub fn dump(self, host: &Value) -> Result<Value, ScalarError> {
        match self {
            ScalarTag::Address => Address::dump(host),
            ScalarTag::Eoa => Eoa::dump(host),
            ScalarTag::Score => Score::dump(host),
            ScalarTag::Hash => address::Hash::dump(host),
            ScalarTag::Signature => Signature::dump(host),
            ScalarTag::BinaryData => BinaryData::dump(host),
            ScalarTag::Boolean => Boolean::dump(host),
            ScalarTag::Integer => Integer::dump(host),
            ScalarTag::PosInteger => PosInteger::dump(host),
            ScalarTag::NegInteger => NegInteger::dump(host),
            ScalarTag::NonNegInteger => NonNegInteger::dump(host),
            ScalarTag::NonPosInteger => NonPosInteger::dump(host),
            ScalarTag::Loop => Loop::dump(host),
            ScalarTag::StringScalar => StringScalar::dump(host),
            ScalarTag::Timestamp => Timestamp::dump(host),
            ScalarTag::EventLog => EventLog::dump(host),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarTag::Address => Address::NAME,
            ScalarTag::Eoa => Eoa::NAME,
            ScalarTag::Score => Score::NAME,
            ScalarTag::Hash => address::Hash::NAME,
            ScalarTag::Signature => Signature::NAME,
            ScalarTag::BinaryData => BinaryData::NAME,
            ScalarTag::Boolean => Boolean::NAME,
            ScalarTag::Integer => Integer::NAME,
            ScalarTag::PosInteger => PosInteger::NAME,
            ScalarTag::NegInteger => NegInteger::NAME,
            ScalarTag::NonNegInteger => NonNegInteger::NAME,
            ScalarTag::NonPosInteger => NonPosInteger::NAME,
            ScalarTag::Loop => Loop::NAME,
            ScalarTag::StringScalar => StringScalar::NAME,
            ScalarTag::Timestamp => Timestamp::NAME,
            ScalarTag::EventLog => EventLog::NAME,
        }
    }
}
