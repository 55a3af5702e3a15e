//! The process-wide schema cache (§9 design note: "process-wide schema
//! cache"), grounded on the teacher's `HashCache::get_or_insert`
//! (`subxt/src/metadata/hash_cache.rs`) — a `RwLock<HashMap<...>>` with a
//! read-then-write-on-miss shape. The teacher uses `parking_lot::RwLock`;
//! that crate isn't a core workspace dependency here, so `std::sync::RwLock`
//! is used instead (same shape, no extra dependency).

use crate::error::Error;
use crate::schema::types::{content_hash, Type};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

fn cache() -> &'static RwLock<HashMap<u64, Arc<Type>>> {
    static CACHE: OnceLock<RwLock<HashMap<u64, Arc<Type>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Compile a schema tree, validating its shape and caching the compiled form
/// keyed by structural content hash. Calling `generate` twice on
/// structurally equal trees returns the *same* `Arc` without recompiling
/// (§8: `generate(generate(S)) == generate(S)`).
pub fn generate(ty: Type) -> Result<Arc<Type>, Error> {
    let hash = content_hash(&ty);

    if let Some(hit) = cache().read().expect("schema cache lock poisoned").get(&hash) {
        return Ok(Arc::clone(hit));
    }

    validate_shape(&ty, Context::Root)?;

    let arc = Arc::new(ty);
    cache()
        .write()
        .expect("schema cache lock poisoned")
        .entry(hash)
        .or_insert_with(|| Arc::clone(&arc));
    Ok(arc)
}

/// Where a `Type` node sits in its enclosing tree, relevant only to whether
/// `{any,...}` is reachable there.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    /// The schema root, as passed to `Schema::compile`/`generate`.
    Root,
    /// A direct field of a `Record` — the only place `transform_record`
    /// dispatches through `transform_any`, which can read the discriminant
    /// sibling it needs.
    RecordField,
    /// Anywhere else: beneath `{list,...}`, or nested inside another
    /// `{any,...}`'s own choices.
    Nested,
}

/// Enforce that `{any,...}` only ever appears as a direct record field
/// (§4.2) — the one place it has a sibling to discriminate on. A bare root
/// `{any,...}` or one nested beneath `{list,...}` or another `{any,...}` is a
/// programmer error, not a validation failure, and so is the one case in
/// this module that surfaces as an `Err` rather than an accumulated
/// schema-state error — callers that author schemas statically should
/// `.expect()` it away at startup.
fn validate_shape(ty: &Type, context: Context) -> Result<(), Error> {
    match ty {
        Type::Scalar(_) | Type::Enum(_) => Ok(()),
        Type::List(inner) => validate_shape(inner, Context::Nested),
        Type::Any(choices, _) => {
            if context != Context::RecordField {
                return Err(Error::InvalidSchema(
                    "{any,...} may only appear as a record field".to_string(),
                ));
            }
            for (_, choice_ty) in choices {
                validate_shape(choice_ty, Context::Nested)?;
            }
            Ok(())
        }
        Type::Record(fields) => {
            for (_, field) in fields {
                validate_shape(&field.ty, Context::RecordField)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{list, record, scalar, Field};
    use crate::scalars::ScalarTag;

    #[test]
    fn repeated_generate_is_idempotent() {
        let make = || record(vec![("height", Field::new(scalar(ScalarTag::Integer)))]);
        let a = generate(make()).unwrap();
        let b = generate(make()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn rejects_any_under_list() {
        use crate::schema::types::any;
        let bad = list(any(vec![("a", scalar(ScalarTag::Integer))], "kind"));
        assert!(generate(bad).is_err());
    }

    #[test]
    fn rejects_any_as_schema_root() {
        use crate::schema::types::any;
        let bad = any(vec![("a", scalar(ScalarTag::Integer))], "kind");
        assert!(matches!(generate(bad), Err(Error::InvalidSchema(_))));
    }
}
