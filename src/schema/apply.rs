//! The `retrieve`/`transform` passes and the public `apply` entry point
//! (§4.2).

use crate::error::Error;
use crate::schema::state::{join, Direction, SchemaState};
use crate::schema::types::{Default as FieldDefault, Field, Type};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Run a schema's load or dump pass against `params`, returning the
/// resulting data map or a flattened `invalid_params` error (§4.2 `apply`).
pub fn apply(schema: Arc<Type>, params: Value, direction: Direction) -> Result<Value, Error> {
    let mut state = SchemaState::new(schema.clone(), params.clone(), direction);
    let result = transform_type(&mut state, "", &schema, Some(&params));

    if !state.errors.is_empty() {
        let message = state
            .errors
            .iter()
            .map(|(path, msg)| format!("{path} {msg}"))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::invalid_params(message));
    }

    Ok(result.unwrap_or(Value::Map(BTreeMap::new())))
}

/// `retrieve`: fetch `params[field]`, apply defaults/required/empty rules,
/// returning the raw (untransformed) value to later feed to `transform`.
fn retrieve_record(
    state: &mut SchemaState,
    path: &str,
    fields: &[(String, Field)],
    input: Option<&BTreeMap<String, Value>>,
) -> BTreeMap<String, Value> {
    let mut raw = BTreeMap::new();

    for (name, field) in fields {
        let field_path = join(path, name);
        let found = input.and_then(|m| m.get(name)).cloned();
        let is_empty = found.as_ref().map_or(true, Value::is_empty_value);

        if is_empty {
            if let Some(default) = &field.default {
                raw.insert(name.clone(), resolve_default(default, state));
            } else if field.nullable {
                raw.insert(name.clone(), Value::Null);
            } else if field.required {
                state.push_error(&field_path, "is required");
            }
            // Non-required, non-nullable, no default, empty: silently
            // dropped (§3).
        } else {
            raw.insert(name.clone(), found.expect("checked non-empty above"));
        }
    }

    raw
}

fn resolve_default(default: &FieldDefault, state: &SchemaState) -> Value {
    default.resolve(state)
}

/// `transform`: dispatch on `ty`, producing the loaded/dumped form of
/// `raw`. Returns `None` (after recording an error) on failure so callers
/// can skip including the field in their output map.
fn transform_type(
    state: &mut SchemaState,
    path: &str,
    ty: &Type,
    raw: Option<&Value>,
) -> Option<Value> {
    match ty {
        Type::Scalar(tag) => {
            let raw = raw?;
            let direction = state.direction;
            let outcome = match direction {
                crate::schema::state::Direction::Load => tag.load(raw),
                crate::schema::state::Direction::Dump => tag.dump(raw),
            };
            match outcome {
                Ok(v) => Some(v),
                Err(_) => {
                    state.push_error(path, "is invalid");
                    None
                }
            }
        }
        Type::Enum(values) => {
            let raw = raw?;
            let tag = match raw {
                Value::Str(s) => Some(s.clone()),
                _ => None,
            };
            match tag {
                Some(t) if values.contains(&t) => Some(Value::Str(t)),
                _ => {
                    state.push_error(path, "is invalid");
                    None
                }
            }
        }
        Type::List(inner) => {
            let raw = raw?;
            let Some(items) = raw.as_list() else {
                state.push_error(path, "is invalid");
                return None;
            };
            let mut out = Vec::with_capacity(items.len());
            let mut failed = false;
            for (i, item) in items.iter().enumerate() {
                // Use a scratch state so an element failure doesn't leak a
                // partial per-index error: "if any fails the whole list is
                // invalid" (§4.2).
                let mut scratch = SchemaState::new(state.schema.clone(), state.params.clone(), state.direction);
                match transform_type(&mut scratch, &format!("{path}.{i}"), inner, Some(item)) {
                    Some(v) if scratch.valid() => out.push(v),
                    _ => {
                        failed = true;
                        break;
                    }
                }
            }
            if failed {
                state.push_error(path, "is invalid");
                None
            } else {
                Some(Value::List(out))
            }
        }
        Type::Record(fields) => {
            let input_map = raw.and_then(Value::as_map);
            if raw.is_some() && input_map.is_none() {
                state.push_error(path, "is invalid");
                return None;
            }
            Some(transform_record(state, path, fields, input_map))
        }
        Type::Any(..) => {
            // `{any,...}` is dispatched through `transform_any` from the
            // enclosing record, which has access to the already-transformed
            // discriminant sibling; `validate_shape` rejects any schema
            // where `Any` would reach this arm instead, so this is
            // unreachable through a compiled `Schema`.
            state.push_error(path, "is invalid");
            None
        }
    }
}

/// Process a record's fields: `retrieve` raw values for all fields, then
/// `transform` them in an order where `{any,...}` fields are resolved after
/// their discriminant sibling (§9 design note on discriminated unions).
fn transform_record(
    state: &mut SchemaState,
    path: &str,
    fields: &[(String, Field)],
    input: Option<&BTreeMap<String, Value>>,
) -> Value {
    let raw = retrieve_record(state, path, fields, input);

    // Stable partition: non-`Any` fields first, so a discriminant field is
    // always transformed before any field that depends on it.
    let mut ordered: Vec<&(String, Field)> = fields.iter().filter(|(_, f)| !matches!(f.ty, Type::Any(..))).collect();
    ordered.extend(fields.iter().filter(|(_, f)| matches!(f.ty, Type::Any(..))));

    let mut data = BTreeMap::new();
    for (name, field) in ordered {
        let field_path = join(path, name);
        let raw_value = raw.get(name);

        let value = if field.nullable && matches!(raw_value, Some(Value::Null)) {
            // A nullable field's explicit/defaulted null passes straight
            // through; it never reaches scalar/record/list/any dispatch.
            Some(Value::Null)
        } else {
            match &field.ty {
                Type::Any(choices, discriminant) => {
                    transform_any(state, &field_path, choices, discriminant, &data, raw_value)
                }
                other => transform_type(state, &field_path, other, raw_value),
            }
        };

        if let Some(v) = value {
            data.insert(name.clone(), v);
        }
    }

    Value::Map(data)
}

fn transform_any(
    state: &mut SchemaState,
    path: &str,
    choices: &[(String, Type)],
    discriminant: &str,
    already_transformed: &BTreeMap<String, Value>,
    raw: Option<&Value>,
) -> Option<Value> {
    let Some(raw) = raw else { return None };

    let tag = already_transformed
        .get(discriminant)
        .and_then(Value::as_str)
        .map(str::to_string);

    let Some(tag) = tag else {
        state.push_error(path, "discriminant is missing");
        return None;
    };

    match choices.iter().find(|(name, _)| *name == tag) {
        Some((_, inner)) => transform_type(state, path, inner, Some(raw)),
        None => {
            state.push_error(path, "discriminant is invalid or missing");
            None
        }
    }
}

/// Project a loaded map onto a named record template, recursively for
/// nested and list fields (§4.2's `into` option). `template` names the
/// fields to keep, in the order they should appear; missing fields are
/// simply omitted from the result.
pub fn project_into(data: &Value, template: &[&str]) -> Value {
    let Some(map) = data.as_map() else {
        return data.clone();
    };
    let mut out = BTreeMap::new();
    for field in template {
        if let Some(v) = map.get(*field) {
            out.insert(field.to_string(), v.clone());
        }
    }
    Value::Map(out)
}
