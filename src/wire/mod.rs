//! JSON instance checking against the resolved IR.
//!
//! Validates `serde_json` values as instances of IR types and resolves the
//! `.tag` discriminator chain of enumerated-subtype trees to a leaf struct.
//! Strict checking rejects unknown keys; non-strict checking routes unknown
//! union tags to the catch-all variant and unknown subtype tags to a
//! catch-all-capable base.

use serde_json::Value;

use crate::ir::{Api, Composite, CompositeId, DataType};

// ─── Errors ──────────────────────────────────────────────────────────

/// A single instance-validation failure with the dotted field path leading
/// to it, e.g. `f.i: expected integer, got null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireError {
    parents: Vec<String>,
    msg: String,
}

impl WireError {
    fn new(msg: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            msg: msg.into(),
        }
    }

    fn nest(mut self, parent: &str) -> Self {
        self.parents.insert(0, parent.to_string());
        self
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.parents.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.parents.join("."), self.msg)
        }
    }
}

impl std::error::Error for WireError {}

/// JSON kind name used in mismatch messages.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(kind: &str, value: &Value) -> WireError {
    WireError::new(format!("expected {}, got {}", kind, json_kind(value)))
}

// ─── Values ──────────────────────────────────────────────────────────

/// Check `value` as an instance of `data_type`.
pub fn check_value(
    api: &Api,
    data_type: &DataType,
    value: &Value,
    strict: bool,
) -> Result<(), WireError> {
    match data_type {
        DataType::Nullable(inner) => match value {
            Value::Null => Ok(()),
            other => check_value(api, inner, other, strict),
        },
        DataType::Void => match value {
            Value::Null => Ok(()),
            other => Err(expected("null", other)),
        },
        DataType::Boolean => match value {
            Value::Bool(_) => Ok(()),
            other => Err(expected("boolean", other)),
        },
        DataType::Int32(a) => check_integer(value, a.min_value, a.max_value, i32::MIN as i128, i32::MAX as i128),
        DataType::Int64(a) => check_integer(value, a.min_value, a.max_value, i64::MIN as i128, i64::MAX as i128),
        DataType::UInt32(a) => check_integer(value, a.min_value, a.max_value, 0, u32::MAX as i128),
        DataType::UInt64(a) => check_integer(value, a.min_value, a.max_value, 0, u64::MAX as i128),
        DataType::Float32(a) | DataType::Float64(a) => {
            let v = match value {
                Value::Number(n) => n
                    .as_f64()
                    .ok_or_else(|| expected("float", value))?,
                other => return Err(expected("float", other)),
            };
            if a.min_value.is_some_and(|min| v < min) || a.max_value.is_some_and(|max| v > max) {
                return Err(WireError::new(format!("{} is out of range", v)));
            }
            Ok(())
        }
        DataType::String(a) => match value {
            Value::String(s) => {
                let len = s.chars().count() as u64;
                if a.min_length.is_some_and(|min| len < min)
                    || a.max_length.is_some_and(|max| len > max)
                {
                    return Err(WireError::new(format!("'{}' has invalid length", s)));
                }
                Ok(())
            }
            other => Err(expected("string", other)),
        },
        DataType::Binary | DataType::Timestamp(_) => match value {
            Value::String(_) => Ok(()),
            other => Err(expected("string", other)),
        },
        DataType::Any => Ok(()),
        DataType::Symbol => match value {
            Value::Null => Ok(()),
            other => Err(expected("null", other)),
        },
        DataType::List(list) => match value {
            Value::Array(items) => {
                let count = items.len() as u64;
                if list.min_items.is_some_and(|min| count < min)
                    || list.max_items.is_some_and(|max| count > max)
                {
                    return Err(WireError::new(format!(
                        "list of {} items has invalid length",
                        count
                    )));
                }
                for item in items {
                    check_value(api, &list.item, item, strict)?;
                }
                Ok(())
            }
            other => Err(expected("array", other)),
        },
        DataType::Struct(id) => check_struct(api, *id, value, strict),
        DataType::Union(id) => check_union(api, *id, value, strict).map(|_| ()),
    }
}

fn check_integer(
    value: &Value,
    min: Option<i128>,
    max: Option<i128>,
    lo: i128,
    hi: i128,
) -> Result<(), WireError> {
    let n = match value {
        Value::Number(n) if !n.is_f64() => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| expected("integer", value))?,
        other => return Err(expected("integer", other)),
    };
    let lo = min.map_or(lo, |m| m.max(lo));
    let hi = max.map_or(hi, |m| m.min(hi));
    if !(lo..=hi).contains(&n) {
        return Err(WireError::new(format!("{} is out of range", n)));
    }
    Ok(())
}

// ─── Structs ─────────────────────────────────────────────────────────

/// Check `value` as an instance of the struct `id`: every required field
/// present, values valid, and (in strict mode) no unknown keys.
/// Discriminator keys (`.tag`…) are ignored so a struct-tree object checks
/// against its resolved leaf directly.
pub fn check_struct(
    api: &Api,
    id: CompositeId,
    value: &Value,
    strict: bool,
) -> Result<(), WireError> {
    let Value::Object(obj) = value else {
        return Err(expected("object", value));
    };
    let s = api
        .composite(id)
        .as_struct()
        .expect("struct handle resolves to a struct");

    for field in &s.all_fields {
        match obj.get(&field.name) {
            Some(v) => {
                check_value(api, &field.data_type, v, strict).map_err(|e| e.nest(&field.name))?
            }
            None if field.is_optional() || field.has_default() => {}
            None => {
                return Err(WireError::new(format!(
                    "missing required field '{}'",
                    field.name
                )));
            }
        }
    }

    if strict {
        for key in obj.keys() {
            if key.starts_with(".tag") {
                continue;
            }
            if !s.all_fields.iter().any(|f| &f.name == key) {
                return Err(WireError::new(format!("unknown field '{}'", key)));
            }
        }
    }
    Ok(())
}

/// Resolve the `.tag` discriminator chain of an enumerated-subtype tree
/// containing `base`, returning the leaf struct the object instantiates.
///
/// Discriminator keys are always rooted at the top of the tree, matching
/// the encoder: the first key is `.tag`, and while the selected subtype
/// itself enumerates subtypes the next key is `.tag.{path}` with the tags
/// seen so far joined by dots. A chain that stops at a non-leaf is an
/// unknown subtype, unless the tree is catch-all-capable and checking is
/// non-strict, in which case the object decodes as the base.
pub fn resolve_struct_tree(
    api: &Api,
    base: CompositeId,
    value: &Value,
    strict: bool,
) -> Result<CompositeId, WireError> {
    let Value::Object(obj) = value else {
        return Err(expected("object", value));
    };
    let base_struct = api
        .composite(base)
        .as_struct()
        .expect("struct handle resolves to a struct");
    if base_struct.subtypes.is_none() {
        return Ok(base);
    }

    // The discriminator chain starts at the top of the tree even when the
    // caller's base sits further down.
    let mut root = base;
    while let Some(parent) = api.composite(root).parent() {
        let enumerates = api
            .composite(parent)
            .as_struct()
            .is_some_and(|s| s.subtypes.is_some());
        if !enumerates {
            break;
        }
        root = parent;
    }
    let catch_all = api
        .composite(root)
        .as_struct()
        .and_then(|s| s.subtypes.as_ref())
        .is_some_and(|s| s.catch_all);

    let mut current = root;
    let mut tag_path: Vec<String> = Vec::new();
    let leaf = loop {
        let composite = api.composite(current);
        let Composite::Struct(s) = composite else {
            unreachable!("subtype tags always resolve to structs");
        };
        let Some(subtypes) = &s.subtypes else {
            break current;
        };

        let key = if tag_path.is_empty() {
            ".tag".to_string()
        } else {
            format!(".tag.{}", tag_path.join("."))
        };
        let tag = match obj.get(&key) {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => return Err(expected("string", other)),
            None if tag_path.is_empty() => {
                return Err(WireError::new("missing '.tag' key"));
            }
            None => {
                // Selected a subtype that still requires dispatch.
                return Err(WireError::new(format!(
                    "unknown subtype '{}'",
                    tag_path.join(".")
                )));
            }
        };

        match subtypes.tags.iter().find(|(t, _)| t == &tag) {
            Some((_, child)) => {
                tag_path.push(tag);
                current = *child;
            }
            None if catch_all && !strict => break root,
            None => {
                tag_path.push(tag);
                return Err(WireError::new(format!(
                    "unknown subtype '{}'",
                    tag_path.join(".")
                )));
            }
        }
    };

    // The resolved leaf must actually sit under the caller's base.
    if !api.ancestry(leaf).contains(&base) {
        return Err(WireError::new(format!(
            "'{}' is not a subtype of '{}'",
            api.composite(leaf).name(),
            api.composite(base).name()
        )));
    }
    Ok(leaf)
}

/// Resolve the leaf and check the object against it in one step.
pub fn decode_struct_tree(
    api: &Api,
    root: CompositeId,
    value: &Value,
    strict: bool,
) -> Result<CompositeId, WireError> {
    let leaf = resolve_struct_tree(api, root, value, strict)?;
    check_struct(api, leaf, value, strict)?;
    Ok(leaf)
}

// ─── Unions ──────────────────────────────────────────────────────────

/// Check `value` as an instance of the union `id` and return the matched
/// tag. Accepts the compact string form `"tag"` and the object form
/// `{".tag": tag, …}` with struct payload fields flattened alongside the
/// discriminator.
pub fn check_union(
    api: &Api,
    id: CompositeId,
    value: &Value,
    strict: bool,
) -> Result<String, WireError> {
    let u = api
        .composite(id)
        .as_union()
        .expect("union handle resolves to a union");

    let find = |tag: &str| u.all_fields.iter().find(|f| f.name == tag);
    let fall_back = |tag: &str| -> Result<String, WireError> {
        match &u.catch_all {
            Some(catch_all) if !strict => Ok(catch_all.clone()),
            _ => Err(WireError::new(format!("unknown tag '{}'", tag))),
        }
    };

    match value {
        // Compact form: a void or nullable variant with no payload.
        Value::String(tag) => match find(tag) {
            Some(field)
                if field.data_type == DataType::Symbol || field.is_optional() =>
            {
                Ok(tag.clone())
            }
            Some(_) => Err(WireError::new(format!("tag '{}' requires a value", tag))),
            None => fall_back(tag),
        },
        Value::Object(obj) => {
            let tag = match obj.get(".tag") {
                Some(Value::String(tag)) => tag.clone(),
                Some(other) => {
                    return Err(WireError::new(format!(
                        "tag must be string, got {}",
                        json_kind(other)
                    )));
                }
                None => return Err(WireError::new("missing '.tag' key")),
            };
            let Some(field) = find(&tag) else {
                return fall_back(&tag);
            };

            let payload_is_struct = matches!(
                strip_nullable(&field.data_type),
                DataType::Struct(_)
            );
            if payload_is_struct {
                // Struct payload fields sit flattened beside the tag.
                let DataType::Struct(struct_id) = strip_nullable(&field.data_type) else {
                    unreachable!();
                };
                let has_payload_keys = obj.keys().any(|k| k != ".tag");
                if !has_payload_keys && field.is_optional() {
                    return Ok(tag);
                }
                check_struct(api, *struct_id, value, strict).map_err(|e| e.nest(&tag))?;
                return Ok(tag);
            }

            // Void and primitive payloads live under the tag key.
            for key in obj.keys() {
                if key != ".tag" && key != &tag {
                    return Err(WireError::new(format!("unexpected key '{}'", key)));
                }
            }
            match obj.get(&tag) {
                Some(v) => {
                    check_value(api, &field.data_type, v, strict).map_err(|e| e.nest(&tag))?
                }
                None if field.data_type == DataType::Symbol || field.is_optional() => {}
                None => {
                    return Err(WireError::new(format!("tag '{}' requires a value", tag)));
                }
            }
            Ok(tag)
        }
        other => Err(expected("string or object", other)),
    }
}

fn strip_nullable(data_type: &DataType) -> &DataType {
    match data_type {
        DataType::Nullable(inner) => inner,
        other => other,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
