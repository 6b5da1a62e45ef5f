//! Resource data accessor used by provider CRUD code
//!
//! `ResourceData` is the provider-side view of one resource instance during a
//! plan/apply operation: the desired configuration, the prior state, and the
//! state being written back.

use crate::error::{Result, TfdataError};
use crate::path::AttributePath;
use crate::schema::{json_type_name, Schema};
use serde_json::{Map, Value};

/// Accessor over one resource instance's configuration and state
pub trait ResourceData: Send + Sync {
    fn schema(&self) -> &Schema;

    /// Resource ID. Empty when the resource does not exist
    fn id(&self) -> &str;

    fn set_id(&mut self, id: &str);

    /// Current value at `path`, if any
    fn get(&self, path: &str) -> Option<&Value>;

    /// Prior and current value at `path`
    fn get_change(&self, path: &str) -> (Option<&Value>, Option<&Value>);

    /// Write a value at `path`. Fails when the value does not fit the schema
    fn set(&mut self, path: &str, value: Value) -> Result<()>;

    /// Current value at `path` when it is set to something other than the
    /// zero value of its type
    fn get_ok(&self, path: &str) -> Option<&Value> {
        self.get(path).filter(|value| !is_zero_value(value))
    }

    fn has_change(&self, path: &str) -> bool {
        let (old, new) = self.get_change(path);
        old.filter(|v| !v.is_null()) != new.filter(|v| !v.is_null())
    }

    /// Current string value at `path`, empty when unset or not a string
    fn get_string(&self, path: &str) -> &str {
        self.get(path).and_then(Value::as_str).unwrap_or_default()
    }
}

/// Zero values are treated as "not set" by `get_ok`
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// In-memory `ResourceData` backed by JSON objects
#[derive(Debug, Clone)]
pub struct MemoryResourceData {
    schema: Schema,
    id: String,
    prior: Value,
    current: Value,
}

impl MemoryResourceData {
    /// Empty instance with no configuration and no prior state
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            id: String::new(),
            prior: Value::Object(Map::new()),
            current: Value::Object(Map::new()),
        }
    }

    /// Instance about to be created from `config`
    pub fn from_config(schema: Schema, config: Value) -> Self {
        let current = with_defaults(&schema, config);
        Self {
            current,
            ..Self::new(schema)
        }
    }

    /// Instance already in state, as seen during read, import or delete
    pub fn from_state(schema: Schema, id: &str, state: Value) -> Self {
        Self {
            schema,
            id: id.to_string(),
            prior: state.clone(),
            current: state,
        }
    }

    /// Instance with prior state being moved to a new configuration
    pub fn for_update(schema: Schema, id: &str, prior: Value, config: Value) -> Self {
        let current = with_defaults(&schema, config);
        Self {
            schema,
            id: id.to_string(),
            prior,
            current,
        }
    }

    pub fn state(&self) -> &Value {
        &self.current
    }

    pub fn into_state(self) -> Value {
        self.current
    }

    fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
        AttributePath::parse(path).ok()?.lookup(root)
    }
}

impl ResourceData for MemoryResourceData {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn get(&self, path: &str) -> Option<&Value> {
        Self::lookup(&self.current, path)
    }

    fn get_change(&self, path: &str) -> (Option<&Value>, Option<&Value>) {
        (
            Self::lookup(&self.prior, path),
            Self::lookup(&self.current, path),
        )
    }

    fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let parsed = AttributePath::parse(path)?;
        let declared = self
            .schema
            .attribute_type_at(&parsed)
            .ok_or_else(|| TfdataError::UnknownAttribute(path.to_string()))?;

        if let Some((location, actual)) = declared.check(&value) {
            let full = if location.is_empty() {
                path.to_string()
            } else {
                format!("{}.{}", path, location)
            };
            tracing::debug!(
                "Rejecting {} value for {} (declared {})",
                json_type_name(&value),
                full,
                declared.type_name()
            );
            return Err(TfdataError::TypeMismatch {
                path: full,
                expected: declared.type_name().to_string(),
                actual: actual.to_string(),
            });
        }

        parsed.assign(&mut self.current, value)
    }
}

/// Fill unset top-level attributes that declare a default
fn with_defaults(schema: &Schema, mut config: Value) -> Value {
    if let Value::Object(map) = &mut config {
        for (name, attr) in &schema.block.attributes {
            if let Some(default) = &attr.default {
                let unset = map.get(name).map_or(true, Value::is_null);
                if unset {
                    map.insert(name.clone(), default.clone());
                }
            }
        }
    }
    config
}
