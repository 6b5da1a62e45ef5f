//! Shared flatten/expand helpers
//!
//! Attribute names use underscores, API field names use hyphens. A `Field`
//! pairs the two and knows how to convert an API value into state.

use serde_json::{Map, Value};
use tfdata::{Attribute, AttributeBuilder, ResourceData, SchemaBuilder};

use crate::api::AttributeMap;
use crate::config::ProviderConfig;
use crate::error::{FortiosError, Result};
use crate::support::{classify_field, sort_subtable, FieldPresence, SortMode, TableImport};

/// Attributes every resource carries besides its own fields
pub const DYNAMIC_SORT_SUBTABLE: &str = "dynamic_sort_subtable";
pub const GET_ALL_TABLES: &str = "get_all_tables";
pub const VDOMPARAM: &str = "vdomparam";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
}

/// One scalar attribute and the API field backing it
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub attribute: &'static str,
    pub wire: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn string(attribute: &'static str, wire: &'static str) -> Self {
        Self {
            attribute,
            wire,
            kind: FieldKind::String,
            required: false,
        }
    }

    pub const fn int(attribute: &'static str, wire: &'static str) -> Self {
        Self {
            attribute,
            wire,
            kind: FieldKind::Int,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// Schema attribute for this field
    pub fn schema_attribute(&self) -> Attribute {
        let builder = match self.kind {
            FieldKind::String => AttributeBuilder::string(self.attribute),
            FieldKind::Int => AttributeBuilder::number(self.attribute),
        };
        if self.required {
            builder.required().build()
        } else {
            builder.optional().computed().build()
        }
    }

    /// Convert an API value into the state shape. Values that cannot be
    /// converted are passed through so the state write decides
    pub fn flatten(&self, raw: &Value) -> Value {
        match self.kind {
            FieldKind::String => raw.clone(),
            FieldKind::Int => forti_int_value(raw).map_or_else(|| raw.clone(), Value::from),
        }
    }
}

/// String form of a scalar API value
pub fn forti_string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer form of an API value. The API reports some integers as strings
pub fn forti_int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Write a flattened value to state.
///
/// Fields missing from the response are skipped. A rejected write is
/// tolerated when the raw API value is patchable and an error otherwise.
pub fn set_field(
    d: &mut dyn ResourceData,
    attribute: &str,
    raw: Option<&Value>,
    value: Value,
) -> Result<()> {
    let presence = classify_field(raw);
    if presence == FieldPresence::Absent {
        return Ok(());
    }

    match d.set(attribute, value) {
        Ok(()) => Ok(()),
        Err(e) if presence == FieldPresence::Patchable => {
            tracing::warn!("Ignoring unpatchable value for {}: {}", attribute, e);
            Ok(())
        }
        Err(source) => Err(FortiosError::FieldWriteRejected {
            field: attribute.to_string(),
            source,
        }),
    }
}

/// Copy configured scalar attributes into an API object
pub fn expand_fields(d: &dyn ResourceData, fields: &[Field], obj: &mut AttributeMap) {
    for field in fields {
        if let Some(value) = d.get_ok(field.attribute) {
            obj.insert(field.wire.to_string(), value.clone());
        }
    }
}

/// Write every scalar field the API returned into state
pub fn flatten_fields(d: &mut dyn ResourceData, fields: &[Field], obj: &AttributeMap) -> Result<()> {
    for field in fields {
        let raw = obj.get(field.wire);
        let value = raw.map(|v| field.flatten(v)).unwrap_or(Value::Null);
        set_field(d, field.attribute, raw, value)?;
    }
    Ok(())
}

/// Schema block attribute for a subtable with the given columns
pub fn subtable_attribute(name: &str, columns: &[Field], description: &str) -> Attribute {
    let attributes = columns.iter().map(Field::schema_attribute).collect();
    AttributeBuilder::block(name, attributes)
        .description(description)
        .optional()
        .build()
}

/// API rows for a configured subtable, `None` when the table is not configured
pub fn expand_subtable(d: &dyn ResourceData, attribute: &str, columns: &[Field]) -> Option<Value> {
    let rows = d.get_ok(attribute)?.as_array()?;

    let expanded = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            let mut out = Map::new();
            for column in columns {
                if let Some(value) = row.get(column.attribute).filter(|v| !v.is_null()) {
                    out.insert(column.wire.to_string(), value.clone());
                }
            }
            Value::Object(out)
        })
        .collect();

    Some(Value::Array(expanded))
}

/// State rows for an API subtable, sorted by `key` per `mode`
pub fn flatten_subtable(raw: &Value, columns: &[Field], key: &str, mode: SortMode) -> Value {
    let Some(rows) = raw.as_array() else {
        return raw.clone();
    };

    let flattened: Vec<AttributeMap> = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| {
            let mut out = Map::new();
            for column in columns {
                if let Some(value) = row.get(column.wire) {
                    out.insert(column.attribute.to_string(), column.flatten(value));
                }
            }
            out
        })
        .collect();

    Value::Array(
        sort_subtable(flattened, key, mode)
            .into_iter()
            .map(Value::Object)
            .collect(),
    )
}

/// Per-operation settings shared by a resource's flatten and expand code
#[derive(Debug, Clone)]
pub struct FieldContext {
    /// Target firmware version
    pub version: String,
    pub sort: SortMode,
    pub tables: TableImport,
}

impl FieldContext {
    pub fn new(d: &dyn ResourceData, version: String, import_default: bool) -> Self {
        Self {
            version,
            sort: SortMode::from_setting(d.get(DYNAMIC_SORT_SUBTABLE).and_then(Value::as_str)),
            tables: TableImport::from_resource(d, import_default),
        }
    }

    /// Flatten an API subtable into `attribute` when table import allows it.
    ///
    /// With every table imported, a table the API no longer reports is
    /// cleared from state so the drift shows up in the plan.
    pub fn set_subtable(
        &self,
        d: &mut dyn ResourceData,
        attribute: &str,
        raw: Option<&Value>,
        columns: &[Field],
        key: &str,
    ) -> Result<()> {
        if !self.tables.should_flatten(d, attribute) {
            return Ok(());
        }
        if raw.map_or(true, Value::is_null) {
            if self.tables == TableImport::All && d.get_ok(attribute).is_some() {
                tracing::debug!("{} not reported by the API, clearing it", attribute);
                d.set(attribute, Value::Null)
                    .map_err(|source| FortiosError::FieldWriteRejected {
                        field: attribute.to_string(),
                        source,
                    })?;
            }
            return Ok(());
        }
        let value = raw
            .map(|v| flatten_subtable(v, columns, key, self.sort))
            .unwrap_or(Value::Null);
        set_field(d, attribute, raw, value)
    }
}

/// Administrative domain for one operation: `vdomparam` when configured,
/// otherwise the provider default, which is then recorded in state
pub fn vdom_param(d: &mut dyn ResourceData, config: &ProviderConfig) -> Result<Option<String>> {
    let configured = d.get_string(VDOMPARAM).to_string();
    if !configured.is_empty() {
        return Ok(Some(configured));
    }

    match config.vdom.as_deref().filter(|v| !v.is_empty()) {
        Some(vdom) => {
            d.set(VDOMPARAM, Value::String(vdom.to_string()))
                .map_err(|source| FortiosError::FieldWriteRejected {
                    field: VDOMPARAM.to_string(),
                    source,
                })?;
            Ok(Some(vdom.to_string()))
        }
        None => Ok(None),
    }
}

/// Append the attributes every resource shares
pub fn provider_attributes(builder: SchemaBuilder) -> SchemaBuilder {
    builder
        .attribute(
            AttributeBuilder::string(DYNAMIC_SORT_SUBTABLE)
                .description("Sort subtables by their key: \"false\", \"true\" or \"natural\"")
                .optional()
                .default_value(Value::String("false".to_string()))
                .build(),
        )
        .attribute(
            AttributeBuilder::string(GET_ALL_TABLES)
                .description("Read back every subtable, including ones not in configuration")
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::string(VDOMPARAM)
                .description("Virtual domain to manage the object in")
                .optional()
                .computed()
                .build(),
        )
}
