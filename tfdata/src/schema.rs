//! Schema types and builders for tfdata
//!
//! A schema describes which attributes a resource has and what shape their
//! values take. `ResourceData` implementations use it to reject writes whose
//! value does not fit the declared type.

use crate::path::{AttributePath, AttributePathStep};
use serde_json::Value;
use std::collections::BTreeMap;

/// AttributeType defines the shape of an attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    /// Repeated nested block (a subtable), stored as a list of objects
    Block(Block),
}

impl AttributeType {
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Number => "number",
            AttributeType::Bool => "bool",
            AttributeType::List(_) => "list",
            AttributeType::Block(_) => "block list",
        }
    }

    /// Check a value against this type. Null always conforms.
    ///
    /// Returns the dotted location and actual type of the first mismatch.
    pub fn check(&self, value: &Value) -> Option<(String, &'static str)> {
        match (self, value) {
            (_, Value::Null) => None,
            (AttributeType::String, Value::String(_)) => None,
            (AttributeType::Number, Value::Number(_)) => None,
            (AttributeType::Bool, Value::Bool(_)) => None,
            (AttributeType::List(inner), Value::Array(items)) => {
                items.iter().enumerate().find_map(|(idx, item)| {
                    inner
                        .check(item)
                        .map(|(loc, actual)| (prefixed(&idx.to_string(), &loc), actual))
                })
            }
            (AttributeType::Block(block), Value::Array(rows)) => {
                rows.iter().enumerate().find_map(|(idx, row)| match row {
                    Value::Object(fields) => fields.iter().find_map(|(name, field)| {
                        let loc = format!("{}.{}", idx, name);
                        match block.attributes.get(name) {
                            Some(attr) => attr
                                .r#type
                                .check(field)
                                .map(|(inner, actual)| (prefixed(&loc, &inner), actual)),
                            None => Some((loc, "undeclared attribute")),
                        }
                    }),
                    other => Some((idx.to_string(), json_type_name(other))),
                })
            }
            (_, other) => Some((String::new(), json_type_name(other))),
        }
    }
}

fn prefixed(head: &str, tail: &str) -> String {
    if tail.is_empty() {
        head.to_string()
    } else {
        format!("{}.{}", head, tail)
    }
}

/// Name of a JSON value's dynamic type, used in mismatch reports
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Block holds the attributes of a resource or of one nested block row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub attributes: BTreeMap<String, Attribute>,
    pub description: String,
}

/// Attribute represents a single configuration attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
}

/// Schema is returned by resources. Version is used for state migration
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

impl Schema {
    /// Resolve the declared type of the attribute addressed by `path`.
    ///
    /// Index steps descend into block rows.
    pub fn attribute_type_at(&self, path: &AttributePath) -> Option<&AttributeType> {
        let mut block = Some(&self.block);
        let mut found: Option<&AttributeType> = None;

        for step in &path.steps {
            match step {
                AttributePathStep::AttributeName(name) => {
                    let attr = block?.attributes.get(name)?;
                    found = Some(&attr.r#type);
                    block = None;
                }
                AttributePathStep::ElementKeyInt(_) => match found? {
                    AttributeType::Block(inner) => {
                        block = Some(inner);
                        found = None;
                    }
                    AttributeType::List(inner) => {
                        found = Some(inner.as_ref());
                    }
                    _ => return None,
                },
            }
        }

        found
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.block.attributes.get(name)
    }
}

/// AttributeBuilder provides fluent API for building attributes
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                default: None,
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    /// Repeated nested block whose rows carry the given attributes
    pub fn block(name: &str, attributes: Vec<Attribute>) -> Self {
        let block = Block {
            attributes: attributes
                .into_iter()
                .map(|attr| (attr.name.clone(), attr))
                .collect(),
            description: String::new(),
        };
        Self::new(name, AttributeType::Block(block))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.attribute.default = Some(value);
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// SchemaBuilder provides fluent API for building schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::default(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.insert(attr.name.clone(), attr);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
