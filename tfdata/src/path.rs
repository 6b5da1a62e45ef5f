//! Attribute paths into resource data
//!
//! Paths use the flatmap spelling Terraform providers are used to:
//! `ports.0.vlan` addresses the `vlan` attribute of the first `ports` block.

use crate::error::{Result, TfdataError};
use serde_json::{Map, Value};
use std::fmt;

/// AttributePath represents a path to an attribute within resource data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

/// Individual step in an AttributePath
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributePathStep {
    /// Access attribute by name in an object
    AttributeName(String),
    /// Access element by index in a list
    ElementKeyInt(usize),
}

impl AttributePath {
    pub fn new(name: &str) -> Self {
        Self {
            steps: vec![AttributePathStep::AttributeName(name.to_string())],
        }
    }

    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn attribute(mut self, name: &str) -> Self {
        self.steps
            .push(AttributePathStep::AttributeName(name.to_string()));
        self
    }

    pub fn index(mut self, idx: usize) -> Self {
        self.steps.push(AttributePathStep::ElementKeyInt(idx));
        self
    }

    /// Parse a dotted path such as `member.0.name`.
    ///
    /// Purely numeric segments become list indexes.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(TfdataError::InvalidPath(raw.to_string()));
        }

        let mut steps = Vec::new();
        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(TfdataError::InvalidPath(raw.to_string()));
            }
            match segment.parse::<usize>() {
                Ok(idx) if !steps.is_empty() => steps.push(AttributePathStep::ElementKeyInt(idx)),
                Ok(_) => return Err(TfdataError::InvalidPath(raw.to_string())),
                Err(_) => steps.push(AttributePathStep::AttributeName(segment.to_string())),
            }
        }

        Ok(Self { steps })
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve the path against a value, returning `None` when any step is missing
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;

        for step in &self.steps {
            current = match (current, step) {
                (Value::Object(m), AttributePathStep::AttributeName(name)) => m.get(name)?,
                (Value::Array(l), AttributePathStep::ElementKeyInt(idx)) => l.get(*idx)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Write `new_value` at this path, creating intermediate objects as needed.
    ///
    /// List elements must already exist; an index past the end is an error.
    pub fn assign(&self, root: &mut Value, new_value: Value) -> Result<()> {
        let Some((last, parents)) = self.steps.split_last() else {
            *root = new_value;
            return Ok(());
        };

        if !root.is_object() {
            *root = Value::Object(Map::new());
        }

        let mut current = root;
        for (idx, step) in parents.iter().enumerate() {
            current = match (current, step) {
                (Value::Object(m), AttributePathStep::AttributeName(name)) => {
                    let next = m.entry(name.clone()).or_insert(Value::Null);
                    if next.is_null() {
                        *next = match self.steps.get(idx + 1) {
                            Some(AttributePathStep::ElementKeyInt(_)) => Value::Array(Vec::new()),
                            _ => Value::Object(Map::new()),
                        };
                    }
                    next
                }
                (Value::Array(l), AttributePathStep::ElementKeyInt(i)) => {
                    l.get_mut(*i).ok_or_else(|| TfdataError::IndexOutOfBounds {
                        path: self.to_string(),
                        index: *i,
                    })?
                }
                _ => return Err(TfdataError::InvalidPath(self.to_string())),
            };
        }

        match (current, last) {
            (Value::Object(m), AttributePathStep::AttributeName(name)) => {
                m.insert(name.clone(), new_value);
                Ok(())
            }
            (Value::Array(l), AttributePathStep::ElementKeyInt(i)) => match l.get_mut(*i) {
                Some(slot) => {
                    *slot = new_value;
                    Ok(())
                }
                None => Err(TfdataError::IndexOutOfBounds {
                    path: self.to_string(),
                    index: *i,
                }),
            },
            _ => Err(TfdataError::InvalidPath(self.to_string())),
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            if !first {
                f.write_str(".")?;
            }
            first = false;
            match step {
                AttributePathStep::AttributeName(name) => f.write_str(name)?,
                AttributePathStep::ElementKeyInt(idx) => write!(f, "{}", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_splits_names_and_indexes() {
        let path = AttributePath::parse("ports.1.vlan").unwrap();
        assert_eq!(path, AttributePath::new("ports").index(1).attribute("vlan"));
        assert_eq!(path.to_string(), "ports.1.vlan");
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!(AttributePath::parse("").is_err());
        assert!(AttributePath::parse("a..b").is_err());
        assert!(AttributePath::parse("0.name").is_err());
    }

    #[test]
    fn lookup_walks_nested_blocks() {
        let value = json!({"member": [{"name": "a"}, {"name": "b"}]});
        let path = AttributePath::parse("member.1.name").unwrap();
        assert_eq!(path.lookup(&value), Some(&json!("b")));
        assert_eq!(AttributePath::parse("member.5.name").unwrap().lookup(&value), None);
    }

    #[test]
    fn assign_creates_intermediate_objects() {
        let mut value = json!({});
        let path = AttributePath::new("config").attribute("endpoint");
        path.assign(&mut value, json!("https://fgt.example.com")).unwrap();
        assert_eq!(value, json!({"config": {"endpoint": "https://fgt.example.com"}}));
    }

    #[test]
    fn assign_rejects_missing_list_elements() {
        let mut value = json!({"member": []});
        let path = AttributePath::parse("member.0.name").unwrap();
        assert!(matches!(
            path.assign(&mut value, json!("a")),
            Err(TfdataError::IndexOutOfBounds { .. })
        ));
    }
}
