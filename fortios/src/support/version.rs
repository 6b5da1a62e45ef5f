//! Firmware version matching for version-gated attributes
//!
//! FortiOS renames and restructures attributes between firmware releases.
//! A constraint table says which releases accept an attribute; the
//! `FieldCompatibility` registry maps one logical attribute to the spelling
//! each release range expects.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use tfdata::ResourceData;

use crate::error::{FortiosError, Result};

/// Comparison operator of a version constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Lt => "<",
        }
    }
}

impl std::str::FromStr for Operator {
    type Err = FortiosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">=" => Ok(Operator::Ge),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Le),
            "<" => Ok(Operator::Lt),
            other => Err(FortiosError::InvalidVersion(format!(
                "unknown constraint operator {}",
                other
            ))),
        }
    }
}

/// Operator -> version list. The table is satisfied when any operator's
/// branch is satisfied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraintTable {
    constraints: BTreeMap<Operator, Vec<String>>,
}

impl VersionConstraintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, operator: Operator, versions: &[&str]) -> Self {
        self.constraints
            .entry(operator)
            .or_default()
            .extend(versions.iter().map(|v| v.to_string()));
        self
    }

    pub fn exact(versions: &[&str]) -> Self {
        Self::new().with(Operator::Eq, versions)
    }

    pub fn at_least(version: &str) -> Self {
        Self::new().with(Operator::Ge, &[version])
    }

    pub fn before(version: &str) -> Self {
        Self::new().with(Operator::Lt, &[version])
    }

    /// Boolean form of `check_version_match`. Unparseable versions never match
    pub fn matches(&self, version: &str) -> bool {
        check_version_match(version, self).is_ok()
    }

    fn branch_matches(&self, operator: Operator, list: &[String], version: &str) -> Result<bool> {
        let accepts: fn(Ordering) -> bool = match operator {
            Operator::Eq => return Ok(list.iter().any(|v| v == version)),
            Operator::Ne => return Ok(!list.iter().any(|v| v == version)),
            Operator::Ge => |ord| ord != Ordering::Less,
            Operator::Gt => |ord| ord == Ordering::Greater,
            Operator::Le => |ord| ord != Ordering::Greater,
            Operator::Lt => |ord| ord == Ordering::Less,
        };

        for bound in list {
            if accepts(compare_versions(version, bound)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for VersionConstraintTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return f.write_str("(none)");
        }
        let parts: Vec<String> = self
            .constraints
            .iter()
            .map(|(op, list)| format!("{} {}", op.symbol(), list.join(", ")))
            .collect();
        f.write_str(&parts.join(" or "))
    }
}

/// Decide whether `version` satisfies `table`.
///
/// `=` and `!=` compare whole strings; ordering operators compare dotted
/// components as integers, left to right, zero-padding the shorter side.
pub fn check_version_match(version: &str, table: &VersionConstraintTable) -> Result<()> {
    for (operator, list) in &table.constraints {
        if table.branch_matches(*operator, list, version)? {
            return Ok(());
        }
    }

    Err(FortiosError::VersionMismatch {
        field: None,
        version: version.to_string(),
        required: table.to_string(),
    })
}

fn parse_components(version: &str) -> Result<Vec<u64>> {
    let trimmed = version.trim().trim_start_matches(['v', 'V']);
    if trimmed.is_empty() {
        return Err(FortiosError::InvalidVersion(version.to_string()));
    }

    trimmed
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| FortiosError::InvalidVersion(version.to_string()))
        })
        .collect()
}

/// Component-wise numeric comparison: `7.10.0 > 7.2.0`, `7.2 == 7.2.0`
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let left = parse_components(a)?;
    let right = parse_components(b)?;

    for idx in 0..left.len().max(right.len()) {
        let l = left.get(idx).copied().unwrap_or(0);
        let r = right.get(idx).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }

    Ok(Ordering::Equal)
}

/// Release range in which one spelling of an attribute is accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    Exact(Vec<String>),
    AtLeast(String),
    Before(String),
}

impl Range {
    pub fn constraints(&self) -> VersionConstraintTable {
        match self {
            Range::Exact(list) => {
                let refs: Vec<&str> = list.iter().map(String::as_str).collect();
                VersionConstraintTable::exact(&refs)
            }
            Range::AtLeast(v) => VersionConstraintTable::at_least(v),
            Range::Before(v) => VersionConstraintTable::before(v),
        }
    }

    pub fn contains(&self, version: &str) -> Result<bool> {
        match check_version_match(version, &self.constraints()) {
            Ok(()) => Ok(true),
            Err(FortiosError::VersionMismatch { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// One spelling of a logical attribute: the Terraform attribute name and the
/// API field name used while `range` holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpelling {
    pub attribute: &'static str,
    pub wire_name: &'static str,
    pub range: Range,
}

impl FieldSpelling {
    pub fn new(attribute: &'static str, wire_name: &'static str, range: Range) -> Self {
        Self {
            attribute,
            wire_name,
            range,
        }
    }
}

/// Registry of attributes whose spelling depends on the firmware version
#[derive(Debug, Clone, Default)]
pub struct FieldCompatibility {
    fields: BTreeMap<&'static str, Vec<FieldSpelling>>,
}

impl FieldCompatibility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, logical: &'static str, spellings: Vec<FieldSpelling>) -> Self {
        self.fields.insert(logical, spellings);
        self
    }

    pub fn spellings(&self, logical: &str) -> &[FieldSpelling] {
        self.fields.get(logical).map(Vec::as_slice).unwrap_or_default()
    }

    /// Spelling the target expects for `logical` at `version`
    pub fn spelling_for(&self, logical: &str, version: &str) -> Result<&FieldSpelling> {
        let spellings = self.spellings(logical);
        for spelling in spellings {
            if spelling.range.contains(version)? {
                return Ok(spelling);
            }
        }

        Err(FortiosError::VersionMismatch {
            field: Some(logical.to_string()),
            version: version.to_string(),
            required: describe_ranges(spellings),
        })
    }

    /// Spelling the user configured for `logical`, validated against `version`.
    ///
    /// Returns `None` when no spelling is configured. When several spellings
    /// are set, the one valid for `version` wins; if none is valid the error
    /// names the first configured spelling and the versions it needs.
    pub fn check_configured(
        &self,
        logical: &str,
        version: &str,
        d: &dyn ResourceData,
    ) -> Result<Option<&FieldSpelling>> {
        let configured: Vec<&FieldSpelling> = self
            .spellings(logical)
            .iter()
            .filter(|s| d.get_ok(s.attribute).is_some())
            .collect();

        for spelling in &configured {
            if spelling.range.contains(version)? {
                return Ok(Some(spelling));
            }
        }

        match configured.first() {
            None => Ok(None),
            Some(spelling) => Err(FortiosError::VersionMismatch {
                field: Some(spelling.attribute.to_string()),
                version: version.to_string(),
                required: spelling.range.constraints().to_string(),
            }),
        }
    }
}

fn describe_ranges(spellings: &[FieldSpelling]) -> String {
    if spellings.is_empty() {
        return "(none)".to_string();
    }
    spellings
        .iter()
        .map(|s| s.range.constraints().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}
