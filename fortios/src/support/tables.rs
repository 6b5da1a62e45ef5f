//! Whether nested tables are read back into state
//!
//! By default a subtable is only flattened when the configuration already
//! has it, so unmanaged tables never produce diffs. `get_all_tables = "true"`
//! (or `FORTIOS_IMPORT_TABLE=true` when the attribute is unset) reads every
//! table, which is what an import wants.

use tfdata::ResourceData;

pub const IMPORT_TABLE_ENV: &str = "FORTIOS_IMPORT_TABLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableImport {
    /// Flatten every subtable the API returns
    All,
    /// Flatten only subtables present in configuration
    Configured,
}

impl TableImport {
    /// Combine the per-resource `get_all_tables` setting with the provider default
    pub fn resolve(get_all_tables: Option<&str>, import_default: bool) -> Self {
        let all = match get_all_tables.map(str::trim).filter(|s| !s.is_empty()) {
            Some(setting) => setting == "true",
            None => import_default,
        };
        if all {
            TableImport::All
        } else {
            TableImport::Configured
        }
    }

    pub fn from_resource(d: &dyn ResourceData, import_default: bool) -> Self {
        Self::resolve(d.get("get_all_tables").and_then(|v| v.as_str()), import_default)
    }

    /// Whether the subtable `field` should be written to state
    pub fn should_flatten(&self, d: &dyn ResourceData, field: &str) -> bool {
        match self {
            TableImport::All => true,
            TableImport::Configured => d.get_ok(field).is_some(),
        }
    }
}

/// Process-wide default from `FORTIOS_IMPORT_TABLE`
pub fn import_table_from_env() -> bool {
    std::env::var(IMPORT_TABLE_ENV)
        .map(|v| v.trim() == "true")
        .unwrap_or(false)
}
