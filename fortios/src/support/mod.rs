//! Shared helpers used by every resource's flatten and expand code

pub mod netmask;
pub mod patch;
pub mod subtable;
pub mod tables;
pub mod version;

pub use netmask::{ip_mask_equivalent, join_ip_mask, mask_to_prefix, reconcile_ip_mask};
pub use patch::{classify_field, is_patchable, FieldPresence};
pub use subtable::{natural_cmp, sort_subtable, SortMode};
pub use tables::{import_table_from_env, TableImport, IMPORT_TABLE_ENV};
pub use version::{
    check_version_match, compare_versions, FieldCompatibility, FieldSpelling, Operator, Range,
    VersionConstraintTable,
};
