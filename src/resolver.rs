//! Maps a column's reported native type name onto the kind of scan target
//! used to read it.
//!
//! Numeric families keep their numeric representation so callers can do
//! arithmetic without re-parsing. Character, binary and temporal families
//! (and anything unrecognised) are read as text.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// The nullable holder a column is scanned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    /// Nullable 64-bit integer
    NullInt,
    /// Nullable 64-bit float
    NullFloat,
    /// Nullable string
    NullString,
}

const INT_TYPES: &[&str] = &[
    "INT",
    "BIT",
    "TINYINT",
    "BOOL",
    "BOOLEAN",
    "SMALLINT",
    "MEDIUMINT",
    "INTEGER",
    "BIGINT",
];

const FLOAT_TYPES: &[&str] = &["FLOAT", "DOUBLE", "DECIMAL", "DEC"];

const STRING_TYPES: &[&str] = &[
    "CHAR",
    "VARCHAR",
    "BINARY",
    "VARBINARY",
    "TINYBLOB",
    "TINYTEXT",
    "TEXT",
    "BLOB",
    "MEDIUMTEXT",
    "MEDIUMBLOB",
    "LONGTEXT",
    "LONGBLOB",
    "ENUM",
    "SET",
    "DATE",
    "DATETIME",
    "TIMESTAMP",
    "TIME",
    "YEAR",
];

lazy_static! {
    static ref SCAN_KINDS: HashMap<&'static str, ScanKind> = {
        let mut table = HashMap::new();
        for (names, kind) in [
            (INT_TYPES, ScanKind::NullInt),
            (FLOAT_TYPES, ScanKind::NullFloat),
            (STRING_TYPES, ScanKind::NullString),
        ] {
            for name in names {
                table.insert(*name, kind);
            }
        }
        table
    };
}

/// Resolve the scan-target kind for a reported type name.
///
/// Matching is exact but case-insensitive; unknown names fall back to
/// [`ScanKind::NullString`].
#[must_use]
pub fn resolve_scan_kind(type_name: &str) -> ScanKind {
    let upper = type_name.to_ascii_uppercase();
    SCAN_KINDS
        .get(upper.as_str())
        .copied()
        .unwrap_or(ScanKind::NullString)
}

/// Resolve every column of a query in order.
#[must_use]
pub fn resolve_scan_kinds<'a, I>(type_names: I) -> Vec<ScanKind>
where
    I: IntoIterator<Item = &'a str>,
{
    type_names.into_iter().map(resolve_scan_kind).collect()
}
