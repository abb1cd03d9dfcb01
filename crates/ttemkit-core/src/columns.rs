//! Header resolution and typed field extraction.
//!
//! A [`ColumnResolver`] maps a canonical field name to an ordered list of
//! header aliases. Lookup compares trimmed header text case-insensitively and
//! tries the aliases in order; the first alias present in the header row wins.

use std::collections::BTreeMap;

use ttemkit_core_common::{RawRecord, RawTable, SourcePosition};

use crate::error::{InputError, Result};

/// Canonical field names understood by the well pipeline.
pub mod field {
    /// Borehole id
    pub const BORE: &str = "bore";
    /// Depth to the top of an interval
    pub const DEPTH_TOP: &str = "depth_top";
    /// Depth to the bottom of an interval
    pub const DEPTH_BOTTOM: &str = "depth_bottom";
    /// Lithology description
    pub const KEYWORD: &str = "keyword";
    /// Latitude
    pub const LATITUDE: &str = "latitude";
    /// Longitude
    pub const LONGITUDE: &str = "longitude";
    /// Land-surface elevation
    pub const ELEVATION: &str = "elevation";
}

/// Ordered alias lists per canonical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolver {
    aliases: BTreeMap<String, Vec<String>>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::empty()
            .with_aliases(field::BORE, ["bore", "borehole", "well", "well_id", "id"])
            .with_aliases(field::DEPTH_TOP, ["depth_top", "top", "from"])
            .with_aliases(field::DEPTH_BOTTOM, ["depth_bottom", "bottom", "to"])
            .with_aliases(field::KEYWORD, ["keyword", "lithology", "description"])
            .with_aliases(field::LATITUDE, ["latitude", "lat", "y"])
            .with_aliases(field::LONGITUDE, ["longitude", "lon", "long", "x"])
            .with_aliases(field::ELEVATION, ["elevation", "elev", "altitude", "z"])
    }
}

impl ColumnResolver {
    /// A resolver without any aliases.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Replaces the alias list of `field`.
    #[must_use]
    pub fn with_aliases<I, S>(mut self, field: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.insert(
            field.to_string(),
            aliases
                .into_iter()
                .map(|a| a.into().trim().to_string())
                .collect(),
        );
        self
    }

    /// Aliases registered for `field`, in priority order.
    #[must_use]
    pub fn aliases(&self, field: &str) -> &[String] {
        self.aliases.get(field).map_or(&[], Vec::as_slice)
    }

    /// Index of the header matching `field`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttemkit_core::columns::{ColumnResolver, field};
    ///
    /// let headers = vec!["Well".to_string(), "Lat".to_string()];
    /// let resolver = ColumnResolver::default();
    /// assert_eq!(resolver.resolve(field::BORE, &headers), Some(0));
    /// assert_eq!(resolver.resolve(field::LATITUDE, &headers), Some(1));
    /// assert_eq!(resolver.resolve(field::LONGITUDE, &headers), None);
    /// ```
    #[must_use]
    pub fn resolve(&self, field: &str, headers: &[String]) -> Option<usize> {
        self.aliases(field).iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    /// Like [`resolve`](Self::resolve) but fails with
    /// [`InputError::MissingColumn`].
    ///
    /// # Errors
    ///
    /// Returns an error when no alias of `field` is present in `table`.
    pub fn require(&self, field: &str, table: &RawTable) -> Result<usize> {
        self.resolve(field, &table.headers)
            .ok_or_else(|| missing_column(field, table))
    }
}

pub(crate) fn missing_column(column: &str, table: &RawTable) -> crate::error::TtemError {
    InputError::MissingColumn {
        column: column.to_string(),
        source_name: table.source_name().to_string(),
    }
    .into()
}

/// Index of the column named exactly `name` (case-insensitive).
pub(crate) fn require_exact(table: &RawTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| missing_column(name, table))
}

/// Typed access to the fields of one [`RawRecord`].
pub(crate) struct FieldReader<'a> {
    table: &'a RawTable,
    record: &'a RawRecord,
    row: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(table: &'a RawTable, row: usize) -> Self {
        Self {
            table,
            record: &table.records[row],
            row,
        }
    }

    fn invalid(&self, index: usize, value: &str, reason: &str) -> crate::error::TtemError {
        let position = SourcePosition {
            line: self.record.line,
            column: Some(index as u64 + 1),
            record: if self.record.line.is_none() {
                Some(self.row as u64 + 1)
            } else {
                None
            },
            ..SourcePosition::default()
        };
        InputError::InvalidValue {
            column: self
                .table
                .headers
                .get(index)
                .cloned()
                .unwrap_or_default(),
            value: value.to_string(),
            source_name: self.table.source_name().to_string(),
            position,
            reason: reason.to_string(),
        }
        .into()
    }

    /// An [`InputError::InvalidValue`] for the field with a custom reason.
    pub(crate) fn reject(&self, index: usize, reason: &str) -> crate::error::TtemError {
        self.invalid(index, self.text(index), reason)
    }

    /// Trimmed text of the field.
    pub(crate) fn text(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or_default().trim()
    }

    /// Non-empty trimmed text of the field.
    pub(crate) fn non_empty(&self, index: usize) -> Result<&'a str> {
        let value = self.text(index);
        if value.is_empty() {
            Err(self.invalid(index, value, "value is empty"))
        } else {
            Ok(value)
        }
    }

    /// Field parsed as a finite `f64`.
    pub(crate) fn f64(&self, index: usize) -> Result<f64> {
        let value = self.text(index);
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(self.invalid(index, value, "value is not finite")),
            Err(_) => Err(self.invalid(index, value, "not a number")),
        }
    }

    /// Field parsed as an `i64`.
    pub(crate) fn i64(&self, index: usize) -> Result<i64> {
        let value = self.text(index);
        value
            .parse::<i64>()
            .map_err(|_| self.invalid(index, value, "not an integer"))
    }
}
