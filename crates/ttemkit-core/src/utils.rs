//! Utility functions.
//!
//! This module provides helpers for grouping records by key in
//! first-appearance order and for reading input files.

use std::collections::HashMap;
use std::hash::Hash;
use std::io::ErrorKind;
use std::path::Path;

use ttemkit_core_common::{RawTable, SpatialFormatReadError, TableReader};

use crate::error::{IoError, Result};

/// Groups `items` by `key`, keeping groups in the order their first member
/// appears and members in input order.
///
/// Returns `(key, indices)` pairs where `indices` point into `items`.
///
/// # Examples
///
/// ```
/// use ttemkit_core::utils::group_indices;
///
/// let groups = group_indices(&["b", "a", "b"], |s| *s);
/// assert_eq!(groups, vec![("b", vec![0, 2]), ("a", vec![1])]);
/// ```
pub fn group_indices<T, K, F>(items: &[T], key: F) -> Vec<(K, Vec<usize>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<usize>)> = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let k = key(item);
        match positions.get(&k) {
            Some(&slot) => groups[slot].1.push(index),
            None => {
                positions.insert(k.clone(), groups.len());
                groups.push((k, vec![index]));
            },
        }
    }

    groups
}

/// Reads `path` with `reader`, reporting a missing file as
/// [`IoError::FileNotFound`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] when `path` does not exist and the
/// reader's error otherwise.
pub fn read_input<R: TableReader + ?Sized>(reader: &R, path: &Path) -> Result<RawTable> {
    match reader.read_path(path) {
        Err(SpatialFormatReadError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Err(IoError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into())
        },
        result => Ok(result?),
    }
}
