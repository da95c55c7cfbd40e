//! Column name to field mapping for record result types.
//!
//! Mappings are built once per record type, on first use, and cached for the
//! lifetime of the process. The cache is append-only: entries are never
//! replaced or removed, so readers only ever see complete mappings.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::naming::to_column_name;
use crate::traits::{Field, Record};

static MAPPING_CACHE: LazyLock<DashMap<TypeId, Arc<ColumnMapping>>> = LazyLock::new(DashMap::new);

/// The field a column is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedField {
    /// Position of the field in [`Record::fields`] and [`Record::slots`].
    pub index: usize,
    pub name: &'static str,
}

/// Immutable mapping from column name (case sensitive) to field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: HashMap<String, MappedField>,
}

impl ColumnMapping {
    /// Builds a mapping from field declarations.
    ///
    /// A field's explicit tag wins over the derived name. When two fields
    /// resolve to the same column the later one takes it.
    pub fn build(fields: &[Field]) -> Self {
        let mut columns = HashMap::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let column = match field.tag {
                Some(tag) => tag.split(',').next().unwrap_or(tag).to_string(),
                None => to_column_name(field.name),
            };
            let mapped = MappedField {
                index,
                name: field.name,
            };
            if let Some(previous) = columns.insert(column, mapped) {
                tracing::debug!(
                    previous = previous.name,
                    field = field.name,
                    "column declared twice, later field wins"
                );
            }
        }
        Self { columns }
    }

    /// The field mapped to `column`, if any.
    pub fn get(&self, column: &str) -> Option<MappedField> {
        self.columns.get(column).copied()
    }

    /// Name of the field mapped to `column`, if any.
    pub fn field_name(&self, column: &str) -> Option<&'static str> {
        self.get(column).map(|f| f.name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Returns the cached mapping for `T`, building it on first use.
pub fn mapping_for<T: Record + 'static>() -> Arc<ColumnMapping> {
    cached_mapping(TypeId::of::<T>(), type_name::<T>(), T::fields)
}

pub(crate) fn cached_mapping(
    key: TypeId,
    type_name: &'static str,
    fields: fn() -> &'static [Field],
) -> Arc<ColumnMapping> {
    if let Some(mapping) = MAPPING_CACHE.get(&key) {
        return Arc::clone(mapping.value());
    }
    // The shard stays write-locked while the closure runs, so racing callers
    // wait for this build instead of running their own.
    let entry = MAPPING_CACHE.entry(key).or_insert_with(|| {
        let mapping = ColumnMapping::build(fields());
        tracing::debug!(type_name, columns = mapping.len(), "built column mapping");
        Arc::new(mapping)
    });
    Arc::clone(entry.value())
}
