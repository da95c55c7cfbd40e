use crate::bind::Destination;
use crate::traits::Scan;

/// Declaration of one record field, in struct declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// The field name as written in the struct.
    pub name: &'static str,
    /// Explicit column declaration, e.g. `"sex"` or `"sex,opts"`.
    /// Only the first comma-delimited segment is used.
    pub tag: Option<&'static str>,
}

impl Field {
    pub const fn new(name: &'static str) -> Self {
        Self { name, tag: None }
    }

    /// Attach an explicit column declaration.
    pub const fn tag(self, tag: &'static str) -> Self {
        Self {
            name: self.name,
            tag: Some(tag),
        }
    }
}

/// Trait representing a result type with named fields.
/// Implementations are typically generated with the `record!` macro.
pub trait Record {
    /// Returns the declared fields, in declaration order.
    fn fields() -> &'static [Field];

    /// Returns one scan slot per declared field, in the same order as
    /// [`Record::fields`].
    fn slots(&mut self) -> Vec<&mut dyn Scan>;
}

/// A result type that maps columns to its own destinations, bypassing the
/// automatic column mapping.
///
/// # Example
/// ```
/// use rowbind::{Destination, Scannable};
///
/// #[derive(Default)]
/// struct Pair {
///     key: String,
///     value: i64,
/// }
///
/// impl Scannable for Pair {
///     fn destinations(&mut self, columns: &[String]) -> Vec<Destination<'_>> {
///         let Pair { key, value } = self;
///         let (mut key, mut value) = (Some(key), Some(value));
///         columns
///             .iter()
///             .map(|column| match column.as_str() {
///                 "k" => key.take().map_or(Destination::Discard, Destination::slot),
///                 "v" => value.take().map_or(Destination::Discard, Destination::slot),
///                 _ => Destination::Discard,
///             })
///             .collect()
///     }
/// }
/// ```
pub trait Scannable {
    /// Returns one destination per column, in column order.
    fn destinations(&mut self, columns: &[String]) -> Vec<Destination<'_>>;
}
