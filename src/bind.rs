//! Routing of result-set columns into typed destinations.
//!
//! Every result type declares one [`Strategy`]. For a given column list the
//! strategy is frozen into a [`Binding`], which can then hand out the
//! destinations for any number of result values without repeating the
//! column lookups.

use std::any::{type_name, TypeId};
use std::fmt;

use crate::discard::Discard;
use crate::error::{Result, RowBindError};
use crate::mapping::cached_mapping;
use crate::traits::{Field, Record, Scan, ScanError, Scannable};
use crate::types::SqlValue;

/// A writable slot for one column's raw value.
pub enum Destination<'a> {
    /// Writes into a field, or into the whole result value.
    Slot(&'a mut dyn Scan),
    /// Accepts the value and drops it.
    Discard,
}

impl<'a> Destination<'a> {
    pub fn slot<S: Scan>(target: &'a mut S) -> Self {
        Destination::Slot(target)
    }

    pub fn is_discard(&self) -> bool {
        matches!(self, Destination::Discard)
    }

    pub fn scan(&mut self, value: SqlValue) -> std::result::Result<(), ScanError> {
        match self {
            Destination::Slot(target) => target.scan(value),
            Destination::Discard => Discard.scan(value),
        }
    }
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Slot(_) => f.write_str("Slot"),
            Destination::Discard => f.write_str("Discard"),
        }
    }
}

pub type SelfDescribingFn<R> = for<'a> fn(&'a mut R, &[String]) -> Vec<Destination<'a>>;
pub type ScalarFn<R> = for<'a> fn(&'a mut R) -> &'a mut dyn Scan;
pub type SlotsFn<R> = for<'a> fn(&'a mut R) -> Vec<&'a mut dyn Scan>;

/// How a result type turns a column list into destinations.
pub enum Strategy<R> {
    /// The type maps columns itself (see [`Scannable`]).
    SelfDescribing(SelfDescribingFn<R>),
    /// The whole value is the destination of a single column.
    Scalar(ScalarFn<R>),
    /// Columns are matched to named fields (see [`Record`]).
    Record {
        fields: fn() -> &'static [Field],
        slots: SlotsFn<R>,
    },
    /// No way to scan into this type.
    Unsupported,
}

impl<R: Scannable> Strategy<R> {
    pub fn self_describing() -> Self {
        Strategy::SelfDescribing(R::destinations)
    }
}

impl<R: Scan> Strategy<R> {
    pub fn scalar() -> Self {
        Strategy::Scalar(scalar_slot::<R>)
    }
}

impl<R: Record> Strategy<R> {
    pub fn record() -> Self {
        Strategy::Record {
            fields: R::fields,
            slots: R::slots,
        }
    }
}

fn scalar_slot<S: Scan>(value: &mut S) -> &mut dyn Scan {
    value
}

/// A type that query results can be scanned into.
///
/// Scalars implement this out of the box; records get it from the
/// `record!` macro and self-describing types from `scannable!`.
pub trait ResultType: Default + Send + Sized + 'static {
    fn strategy() -> Strategy<Self> {
        Strategy::Unsupported
    }
}

macro_rules! impl_scalar_result {
    ($($ty:ty),* $(,)?) => {$(
        impl ResultType for $ty {
            fn strategy() -> Strategy<Self> {
                Strategy::scalar()
            }
        }
    )*};
}

impl_scalar_result!(
    bool, String, Vec<u8>, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);

impl<T: Scan + Default + Send + 'static> ResultType for Option<T> {
    fn strategy() -> Strategy<Self> {
        Strategy::scalar()
    }
}

enum Plan<R> {
    SelfDescribing(SelfDescribingFn<R>),
    Scalar(ScalarFn<R>),
    Record {
        slots: SlotsFn<R>,
        targets: Vec<Option<usize>>,
    },
}

/// Destinations for one result type and one column list.
pub struct Binding<R> {
    columns: Vec<String>,
    plan: Plan<R>,
}

impl<R: ResultType> Binding<R> {
    /// Resolves the strategy of `R` against `columns`.
    ///
    /// Fails with [`RowBindError::UnscannableResultType`] when `R` has no
    /// strategy, or is a scalar and there is not exactly one column.
    pub fn new(columns: &[String]) -> Result<Self> {
        let plan = match R::strategy() {
            Strategy::SelfDescribing(destinations) => Plan::SelfDescribing(destinations),
            Strategy::Scalar(slot) if columns.len() == 1 => Plan::Scalar(slot),
            Strategy::Record { fields, slots } => {
                let mapping = cached_mapping(TypeId::of::<R>(), type_name::<R>(), fields);
                let targets = columns
                    .iter()
                    .map(|column| mapping.get(column).map(|field| field.index))
                    .collect();
                Plan::Record { slots, targets }
            }
            Strategy::Scalar(_) | Strategy::Unsupported => {
                return Err(RowBindError::UnscannableResultType(type_name::<R>()));
            }
        };
        Ok(Self {
            columns: columns.to_vec(),
            plan,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Destinations inside `result`, one per column, in column order.
    ///
    /// A field targeted by more than one column receives the first of them;
    /// the others are discarded.
    pub fn destinations<'a>(&self, result: &'a mut R) -> Vec<Destination<'a>> {
        match &self.plan {
            Plan::SelfDescribing(destinations) => destinations(result, &self.columns),
            Plan::Scalar(slot) => vec![Destination::Slot(slot(result))],
            Plan::Record { slots, targets } => {
                let mut fields: Vec<Option<&'a mut dyn Scan>> =
                    slots(result).into_iter().map(Some).collect();
                targets
                    .iter()
                    .map(|target| {
                        target
                            .and_then(|index| fields.get_mut(index).and_then(Option::take))
                            .map_or(Destination::Discard, Destination::Slot)
                    })
                    .collect()
            }
        }
    }

    /// Scans one row of raw values into `result`.
    pub fn scan(&self, result: &mut R, values: Vec<SqlValue>) -> Result<()> {
        let mut destinations = self.destinations(result);
        if destinations.len() != self.columns.len() || values.len() != self.columns.len() {
            return Err(RowBindError::RowScan {
                column: "*".to_string(),
                reason: format!(
                    "{} columns, {} destinations, {} values",
                    self.columns.len(),
                    destinations.len(),
                    values.len()
                ),
            });
        }
        for ((destination, value), column) in destinations.iter_mut().zip(values).zip(&self.columns)
        {
            destination
                .scan(value)
                .map_err(|err| RowBindError::RowScan {
                    column: column.clone(),
                    reason: err.to_string(),
                })?;
        }
        Ok(())
    }
}

/// One-shot form of [`Binding::new`] followed by [`Binding::destinations`].
pub fn bind<'a, R: ResultType>(
    result: &'a mut R,
    columns: &[String],
) -> Result<Vec<Destination<'a>>> {
    Ok(Binding::<R>::new(columns)?.destinations(result))
}

/// Prepares `R` ahead of its first query: record types get their column
/// mapping built now.
///
/// Fails with [`RowBindError::UnscannableResultType`] when `R` has no scan
/// strategy at all.
pub fn prime<R: ResultType>() -> Result<()> {
    match R::strategy() {
        Strategy::Record { fields, .. } => {
            cached_mapping(TypeId::of::<R>(), type_name::<R>(), fields);
            Ok(())
        }
        Strategy::Unsupported => Err(RowBindError::UnscannableResultType(type_name::<R>())),
        Strategy::SelfDescribing(_) | Strategy::Scalar(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct UserResult {
        user_id: String,
        first_name: String,
        last_name: Option<String>,
        gender: i32,
    }

    crate::record!(UserResult {
        user_id,
        first_name,
        last_name,
        gender => "sex",
    });

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        key: String,
        value: i64,
    }

    impl Scannable for Pair {
        fn destinations(&mut self, columns: &[String]) -> Vec<Destination<'_>> {
            let Pair { key, value } = self;
            let (mut key, mut value) = (Some(key), Some(value));
            columns
                .iter()
                .map(|column| match column.as_str() {
                    "k" => key.take().map_or(Destination::Discard, Destination::slot),
                    "v" => value.take().map_or(Destination::Discard, Destination::slot),
                    _ => Destination::Discard,
                })
                .collect()
        }
    }

    crate::scannable!(Pair);

    #[derive(Default)]
    struct Opaque;

    impl ResultType for Opaque {}

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_columns_map_to_fields_in_order() {
        let columns = cols(&["user_id", "first_name", "last_name", "sex"]);
        let binding = Binding::<UserResult>::new(&columns).unwrap();

        let mut user = UserResult::default();
        let destinations = binding.destinations(&mut user);
        assert_eq!(destinations.len(), 4);
        assert!(destinations.iter().all(|d| !d.is_discard()));
        drop(destinations);

        binding
            .scan(
                &mut user,
                vec![
                    SqlValue::from("u-1"),
                    SqlValue::from("Ada"),
                    SqlValue::Null,
                    SqlValue::Int32(2),
                ],
            )
            .unwrap();
        assert_eq!(
            user,
            UserResult {
                user_id: "u-1".to_string(),
                first_name: "Ada".to_string(),
                last_name: None,
                gender: 2,
            }
        );
    }

    #[test]
    fn test_column_order_follows_result_set() {
        let columns = cols(&["sex", "user_id"]);
        let mut user = UserResult::default();
        Binding::<UserResult>::new(&columns)
            .unwrap()
            .scan(&mut user, vec![SqlValue::Int64(1), SqlValue::from("u-9")])
            .unwrap();
        assert_eq!(user.gender, 1);
        assert_eq!(user.user_id, "u-9");
    }

    #[test]
    fn test_unmapped_columns_are_discarded() {
        let columns = cols(&["user_id", "created_at", "gender"]);
        let mut user = UserResult::default();
        let destinations = bind(&mut user, &columns).unwrap();

        assert_eq!(destinations.len(), 3);
        assert!(!destinations[0].is_discard());
        assert!(destinations[1].is_discard());
        // only the tag "sex" maps to the gender field
        assert!(destinations[2].is_discard());
    }

    #[test]
    fn test_repeated_column_fills_field_once() {
        let columns = cols(&["user_id", "user_id"]);
        let mut user = UserResult::default();
        Binding::<UserResult>::new(&columns)
            .unwrap()
            .scan(&mut user, vec![SqlValue::from("first"), SqlValue::from("second")])
            .unwrap();
        assert_eq!(user.user_id, "first");
    }

    #[test]
    fn test_scalar_single_column() {
        let columns = cols(&["count"]);
        let mut n = 0i64;
        Binding::<i64>::new(&columns)
            .unwrap()
            .scan(&mut n, vec![SqlValue::Int64(12)])
            .unwrap();
        assert_eq!(n, 12);

        let mut maybe: Option<String> = None;
        Binding::<Option<String>>::new(&columns)
            .unwrap()
            .scan(&mut maybe, vec![SqlValue::from("x")])
            .unwrap();
        assert_eq!(maybe.as_deref(), Some("x"));
    }

    #[test]
    fn test_scalar_needs_exactly_one_column() {
        let err = Binding::<String>::new(&cols(&["a", "b"])).err().unwrap();
        assert!(matches!(err, RowBindError::UnscannableResultType(_)));
        assert!(Binding::<String>::new(&[]).is_err());
    }

    #[test]
    fn test_unsupported_type_fails_at_bind_time() {
        let err = Binding::<Opaque>::new(&cols(&["a"])).err().unwrap();
        match err {
            RowBindError::UnscannableResultType(name) => assert!(name.ends_with("Opaque")),
            other => panic!("Expected UnscannableResultType, got {other:?}"),
        }
    }

    #[test]
    fn test_prime_rejects_unsupported_type() {
        assert!(prime::<UserResult>().is_ok());
        assert!(prime::<i64>().is_ok());
        assert!(prime::<Pair>().is_ok());
        assert!(matches!(
            prime::<Opaque>(),
            Err(RowBindError::UnscannableResultType(_))
        ));
    }

    #[test]
    fn test_self_describing_type_maps_itself() {
        let columns = cols(&["v", "other", "k"]);
        let binding = Binding::<Pair>::new(&columns).unwrap();

        let mut pair = Pair::default();
        assert_eq!(binding.destinations(&mut pair).len(), 3);
        binding
            .scan(
                &mut pair,
                vec![SqlValue::Int32(5), SqlValue::Bool(true), SqlValue::from("five")],
            )
            .unwrap();
        assert_eq!(
            pair,
            Pair {
                key: "five".to_string(),
                value: 5
            }
        );
    }

    #[test]
    fn test_scan_failure_names_the_column() {
        let columns = cols(&["user_id", "sex"]);
        let mut user = UserResult::default();
        let err = Binding::<UserResult>::new(&columns)
            .unwrap()
            .scan(&mut user, vec![SqlValue::from("u"), SqlValue::from("female")])
            .unwrap_err();
        match err {
            RowBindError::RowScan { column, .. } => assert_eq!(column, "sex"),
            other => panic!("Expected RowScan, got {other:?}"),
        }
    }

    #[test]
    fn test_value_count_mismatch_is_a_scan_error() {
        let columns = cols(&["user_id", "sex"]);
        let mut user = UserResult::default();
        let err = Binding::<UserResult>::new(&columns)
            .unwrap()
            .scan(&mut user, vec![SqlValue::from("u")])
            .unwrap_err();
        assert!(matches!(err, RowBindError::RowScan { .. }));
    }
}
