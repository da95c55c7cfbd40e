/// Implements [`Record`](crate::Record) and [`ResultType`](crate::ResultType)
/// for a struct, listing the fields that take part in column mapping.
///
/// A field maps to the column derived from its name unless it carries an
/// explicit column declaration after `=>`. Only the part of the declaration
/// before the first comma is used.
///
/// # Example
/// ```
/// #[derive(Default)]
/// struct UserResult {
///     user_id: String,
///     last_name: Option<String>,
///     gender: i32,
/// }
///
/// rowbind::record!(UserResult {
///     user_id,
///     last_name,
///     gender => "sex",
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(=> $column:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields() -> &'static [$crate::Field] {
                const FIELDS: &[$crate::Field] = &[
                    $($crate::Field::new(stringify!($field)) $(.tag($column))?),*
                ];
                FIELDS
            }

            fn slots(&mut self) -> ::std::vec::Vec<&mut dyn $crate::Scan> {
                ::std::vec![$(&mut self.$field as &mut dyn $crate::Scan),*]
            }
        }

        impl $crate::ResultType for $ty {
            fn strategy() -> $crate::Strategy<Self> {
                $crate::Strategy::record()
            }
        }
    };
}

/// Implements [`ResultType`](crate::ResultType) for a type that implements
/// [`Scannable`](crate::Scannable).
#[macro_export]
macro_rules! scannable {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::ResultType for $ty {
            fn strategy() -> $crate::Strategy<Self> {
                $crate::Strategy::self_describing()
            }
        }
    )+};
}

/// Implements [`ResultType`](crate::ResultType) for a type that implements
/// [`Scan`](crate::Scan), so it can be queried from a single column.
#[macro_export]
macro_rules! scalar {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::ResultType for $ty {
            fn strategy() -> $crate::Strategy<Self> {
                $crate::Strategy::scalar()
            }
        }
    )+};
}

/// Implements [`Params`](crate::Params) for a struct whose fields convert
/// into [`SqlValue`](crate::SqlValue).
///
/// # Example
/// ```
/// struct QueryParams {
///     user_id: String,
///     status: i32,
/// }
///
/// rowbind::params!(QueryParams { user_id, status });
/// ```
#[macro_export]
macro_rules! params {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Params for $ty {
            fn names() -> &'static [&'static str] {
                &[$(stringify!($field)),*]
            }

            fn value(&self, name: &str) -> ::std::option::Option<$crate::SqlValue> {
                match name {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::SqlValue::from(::std::clone::Clone::clone(&self.$field)),
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}
