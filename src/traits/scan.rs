use std::str::FromStr;

use thiserror::Error;

use crate::types::SqlValue;

/// Failure to convert one raw column value into its destination.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct ScanError(String);

impl ScanError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The value's kind can not be stored into `target`.
    pub fn mismatch(target: &str, value: &SqlValue) -> Self {
        Self(format!("can not convert {} into {}", value.kind(), target))
    }
}

/// A writable slot that accepts one raw column value.
///
/// Implemented for the primitive types, `String`, `Vec<u8>` and `Option<T>`
/// (the nullable wrapper). User types may implement it to take part in the
/// single-column path or to serve as record fields.
pub trait Scan {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError>;
}

impl Scan for bool {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match value {
            SqlValue::Bool(b) => b,
            SqlValue::Int16(n) => n != 0,
            SqlValue::Int32(n) => n != 0,
            SqlValue::Int64(n) => n != 0,
            SqlValue::Text(ref s) => match s.as_str() {
                "true" | "t" | "1" => true,
                "false" | "f" | "0" => false,
                _ => return Err(ScanError::mismatch("bool", &value)),
            },
            other => return Err(ScanError::mismatch("bool", &other)),
        };
        Ok(())
    }
}

impl Scan for String {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match value {
            SqlValue::Text(s) => s,
            SqlValue::Bytes(b) => String::from_utf8(b)
                .map_err(|e| ScanError::new(format!("invalid utf-8 in bytes: {e}")))?,
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Int16(n) => n.to_string(),
            SqlValue::Int32(n) => n.to_string(),
            SqlValue::Int64(n) => n.to_string(),
            SqlValue::Float32(n) => n.to_string(),
            SqlValue::Float64(n) => n.to_string(),
            SqlValue::Null => return Err(ScanError::mismatch("String", &SqlValue::Null)),
        };
        Ok(())
    }
}

impl Scan for Vec<u8> {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
        *self = match value {
            SqlValue::Bytes(b) => b,
            SqlValue::Text(s) => s.into_bytes(),
            other => return Err(ScanError::mismatch("Vec<u8>", &other)),
        };
        Ok(())
    }
}

fn scan_integer<T>(value: SqlValue, target: &'static str) -> Result<T, ScanError>
where
    T: TryFrom<i64> + FromStr,
{
    let wide = match value {
        SqlValue::Int16(n) => i64::from(n),
        SqlValue::Int32(n) => i64::from(n),
        SqlValue::Int64(n) => n,
        SqlValue::Text(ref s) => {
            return s
                .trim()
                .parse::<T>()
                .map_err(|_| ScanError::new(format!("can not parse {s:?} as {target}")));
        }
        other => return Err(ScanError::mismatch(target, &other)),
    };
    T::try_from(wide).map_err(|_| ScanError::new(format!("{wide} out of range for {target}")))
}

macro_rules! impl_scan_integer {
    ($($ty:ty),* $(,)?) => {$(
        impl Scan for $ty {
            fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
                *self = scan_integer::<$ty>(value, stringify!($ty))?;
                Ok(())
            }
        }
    )*};
}

impl_scan_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_scan_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Scan for $ty {
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
                *self = match value {
                    SqlValue::Float32(n) => n as $ty,
                    SqlValue::Float64(n) => n as $ty,
                    SqlValue::Int16(n) => n as $ty,
                    SqlValue::Int32(n) => n as $ty,
                    SqlValue::Int64(n) => n as $ty,
                    SqlValue::Text(ref s) => s.trim().parse::<$ty>().map_err(|_| {
                        ScanError::new(format!("can not parse {s:?} as {}", stringify!($ty)))
                    })?,
                    other => return Err(ScanError::mismatch(stringify!($ty), &other)),
                };
                Ok(())
            }
        }
    )*};
}

impl_scan_float!(f32, f64);

impl<T: Scan + Default> Scan for Option<T> {
    fn scan(&mut self, value: SqlValue) -> Result<(), ScanError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.scan(value)?;
        *self = Some(inner);
        Ok(())
    }
}
