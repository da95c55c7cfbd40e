use crate::traits::Scan;
use crate::types::SqlValue;

/// A scan destination that accepts any value and stores nothing.
///
/// Unmapped columns are routed here so that result sets with extra columns
/// still scan. Self-describing result types can use it for columns they do
/// not care about.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discard;

impl Scan for Discard {
    fn scan(&mut self, _value: SqlValue) -> Result<(), crate::traits::ScanError> {
        Ok(())
    }
}
