mod executor;
mod record;
mod scan;

pub use executor::{Executor, RowCursor};
pub use record::{Field, Record, Scannable};
pub use scan::{Scan, ScanError};
