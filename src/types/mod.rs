mod row;
mod sql_value;

pub use row::RawQueryResult;
pub use sql_value::SqlValue;
