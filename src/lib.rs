//! rowbind - Typed SQL functions with automatic result binding
//!
//! Functions are generated from SQL template lines; at call time the
//! template is rendered against a parameter value, executed with the
//! executor attached to the context, and the resulting rows are scanned
//! into the result type.
//!
//! # Example
//! ```ignore
//! use rowbind::{query_fn, record, params, RowBindClient};
//!
//! #[derive(Default)]
//! struct UserResult {
//!     user_id: String,
//!     first_name: String,
//!     last_name: Option<String>,
//!     gender: i32,
//! }
//! record!(UserResult { user_id, first_name, last_name, gender => "sex" });
//!
//! struct QueryParams {
//!     user_id: String,
//!     status: i32,
//! }
//! params!(QueryParams { user_id, status });
//!
//! let query_user = query_fn::<QueryParams, UserResult>(&[
//!     "SELECT user_id, first_name, last_name, sex",
//!     "FROM tbl_user",
//!     "WHERE user_id = {{ .user_id }} AND status = {{ .status }}",
//! ])?;
//!
//! let client = RowBindClient::connect("postgres://localhost/mydb").await?;
//! let user = query_user
//!     .call(&client.context(), &QueryParams { user_id: "123".into(), status: 1 })
//!     .await?;
//! ```

pub mod bind;
pub mod config;
pub mod context;
pub mod drivers;
pub mod error;
pub mod function;
pub mod mapping;
pub mod naming;
pub mod query;
pub mod template;
pub mod traits;
pub mod types;

mod client;
mod discard;
mod macros;

// Re-export main types for convenient access
pub use bind::{bind, prime, Binding, Destination, ResultType, Strategy};
pub use client::RowBindClient;
pub use config::Config;
pub use context::{attach, resolve, Context};
pub use discard::Discard;
pub use error::{Result, RowBindError};
pub use function::{
    optional_fn, optional_fn0, query_fn, query_fn0, query_seq_fn, query_seq_fn0, update_fn,
    update_fn0, OptionalFn, OptionalFn0, QueryFn, QueryFn0, QuerySeqFn, QuerySeqFn0, UpdateFn,
    UpdateFn0,
};
pub use mapping::{mapping_for, ColumnMapping};
pub use naming::to_column_name;
pub use query::{execute_update, query_optional, query_row, query_rows, ResultStream};
pub use template::{Params, Template};
pub use traits::{Executor, Field, Record, RowCursor, Scan, ScanError, Scannable};
pub use types::{RawQueryResult, SqlValue};
