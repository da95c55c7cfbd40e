use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::types::SqlValue;

/// Trait for statement execution capabilities.
/// Implementations are bound to one unit of work: a single connection, a
/// pooled handle or a transaction. They are responsible for:
/// - Converting SqlValue arguments to native types
/// - Executing statements and exposing the rows through a [`RowCursor`]
/// - Honouring the deadline carried by the [`Context`], if any
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute a statement that returns no rows, reporting the number of rows
    /// affected. Arguments use PostgreSQL-style placeholders ($1, $2, etc.)
    async fn execute(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<u64>;

    /// Execute a statement that returns rows.
    async fn query(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[SqlValue],
    ) -> Result<Box<dyn RowCursor>>;
}

/// Forward-only cursor over the rows of one executed statement.
#[async_trait]
pub trait RowCursor: Send {
    /// Column names of the result set, in order.
    fn columns(&self) -> Result<Vec<String>>;

    /// Move to the next row. Returns false once the rows are exhausted.
    async fn advance(&mut self) -> Result<bool>;

    /// Take the raw values of the current row, in column order.
    fn values(&mut self) -> Result<Vec<SqlValue>>;

    /// Release the cursor. Called exactly once by the engine, on every exit
    /// path; implementations should tolerate repeated calls.
    fn close(&mut self);
}
