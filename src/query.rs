//! Query execution pipeline.
//!
//! Every read follows the same steps: resolve the executor from the context,
//! execute the statement, enumerate the columns once, bind the result type
//! against them, then scan. The cursor is held by a guard that releases it
//! on every exit path, including a sequence dropped before exhaustion.

use std::ops::{Deref, DerefMut};
use std::pin::Pin;

use async_stream::try_stream;
use futures_util::Stream;

use crate::bind::{Binding, ResultType};
use crate::context::{resolve, Context};
use crate::error::{Result, RowBindError};
use crate::traits::RowCursor;
use crate::types::SqlValue;

/// Lazy, forward-only sequence of scanned rows.
///
/// A row that fails to scan is yielded as `Err` and ends the sequence.
pub type ResultStream<R> = Pin<Box<dyn Stream<Item = Result<R>> + Send>>;

/// Owns a cursor for one pipeline invocation and releases it on drop.
struct CursorGuard {
    cursor: Box<dyn RowCursor>,
    rows: usize,
}

impl CursorGuard {
    fn new(cursor: Box<dyn RowCursor>) -> Self {
        Self { cursor, rows: 0 }
    }

    async fn next_values(&mut self) -> Result<Option<Vec<SqlValue>>> {
        if !self.cursor.advance().await? {
            return Ok(None);
        }
        self.rows += 1;
        self.cursor.values().map(Some)
    }
}

impl Deref for CursorGuard {
    type Target = dyn RowCursor;

    fn deref(&self) -> &Self::Target {
        self.cursor.as_ref()
    }
}

impl DerefMut for CursorGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor.as_mut()
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.cursor.close();
        tracing::trace!(rows = self.rows, "cursor released");
    }
}

/// Executes `sql` and binds `R` against the result columns.
async fn open<R: ResultType>(
    ctx: &Context,
    sql: &str,
    args: &[SqlValue],
) -> Result<(CursorGuard, Binding<R>)> {
    let executor = resolve(ctx)?;
    tracing::debug!(sql, args = args.len(), "executing query");

    let cursor = CursorGuard::new(executor.query(ctx, sql, args).await?);
    let columns = cursor.columns()?;
    let binding = Binding::<R>::new(&columns)?;
    tracing::trace!(columns = columns.len(), "result columns bound");

    Ok((cursor, binding))
}

/// Executes a query and scans its first row.
///
/// Fails with [`RowBindError::NoRows`] when the query returns nothing. Rows
/// after the first are never read.
pub async fn query_row<R: ResultType>(ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<R> {
    let (mut cursor, binding) = open::<R>(ctx, sql, args).await?;
    let values = cursor.next_values().await?.ok_or(RowBindError::NoRows)?;

    let mut result = R::default();
    binding.scan(&mut result, values)?;
    Ok(result)
}

/// Executes a query and scans its first row, if there is one.
///
/// An empty result is `Ok(None)`. A row that fails to scan is an error,
/// never a `Some`.
pub async fn query_optional<R: ResultType>(
    ctx: &Context,
    sql: &str,
    args: &[SqlValue],
) -> Result<Option<R>> {
    let (mut cursor, binding) = open::<R>(ctx, sql, args).await?;
    let Some(values) = cursor.next_values().await? else {
        tracing::debug!(sql, "query returned no rows");
        return Ok(None);
    };

    let mut result = R::default();
    binding.scan(&mut result, values)?;
    Ok(Some(result))
}

/// Executes a query and returns its rows as a lazy sequence.
///
/// Setup failures (no executor, execution, column enumeration, binding) are
/// returned up front. Each element is scanned into a fresh `R` when the
/// consumer polls for it.
pub async fn query_rows<R: ResultType>(
    ctx: &Context,
    sql: &str,
    args: &[SqlValue],
) -> Result<ResultStream<R>> {
    let (mut cursor, binding) = open::<R>(ctx, sql, args).await?;

    let rows: ResultStream<R> = Box::pin(try_stream! {
        while let Some(values) = cursor.next_values().await? {
            let mut result = R::default();
            binding.scan(&mut result, values)?;
            yield result;
        }
        tracing::debug!(rows = cursor.rows, "sequence exhausted");
    });
    Ok(rows)
}

/// Executes a statement that returns no rows and reports the number of rows
/// affected.
pub async fn execute_update(ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<u64> {
    let executor = resolve(ctx)?;
    tracing::debug!(sql, args = args.len(), "executing update");

    let affected = executor.execute(ctx, sql, args).await?;
    tracing::debug!(affected, "update executed");
    Ok(affected)
}
