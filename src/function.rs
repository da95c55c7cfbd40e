//! Typed callables generated from SQL template lines.
//!
//! # Example
//! ```ignore
//! let query_user = rowbind::query_fn::<QueryParams, UserResult>(&[
//!     "SELECT user_id, first_name, last_name, sex",
//!     "FROM tbl_user",
//!     "WHERE user_id = {{ .user_id }} AND status = {{ .status }}",
//! ])?;
//!
//! let ctx = rowbind::attach(&Context::background(), executor);
//! let user = query_user.call(&ctx, &QueryParams { user_id: "123".into(), status: 1 }).await?;
//! ```

use std::borrow::Cow;
use std::marker::PhantomData;

use crate::bind::{prime, ResultType};
use crate::context::Context;
use crate::error::Result;
use crate::query::{execute_update, query_optional, query_row, query_rows, ResultStream};
use crate::template::{join_lines, Params, Template};
use crate::types::SqlValue;

/// The statement behind a generated function.
enum Statement<P> {
    /// Rendered against the parameters on every call.
    Template(Template<P>),
    /// Used verbatim, without arguments.
    Literal(String),
}

impl<P: Params> Statement<P> {
    fn parse(lines: &[&str]) -> Result<Self> {
        Template::parse(lines).map(Statement::Template)
    }

    fn literal(lines: &[&str]) -> Self {
        Statement::Literal(join_lines(lines))
    }

    fn render(&self, params: &P) -> Result<(Cow<'_, str>, Vec<SqlValue>)> {
        match self {
            Statement::Template(template) => {
                let (sql, args) = template.render(params)?;
                Ok((Cow::Owned(sql), args))
            }
            Statement::Literal(sql) => Ok((Cow::Borrowed(sql.as_str()), Vec::new())),
        }
    }
}

/// Executes a query and returns the first row.
pub struct QueryFn<P, R> {
    statement: Statement<P>,
    _result: PhantomData<fn() -> R>,
}

/// [`QueryFn`] for a statement without parameters.
pub type QueryFn0<R> = QueryFn<(), R>;

impl<P: Params, R: ResultType> QueryFn<P, R> {
    pub async fn call(&self, ctx: &Context, params: &P) -> Result<R> {
        let (sql, args) = self.statement.render(params)?;
        query_row(ctx, &sql, &args).await
    }
}

/// Executes a query and returns the first row, if any.
pub struct OptionalFn<P, R> {
    statement: Statement<P>,
    _result: PhantomData<fn() -> R>,
}

/// [`OptionalFn`] for a statement without parameters.
pub type OptionalFn0<R> = OptionalFn<(), R>;

impl<P: Params, R: ResultType> OptionalFn<P, R> {
    pub async fn call(&self, ctx: &Context, params: &P) -> Result<Option<R>> {
        let (sql, args) = self.statement.render(params)?;
        query_optional(ctx, &sql, &args).await
    }
}

/// Executes a query and returns a lazy sequence of all matching rows.
pub struct QuerySeqFn<P, R> {
    statement: Statement<P>,
    _result: PhantomData<fn() -> R>,
}

/// [`QuerySeqFn`] for a statement without parameters.
pub type QuerySeqFn0<R> = QuerySeqFn<(), R>;

impl<P: Params, R: ResultType> QuerySeqFn<P, R> {
    pub async fn call(&self, ctx: &Context, params: &P) -> Result<ResultStream<R>> {
        let (sql, args) = self.statement.render(params)?;
        query_rows(ctx, &sql, &args).await
    }
}

/// Executes an updating statement and returns the number of rows affected.
pub struct UpdateFn<P> {
    statement: Statement<P>,
}

/// [`UpdateFn`] for a statement without parameters.
pub type UpdateFn0 = UpdateFn<()>;

impl<P: Params> UpdateFn<P> {
    pub async fn call(&self, ctx: &Context, params: &P) -> Result<u64> {
        let (sql, args) = self.statement.render(params)?;
        execute_update(ctx, &sql, &args).await
    }
}

/// Non-parameterized constructors can not fail; an unscannable result type
/// is reported here and again by every call.
fn prime_or_warn<R: ResultType>() {
    if let Err(err) = prime::<R>() {
        tracing::warn!(error = %err, "queries of this function will fail");
    }
}

/// Makes a [`QueryFn`] from template lines.
pub fn query_fn<P: Params, R: ResultType>(lines: &[&str]) -> Result<QueryFn<P, R>> {
    prime::<R>()?;
    Ok(QueryFn {
        statement: Statement::parse(lines)?,
        _result: PhantomData,
    })
}

/// Makes a [`QueryFn0`] from statement lines.
pub fn query_fn0<R: ResultType>(lines: &[&str]) -> QueryFn0<R> {
    prime_or_warn::<R>();
    QueryFn {
        statement: Statement::literal(lines),
        _result: PhantomData,
    }
}

/// Makes an [`OptionalFn`] from template lines.
pub fn optional_fn<P: Params, R: ResultType>(lines: &[&str]) -> Result<OptionalFn<P, R>> {
    prime::<R>()?;
    Ok(OptionalFn {
        statement: Statement::parse(lines)?,
        _result: PhantomData,
    })
}

/// Makes an [`OptionalFn0`] from statement lines.
pub fn optional_fn0<R: ResultType>(lines: &[&str]) -> OptionalFn0<R> {
    prime_or_warn::<R>();
    OptionalFn {
        statement: Statement::literal(lines),
        _result: PhantomData,
    }
}

/// Makes a [`QuerySeqFn`] from template lines.
pub fn query_seq_fn<P: Params, R: ResultType>(lines: &[&str]) -> Result<QuerySeqFn<P, R>> {
    prime::<R>()?;
    Ok(QuerySeqFn {
        statement: Statement::parse(lines)?,
        _result: PhantomData,
    })
}

/// Makes a [`QuerySeqFn0`] from statement lines.
pub fn query_seq_fn0<R: ResultType>(lines: &[&str]) -> QuerySeqFn0<R> {
    prime_or_warn::<R>();
    QuerySeqFn {
        statement: Statement::literal(lines),
        _result: PhantomData,
    }
}

/// Makes an [`UpdateFn`] from template lines.
pub fn update_fn<P: Params>(lines: &[&str]) -> Result<UpdateFn<P>> {
    Ok(UpdateFn {
        statement: Statement::parse(lines)?,
    })
}

/// Makes an [`UpdateFn0`] from statement lines.
pub fn update_fn0(lines: &[&str]) -> UpdateFn0 {
    UpdateFn {
        statement: Statement::literal(lines),
    }
}
