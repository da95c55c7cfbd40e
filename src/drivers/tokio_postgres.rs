use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::time::Instant;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Row, RowStream};

use crate::context::Context;
use crate::error::{Result, RowBindError};
use crate::traits::{Executor, RowCursor};
use crate::types::SqlValue;

/// PostgreSQL executor implementation using tokio-postgres.
///
/// Bound to a single connection. Rows are streamed from the server as the
/// cursor advances rather than collected up front.
pub struct TokioPostgresExecutor {
    client: Client,
}

impl TokioPostgresExecutor {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| RowBindError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl Executor for TokioPostgresExecutor {
    async fn execute(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<u64> {
        let converted = to_sql_args(args);
        let arg_refs = arg_refs(&converted);

        with_deadline(ctx.deadline(), self.client.execute(sql, &arg_refs))
            .await?
            .map_err(|e| RowBindError::StatementExecution(e.to_string()))
    }

    async fn query(
        &self,
        ctx: &Context,
        sql: &str,
        args: &[SqlValue],
    ) -> Result<Box<dyn RowCursor>> {
        let deadline = ctx.deadline();
        let statement = with_deadline(deadline, self.client.prepare(sql))
            .await?
            .map_err(|e| RowBindError::StatementExecution(e.to_string()))?;

        let columns = statement
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.type_().clone()))
            .collect();

        let converted = to_sql_args(args);
        let arg_refs = arg_refs(&converted);
        let rows = with_deadline(
            deadline,
            self.client.query_raw(&statement, slice_iter(&arg_refs)),
        )
        .await?
        .map_err(|e| RowBindError::StatementExecution(e.to_string()))?;

        Ok(Box::new(PostgresCursor {
            rows: Box::pin(rows),
            columns,
            current: None,
            deadline,
            closed: false,
        }))
    }
}

struct PostgresCursor {
    rows: Pin<Box<RowStream>>,
    columns: Vec<(String, Type)>,
    current: Option<Row>,
    deadline: Option<Instant>,
    closed: bool,
}

#[async_trait]
impl RowCursor for PostgresCursor {
    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        match with_deadline(self.deadline, self.rows.next()).await? {
            Some(Ok(row)) => {
                self.current = Some(row);
                Ok(true)
            }
            Some(Err(e)) => Err(RowBindError::StatementExecution(e.to_string())),
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    fn values(&mut self) -> Result<Vec<SqlValue>> {
        let row = self.current.take().ok_or_else(|| RowBindError::RowScan {
            column: "*".to_string(),
            reason: "no current row".to_string(),
        })?;
        self.columns
            .iter()
            .enumerate()
            .map(|(index, (name, type_))| {
                column_value(&row, index, type_).map_err(|e| RowBindError::RowScan {
                    column: name.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn close(&mut self) {
        // Dropping the stream stops reading; the rest of the response is
        // discarded by the connection task.
        self.closed = true;
        self.current = None;
    }
}

/// Runs `fut`, giving up at `deadline` if there is one.
async fn with_deadline<F: Future>(deadline: Option<Instant>, fut: F) -> Result<F::Output> {
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut)
            .await
            .map_err(|_| RowBindError::StatementExecution("deadline exceeded".to_string())),
        None => Ok(fut.await),
    }
}

/// Convert SqlValue arguments to boxed ToSql trait objects.
fn to_sql_args(args: &[SqlValue]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    args.iter().map(sql_value_to_tosql).collect()
}

fn arg_refs(converted: &[Box<dyn ToSql + Sync + Send>]) -> Vec<&(dyn ToSql + Sync)> {
    converted
        .iter()
        .map(|b| b.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

fn slice_iter<'a>(
    s: &'a [&'a (dyn ToSql + Sync)],
) -> impl ExactSizeIterator<Item = &'a dyn ToSql> + 'a {
    s.iter().map(|s| *s as _)
}

/// Convert a SqlValue to a boxed ToSql trait object.
fn sql_value_to_tosql(value: &SqlValue) -> Box<dyn ToSql + Sync + Send> {
    match value {
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Bool(b) => Box::new(*b),
        SqlValue::Int16(i) => Box::new(*i),
        SqlValue::Int32(i) => Box::new(*i),
        SqlValue::Int64(i) => Box::new(*i),
        SqlValue::Float32(f) => Box::new(*f),
        SqlValue::Float64(f) => Box::new(*f),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Bytes(b) => Box::new(b.clone()),
    }
}

/// Convert the value at `index` to a SqlValue according to its column type.
/// Types without a dedicated variant are read as text.
fn column_value(
    row: &Row,
    index: usize,
    type_: &Type,
) -> std::result::Result<SqlValue, tokio_postgres::Error> {
    let value = if *type_ == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)?.map(SqlValue::Bool)
    } else if *type_ == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)?.map(SqlValue::Int16)
    } else if *type_ == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)?.map(SqlValue::Int32)
    } else if *type_ == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)?.map(SqlValue::Int64)
    } else if *type_ == Type::OID {
        row.try_get::<_, Option<u32>>(index)?
            .map(|oid| SqlValue::Int64(i64::from(oid)))
    } else if *type_ == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)?.map(SqlValue::Float32)
    } else if *type_ == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)?.map(SqlValue::Float64)
    } else if *type_ == Type::BYTEA {
        row.try_get::<_, Option<Vec<u8>>>(index)?.map(SqlValue::Bytes)
    } else {
        row.try_get::<_, Option<String>>(index)?.map(SqlValue::Text)
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
