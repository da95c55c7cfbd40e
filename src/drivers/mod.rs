mod tokio_postgres;

pub use self::in_memory_test::{
    InMemoryTestExecutor, InMemoryTestResponseBuilder, RecordedQuery, TestResponse,
};
pub use self::tokio_postgres::TokioPostgresExecutor;
