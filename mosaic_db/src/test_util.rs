//! In-memory backends and routers for exercising the execution core without a database.

use async_trait::async_trait;
use mosaic_core::{
    BackendConnection, BackendError, BackendStatement, ColumnDefinition, ColumnType,
    ConnectionSource, MasterSlaveRouter, PrepareOptions, ProxyError, RouteResult, RowCursor,
    ShardingRouter, SqlStatement, SqlType, StatementJudge, StatementOutcome, Value,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Column sets used across tests.
pub struct TestColumns;

impl TestColumns {
    pub fn id_name() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("order_id", ColumnType::LongLong).table("ds", "t_order"),
            ColumnDefinition::new("status", ColumnType::VarString).table("ds", "t_order"),
        ]
    }
}

/// Shorthand for an `(order_id, status)` row.
pub fn row(id: i64, status: &str) -> Vec<Value> {
    vec![Value::Int(id), Value::from(status)]
}

#[derive(Clone, Debug)]
enum MockOutcome {
    Update { affected_rows: u64, last_insert_id: u64 },
    Rows { columns: Vec<ColumnDefinition>, rows: Vec<Vec<Value>> },
    SqlError(BackendError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExecutionMode {
    Normal,
    Hang,
    Panic,
}

/// Counts what a mock data source was asked to do.
#[derive(Debug, Default)]
pub struct MockCounters {
    connections_opened: AtomicUsize,
    connections_closed: AtomicUsize,
    statements_prepared: AtomicUsize,
    statements_closed: AtomicUsize,
    executions_started: AtomicUsize,
    executions_finished: AtomicUsize,
    executions_dropped: AtomicUsize,
    generated_keys_requested: AtomicBool,
    last_sql: Mutex<Option<String>>,
    last_parameters: Mutex<Vec<Value>>,
}

impl MockCounters {
    pub fn connections_opened(&self) -> usize {
        self.connections_opened.load(Ordering::SeqCst)
    }

    pub fn connections_closed(&self) -> usize {
        self.connections_closed.load(Ordering::SeqCst)
    }

    pub fn statements_prepared(&self) -> usize {
        self.statements_prepared.load(Ordering::SeqCst)
    }

    pub fn statements_closed(&self) -> usize {
        self.statements_closed.load(Ordering::SeqCst)
    }

    pub fn executions_started(&self) -> usize {
        self.executions_started.load(Ordering::SeqCst)
    }

    pub fn executions_finished(&self) -> usize {
        self.executions_finished.load(Ordering::SeqCst)
    }

    /// Executions whose future was dropped before completing.
    pub fn executions_dropped(&self) -> usize {
        self.executions_dropped.load(Ordering::SeqCst)
    }

    pub fn generated_keys_requested(&self) -> bool {
        self.generated_keys_requested.load(Ordering::SeqCst)
    }

    pub fn last_sql(&self) -> Option<String> {
        self.last_sql.lock().unwrap().clone()
    }

    pub fn last_parameters(&self) -> Vec<Value> {
        self.last_parameters.lock().unwrap().clone()
    }

    /// True when no connection was ever handed out.
    pub fn untouched(&self) -> bool {
        self.connections_opened() == 0
    }
}

#[derive(Clone, Debug)]
struct MockBehavior {
    outcome: MockOutcome,
    mode: ExecutionMode,
    delay: Option<Duration>,
    fail_cursor_at: Option<usize>,
    prepare_error: Option<BackendError>,
    unavailable: bool,
}

/// A scripted data source. Every connection it hands out behaves the same way.
#[derive(Clone, Debug)]
pub struct MockDataSource {
    behavior: MockBehavior,
    counters: Arc<MockCounters>,
}

impl MockDataSource {
    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            behavior: MockBehavior {
                outcome,
                mode: ExecutionMode::Normal,
                delay: None,
                fail_cursor_at: None,
                prepare_error: None,
                unavailable: false,
            },
            counters: Arc::new(MockCounters::default()),
        }
    }

    pub fn update(affected_rows: u64) -> Self {
        Self::with_outcome(MockOutcome::Update {
            affected_rows,
            last_insert_id: 0,
        })
    }

    pub fn insert(affected_rows: u64, last_insert_id: u64) -> Self {
        Self::with_outcome(MockOutcome::Update {
            affected_rows,
            last_insert_id,
        })
    }

    pub fn rows(columns: Vec<ColumnDefinition>, rows: Vec<Vec<Value>>) -> Self {
        Self::with_outcome(MockOutcome::Rows { columns, rows })
    }

    pub fn sql_error(error: BackendError) -> Self {
        Self::with_outcome(MockOutcome::SqlError(error))
    }

    pub fn prepare_error(error: BackendError) -> Self {
        let mut source = Self::update(0);
        source.behavior.prepare_error = Some(error);
        source
    }

    /// A source that refuses to hand out connections.
    pub fn unavailable() -> Self {
        let mut source = Self::update(0);
        source.behavior.unavailable = true;
        source
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = Some(delay);
        self
    }

    /// Execution never completes.
    pub fn hang(mut self) -> Self {
        self.behavior.mode = ExecutionMode::Hang;
        self
    }

    /// Execution panics.
    pub fn panic(mut self) -> Self {
        self.behavior.mode = ExecutionMode::Panic;
        self
    }

    /// The row cursor errors when asked to move past `rows` rows.
    pub fn fail_cursor_at(mut self, rows: usize) -> Self {
        self.behavior.fail_cursor_at = Some(rows);
        self
    }

    pub fn counters(&self) -> Arc<MockCounters> {
        self.counters.clone()
    }

    pub fn into_source(self) -> Arc<dyn ConnectionSource> {
        Arc::new(self)
    }
}

#[async_trait]
impl ConnectionSource for MockDataSource {
    async fn connection(&self) -> Result<Arc<dyn BackendConnection>, BackendError> {
        if self.behavior.unavailable {
            return Err(BackendError::new(
                1040,
                "08004",
                "Too many connections",
            ));
        }
        self.counters.connections_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnection {
            behavior: Arc::new(self.behavior.clone()),
            counters: self.counters.clone(),
        }))
    }
}

struct MockConnection {
    behavior: Arc<MockBehavior>,
    counters: Arc<MockCounters>,
}

#[async_trait]
impl BackendConnection for MockConnection {
    async fn prepare(
        &self,
        sql: &str,
        options: PrepareOptions,
    ) -> Result<Arc<dyn BackendStatement>, BackendError> {
        *self.counters.last_sql.lock().unwrap() = Some(sql.to_string());
        if options.return_generated_keys {
            self.counters
                .generated_keys_requested
                .store(true, Ordering::SeqCst);
        }
        if let Some(e) = &self.behavior.prepare_error {
            return Err(e.clone());
        }
        self.counters.statements_prepared.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockStatement {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
        }))
    }

    fn close(&self) {
        self.counters.connections_closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockStatement {
    behavior: Arc<MockBehavior>,
    counters: Arc<MockCounters>,
}

struct ExecutionGuard {
    counters: Arc<MockCounters>,
    finished: bool,
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        if self.finished {
            self.counters.executions_finished.fetch_add(1, Ordering::SeqCst);
        } else {
            self.counters.executions_dropped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl BackendStatement for MockStatement {
    async fn execute(&self, parameters: &[Value]) -> Result<StatementOutcome, BackendError> {
        self.counters.executions_started.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_parameters.lock().unwrap() = parameters.to_vec();
        let mut guard = ExecutionGuard {
            counters: self.counters.clone(),
            finished: false,
        };

        if let Some(delay) = self.behavior.delay {
            tokio::time::sleep(delay).await;
        }
        match self.behavior.mode {
            ExecutionMode::Hang => std::future::pending::<()>().await,
            ExecutionMode::Panic => panic!("backend crashed while executing"),
            ExecutionMode::Normal => {}
        }

        let outcome = match &self.behavior.outcome {
            MockOutcome::Update {
                affected_rows,
                last_insert_id,
            } => Ok(StatementOutcome::Update {
                affected_rows: *affected_rows,
                last_insert_id: *last_insert_id,
            }),
            MockOutcome::Rows { columns, rows } => Ok(StatementOutcome::Rows {
                columns: columns.clone(),
                cursor: Box::new(MockCursor {
                    rows: rows.clone(),
                    position: 0,
                    fail_at: self.behavior.fail_cursor_at,
                }),
            }),
            MockOutcome::SqlError(e) => Err(e.clone()),
        };
        guard.finished = true;
        outcome
    }

    fn close(&self) {
        self.counters.statements_closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cursor over a fixed list of rows.
pub struct MockCursor {
    rows: Vec<Vec<Value>>,
    position: usize,
    fail_at: Option<usize>,
}

impl MockCursor {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            position: 0,
            fail_at: None,
        }
    }
}

#[async_trait]
impl RowCursor for MockCursor {
    async fn next(&mut self) -> Result<bool, BackendError> {
        if self.fail_at == Some(self.position) {
            return Err(BackendError::new(
                2013,
                "HY000",
                "Lost connection to MySQL server during query",
            ));
        }
        if self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn value(&self, index: usize) -> Result<Value, BackendError> {
        self.position
            .checked_sub(1)
            .and_then(|row| self.rows.get(row))
            .and_then(|row| index.checked_sub(1).and_then(|i| row.get(i)))
            .cloned()
            .ok_or_else(|| BackendError::new(0, "S1009", format!("Column index {} out of range", index)))
    }
}

/// Router that always answers with the same route.
pub struct StaticRouter {
    route: RouteResult,
}

impl StaticRouter {
    pub fn new(route: RouteResult) -> Self {
        Self { route }
    }
}

impl ShardingRouter for StaticRouter {
    fn route(&self, _sql: &str, _parameters: &[Value]) -> Result<RouteResult, ProxyError> {
        Ok(self.route.clone())
    }
}

/// Sends reads to the slave and everything else to the master.
pub struct ReadWriteSplitRouter {
    pub master: String,
    pub slave: String,
}

impl MasterSlaveRouter for ReadWriteSplitRouter {
    fn route(&self, sql_type: SqlType) -> String {
        if sql_type == SqlType::Dql {
            self.slave.clone()
        } else {
            self.master.clone()
        }
    }
}

/// Classifier that returns a fixed statement for any SQL.
pub struct StaticJudge {
    statement: SqlStatement,
}

impl StaticJudge {
    pub fn new(statement: SqlStatement) -> Self {
        Self { statement }
    }
}

impl StatementJudge for StaticJudge {
    fn judge(&self, _sql: &str) -> Result<SqlStatement, ProxyError> {
        Ok(self.statement.clone())
    }
}
