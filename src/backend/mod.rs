//! Command handlers that sit between the protocol layer and the shards.

pub mod cursor;
pub mod merge;

use crate::context::{ProxyContext, RoutingMode};
use async_trait::async_trait;
use cursor::StreamingCursor;
use mosaic_core::{
    CommandResponsePackets, DatabasePacket, ExecutionUnit, OkPacket, PreparedStatementParameter,
    ProxyError, RouteResult, Value,
};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// What the protocol layer drives for one command: one response, then rows on demand.
#[async_trait]
pub trait BackendHandler: Send {
    /// Runs the command. Never fails: errors are answered with an error packet.
    async fn execute(&mut self) -> CommandResponsePackets;

    /// Advances the row stream. `false` means nothing more is to be sent.
    async fn has_more_rows(&mut self) -> Result<bool, ProxyError>;

    fn next_row_packet(&mut self) -> DatabasePacket;
}

/// Executes one prepared statement across its shards.
pub struct StatementExecuteHandler {
    context: Arc<ProxyContext>,
    statement_id: u32,
    parameters: Vec<PreparedStatementParameter>,
    command_id: Uuid,
    cursor: StreamingCursor,
}

impl StatementExecuteHandler {
    pub fn new(
        context: Arc<ProxyContext>,
        statement_id: u32,
        parameters: Vec<PreparedStatementParameter>,
    ) -> Self {
        Self {
            context,
            statement_id,
            parameters,
            command_id: Uuid::new_v4(),
            cursor: StreamingCursor::new(),
        }
    }

    pub fn command_id(&self) -> Uuid {
        self.command_id
    }

    pub fn cursor(&self) -> &StreamingCursor {
        &self.cursor
    }

    async fn run(&mut self) -> Result<CommandResponsePackets, ProxyError> {
        let context = self.context.clone();
        let sql = context
            .statements()
            .sql(self.statement_id)
            .ok_or(ProxyError::UnknownStatement(self.statement_id))?;
        let values = PreparedStatementParameter::values(&self.parameters);

        let route = route(context.routing(), &sql, &values)?;
        if route.is_empty() {
            debug!("Route is empty, nothing to execute");
            return Ok(OkPacket::new(1, 0, 0).into());
        }
        context.policy().check(route.statement.sql_type)?;
        if context.show_sql() {
            for unit in &route.units {
                info!(logic_sql = %sql, data_source = %unit.data_source, actual_sql = %unit.sql, "Routed SQL");
            }
        }

        let mut units = Vec::with_capacity(route.units.len());
        for unit in &route.units {
            let prepared = context
                .preparer()
                .prepare(self.cursor.resources_mut(), &unit.data_source, &unit.sql, &route.statement)
                .await?;
            units.push(prepared);
        }
        let responses = context.executor().execute(units, &values).await?;
        Ok(merge::merge_responses(
            &route.statement,
            responses,
            context.merge_engine(),
            &mut self.cursor,
        )
        .await)
    }
}

fn route(routing: &RoutingMode, sql: &str, values: &[Value]) -> Result<RouteResult, ProxyError> {
    match routing {
        RoutingMode::Sharding(router) => router.route(sql, values),
        RoutingMode::MasterSlave { router, judge } => {
            let statement = judge.judge(sql)?;
            let data_source = router.route(statement.sql_type);
            Ok(RouteResult::new(statement, vec![ExecutionUnit::new(data_source, sql)]))
        }
    }
}

#[async_trait]
impl BackendHandler for StatementExecuteHandler {
    async fn execute(&mut self) -> CommandResponsePackets {
        let span = info_span!(
            "statement_execute",
            command_id = %self.command_id,
            statement_id = self.statement_id
        );
        match self.run().instrument(span.clone()).await {
            Ok(packets) => packets,
            Err(e) => {
                span.in_scope(|| warn!(error = %e, "Statement execution failed"));
                self.cursor.close();
                e.to_err_packet(1).into()
            }
        }
    }

    async fn has_more_rows(&mut self) -> Result<bool, ProxyError> {
        self.cursor.has_more_rows().await
    }

    fn next_row_packet(&mut self) -> DatabasePacket {
        self.cursor.next_row_packet()
    }
}
