use mosaic::prelude::*;
use mosaic_db::test_util::{MockCounters, MockDataSource, StaticRouter};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Proxy {
    pub context: Arc<ProxyContext>,
    pub counters: HashMap<String, Arc<MockCounters>>,
}

impl Proxy {
    pub fn counters(&self, data_source: &str) -> &MockCounters {
        &self.counters[data_source]
    }

    /// Every connection and statement handed out was closed exactly once.
    pub fn assert_all_released(&self) {
        for (name, counters) in &self.counters {
            assert_eq!(
                counters.connections_closed(),
                counters.connections_opened(),
                "connections of {}",
                name
            );
            assert_eq!(
                counters.statements_closed(),
                counters.statements_prepared(),
                "statements of {}",
                name
            );
        }
    }

    pub fn handler(&self, sql: &str, parameters: Vec<PreparedStatementParameter>) -> StatementExecuteHandler {
        let statement_id = self.context.statements().register(sql);
        StatementExecuteHandler::new(self.context.clone(), statement_id, parameters)
    }
}

pub fn sharded(
    config: ProxyConfig,
    route: RouteResult,
    sources: HashMap<&str, MockDataSource>,
) -> Proxy {
    let mut builder = ProxyContext::builder(config).sharding(Arc::new(StaticRouter::new(route)));
    let mut counters = HashMap::new();
    for (name, source) in sources {
        counters.insert(name.to_string(), source.counters());
        builder = builder.data_source(name, source.into_source());
    }
    Proxy {
        context: builder.build().unwrap(),
        counters,
    }
}

/// One unit per data source, each with its own physical table.
pub fn units(data_sources: &[&str], table_sql: &str) -> Vec<ExecutionUnit> {
    data_sources
        .iter()
        .enumerate()
        .map(|(i, ds)| ExecutionUnit::new(*ds, table_sql.replace("t_order", &format!("t_order_{}", i))))
        .collect()
}

/// Pulls every remaining packet of the row stream.
pub async fn drain(handler: &mut StatementExecuteHandler) -> Vec<DatabasePacket> {
    let mut packets = Vec::new();
    while handler.has_more_rows().await.unwrap() {
        packets.push(handler.next_row_packet());
    }
    packets
}

pub fn ids(packets: &[DatabasePacket]) -> Vec<i64> {
    packets
        .iter()
        .filter_map(|p| match p {
            DatabasePacket::BinaryRow(row) => match row.values[0] {
                Value::Int(id) => Some(id),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
