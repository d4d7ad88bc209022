use crate::common::drain;
use anyhow::Result;
use mosaic::prelude::*;
use mosaic_db::test_util::{row, MockDataSource, ReadWriteSplitRouter, StaticJudge, TestColumns};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn context(statement: SqlStatement, master: &MockDataSource, slave: &MockDataSource) -> Arc<ProxyContext> {
    ProxyContext::builder(ProxyConfig::default())
        .master_slave(
            Arc::new(ReadWriteSplitRouter {
                master: "master".into(),
                slave: "slave_0".into(),
            }),
            Arc::new(StaticJudge::new(statement)),
        )
        .data_source("master", master.clone().into_source())
        .data_source("slave_0", slave.clone().into_source())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_reads_go_to_the_slave() -> Result<()> {
    let master = MockDataSource::rows(TestColumns::id_name(), vec![]);
    let slave = MockDataSource::rows(TestColumns::id_name(), vec![row(1, "NEW")]);
    let context = context(SqlStatement::new(SqlType::Dql), &master, &slave);
    let sql = "SELECT order_id, status FROM t_order WHERE order_id = ?";
    let id = context.statements().register(sql);
    let mut handler = StatementExecuteHandler::new(
        context,
        id,
        vec![PreparedStatementParameter::new(ColumnType::LongLong, 1i64)],
    );

    let head = handler.execute().await;
    assert!(matches!(head.head(), Some(DatabasePacket::FieldCount(f)) if f.column_count == 2));
    let packets = drain(&mut handler).await;
    assert_eq!(packets.len(), 2);

    // the unrewritten SQL runs on exactly one data source
    assert_eq!(slave.counters().last_sql().as_deref(), Some(sql));
    assert_eq!(slave.counters().last_parameters(), vec![Value::Int(1)]);
    assert!(master.counters().untouched());
    assert_eq!(slave.counters().connections_closed(), 1);
    Ok(())
}

#[tokio::test]
async fn test_writes_go_to_the_master() -> Result<()> {
    let master = MockDataSource::update(4);
    let slave = MockDataSource::update(0);
    let context = context(SqlStatement::new(SqlType::Dml), &master, &slave);
    let id = context.statements().register("DELETE FROM t_order WHERE status = 'CANCELLED'");
    let mut handler = StatementExecuteHandler::new(context, id, vec![]);

    let packets = handler.execute().await;
    assert_eq!(packets.into_packets(), vec![DatabasePacket::Ok(OkPacket::new(1, 4, 0))]);
    assert!(slave.counters().untouched());
    assert!(!handler.has_more_rows().await?);
    assert_eq!(master.counters().connections_closed(), 1);
    Ok(())
}

#[tokio::test]
async fn test_ddl_under_xa_is_rejected_before_routing_to_a_backend() -> Result<()> {
    let master = MockDataSource::update(0);
    let slave = MockDataSource::update(0);
    let context = context(SqlStatement::new(SqlType::Ddl), &master, &slave);
    context.set_transaction_mode(TransactionMode::Xa);
    let id = context.statements().register("TRUNCATE TABLE t_order");
    let mut handler = StatementExecuteHandler::new(context, id, vec![]);

    let packets = handler.execute().await;
    assert!(matches!(packets.head(), Some(DatabasePacket::Err(err)) if err.message.contains("XA")));
    assert!(master.counters().untouched());
    Ok(())
}
