use crate::common::{sharded, units};
use anyhow::Result;
use futures::future::join_all;
use maplit::hashmap;
use mosaic::prelude::*;
use mosaic_db::test_util::MockDataSource;
use pretty_assertions::assert_eq;

const UPDATE: &str = "UPDATE t_order SET status = ? WHERE user_id = ?";

fn update_parameters() -> Vec<PreparedStatementParameter> {
    vec![
        PreparedStatementParameter::new(ColumnType::VarString, "PAID"),
        PreparedStatementParameter::new(ColumnType::LongLong, 7i64),
    ]
}

#[tokio::test]
async fn test_update_sums_affected_rows() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_1", "ds_2"], UPDATE)),
        hashmap! {
            "ds_0" => MockDataSource::update(2),
            "ds_1" => MockDataSource::update(0),
            "ds_2" => MockDataSource::update(5),
        },
    );
    let mut handler = proxy.handler(UPDATE, update_parameters());

    let packets = handler.execute().await;
    assert_eq!(packets.into_packets(), vec![DatabasePacket::Ok(OkPacket::new(1, 7, 0))]);
    assert!(!handler.has_more_rows().await?);
    assert_eq!(
        proxy.counters("ds_1").last_sql().as_deref(),
        Some("UPDATE t_order_1 SET status = ? WHERE user_id = ?")
    );
    proxy.assert_all_released();
    assert_eq!(handler.cursor().resources().releases(), 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_route_is_a_noop() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), vec![]),
        hashmap! { "ds_0" => MockDataSource::rows(vec![], vec![]) },
    );
    let mut handler = proxy.handler("SELECT * FROM t_order WHERE 1 = 0", vec![]);

    let packets = handler.execute().await;
    assert_eq!(packets.into_packets(), vec![DatabasePacket::Ok(OkPacket::new(1, 0, 0))]);
    assert!(!handler.has_more_rows().await?);
    assert!(proxy.counters("ds_0").untouched());
    Ok(())
}

#[tokio::test]
async fn test_empty_route_wins_over_xa_policy() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Ddl), vec![]),
        hashmap! {},
    );
    proxy.context.set_transaction_mode(TransactionMode::Xa);
    let mut handler = proxy.handler("DROP TABLE t_order", vec![]);

    let packets = handler.execute().await;
    assert!(matches!(packets.head(), Some(DatabasePacket::Ok(ok)) if ok.affected_rows == 0));
    Ok(())
}

#[tokio::test]
async fn test_shard_error_is_the_result() -> Result<()> {
    let select = "SELECT * FROM t_order";
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), units(&["ds_0", "ds_1"], select)),
        hashmap! {
            "ds_0" => MockDataSource::rows(mosaic_db::test_util::TestColumns::id_name(), vec![]),
            "ds_1" => MockDataSource::sql_error(BackendError::new(1146, "42S02", "Table 't_order_1' doesn't exist")),
        },
    );
    let mut handler = proxy.handler(select, vec![]);

    let packets = handler.execute().await;
    assert_eq!(
        packets.into_packets(),
        vec![DatabasePacket::Err(ErrPacket::new(1, 1146, "42S02", "Table 't_order_1' doesn't exist"))]
    );
    assert!(!handler.has_more_rows().await?);
    proxy.assert_all_released();
    Ok(())
}

#[tokio::test]
async fn test_ddl_rejected_under_xa() -> Result<()> {
    let ddl = "ALTER TABLE t_order ADD COLUMN remark VARCHAR(32)";
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Ddl), units(&["ds_0", "ds_1"], ddl)),
        hashmap! {
            "ds_0" => MockDataSource::update(0),
            "ds_1" => MockDataSource::update(0),
        },
    );
    proxy.context.set_transaction_mode(TransactionMode::Xa);
    let mut handler = proxy.handler(ddl, vec![]);

    let packets = handler.execute().await;
    match packets.head() {
        Some(DatabasePacket::Err(err)) => {
            assert_eq!(err.error_code, 0);
            assert_eq!(err.message, "DDL command can't execute in XA transaction mode");
        }
        other => panic!("unexpected head {:?}", other),
    }
    assert!(proxy.counters("ds_0").untouched());
    assert!(proxy.counters("ds_1").untouched());

    // the same statement goes through once the mode is switched back
    proxy.context.set_transaction_mode(TransactionMode::Local);
    let mut handler = proxy.handler(ddl, vec![]);
    assert!(matches!(handler.execute().await.head(), Some(DatabasePacket::Ok(_))));
    Ok(())
}

#[tokio::test]
async fn test_insert_requests_generated_keys() -> Result<()> {
    let insert = "INSERT INTO t_order (user_id, status) VALUES (?, ?)";
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::insert(), units(&["ds_0", "ds_1"], insert)),
        hashmap! {
            "ds_0" => MockDataSource::insert(1, 0),
            "ds_1" => MockDataSource::insert(1, 1001),
        },
    );
    let mut handler = proxy.handler(insert, update_parameters());

    let packets = handler.execute().await;
    assert_eq!(packets.into_packets(), vec![DatabasePacket::Ok(OkPacket::new(1, 2, 1001))]);
    assert!(proxy.counters("ds_0").generated_keys_requested());
    assert!(proxy.counters("ds_1").generated_keys_requested());
    Ok(())
}

#[tokio::test]
async fn test_concurrent_commands_share_the_pool() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_1"], UPDATE)),
        hashmap! {
            "ds_0" => MockDataSource::update(1),
            "ds_1" => MockDataSource::update(2),
        },
    );
    let mut handlers: Vec<_> = (0..10).map(|_| proxy.handler(UPDATE, update_parameters())).collect();

    let responses = join_all(handlers.iter_mut().map(|h| h.execute())).await;
    for packets in responses {
        assert!(matches!(packets.head(), Some(DatabasePacket::Ok(ok)) if ok.affected_rows == 3));
    }
    let metrics = proxy.context.executor().pool().metrics();
    assert_eq!(metrics.total_tasks(), 20);
    assert_eq!(proxy.context.executor().pool().busy(), 0);
    assert_eq!(proxy.counters("ds_0").connections_closed(), 0);

    for handler in handlers.iter_mut() {
        assert!(!handler.has_more_rows().await?);
    }
    proxy.assert_all_released();
    Ok(())
}
