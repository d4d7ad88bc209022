use crate::common::{sharded, units};
use anyhow::Result;
use maplit::hashmap;
use mosaic::prelude::*;
use mosaic_db::test_util::MockDataSource;
use pretty_assertions::assert_eq;
use std::time::Duration;

const UPDATE: &str = "UPDATE t_order SET status = 'PAID'";

fn err_of(packets: &CommandResponsePackets) -> &ErrPacket {
    match packets.head() {
        Some(DatabasePacket::Err(err)) => err,
        other => panic!("unexpected head {:?}", other),
    }
}

#[tokio::test]
async fn test_panicking_shard_fails_the_command() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_1", "ds_2"], UPDATE)),
        hashmap! {
            "ds_0" => MockDataSource::update(1),
            "ds_1" => MockDataSource::update(1).delay(Duration::from_millis(10)).panic(),
            "ds_2" => MockDataSource::update(1).hang(),
        },
    );
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    let err = err_of(&packets);
    assert_eq!(err.sequence_id, 1);
    assert_eq!(err.error_code, 0);
    assert!(err.message.contains("panicked"));
    assert_eq!(packets.len(), 1);

    // the hanging sibling was cancelled and everything was closed
    assert_eq!(proxy.counters("ds_2").executions_dropped(), 1);
    proxy.assert_all_released();
    assert!(!handler.has_more_rows().await?);
    assert_eq!(handler.cursor().resources().releases(), 1);
    Ok(())
}

#[tokio::test]
async fn test_gather_deadline() -> Result<()> {
    let mut config = ProxyConfig::default();
    config.executor.query.query_timeout = Some(Duration::from_millis(50));
    let proxy = sharded(
        config,
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_1"], UPDATE)),
        hashmap! {
            "ds_0" => MockDataSource::update(1),
            "ds_1" => MockDataSource::update(1).hang(),
        },
    );
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    assert!(err_of(&packets).message.contains("did not finish"));
    assert_eq!(proxy.counters("ds_1").executions_finished(), 0);
    proxy.assert_all_released();
    Ok(())
}

#[tokio::test]
async fn test_prepare_failure_keeps_backend_code() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_1"], UPDATE)),
        hashmap! {
            "ds_0" => MockDataSource::update(1),
            "ds_1" => MockDataSource::prepare_error(BackendError::new(1064, "42000", "You have an error in your SQL syntax")),
        },
    );
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    let err = err_of(&packets);
    assert_eq!((err.error_code, err.sql_state.as_str()), (1064, "42000"));
    assert!(err.message.contains("ds_1"));
    // nothing was executed, but the first shard's statement and both connections were closed
    assert_eq!(proxy.counters("ds_0").executions_started(), 0);
    assert_eq!(proxy.counters("ds_0").statements_closed(), 1);
    assert_eq!(proxy.counters("ds_1").connections_closed(), 1);
    proxy.assert_all_released();
    Ok(())
}

#[tokio::test]
async fn test_unavailable_data_source() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0", "ds_9"], UPDATE)),
        hashmap! { "ds_0" => MockDataSource::update(1) },
    );
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    assert!(err_of(&packets).message.contains("ds_9"));
    proxy.assert_all_released();
    assert_eq!(proxy.counters("ds_0").connections_closed(), 1);
    Ok(())
}

#[tokio::test]
async fn test_refused_connection() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0"], UPDATE)),
        hashmap! { "ds_0" => MockDataSource::unavailable() },
    );
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    let err = err_of(&packets);
    assert_eq!(err.error_code, 1040);
    assert_eq!(err.sql_state, "08004");
    assert!(err.message.contains("Too many connections"));
    assert!(proxy.counters("ds_0").untouched());
    Ok(())
}

#[tokio::test]
async fn test_closed_pool_rejects_commands() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dml), units(&["ds_0"], UPDATE)),
        hashmap! { "ds_0" => MockDataSource::update(1) },
    );
    proxy.context.executor().pool().close();
    let mut handler = proxy.handler(UPDATE, vec![]);

    let packets = handler.execute().await;
    assert!(err_of(&packets).message.contains("rejected"));
    proxy.assert_all_released();
    Ok(())
}
