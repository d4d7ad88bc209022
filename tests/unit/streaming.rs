use crate::common::{drain, ids, sharded, units};
use anyhow::Result;
use maplit::hashmap;
use mosaic::prelude::*;
use mosaic_db::test_util::{row, MockDataSource, TestColumns};
use pretty_assertions::assert_eq;

const SELECT: &str = "SELECT order_id, status FROM t_order";

fn query_source(rows: Vec<Vec<Value>>) -> MockDataSource {
    MockDataSource::rows(TestColumns::id_name(), rows)
}

#[tokio::test]
async fn test_rows_stream_with_contiguous_sequence_ids() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), units(&["ds_0", "ds_1"], SELECT)),
        hashmap! {
            "ds_0" => query_source(vec![row(1, "NEW"), row(2, "PAID")]),
            "ds_1" => query_source(vec![row(3, "NEW")]),
        },
    );
    let mut handler = proxy.handler(SELECT, vec![]);

    let head = handler.execute().await;
    let head_ids: Vec<u32> = head.packets().iter().map(|p| p.sequence_id()).collect();
    assert_eq!(head_ids, vec![1, 2, 3, 4]);
    assert!(matches!(head.packets()[3], DatabasePacket::Eof(_)));

    let mut rows = Vec::new();
    for _ in 0..3 {
        assert!(handler.has_more_rows().await?);
        rows.push(handler.next_row_packet());
    }
    assert_eq!(ids(&rows), vec![1, 2, 3]);
    assert_eq!(proxy.counters("ds_0").connections_closed(), 0);

    // the pull that finds no more rows releases the backends but still reports a packet
    assert!(handler.has_more_rows().await?);
    proxy.assert_all_released();
    let eof = handler.next_row_packet();
    assert_eq!(eof, DatabasePacket::Eof(EofPacket::new(8)));

    assert!(!handler.has_more_rows().await?);
    let sequence: Vec<u32> = rows.iter().map(|p| p.sequence_id()).collect();
    assert_eq!(sequence, vec![5, 6, 7]);
    assert_eq!(handler.cursor().resources().releases(), 1);
    assert_eq!(proxy.counters("ds_0").connections_closed(), 1);
    Ok(())
}

#[tokio::test]
async fn test_row_packets_carry_typed_values() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), units(&["ds_0"], SELECT)),
        hashmap! { "ds_0" => query_source(vec![vec![Value::from("41"), Value::from("NEW")]]) },
    );
    let mut handler = proxy.handler(SELECT, vec![]);
    handler.execute().await;

    let packets = drain(&mut handler).await;
    assert_eq!(
        packets[0],
        DatabasePacket::BinaryRow(BinaryRowPacket {
            sequence_id: 5,
            values: vec![Value::Int(41), Value::from("NEW")],
            column_types: vec![ColumnType::LongLong, ColumnType::VarString],
        })
    );
    assert_eq!(packets.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_ordered_and_paginated_query() -> Result<()> {
    let statement = SqlStatement::new(SqlType::Dql)
        .order_by(OrderItem::desc(1))
        .limit(1, Some(3));
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(statement, units(&["ds_0", "ds_1", "ds_2"], SELECT)),
        hashmap! {
            "ds_0" => query_source(vec![row(9, "a"), row(4, "b"), row(1, "c")]),
            "ds_1" => query_source(vec![row(8, "d"), row(7, "e")]),
            "ds_2" => query_source(vec![row(6, "f"), row(2, "g")]),
        },
    );
    let mut handler = proxy.handler(SELECT, vec![]);
    handler.execute().await;

    let packets = drain(&mut handler).await;
    assert_eq!(ids(&packets), vec![8, 7, 6]);
    assert!(matches!(packets.last(), Some(DatabasePacket::Eof(eof)) if eof.sequence_id == 8));
    proxy.assert_all_released();
    Ok(())
}

#[tokio::test]
async fn test_show_statements_are_merged_like_queries() -> Result<()> {
    let show = "SHOW TABLES";
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dal), units(&["ds_0", "ds_1"], show)),
        hashmap! {
            "ds_0" => query_source(vec![row(1, "t_order_0")]),
            "ds_1" => query_source(vec![row(2, "t_order_1")]),
        },
    );
    let mut handler = proxy.handler(show, vec![]);
    handler.execute().await;
    assert_eq!(ids(&drain(&mut handler).await), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn test_unreadable_value_is_an_inline_error() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), units(&["ds_0"], SELECT)),
        hashmap! {
            "ds_0" => query_source(vec![row(1, "NEW"), vec![Value::from("oops"), Value::from("PAID")], row(3, "NEW")]),
        },
    );
    let mut handler = proxy.handler(SELECT, vec![]);
    handler.execute().await;

    let packets = drain(&mut handler).await;
    assert_eq!(packets.len(), 4);
    match &packets[1] {
        DatabasePacket::Err(err) => {
            assert_eq!(err.sequence_id, 6);
            assert_eq!(err.sql_state, "22018");
        }
        other => panic!("unexpected packet {:?}", other),
    }
    assert_eq!(ids(&packets), vec![1, 3]);
    let sequence: Vec<u32> = packets.iter().map(|p| p.sequence_id()).collect();
    assert_eq!(sequence, vec![5, 6, 7, 8]);
    Ok(())
}

#[tokio::test]
async fn test_cursor_failure_ends_the_stream() -> Result<()> {
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(SqlStatement::new(SqlType::Dql), units(&["ds_0", "ds_1"], SELECT)),
        hashmap! {
            "ds_0" => query_source(vec![row(1, "NEW"), row(2, "NEW")]).fail_cursor_at(1),
            "ds_1" => query_source(vec![row(3, "NEW")]),
        },
    );
    let mut handler = proxy.handler(SELECT, vec![]);
    handler.execute().await;

    assert!(handler.has_more_rows().await?);
    handler.next_row_packet();
    let err = handler.has_more_rows().await.unwrap_err();
    assert!(matches!(err, ProxyError::Merge(ref e) if e.code == 2013));
    proxy.assert_all_released();
    assert!(matches!(handler.cursor().state(), CursorState::Closed));
    assert!(!handler.has_more_rows().await?);
    assert_eq!(handler.cursor().resources().releases(), 1);
    Ok(())
}

#[tokio::test]
async fn test_merge_failure_releases_resources() -> Result<()> {
    let statement = SqlStatement::new(SqlType::Dql).order_by(OrderItem::asc(3));
    let proxy = sharded(
        ProxyConfig::default(),
        RouteResult::new(statement, units(&["ds_0", "ds_1"], SELECT)),
        hashmap! {
            "ds_0" => query_source(vec![row(1, "NEW")]),
            "ds_1" => query_source(vec![row(2, "NEW")]),
        },
    );
    let mut handler = proxy.handler(SELECT, vec![]);

    let packets = handler.execute().await;
    match packets.head() {
        Some(DatabasePacket::Err(err)) => assert!(err.message.contains("out of range")),
        other => panic!("unexpected head {:?}", other),
    }
    assert!(matches!(handler.cursor().state(), CursorState::Inactive));
    assert!(!handler.has_more_rows().await?);
    proxy.assert_all_released();
    Ok(())
}
