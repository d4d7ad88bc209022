use crate::backend::cursor::StreamingCursor;
use mosaic_core::{
    ColumnDefinitionPacket, CommandResponsePackets, DatabasePacket, EofPacket, FieldCountPacket,
    MergeError, OkPacket, SqlStatement, SqlType,
};
use mosaic_db::ShardResponse;
use mosaic_merge::{MergeEngine, QueryResult, ShardQueryResult};
use tracing::{debug, warn};

/// Reconciles the shard responses of one command into the single response the client sees.
///
/// Row-producing statements hand their merged stream to `cursor`; everything
/// else is answered entirely by the returned packets.
pub async fn merge_responses(
    statement: &SqlStatement,
    mut responses: Vec<ShardResponse>,
    engine: &dyn MergeEngine,
    cursor: &mut StreamingCursor,
) -> CommandResponsePackets {
    if let Some((data_source, err)) = responses.iter().find_map(|r| match r.packets.head() {
        Some(DatabasePacket::Err(err)) => Some((&r.data_source, err)),
        _ => None,
    }) {
        debug!(%data_source, code = err.error_code, "Shard error is the command result");
        return err.clone().into();
    }
    if responses.is_empty() {
        return OkPacket::new(1, 0, 0).into();
    }

    match statement.sql_type {
        SqlType::Dml => merge_updates(&responses),
        // a row-type command the backend answered with OK
        sql_type if sql_type.is_row_producing() && !produced_rows(&responses[0]) => {
            responses.swap_remove(0).packets
        }
        sql_type if sql_type.is_row_producing() => {
            match merge_rows(statement, responses, engine, cursor).await {
                Ok(head) => head,
                Err(e) => {
                    warn!(error = %e, "Failed to merge shard results");
                    e.to_err_packet(1).into()
                }
            }
        }
        _ => responses.swap_remove(0).packets,
    }
}

fn produced_rows(response: &ShardResponse) -> bool {
    !matches!(response.packets.head(), Some(DatabasePacket::Ok(_)))
}

fn merge_updates(responses: &[ShardResponse]) -> CommandResponsePackets {
    let (affected_rows, last_insert_id) = responses
        .iter()
        .filter_map(|r| match r.packets.head() {
            Some(DatabasePacket::Ok(ok)) => Some((ok.affected_rows, ok.last_insert_id)),
            _ => None,
        })
        .fold((0u64, 0u64), |(affected, first_id), (rows, id)| {
            (affected + rows, if first_id == 0 { id } else { first_id })
        });
    OkPacket::new(1, affected_rows, last_insert_id).into()
}

async fn merge_rows(
    statement: &SqlStatement,
    responses: Vec<ShardResponse>,
    engine: &dyn MergeEngine,
    cursor: &mut StreamingCursor,
) -> Result<CommandResponsePackets, MergeError> {
    // every shard is assumed to share the first shard's columns
    let columns: Vec<_> = responses[0].packets.column_definitions().cloned().collect();
    let mut results: Vec<Box<dyn QueryResult>> = Vec::with_capacity(responses.len());
    for response in responses {
        let rows = response.rows.ok_or_else(|| {
            MergeError::new(format!("Shard `{}` returned no result set", response.data_source))
        })?;
        results.push(Box::new(ShardQueryResult::new(
            response.data_source,
            &response.packets,
            rows,
        )));
    }
    let merged = engine.merge(results, statement).await?;

    let mut head = CommandResponsePackets::new();
    let mut sequence_id = 1;
    head.add_packet(FieldCountPacket {
        sequence_id,
        column_count: columns.len(),
    });
    let column_types = columns.iter().map(|c| c.column_type).collect();
    for column in columns {
        sequence_id += 1;
        head.add_packet(ColumnDefinitionPacket { sequence_id, column });
    }
    sequence_id += 1;
    head.add_packet(EofPacket::new(sequence_id));
    cursor.activate(merged, column_types, sequence_id);
    Ok(head)
}
