use crate::executor::utils::metrics::ExecutorMetrics;
use crate::executor::ShardResponse;
use crate::preparer::PreparedUnit;
use mosaic_core::{
    ColumnDefinitionPacket, CommandResponsePackets, EofPacket, FieldCountPacket, OkPacket,
    ProxyError, StatementOutcome, Value,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Executes one prepared unit and captures its outcome as packets.
///
/// A SQL error from the backend is part of the response, not a failure of the
/// task. Only rejection by the pool or cancellation fail the task.
pub(crate) async fn execute_unit(
    unit: PreparedUnit,
    parameters: Arc<[Value]>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    metrics: Arc<ExecutorMetrics>,
) -> Result<ShardResponse, ProxyError> {
    let _permit = tokio::select! {
        _ = cancel.cancelled() => return Err(cancelled(&unit)),
        permit = permits.acquire_owned() => permit
            .map_err(|_| ProxyError::Infrastructure("worker pool rejected the task: pool is closed".into()))?,
    };

    let start = Instant::now();
    let outcome = tokio::select! {
        _ = cancel.cancelled() => return Err(cancelled(&unit)),
        outcome = unit.statement.execute(&parameters) => outcome,
    };

    let response = match outcome {
        Ok(StatementOutcome::Update {
            affected_rows,
            last_insert_id,
        }) => {
            metrics.update_success(start.elapsed().as_micros() as usize);
            debug!(data_source = %unit.data_source, affected_rows, "Shard update finished");
            ShardResponse {
                data_source: unit.data_source,
                packets: OkPacket::new(1, affected_rows, last_insert_id).into(),
                rows: None,
            }
        }
        Ok(StatementOutcome::Rows { columns, cursor }) => {
            metrics.update_success(start.elapsed().as_micros() as usize);
            debug!(data_source = %unit.data_source, columns = columns.len(), "Shard query opened");
            let mut packets = CommandResponsePackets::new();
            let mut sequence_id = 1;
            packets.add_packet(FieldCountPacket {
                sequence_id,
                column_count: columns.len(),
            });
            for column in columns {
                sequence_id += 1;
                packets.add_packet(ColumnDefinitionPacket {
                    sequence_id,
                    column,
                });
            }
            packets.add_packet(EofPacket::new(sequence_id + 1));
            ShardResponse {
                data_source: unit.data_source,
                packets,
                rows: Some(cursor),
            }
        }
        Err(e) => {
            metrics.update_failure();
            warn!(data_source = %unit.data_source, error = %e, "Shard returned an error");
            ShardResponse {
                data_source: unit.data_source,
                packets: e.to_err_packet(1).into(),
                rows: None,
            }
        }
    };
    Ok(response)
}

fn cancelled(unit: &PreparedUnit) -> ProxyError {
    ProxyError::Infrastructure(format!("task on `{}` was cancelled", unit.data_source))
}
