use mosaic_core::{
    BinaryRowPacket, ColumnType, DatabasePacket, EofPacket, MergeError, ProxyError, Value,
};
use mosaic_db::ResourceSet;
use mosaic_merge::MergedResult;
use tracing::{debug, warn};

/// Where a command's row stream stands.
pub enum CursorState {
    /// The command produced no merged rows.
    Inactive,
    Active(Box<dyn MergedResult>),
    /// The last row has been handed out; the terminator is still pending.
    Exhausted,
    Closed,
}

impl std::fmt::Debug for CursorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CursorState::Inactive => "Inactive",
            CursorState::Active(_) => "Active",
            CursorState::Exhausted => "Exhausted",
            CursorState::Closed => "Closed",
        })
    }
}

/// Pull-based row stream of one command.
///
/// Owns the command's backend resources and releases them the moment the
/// stream can no longer produce rows. Sequence ids continue from the last
/// packet of the command's head.
#[derive(Debug)]
pub struct StreamingCursor {
    sequence_id: u32,
    column_types: Vec<ColumnType>,
    state: CursorState,
    resources: ResourceSet,
}

impl Default for StreamingCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingCursor {
    pub fn new() -> Self {
        Self {
            sequence_id: 0,
            column_types: Vec::new(),
            state: CursorState::Inactive,
            resources: ResourceSet::new(),
        }
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceSet {
        &mut self.resources
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    pub fn column_count(&self) -> usize {
        self.column_types.len()
    }

    /// Starts streaming `merged`. `sequence_id` is the id of the last head packet sent.
    pub fn activate(
        &mut self,
        merged: Box<dyn MergedResult>,
        column_types: Vec<ColumnType>,
        sequence_id: u32,
    ) {
        self.column_types = column_types;
        self.sequence_id = sequence_id;
        self.state = CursorState::Active(merged);
    }

    /// Advances to the next row.
    ///
    /// Returns `true` once more after the last row so that the following
    /// [`next_row_packet`](Self::next_row_packet) emits the terminator.
    pub async fn has_more_rows(&mut self) -> Result<bool, ProxyError> {
        let advanced = match &mut self.state {
            CursorState::Active(merged) => merged.next().await,
            _ => {
                self.close();
                return Ok(false);
            }
        };
        match advanced {
            Ok(true) => Ok(true),
            Ok(false) => {
                debug!(sequence_id = self.sequence_id, "Merged rows exhausted");
                self.resources.release();
                self.state = CursorState::Exhausted;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Failed to advance merged rows");
                self.close();
                Err(e.into())
            }
        }
    }

    /// The packet for the current position: a row, an in-line error, or the terminator.
    pub fn next_row_packet(&mut self) -> DatabasePacket {
        self.sequence_id = self.sequence_id.wrapping_add(1);
        let sequence_id = self.sequence_id;
        if matches!(self.state, CursorState::Exhausted) {
            self.state = CursorState::Closed;
            return EofPacket::new(sequence_id).into();
        }
        match &self.state {
            CursorState::Active(merged) => match self.read_row(merged.as_ref()) {
                Ok(values) => BinaryRowPacket {
                    sequence_id,
                    values,
                    column_types: self.column_types.clone(),
                }
                .into(),
                Err(e) => {
                    warn!(error = %e, sequence_id, "Failed to read merged row");
                    e.to_err_packet(sequence_id).into()
                }
            },
            _ => EofPacket::new(sequence_id).into(),
        }
    }

    fn read_row(&self, merged: &dyn MergedResult) -> Result<Vec<Value>, MergeError> {
        self.column_types
            .iter()
            .enumerate()
            .map(|(i, column_type)| merged.value(i + 1, *column_type))
            .collect()
    }

    /// Releases the resources and ends the stream. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.resources.release();
        self.state = CursorState::Closed;
    }
}
