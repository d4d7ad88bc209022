//! Protocol packets produced by the execution core.
//!
//! The core only builds and sequences packets; byte-level encoding belongs to
//! the protocol layer.

use crate::types::{ColumnDefinition, ColumnType, Value};
use serde::{Deserialize, Serialize};

/// Server status flags stamped on OK and EOF packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFlag {
    Autocommit = 0x0002,
}

impl StatusFlag {
    pub fn value(self) -> u16 {
        self as u16
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkPacket {
    pub sequence_id: u32,
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: u16,
    pub warnings: u16,
    pub info: String,
}

impl OkPacket {
    pub fn new(sequence_id: u32, affected_rows: u64, last_insert_id: u64) -> Self {
        Self {
            sequence_id,
            affected_rows,
            last_insert_id,
            status_flags: StatusFlag::Autocommit.value(),
            warnings: 0,
            info: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrPacket {
    pub sequence_id: u32,
    pub error_code: u16,
    pub sql_state: String,
    pub message: String,
}

impl ErrPacket {
    pub fn new(sequence_id: u32, error_code: u16, sql_state: &str, message: &str) -> Self {
        Self {
            sequence_id,
            error_code,
            sql_state: sql_state.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCountPacket {
    pub sequence_id: u32,
    pub column_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinitionPacket {
    pub sequence_id: u32,
    pub column: ColumnDefinition,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EofPacket {
    pub sequence_id: u32,
    pub warnings: u16,
    pub status_flags: u16,
}

impl EofPacket {
    pub fn new(sequence_id: u32) -> Self {
        Self {
            sequence_id,
            warnings: 0,
            status_flags: StatusFlag::Autocommit.value(),
        }
    }
}

/// One row of a binary (prepared statement) result set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryRowPacket {
    pub sequence_id: u32,
    pub values: Vec<Value>,
    pub column_types: Vec<ColumnType>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DatabasePacket {
    Ok(OkPacket),
    Err(ErrPacket),
    FieldCount(FieldCountPacket),
    ColumnDefinition(ColumnDefinitionPacket),
    Eof(EofPacket),
    BinaryRow(BinaryRowPacket),
}

impl DatabasePacket {
    pub fn sequence_id(&self) -> u32 {
        match self {
            DatabasePacket::Ok(p) => p.sequence_id,
            DatabasePacket::Err(p) => p.sequence_id,
            DatabasePacket::FieldCount(p) => p.sequence_id,
            DatabasePacket::ColumnDefinition(p) => p.sequence_id,
            DatabasePacket::Eof(p) => p.sequence_id,
            DatabasePacket::BinaryRow(p) => p.sequence_id,
        }
    }
}

impl From<OkPacket> for DatabasePacket {
    fn from(p: OkPacket) -> Self {
        DatabasePacket::Ok(p)
    }
}

impl From<ErrPacket> for DatabasePacket {
    fn from(p: ErrPacket) -> Self {
        DatabasePacket::Err(p)
    }
}

impl From<FieldCountPacket> for DatabasePacket {
    fn from(p: FieldCountPacket) -> Self {
        DatabasePacket::FieldCount(p)
    }
}

impl From<ColumnDefinitionPacket> for DatabasePacket {
    fn from(p: ColumnDefinitionPacket) -> Self {
        DatabasePacket::ColumnDefinition(p)
    }
}

impl From<EofPacket> for DatabasePacket {
    fn from(p: EofPacket) -> Self {
        DatabasePacket::Eof(p)
    }
}

impl From<BinaryRowPacket> for DatabasePacket {
    fn from(p: BinaryRowPacket) -> Self {
        DatabasePacket::BinaryRow(p)
    }
}

/// The ordered packets answering one command.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponsePackets {
    packets: Vec<DatabasePacket>,
}

impl CommandResponsePackets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(packet: impl Into<DatabasePacket>) -> Self {
        Self {
            packets: vec![packet.into()],
        }
    }

    pub fn add_packet(&mut self, packet: impl Into<DatabasePacket>) {
        self.packets.push(packet.into());
    }

    pub fn head(&self) -> Option<&DatabasePacket> {
        self.packets.first()
    }

    pub fn packets(&self) -> &[DatabasePacket] {
        &self.packets
    }

    pub fn into_packets(self) -> Vec<DatabasePacket> {
        self.packets
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Column definitions carried by a row-producing response, in order.
    pub fn column_definitions(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.packets.iter().filter_map(|p| match p {
            DatabasePacket::ColumnDefinition(c) => Some(&c.column),
            _ => None,
        })
    }
}

impl From<ErrPacket> for CommandResponsePackets {
    fn from(p: ErrPacket) -> Self {
        Self::single(p)
    }
}

impl From<OkPacket> for CommandResponsePackets {
    fn from(p: OkPacket) -> Self {
        Self::single(p)
    }
}
