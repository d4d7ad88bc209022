//! Merging of per-shard result sets into one logical row stream.
//!
//! Each shard's rows arrive as a [`QueryResult`]. The [`MergeEngine`] picks how
//! to combine them for a statement and hands back a single [`MergedResult`]
//! that is read row by row.

pub mod engine;
pub mod merged;
pub mod result;

pub use engine::{DefaultMergeEngine, MergeEngine};
pub use merged::{
    IteratorMergedResult, LimitDecoratorMergedResult, MergedResult, OrderByStreamMergedResult,
};
pub use result::{QueryResult, ShardQueryResult};
