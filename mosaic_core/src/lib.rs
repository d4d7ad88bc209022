//! Core types and traits shared by every Mosaic crate.
//!
//! Everything the execution core exchanges with its collaborators lives here:
//! classified statements and routes, values and column metadata, the wire
//! packets handed to the protocol layer, and the backend seams.

pub mod backend;
pub mod error;
pub mod packet;
pub mod route;
pub mod types;

pub use backend::*;
pub use error::*;
pub use packet::*;
pub use route::*;
pub use types::*;
