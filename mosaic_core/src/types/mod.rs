pub mod column;
pub mod parameter;
pub mod statement;
pub mod value;

pub use column::*;
pub use parameter::*;
pub use statement::*;
pub use value::*;
