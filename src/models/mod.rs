pub mod entities;
pub mod macros;

pub use entities::*;
