pub mod serialization;
pub mod table;

pub use serialization::JsonSerializable;
pub use table::{Row, TabularResult, Value};
