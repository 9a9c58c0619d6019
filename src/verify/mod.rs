pub mod baseline;

pub use baseline::{compare, BaselineStore, DifferenceReport};
