//! Column-aware reading order.

mod policy;
mod reconstruct;

pub use policy::{ColumnDirection, ColumnLayout, ReadingOrderPolicy};
pub use reconstruct::ColumnReconstructor;
