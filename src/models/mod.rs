pub mod order;

pub use order::{Customer, OrderRecord, SkuItem};
