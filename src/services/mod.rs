pub mod detail_reader;
pub mod login;
pub mod order_parser;

pub use detail_reader::DetailReader;
pub use login::LoginFlow;
pub use order_parser::{DetailOutcome, DetailSnapshot, SkipReason};
