pub mod filter;
pub mod notify;
pub mod stats;
pub mod store;
