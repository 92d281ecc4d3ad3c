pub mod cache;
pub mod service;

pub use cache::SummaryCache;
