//! Yahoo-backed implementations of the collaborator traits

pub mod quote_page;
pub mod search;
pub mod yahoo;

pub use quote_page::YahooQuotePage;
pub use search::YahooSearchClient;
pub use yahoo::YahooFinanceClient;
