pub mod registry;
pub mod traits;

// API provider implementations
pub mod yahoo_finance;
