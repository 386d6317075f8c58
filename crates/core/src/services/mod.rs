pub mod monitor_service;
pub mod quote_service;
