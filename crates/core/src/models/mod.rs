pub mod alert;
pub mod change;
pub mod holding;
pub mod settings;
pub mod snapshot;
