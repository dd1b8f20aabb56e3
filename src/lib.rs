pub mod config;
pub mod dataset;
pub mod fetch;
pub mod snapshot;
pub mod state;
pub mod table;
