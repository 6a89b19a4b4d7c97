pub mod bulk;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod logging;
pub mod lookup;
pub mod processor;
pub mod report;
pub mod store;
