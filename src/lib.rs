// Library surface shared by the binary and the integration tests

pub mod config;
pub mod engine;
pub mod system;
pub mod ui;
