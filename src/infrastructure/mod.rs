//! Infrastructure layer - External service implementations

pub mod config_store;
pub mod logging;
pub mod qnamaker;
pub mod services;
