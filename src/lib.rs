// ABOUTME: Public library API for the Tasks Collector dump tools
// ABOUTME: Re-exports core modules for the binary and integration tests

pub mod api;
pub mod cli;
pub mod config;
pub mod convert;
pub mod dump;
pub mod error;
pub mod filter;
pub mod habits;
pub mod model;
pub mod storage;
pub mod util;

pub use error::{Error, Result};
pub use model::{DailyResult, Event, Observation};
