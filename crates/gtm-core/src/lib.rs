pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod money;
pub mod paths;
pub mod rolling;
pub mod seed;
pub mod simulation;
pub mod state;
pub mod store;

pub use error::{GtmError, Result};
