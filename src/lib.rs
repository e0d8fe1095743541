pub mod cli;
pub mod config;
pub mod model;
pub mod reconcile;

mod api;
mod flock;

pub use api::{LockMode, Relock, RelockBuilder};
pub use reconcile::{update_lock, LockUpdate};
