#![allow(clippy::must_use_candidate)]

pub mod logging;
pub mod server;
pub mod settings;
mod store;

pub use logging::*;
pub use server::*;
pub use settings::*;
pub use store::{ConfigStore, FileConfigStore, MemoryConfigStore};
