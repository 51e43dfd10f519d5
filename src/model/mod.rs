pub mod config;
pub mod list;
pub mod task;

pub use config::*;
pub use list::*;
pub use task::*;
