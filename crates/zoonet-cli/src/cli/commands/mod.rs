//! CLI command handlers. Each command is in its own file for clarity.

mod animal;
mod animals;
mod gc;
mod get;
mod status;
mod wake;
mod warm;

pub use animal::run_animal;
pub use animals::run_animals;
pub use gc::run_gc;
pub use get::run_get;
pub use status::run_status;
pub use wake::run_wake;
pub use warm::run_warm;
