#[macro_use]
extern crate tracing;

mod app;
pub mod collectors;
mod errors;
mod logging;
pub mod source;

pub use app::{
    App,
    Cli,
    Command,
    ParseArgs,
};
pub use errors::init_errors;
pub use logging::init_logging;
