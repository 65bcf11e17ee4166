pub mod commands;
pub mod render;
pub mod repl;

pub use commands::{parse, Command, CommandError};
pub use repl::Console;
