pub mod bosh;
pub mod command;
mod error;
mod poll;
pub mod turbulence;

pub use command::{Cli, Command};
pub use error::{Error, Result};
