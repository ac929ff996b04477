#![deny(clippy::print_stdout)]

pub mod analysis;
pub mod command_line;
pub mod dataset;
pub mod error;
pub mod loading;
pub mod molecule;
pub mod parsing;
pub mod sampling;
pub mod schema;
