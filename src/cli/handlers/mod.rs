// src/cli/handlers/mod.rs

//! One handler per subcommand, plus the setup they share.

pub mod commons;
pub mod repl;
pub mod run;
