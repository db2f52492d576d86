// src/core/mod.rs

//! Process-independent building blocks: script arguments and launch options.

pub mod arguments;
pub mod config_loader;
