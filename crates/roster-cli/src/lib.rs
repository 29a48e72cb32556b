//! Roster import command-line components.

pub mod config;
pub mod logging;
pub mod pipeline;
