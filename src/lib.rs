//! Observatory dome and hand-paddle controller.
//!
//! Drives a dome controller over a `\r`-separated, `*`-terminated serial
//! protocol, queues dome gotos and shutter commands, and turns physical
//! and virtual hand-paddle buttons into telescope axis motor commands.
//! Hardware is reached only through the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod dome;
pub mod error;
pub mod paddle;
pub mod protocol;

pub use error::{Error, Result};
