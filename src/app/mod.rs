//! Application core: pure domain logic, zero I/O.
//!
//! This module orchestrates the dome controller: request handling, dome
//! tracking, paddle evaluation and the per-tick serial exchange.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
