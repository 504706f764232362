//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no serial port
//! or telescope drive attached.

mod dome_tests;
mod mock_hw;
mod service_tests;
