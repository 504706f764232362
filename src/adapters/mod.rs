//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements                    | Connects to              |
//! |---------------|-------------------------------|--------------------------|
//! | `serial`      | Transport                     | dome controller, 9600 8N1|
//! | `config_file` | ConfigPort                    | JSON file                |
//! | `log_sink`    | EventSink                     | `log` facade             |
//! | `pin_inputs`  | PaddleInputPort               | embedded-hal input pins  |
//! | `safety_flag` | SafetyPort                    | shared atomic interlock  |
//! | `bench`       | MotorPort, LimitPort,         | log output (desk runs)   |
//! |               | PaddleInputPort, SafetyPort   |                          |
//! | `time`        | (clock only)                  | `std::time::Instant`     |

pub mod bench;
pub mod config_file;
pub mod log_sink;
pub mod pin_inputs;
pub mod safety_flag;
#[cfg(feature = "serial")]
pub mod serial;
pub mod time;
