//! Dome controller serial protocol.
//!
//! | Module      | Responsibility                                   |
//! |-------------|--------------------------------------------------|
//! | `codec`     | `\r`-separated, `*`-terminated frames            |
//! | `inbound`   | letters a–l → [`InboundCommand`]                 |
//! | `dispatch`  | letter table, folding commands into `DomeState`  |
//! | `outbound`  | letters A–P, per-tick [`OutboundBuffer`]         |
//! | `transport` | byte channel trait                               |
//! | `link`      | framing over a transport, disconnected fallback  |

pub mod codec;
pub mod dispatch;
pub mod inbound;
pub mod link;
pub mod outbound;
pub mod transport;

pub use dispatch::{dispatch, dispatch_frame};
pub use inbound::InboundCommand;
pub use link::SerialLink;
pub use outbound::{OutboundBuffer, OutboundCommand};
pub use transport::Transport;
