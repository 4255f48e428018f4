#![deny(warnings)]
pub mod frame;
pub mod message;

pub use frame::{Dest, Frame, FrameError, Header, MsgKind, BROADCAST_ID, HEADER_LEN};
pub use message::{Message, PayloadError, StartPhase};
