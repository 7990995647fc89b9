//! Signaling against the camera streaming gateway
//!
//! Resolves a stream source descriptor into a WHEP endpoint and performs
//! the single-POST offer/answer exchange.

pub mod endpoint;
pub mod whep;

pub use endpoint::{resolve_signaling_target, SignalingTarget};
pub use whep::{WhepAnswer, WhepExchange};
