// src/core/protocol/mod.rs

mod resp_frame;
mod resp_value;

pub use resp_frame::{RespFrame, RespFrameCodec};
pub use resp_value::RespValue;
