//! Time subsystem.
//!
//! The host hands `draw_frame` a millisecond timestamp; [`FrameClock`] turns the
//! sequence of timestamps into per-frame [`FrameTime`] snapshots for scenes.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
