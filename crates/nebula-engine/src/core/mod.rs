//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and the
//! application: a one-time GPU setup hook, window events, and a per-frame
//! callback with a ready-to-use frame context.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
