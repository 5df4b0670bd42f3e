//! Audio output for DrumToy.
//!
//! The output device pulls audio straight from a
//! [`SharedEngine`](dt_engine::SharedEngine) in its callback. [`ScopeTap`]
//! lets the control side watch the mix without touching the engine lock.

mod cpal_backend;
mod scope;
mod traits;

pub use cpal_backend::CpalOutput;
pub use scope::{ScopeReader, ScopeTap};
pub use traits::{AudioError, AudioOutput};
