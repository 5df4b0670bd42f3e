//! Engine shared between the audio callback and the control side.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::Engine;
use crate::frame::Frame;

/// Cloneable handle to one engine behind a single lock.
///
/// The audio callback holds the lock for one render call; the control side
/// holds it for whole edits so the callback never sees half of one.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine. A lock poisoned by a panicking holder is taken over.
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the engine locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Engine) -> R) -> R {
        f(&mut self.lock())
    }

    /// Render into `out` under the lock.
    pub fn render(&self, out: &mut [Frame]) {
        self.lock().render(out);
    }
}

impl Default for SharedEngine {
    fn default() -> Self {
        Self::new(Engine::new())
    }
}
