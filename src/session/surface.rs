// src/session/surface.rs

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SessionError;

/// Callback fired after the candidate changes the text.
pub type ChangeListener = Box<dyn FnMut(&str) + Send>;

/// The minimal capability the session needs from an editor widget.
///
/// `set_text` is the programmatic path (loading a draft, writing run
/// output) and does not notify listeners. `edit` is the candidate's path:
/// it is refused while the surface is read-only and notifies listeners.
pub trait TextSurface: Send {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn edit(&mut self, text: &str) -> Result<(), SessionError>;
    fn set_read_only(&mut self, read_only: bool);
    fn is_read_only(&self) -> bool;
    fn on_change(&mut self, listener: ChangeListener);
}

#[derive(Default)]
struct BufferState {
    text: String,
    read_only: bool,
    listeners: Vec<ChangeListener>,
}

/// In-memory text buffer. Clones share the same buffer, so the UI side and
/// the session can each hold a handle.
#[derive(Clone, Default)]
pub struct BufferSurface {
    state: Arc<Mutex<BufferState>>,
}

impl BufferSurface {
    pub fn new(text: &str) -> Self {
        let surface = Self::default();
        surface.lock().text = text.to_string();
        surface
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for BufferSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("BufferSurface")
            .field("text", &state.text)
            .field("read_only", &state.read_only)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl TextSurface for BufferSurface {
    fn text(&self) -> String {
        self.lock().text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.lock().text = text.to_string();
    }

    fn edit(&mut self, text: &str) -> Result<(), SessionError> {
        let mut listeners = {
            let mut state = self.lock();
            if state.read_only {
                return Err(SessionError::Surface("editor is read-only".to_string()));
            }
            state.text = text.to_string();
            std::mem::take(&mut state.listeners)
        };

        // Unlocked, so listeners may read the surface through any clone.
        for listener in listeners.iter_mut() {
            listener(text);
        }

        let mut state = self.lock();
        listeners.append(&mut state.listeners);
        state.listeners = listeners;
        Ok(())
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.lock().read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.lock().read_only
    }

    fn on_change(&mut self, listener: ChangeListener) {
        self.lock().listeners.push(listener);
    }
}
