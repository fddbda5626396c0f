use std::cell::Cell;
use std::rc::Rc;

/// Cancellation flag shared between a viewer and the host's frame callback.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct AnimationToken {
    cancelled: Rc<Cell<bool>>,
}

impl AnimationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Outcome of one frame step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule the next frame
    Continue,
    /// The viewer was torn down; stop scheduling
    Stopped,
}
