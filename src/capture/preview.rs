//! Rendering target a live stream is bound to.

use tokio::sync::watch;

/// The live stream currently shown on a [`PreviewTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewBinding {
    /// Id of the capture session that owns the stream.
    pub session_id: u64,
    /// Natural width of the bound stream.
    pub width: u32,
    /// Natural height of the bound stream.
    pub height: u32,
}

/// A surface that shows at most one live stream at a time.
///
/// UI code subscribes to it to learn when a preview starts and stops.
#[derive(Debug)]
pub struct PreviewTarget {
    binding: watch::Sender<Option<PreviewBinding>>,
}

impl PreviewTarget {
    /// A target with nothing bound.
    pub fn new() -> Self {
        let (binding, _) = watch::channel(None);
        Self { binding }
    }

    /// Binds a stream. Returns false if another stream is already bound.
    pub(crate) fn bind(&self, binding: PreviewBinding) -> bool {
        self.binding.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(binding);
            true
        })
    }

    /// Unbinds the stream owned by `session_id`, if it is the bound one.
    pub(crate) fn unbind(&self, session_id: u64) {
        self.binding.send_if_modified(|current| match current {
            Some(b) if b.session_id == session_id => {
                *current = None;
                true
            }
            _ => false,
        });
    }

    /// The stream currently bound, if any.
    pub fn binding(&self) -> Option<PreviewBinding> {
        *self.binding.borrow()
    }

    /// Whether a live stream is bound.
    pub fn is_live(&self) -> bool {
        self.binding.borrow().is_some()
    }

    /// Watches binding changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<PreviewBinding>> {
        self.binding.subscribe()
    }
}

impl Default for PreviewTarget {
    fn default() -> Self {
        Self::new()
    }
}
