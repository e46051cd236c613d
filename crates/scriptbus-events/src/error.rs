/// Error raised while dispatching an event
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A listener returned an error; listeners after it were not called
    #[error("listener at position {position} failed: {source}")]
    Listener {
        /// Zero-based position of the failing listener within this firing
        position: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl EventError {
    /// Position of the listener that failed
    pub fn position(&self) -> usize {
        match self {
            EventError::Listener { position, .. } => *position,
        }
    }
}
