use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tells a list producer that nobody is reading its stream any more.
///
/// Each fetch gets a fresh token. Starting the next fetch, or destroying the
/// controller, cancels the previous one. Producers should check it between
/// items and stop early.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_cancellation() {
        let token = CancellationToken::new();
        let producer_side = token.clone();
        assert!(!producer_side.is_cancelled());
        token.cancel();
        assert!(producer_side.is_cancelled());
    }
}
