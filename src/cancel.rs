use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative cancellation flag, shared between the code driving a request and whoever may
/// want to abandon it.
///
/// Adapters check it before every call into the library; once set, they fail immediately instead
/// of touching a handle whose request may already be gone.
#[derive(Clone, Debug, Default)]
pub struct Cancellable {
    cancelled: Arc<AtomicBool>,
}

impl Cancellable {
    pub fn new() -> Cancellable {
        Cancellable::default()
    }

    pub fn cancel(&self) {
        debug!("cancelling");
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = Cancellable::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
