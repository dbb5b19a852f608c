//! Copy-on-write publication of state read on the draw path.

use std::sync::Arc;

use parking_lot::RwLock;

/// An immutable value that writers replace wholesale.
///
/// Readers clone the current `Arc` under a momentary read lock and then work
/// lock-free on a value that can no longer change under them.
#[derive(Debug, Default)]
pub struct Published<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Published<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    #[inline]
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    pub fn store(&self, value: T) {
        let value = Arc::new(value);
        *self.current.write() = value;
    }
}
