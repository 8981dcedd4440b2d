//! Free-list of request contexts.

use http::Request;
use parking_lot::Mutex;

use super::core::Context;

/// Bounded pool of reusable contexts
///
/// Contexts are fully reset on release, before they go back on the free
/// list. When the list is full the released context is dropped.
#[derive(Debug)]
pub struct ContextPool {
    free: Mutex<Vec<Context>>,
    capacity: usize,
}

impl ContextPool {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    /// Take a context from the free list (or allocate one) bound to `request`
    #[must_use]
    pub fn acquire(&self, request: Request<Vec<u8>>) -> Context {
        let mut ctx = self.free.lock().pop().unwrap_or_default();
        ctx.begin(request);
        ctx
    }

    /// Reset `ctx` and return it to the free list
    pub fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(ctx);
        }
    }

    /// Contexts currently waiting for reuse
    #[must_use]
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Upper bound on idle contexts
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
