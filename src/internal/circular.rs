//! Circular dependency detection for recursive provider resolution.

use std::cell::RefCell;

use crate::error::{InjectResult, InjectionError};

const MAX_DEPTH: usize = 256;

/// Frame identity: the container serving the request and the capability name.
///
/// Resolving the same capability through a different container (a provider
/// decorating its parent's binding) is not a cycle.
type Frame = (usize, &'static str);

// Thread-local resolution stack. Providers are synchronous, so a resolution
// never migrates between threads while it is on the stack.
thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Guard for one frame of the resolution stack
pub(crate) struct StackGuard {
    frame: Frame,
}

impl StackGuard {
    /// Pushes `(scope, name)`, failing if that frame is already on this thread's stack.
    pub(crate) fn enter(scope: usize, name: &'static str) -> InjectResult<Self> {
        let frame = (scope, name);
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.contains(&frame) {
                let mut path: Vec<&'static str> = stack.iter().map(|(_, n)| *n).collect();
                path.push(name);
                return Err(InjectionError::Circular(path));
            }

            if stack.len() >= MAX_DEPTH {
                return Err(InjectionError::DepthExceeded(stack.len()));
            }

            stack.push(frame);
            Ok(Self { frame })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.frame));
        });
    }
}
