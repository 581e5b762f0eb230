//! Stack growth for deeply nested evaluation.
//!
//! Every expression and every call recurses on the native stack. On WASM,
//! where `stacker` is unavailable, the closure runs directly and the mode's
//! depth limit guards recursion instead.

/// Bytes that must remain free before evaluating another level.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first switching to a new stack segment if the current one is
/// nearly exhausted.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(not(target_arch = "wasm32"))]
    {
        stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
    }
    #[cfg(target_arch = "wasm32")]
    {
        f()
    }
}
