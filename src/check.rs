//! Precondition checks for array views.
//!
//! Misuse of a view, e.g. indexing out of bounds or through a null view, is
//! reported as a [`ViewError`]. The fallible `try_*` methods return the error,
//! while the other methods pass it to the precondition hook and then panic.
//!
//! The hook is process-wide and can be replaced with [`set_hook`], which is
//! useful to route violations into an application logger or to record them
//! in tests. The default hook logs the violation at error level.

use std::fmt::{self, Display, Formatter};
use std::panic::Location;

use parking_lot::RwLock;

/// Precondition violation of an array view operation.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// The view is null.
    #[error("view is null")]
    NullView,

    /// An index is not less than the size of its dimension.
    #[error("index {index} is out of range for dimension {dim} of size {size}")]
    IndexOutOfBounds {
        /// Dimension, counted from the outermost.
        dim: usize,
        /// Given index.
        index: usize,
        /// Number of elements in the dimension.
        size: usize,
    },

    /// A dimension is not less than the rank.
    #[error("dimension {dim} is out of range for rank {rank}")]
    DimOutOfRange {
        /// Given dimension.
        dim: usize,
        /// Number of dimensions.
        rank: usize,
    },

    /// A deferred size is zero.
    #[error("deferred size of dimension {dim} must be greater than 0")]
    ZeroExtent {
        /// Dimension, counted from the outermost.
        dim: usize,
    },

    /// A size is not matching a constant-sized dimension.
    #[error("dimension {dim} has constant size {expected} but {found} was given")]
    ExtentMismatch {
        /// Dimension, counted from the outermost.
        dim: usize,
        /// Constant size of the dimension.
        expected: usize,
        /// Given size.
        found: usize,
    },

    /// The number of deferred sizes is not matching the shape.
    #[error("expected {expected} deferred sizes, got {found}")]
    DeferredCount {
        /// Number of deferred dimensions.
        expected: usize,
        /// Number of given sizes.
        found: usize,
    },

    /// The buffer is shorter than the number of elements in the shape.
    #[error("buffer of length {len} is too small for {required} elements")]
    BufferTooSmall {
        /// Buffer length.
        len: usize,
        /// Number of elements in the shape.
        required: usize,
    },

    /// The number of elements in the shape overflows `usize`.
    #[error("number of elements overflows usize")]
    ShapeOverflow,

    /// The length of a multidimensional index is not matching the rank.
    #[error("index of rank {found} does not match array rank {rank}")]
    RankMismatch {
        /// Number of dimensions.
        rank: usize,
        /// Length of the given index.
        found: usize,
    },
}

/// Information about a precondition violation, passed to the hook.
#[derive(Debug)]
pub struct Violation<'a> {
    op: &'static str,
    error: &'a ViewError,
    location: &'static Location<'static>,
}

type Hook = Box<dyn Fn(&Violation<'_>) + Send + Sync>;

static HOOK: RwLock<Option<Hook>> = parking_lot::const_rwlock(None);

impl Violation<'_> {
    /// Returns the name of the operation that was misused.
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Returns the violated precondition.
    pub fn error(&self) -> &ViewError {
        self.error
    }

    /// Returns the source location of the calling code.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl Display for Violation<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.error)
    }
}

/// Registers a custom precondition hook, replacing the previous one.
///
/// The hook is called once for each violation before the operation panics.
/// It must not call `set_hook` or `take_hook` itself.
pub fn set_hook(hook: Box<dyn Fn(&Violation<'_>) + Send + Sync>) {
    *HOOK.write() = Some(hook);
}

/// Unregisters the current precondition hook and returns it.
///
/// If no custom hook is registered, the default hook is returned.
pub fn take_hook() -> Box<dyn Fn(&Violation<'_>) + Send + Sync> {
    HOOK.write().take().unwrap_or_else(|| Box::new(default_hook))
}

/// The default precondition hook, which logs the violation.
pub fn default_hook(violation: &Violation<'_>) {
    log::error!("precondition violated at {}: {}", violation.location, violation);
}

/// Returns the value, or reports the violation and panics.
#[track_caller]
pub(crate) fn checked<T>(op: &'static str, result: Result<T, ViewError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => violation(op, error),
    }
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violation(op: &'static str, error: ViewError) -> ! {
    let violation = Violation { op, error: &error, location: Location::caller() };

    match &*HOOK.read() {
        Some(hook) => hook(&violation),
        None => default_hook(&violation),
    }

    panic!("{violation}")
}
