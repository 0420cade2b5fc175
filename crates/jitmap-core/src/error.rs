//! # Error Types
//!
//! General error handling for the debug-info bridge.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Most "failures" the bridge sees are not errors at all: missing symbol names,
//! functions without line tables and frees of unknown images are all skipped
//! silently. Only the cases below ever reach a caller.

use thiserror::Error;

/// Main error type for bridge operations
///
/// ## Error Categories
///
/// 1. **Engine errors**: AllocationFailed, DeliveryFailed
/// 2. **Image errors**: InvalidImage, Dwarf
/// 3. **I/O errors**: Io (for loading object files from disk)
#[derive(Error, Debug)]
pub enum BridgeError
{
    /// The execution engine could not provide an offset-mapping array
    ///
    /// This is fatal to the current translation. There is no fallback
    /// allocator, so the notification that triggered it is abandoned.
    #[error("Engine allocation failed: requested {requested} offset mappings ({bytes} bytes)")]
    AllocationFailed
    {
        /// Number of `OffsetMapping` records requested
        requested: usize,
        /// Size of the request in the engine's native layout
        bytes: usize,
    },

    /// The execution engine rejected a finished offset-mapping array
    #[error("Failed to deliver offset mappings: {0}")]
    DeliveryFailed(String),

    /// The loader handed us an image that cannot be read as an object file
    ///
    /// Examples:
    /// - Truncated or corrupt object bytes
    /// - Unsupported object format
    #[error("Invalid code image: {0}")]
    InvalidImage(String),

    /// DWARF sections are present but could not be loaded
    #[error("DWARF error: {0}")]
    Dwarf(String),

    /// I/O error (reading an object file from disk)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, BridgeError>`
///
/// ```rust
/// use jitmap_core::error::BridgeResult;
/// fn foo() -> BridgeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Map a gimli DWARF error to a `BridgeError` with context.
pub(crate) fn map_dwarf_error(context: &str, err: gimli::Error) -> BridgeError
{
    BridgeError::Dwarf(format!("{context}: {err}"))
}
