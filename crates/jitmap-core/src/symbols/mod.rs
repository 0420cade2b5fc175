//! # Code Images
//!
//! Loader-side view of compiled code: the traits the listener reads images
//! through, plus an `object`/`addr2line` backed implementation for real
//! in-memory object files.
//!
//! ## Image identity
//!
//! Images are identified by the address of their data buffer ([`ImageKey`]).
//! The loader reports "emitted" and "freeing" through two separate calls,
//! possibly with structurally different image objects, and the buffer address
//! is what ties them together. The key is only meaningful while the loader
//! keeps that buffer alive and in place; once an image is freed its address
//! may be reused by a new image.

mod demangle;
pub mod image;
pub mod load_info;

use std::fmt;

pub use image::{ObjectDebugImage, ObjectImage};
pub use load_info::{CopyingLoadInfo, IdentityLoadInfo};

use crate::error::BridgeResult;
use crate::types::{Address, FunctionSymbol, LineEntry};

/// Identity of an image: the address of its underlying data buffer.
///
/// This is not a content hash. Two byte-identical images at different
/// addresses have different keys, and a buffer address reused after a free
/// produces the same key again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageKey(usize);

impl ImageKey
{
    /// Key for the buffer `data` points into.
    pub fn of(data: &[u8]) -> Self
    {
        ImageKey(data.as_ptr() as usize)
    }

    /// Raw buffer address.
    pub fn as_usize(self) -> usize
    {
        self.0
    }
}

impl fmt::Display for ImageKey
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "image@{:#x}", self.0)
    }
}

/// A loaded block of machine code as the loader reports it.
pub trait CodeImage
{
    /// The image's underlying bytes.
    fn data(&self) -> &[u8];

    /// Identity of this image.
    fn key(&self) -> ImageKey
    {
        ImageKey::of(self.data())
    }
}

/// A view of a code image suitable for reading debug metadata.
///
/// This may be the same buffer as the executed image or a separate copy the
/// loader keeps because debug sections were stripped from the load copy.
pub trait DebugImage
{
    /// The view's underlying bytes.
    fn data(&self) -> &[u8];

    /// Identity of this view.
    fn key(&self) -> ImageKey
    {
        ImageKey::of(self.data())
    }

    /// Function-typed symbols whose name, address and size all resolved,
    /// in symbol-table order.
    fn function_symbols(&self) -> Vec<FunctionSymbol>;

    /// Line-table rows covering `[address, address + size)`, in address order.
    ///
    /// A function without line information yields an empty table.
    fn line_table(&self, address: Address, size: u64) -> Vec<LineEntry>;
}

/// Load metadata handed over alongside an emitted image.
pub trait LoadedObjectInfo
{
    /// Produce the debug-capable view of `image`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the view cannot be produced or parsed.
    fn debug_object(&self, image: &dyn CodeImage) -> BridgeResult<Box<dyn DebugImage>>;
}
