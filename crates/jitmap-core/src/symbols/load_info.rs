//! Load metadata implementations for object-file images.
//!
//! A loader may hand the bridge the very buffer it executes, or a separate
//! copy kept for debugging. Both shapes are provided so the listener's
//! two-key bookkeeping can be driven either way.

use std::sync::Arc;

use super::image::{ObjectDebugImage, ObjectImage};
use super::{CodeImage, DebugImage, ImageKey, LoadedObjectInfo};
use crate::error::{BridgeError, BridgeResult};

/// Debug view that re-reads the executed buffer itself.
///
/// The view's identity equals the image's raw key.
#[derive(Debug, Clone)]
pub struct IdentityLoadInfo
{
    data: Arc<[u8]>,
}

impl IdentityLoadInfo
{
    /// Load metadata for `image`.
    pub fn for_image(image: &ObjectImage) -> Self
    {
        Self {
            data: image.shared_data(),
        }
    }
}

impl LoadedObjectInfo for IdentityLoadInfo
{
    fn debug_object(&self, image: &dyn CodeImage) -> BridgeResult<Box<dyn DebugImage>>
    {
        if image.key() != ImageKey::of(&self.data) {
            return Err(BridgeError::InvalidImage(format!(
                "load info for {} does not describe {}",
                ImageKey::of(&self.data),
                image.key()
            )));
        }
        Ok(Box::new(ObjectDebugImage::parse(self.data.clone())?))
    }
}

/// Debug view backed by a private copy of the executed buffer.
///
/// The view's identity differs from the image's raw key.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyingLoadInfo;

impl LoadedObjectInfo for CopyingLoadInfo
{
    fn debug_object(&self, image: &dyn CodeImage) -> BridgeResult<Box<dyn DebugImage>>
    {
        let copy = Arc::<[u8]>::from(image.data());
        Ok(Box::new(ObjectDebugImage::parse(copy)?))
    }
}
