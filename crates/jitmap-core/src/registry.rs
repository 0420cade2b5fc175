//! # Image Lifecycle Registry
//!
//! Bookkeeping for images between "emitted" and "freeing":
//!
//! - **image identity → function addresses**: authoritative; drives cleanup.
//! - **raw image key → registered image**: owns the debug-capable view and the
//!   identity derived for it at registration time.
//! - **function address → method ID**: reverse lookup written by whichever
//!   component assigns method IDs, retired here when the image goes away.
//!
//! The raw key is the address of the *executed* image's buffer, the only
//! thing a later free notification carries. The identity is the address of
//! the debug view's buffer, which may be a different allocation. Storing the
//! identity next to the owned view means a free never has to recompute it.
//!
//! ## Thread Safety
//!
//! The registry is not thread-safe and owns non-`Send` debug views. If the
//! loader reports events from several threads, funnel them to the thread that
//! owns the listener.

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::symbols::{DebugImage, ImageKey};
use crate::types::{Address, MethodId};

/// Function start addresses of one image, in symbol-table order.
pub type MethodAddressVector = SmallVec<[Address; 64]>;

/// A live image: its debug view and the identity derived from it.
struct RegisteredImage
{
    identity: ImageKey,
    debug_image: Box<dyn DebugImage>,
}

/// What a successful [`ImageRegistry::unregister`] released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisteredImage
{
    /// Identity of the released debug view.
    pub identity: ImageKey,
    /// Functions the image contained.
    pub functions: MethodAddressVector,
    /// How many reverse method-ID entries were erased.
    pub method_ids_erased: usize,
}

/// Registry of live images, owned by a single listener.
#[derive(Default)]
pub struct ImageRegistry
{
    loaded_objects: HashMap<ImageKey, MethodAddressVector>,
    debug_objects: HashMap<ImageKey, RegisteredImage>,
    method_ids: HashMap<Address, MethodId>,
}

impl ImageRegistry
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a newly emitted image.
    ///
    /// `raw_key` identifies the executed image, `identity` the debug view.
    /// Re-registering a live raw key replaces the previous entry and drops
    /// its debug view, so there is never more than one live entry per image.
    pub fn register(
        &mut self,
        raw_key: ImageKey,
        identity: ImageKey,
        functions: MethodAddressVector,
        debug_image: Box<dyn DebugImage>,
    )
    {
        if let Some(previous) = self.debug_objects.remove(&raw_key) {
            warn!(key = %raw_key, "image registered twice without being freed; replacing");
            if let Some(stale) = self.loaded_objects.remove(&previous.identity) {
                self.erase_method_ids(&stale);
            }
        }

        debug!(key = %raw_key, %identity, functions = functions.len(), "registered image");
        self.loaded_objects.insert(identity, functions);
        self.debug_objects.insert(raw_key, RegisteredImage { identity, debug_image });
    }

    /// Release everything recorded for the image with `raw_key`.
    ///
    /// Returns `None` if the image was never registered or is already gone.
    pub fn unregister(&mut self, raw_key: ImageKey) -> Option<UnregisteredImage>
    {
        let Some(registered) = self.debug_objects.remove(&raw_key) else {
            debug!(key = %raw_key, "freeing unregistered image; ignoring");
            return None;
        };
        let identity = registered.identity;
        drop(registered.debug_image);

        let Some(functions) = self.loaded_objects.remove(&identity) else {
            debug!(key = %raw_key, %identity, "no function list for image; released view only");
            return None;
        };

        let method_ids_erased = self.erase_method_ids(&functions);
        debug!(key = %raw_key, %identity, functions = functions.len(), method_ids_erased, "unregistered image");
        Some(UnregisteredImage {
            identity,
            functions,
            method_ids_erased,
        })
    }

    fn erase_method_ids(&mut self, functions: &[Address]) -> usize
    {
        functions
            .iter()
            .filter(|&&address| self.method_ids.remove(&address).is_some())
            .count()
    }

    /// Function addresses recorded under a debug-view identity.
    pub fn functions_for(&self, identity: ImageKey) -> Option<&[Address]>
    {
        self.loaded_objects.get(&identity).map(|functions| functions.as_slice())
    }

    /// Identity recorded for the image with `raw_key`.
    pub fn image_identity(&self, raw_key: ImageKey) -> Option<ImageKey>
    {
        self.debug_objects.get(&raw_key).map(|registered| registered.identity)
    }

    /// The owned debug view for the image with `raw_key`.
    pub fn debug_image(&self, raw_key: ImageKey) -> Option<&dyn DebugImage>
    {
        self.debug_objects.get(&raw_key).map(|registered| registered.debug_image.as_ref())
    }

    /// Whether an image with `raw_key` is currently registered.
    pub fn is_registered(&self, raw_key: ImageKey) -> bool
    {
        self.debug_objects.contains_key(&raw_key)
    }

    /// Whether any function list is recorded under `identity`.
    pub fn has_identity(&self, identity: ImageKey) -> bool
    {
        self.loaded_objects.contains_key(&identity)
    }

    /// Record the engine's method ID for a function start address.
    pub fn register_method_id(&mut self, address: Address, id: MethodId) -> Option<MethodId>
    {
        self.method_ids.insert(address, id)
    }

    /// Method ID recorded for `address`.
    pub fn method_id(&self, address: Address) -> Option<MethodId>
    {
        self.method_ids.get(&address).copied()
    }

    /// Number of reverse method-ID entries.
    pub fn method_id_count(&self) -> usize
    {
        self.method_ids.len()
    }

    /// Number of live images.
    pub fn len(&self) -> usize
    {
        self.debug_objects.len()
    }

    /// Whether no image is live.
    pub fn is_empty(&self) -> bool
    {
        self.debug_objects.is_empty()
    }
}

impl std::fmt::Debug for ImageRegistry
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ImageRegistry")
            .field("loaded_objects", &self.loaded_objects)
            .field("debug_objects", &self.debug_objects.len())
            .field("method_ids", &self.method_ids)
            .finish()
    }
}

#[cfg(test)]
mod tests
{
    use smallvec::smallvec;

    use super::*;
    use crate::types::{FunctionSymbol, LineEntry};

    struct StubImage(Vec<u8>);

    impl DebugImage for StubImage
    {
        fn data(&self) -> &[u8]
        {
            &self.0
        }

        fn function_symbols(&self) -> Vec<FunctionSymbol>
        {
            Vec::new()
        }

        fn line_table(&self, _address: Address, _size: u64) -> Vec<LineEntry>
        {
            Vec::new()
        }
    }

    fn stub() -> (ImageKey, Box<dyn DebugImage>)
    {
        let image: Box<dyn DebugImage> = Box::new(StubImage(vec![0; 8]));
        (image.key(), image)
    }

    #[test]
    fn test_register_then_unregister()
    {
        let mut registry = ImageRegistry::new();
        let raw = ImageKey::of(&[1u8, 2, 3]);
        let (identity, image) = stub();
        let functions: MethodAddressVector = smallvec![Address::from(0x10), Address::from(0x40)];

        registry.register(raw, identity, functions, image);
        assert!(registry.is_registered(raw));
        assert_eq!(registry.image_identity(raw), Some(identity));
        assert_eq!(registry.functions_for(identity), Some(&[Address::from(0x10), Address::from(0x40)][..]));
        assert!(registry.debug_image(raw).is_some());

        let released = registry.unregister(raw).unwrap();
        assert_eq!(released.identity, identity);
        assert_eq!(released.functions.len(), 2);
        assert!(!registry.is_registered(raw));
        assert!(!registry.has_identity(identity));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown_is_noop()
    {
        let mut registry = ImageRegistry::new();
        registry.register_method_id(Address::from(0x10), MethodId(1));
        assert!(registry.unregister(ImageKey::of(&[9u8])).is_none());
        assert_eq!(registry.method_id_count(), 1);
    }

    #[test]
    fn test_unregister_erases_only_own_method_ids()
    {
        let mut registry = ImageRegistry::new();
        let raw = ImageKey::of(&[4u8, 5]);
        let (identity, image) = stub();
        registry.register(raw, identity, smallvec![Address::from(0x10), Address::from(0x20)], image);
        registry.register_method_id(Address::from(0x10), MethodId(7));
        registry.register_method_id(Address::from(0x99), MethodId(8));

        let released = registry.unregister(raw).unwrap();
        assert_eq!(released.method_ids_erased, 1);
        assert_eq!(registry.method_id(Address::from(0x10)), None);
        assert_eq!(registry.method_id(Address::from(0x99)), Some(MethodId(8)));
    }

    #[test]
    fn test_reregistration_replaces_entry()
    {
        let mut registry = ImageRegistry::new();
        let raw = ImageKey::of(&[6u8]);
        let (first_identity, first) = stub();
        let (second_identity, second) = stub();

        registry.register(raw, first_identity, smallvec![Address::from(0x10)], first);
        registry.register(raw, second_identity, smallvec![Address::from(0x80)], second);

        assert_eq!(registry.len(), 1);
        assert!(!registry.has_identity(first_identity));
        assert_eq!(registry.functions_for(second_identity), Some(&[Address::from(0x80)][..]));
    }

    #[test]
    fn test_reregistration_erases_stale_method_ids()
    {
        let mut registry = ImageRegistry::new();
        let raw = ImageKey::of(&[7u8]);
        let (first_identity, first) = stub();
        let (second_identity, second) = stub();

        registry.register(raw, first_identity, smallvec![Address::from(0x10), Address::from(0x20)], first);
        registry.register_method_id(Address::from(0x10), MethodId(1));
        registry.register_method_id(Address::from(0x20), MethodId(2));
        registry.register_method_id(Address::from(0x99), MethodId(3));

        registry.register(raw, second_identity, smallvec![Address::from(0x80)], second);

        assert_eq!(registry.method_id(Address::from(0x10)), None);
        assert_eq!(registry.method_id(Address::from(0x20)), None);
        assert_eq!(registry.method_id(Address::from(0x99)), Some(MethodId(3)));
    }

    #[test]
    fn test_unregister_releases_view_when_function_list_is_gone()
    {
        let mut registry = ImageRegistry::new();
        let first_raw = ImageKey::of(&[8u8]);
        let second_raw = ImageKey::of(&[9u8]);
        let (identity, first) = stub();
        let (_, second) = stub();

        // Both raw keys resolve to one identity; the second list overwrites the first.
        registry.register(first_raw, identity, smallvec![Address::from(0x10)], first);
        registry.register(second_raw, identity, smallvec![Address::from(0x40)], second);
        assert!(registry.unregister(second_raw).is_some());

        assert!(registry.unregister(first_raw).is_none());
        assert!(!registry.is_registered(first_raw));
        assert!(registry.debug_image(first_raw).is_none());
        assert!(registry.is_empty());
    }
}
