//! # JIT Event Listener
//!
//! The bridge object the code loader talks to. It receives the loader's two
//! notifications, runs each emitted function's line table through the
//! translator, hands the result to the engine binding and keeps the
//! [`ImageRegistry`] in step with image lifetimes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jitmap_core::engine::RecordingEngine;
//! use jitmap_core::listener::JitEventListener;
//! use jitmap_core::symbols::{IdentityLoadInfo, ObjectImage};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>>
//! {
//!     let mut listener = JitEventListener::new(RecordingEngine::new());
//!     let image = ObjectImage::open("/tmp/method.o")?;
//!
//!     listener.notify_object_emitted(&image, &IdentityLoadInfo::for_image(&image))?;
//!     for delivery in listener.engine().deliveries() {
//!         println!("{}: {} mappings", delivery.function, delivery.mappings.len());
//!     }
//!
//!     listener.notify_freeing_object(&image);
//!     Ok(())
//! }
//! ```

use tracing::{debug, trace};

use crate::config::ListenerConfig;
use crate::engine::EngineBinding;
use crate::error::BridgeResult;
use crate::events::{BridgeEvent, BridgeEventSender};
use crate::registry::{ImageRegistry, MethodAddressVector};
use crate::symbols::{CodeImage, LoadedObjectInfo};
use crate::translate::translate;
use crate::types::{Address, MethodId};

/// Listener bound to one engine binding.
///
/// All state lives in this value; dropping it releases every debug view still
/// registered.
pub struct JitEventListener<E>
{
    engine: E,
    registry: ImageRegistry,
    config: ListenerConfig,
    events: Option<BridgeEventSender>,
}

impl<E: EngineBinding> JitEventListener<E>
{
    /// Create a listener with the default configuration.
    pub fn new(engine: E) -> Self
    {
        Self::with_config(engine, ListenerConfig::default())
    }

    /// Create a listener with an explicit configuration.
    pub fn with_config(engine: E, config: ListenerConfig) -> Self
    {
        Self {
            engine,
            registry: ImageRegistry::new(),
            config,
            events: None,
        }
    }

    /// Publish lifecycle events on `sender`.
    #[must_use]
    pub fn with_event_sender(mut self, sender: BridgeEventSender) -> Self
    {
        self.events = Some(sender);
        self
    }

    /// The loader finished loading `image`.
    ///
    /// Every function in the image's debug view is recorded. Functions with
    /// line information additionally get an offset-mapping table delivered to
    /// the engine.
    ///
    /// ## Errors
    ///
    /// Returns an error if the debug view cannot be produced, or if the
    /// engine fails to allocate or accept a table. The registry is left
    /// untouched in that case.
    pub fn notify_object_emitted(&mut self, image: &dyn CodeImage, load_info: &dyn LoadedObjectInfo) -> BridgeResult<()>
    {
        let raw_key = image.key();
        let debug_image = load_info.debug_object(image)?;
        let identity = debug_image.key();

        let mut functions = MethodAddressVector::new();
        for function in debug_image.function_symbols() {
            functions.push(function.address);
            if !self.config.emit_debug_info {
                continue;
            }

            let entries = debug_image.line_table(function.address, function.size);
            let Some(mappings) = translate(&entries, &mut self.engine)? else {
                trace!(function = %function.name, "no line information");
                continue;
            };

            let count = mappings.as_ref().len();
            self.engine.notify_event(&function, mappings)?;
            debug!(function = %function.name, address = %function.address, count, "reported offset mappings");
            self.publish(BridgeEvent::BoundariesReported {
                function: function.address,
                count,
            });
        }

        let function_count = functions.len();
        self.registry.register(raw_key, identity, functions, debug_image);
        self.publish(BridgeEvent::ObjectEmitted {
            key: raw_key,
            functions: function_count,
        });
        Ok(())
    }

    /// The loader is about to free `image`.
    ///
    /// Unknown or already-freed images are ignored.
    pub fn notify_freeing_object(&mut self, image: &dyn CodeImage)
    {
        let raw_key = image.key();
        if let Some(released) = self.registry.unregister(raw_key) {
            self.publish(BridgeEvent::ObjectFreed {
                key: raw_key,
                functions: released.functions.len(),
            });
        }
    }

    /// Record the method ID the engine assigned to the function at `address`.
    ///
    /// The entry is dropped automatically when the image containing the
    /// function is freed.
    pub fn register_method_id(&mut self, address: Address, id: MethodId) -> Option<MethodId>
    {
        self.registry.register_method_id(address, id)
    }

    /// Image bookkeeping.
    pub fn registry(&self) -> &ImageRegistry
    {
        &self.registry
    }

    /// Active configuration.
    pub fn config(&self) -> ListenerConfig
    {
        self.config
    }

    /// The engine binding.
    pub fn engine(&self) -> &E
    {
        &self.engine
    }

    /// Mutable access to the engine binding.
    pub fn engine_mut(&mut self) -> &mut E
    {
        &mut self.engine
    }

    /// Tear the listener down, returning the engine binding.
    pub fn into_engine(self) -> E
    {
        self.engine
    }

    fn publish(&self, event: BridgeEvent)
    {
        if let Some(sender) = &self.events {
            // A dropped receiver just means nobody is listening anymore.
            let _ = sender.send(event);
        }
    }
}
