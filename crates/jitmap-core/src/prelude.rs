//! Common module for library exports

pub use crate::config::ListenerConfig;
pub use crate::engine::{Delivery, EngineAllocator, EngineBinding, RecordingEngine};
pub use crate::error::{BridgeError, BridgeResult};
pub use crate::events::{event_channel, BridgeEvent};
pub use crate::listener::JitEventListener;
pub use crate::registry::ImageRegistry;
pub use crate::symbols::{CodeImage, DebugImage, ImageKey, LoadedObjectInfo};
pub use crate::types::{Address, FunctionSymbol, LineEntry, MethodId, OffsetMapping, SourceReason};
