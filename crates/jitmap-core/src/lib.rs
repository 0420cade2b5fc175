//! # jitmap-core
//!
//! Debug-info bridge between a JIT code loader and a managed execution engine.
//!
//! The loader emits and frees compiled machine-code images. The engine needs,
//! for every compiled method, a compact table mapping native instruction
//! offsets back to IL offsets so it can step and walk stacks. This crate
//! provides:
//! - The line-table translator ([`translate`]): collapses a verbose per-address
//!   line table into the minimal offset-mapping table the engine consumes
//! - The image registry ([`registry`]): tracks which functions each image
//!   contains and owns the debug-capable view of the image until it is freed
//! - The listener ([`listener`]): ties both to the loader's "emitted" and
//!   "freeing" notifications and to an [`engine::EngineBinding`]
//!
//! ## Collaborators
//!
//! The loader and the engine stay outside this crate. The loader is reached
//! through [`symbols::CodeImage`], [`symbols::DebugImage`] and
//! [`symbols::LoadedObjectInfo`]; the engine through
//! [`engine::EngineAllocator`] and [`engine::EngineBinding`]. Object-file
//! backed implementations of the loader side are included, as is a recording
//! engine for tests.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod listener;
pub mod prelude;
pub mod registry;
pub mod symbols;
pub mod translate;
pub mod types;

pub use config::ListenerConfig;
// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
pub use listener::JitEventListener;
pub use types::{Address, LineEntry, OffsetMapping, SourceReason};
