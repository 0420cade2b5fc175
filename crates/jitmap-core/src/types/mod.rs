//! Platform-agnostic types shared by the translator, registry and listener.

pub mod address;
pub mod offsets;
pub mod symbols;

pub use address::Address;
pub use offsets::{LineEntry, MethodId, OffsetMapping, SourceReason};
pub use symbols::{FunctionSymbol, SymbolLanguage, SymbolName};
