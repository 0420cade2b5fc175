//! Symbol demangling utilities.
//!
//! JIT-generated method symbols are usually plain names, but images built by
//! ahead-of-time toolchains carry Rust or C++ mangling. We keep the raw name
//! for identity and attach a demangled form for logs.

use rustc_demangle::try_demangle;

use crate::types::{SymbolLanguage, SymbolName};

/// Create a `SymbolName` from a raw symbol string.
pub(crate) fn make_symbol_name(raw: String) -> SymbolName
{
    let demangled = try_demangle(&raw).ok().map(|d| d.to_string());
    let language = if raw.starts_with("_R") || raw.starts_with("_ZN") || raw.contains("::") {
        SymbolLanguage::Rust
    } else if raw.starts_with("_Z") {
        SymbolLanguage::Cpp
    } else {
        SymbolLanguage::Unknown
    };

    SymbolName::new(raw, demangled, language)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_plain_jit_name()
    {
        let name = make_symbol_name("Program.Main".to_string());
        assert_eq!(name.raw(), "Program.Main");
        assert_eq!(name.demangled(), None);
        assert_eq!(name.display_name(), "Program.Main");
        assert_eq!(name.language(), SymbolLanguage::Unknown);
    }

    #[test]
    fn test_rust_legacy_mangling()
    {
        let name = make_symbol_name("_ZN4core3fmt5write17h0123456789abcdefE".to_string());
        assert_eq!(name.language(), SymbolLanguage::Rust);
        assert!(name.display_name().starts_with("core::fmt::write"));
    }
}
