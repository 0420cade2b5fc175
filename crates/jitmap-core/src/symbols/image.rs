//! Object-file backed code images and DWARF line-table reading.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use addr2line::Context;
use gimli::{Dwarf, EndianArcSlice, RunTimeEndian, SectionId};
use object::{Object, ObjectSection, ObjectSymbol, SymbolKind};
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use super::demangle::make_symbol_name;
use super::{CodeImage, DebugImage};
use crate::error::{map_dwarf_error, BridgeError, BridgeResult};
use crate::types::{Address, FunctionSymbol, LineEntry};

type OwnedReader = EndianArcSlice<RunTimeEndian>;

/// An executed code image held as an in-memory object file.
///
/// Clones share the same buffer and therefore the same identity.
#[derive(Debug, Clone)]
pub struct ObjectImage
{
    data: Arc<[u8]>,
}

impl ObjectImage
{
    /// Wrap object bytes produced by the code generator.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self
    {
        Self { data: bytes.into() }
    }

    /// Read an object file from disk.
    ///
    /// ## Errors
    ///
    /// Returns [`BridgeError::Io`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> BridgeResult<Self>
    {
        let bytes = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(bytes))
    }

    /// Shared handle to the underlying buffer.
    pub fn shared_data(&self) -> Arc<[u8]>
    {
        self.data.clone()
    }
}

impl CodeImage for ObjectImage
{
    fn data(&self) -> &[u8]
    {
        &self.data
    }
}

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_aranges", &[".debug_aranges", "__debug_aranges"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
    (".debug_types", &[".debug_types", "__debug_types"]),
];

fn load_section_bytes<'data>(file: &object::File<'data>, names: &[&str]) -> BridgeResult<Option<Arc<[u8]>>>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| BridgeError::InvalidImage(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }

    Ok(None)
}

/// Debug-capable view over an in-memory object file.
///
/// Function symbols and DWARF sections are read once at parse time; the
/// `addr2line` context is built lazily on the first line-table request.
pub struct ObjectDebugImage
{
    data: Arc<[u8]>,
    endian: RunTimeEndian,
    functions: Vec<FunctionSymbol>,
    debug_sections: HashMap<&'static str, Arc<[u8]>>,
    context_cache: OnceCell<Context<OwnedReader>>,
}

impl ObjectDebugImage
{
    /// Parse `data` as an object file.
    ///
    /// ## Errors
    ///
    /// Returns [`BridgeError::InvalidImage`] if the bytes are not a readable
    /// object file or a debug section cannot be decompressed.
    pub fn parse(data: Arc<[u8]>) -> BridgeResult<Self>
    {
        let file =
            object::File::parse(&*data).map_err(|err| BridgeError::InvalidImage(format!("failed to parse object: {err}")))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut functions = Vec::new();
        for symbol in file.symbols() {
            if symbol.kind() != SymbolKind::Text || symbol.is_undefined() {
                continue;
            }
            let Ok(name) = symbol.name() else {
                trace!(index = symbol.index().0, "skipping function symbol without a name");
                continue;
            };
            if name.is_empty() {
                continue;
            }
            functions.push(FunctionSymbol::new(
                make_symbol_name(name.to_string()),
                Address::from(symbol.address()),
                symbol.size(),
            ));
        }

        let mut debug_sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            if let Some(bytes) = load_section_bytes(&file, aliases)? {
                debug_sections.insert(*canonical, bytes);
            }
        }
        drop(file);

        debug!(
            functions = functions.len(),
            dwarf_sections = debug_sections.len(),
            "parsed debug object"
        );

        Ok(Self {
            data,
            endian,
            functions,
            debug_sections,
            context_cache: OnceCell::new(),
        })
    }

    /// Whether the object carries a `.debug_line` section.
    pub fn has_line_info(&self) -> bool
    {
        self.debug_sections.contains_key(".debug_line")
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .debug_sections
            .get(id.name())
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }

    fn symbol_context(&self) -> BridgeResult<&Context<OwnedReader>>
    {
        self.context_cache.get_or_try_init(|| {
            let dwarf = Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
                .map_err(|err| map_dwarf_error("failed to load DWARF", err))?;
            Context::from_dwarf(dwarf).map_err(|err| map_dwarf_error("failed to build addr2line context", err))
        })
    }
}

impl DebugImage for ObjectDebugImage
{
    fn data(&self) -> &[u8]
    {
        &self.data
    }

    fn function_symbols(&self) -> Vec<FunctionSymbol>
    {
        self.functions.clone()
    }

    fn line_table(&self, address: Address, size: u64) -> Vec<LineEntry>
    {
        if size == 0 || !self.has_line_info() {
            return Vec::new();
        }

        let ctx = match self.symbol_context() {
            Ok(ctx) => ctx,
            Err(err) => {
                debug!(%address, "no line table: {err}");
                return Vec::new();
            }
        };

        let end = address.saturating_add(size);
        let rows = match ctx.find_location_range(address.value(), end.value()) {
            Ok(rows) => rows,
            Err(err) => {
                debug!(%address, "no line table: {err}");
                return Vec::new();
            }
        };

        // The first row may start before the function and still be in effect at
        // its entry; it maps to native offset 0.
        rows.filter_map(|(row_address, _len, location)| {
            let offset = Address::from(row_address).offset_from(address).unwrap_or(0);
            let native_offset = u32::try_from(offset).ok()?;
            Some(LineEntry::new(
                native_offset,
                location.line.unwrap_or(0),
                location.column.unwrap_or(0),
            ))
        })
        .collect()
    }
}
