//! Line-table and offset-mapping types.
//!
//! [`LineEntry`] is what the loader's line-table reader produces: one row per
//! address range, often repeating the same source line many times.
//! [`OffsetMapping`] is what the execution engine consumes: one record per
//! change of source position, laid out the way the engine's debugger
//! interface expects it.

use std::fmt;
use std::mem;

/// One raw row from a function's line table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineEntry
{
    /// Offset of the row's first instruction from the function start.
    pub native_offset: u32,
    /// Source line, which for JIT-generated code is the IL offset.
    pub source_line: u32,
    /// `1` when the row marks a call instruction. The code generator stores
    /// this in the DWARF column field.
    pub is_call: u32,
}

impl LineEntry
{
    /// Build a row from `(native_offset, source_line, is_call)`.
    pub const fn new(native_offset: u32, source_line: u32, is_call: u32) -> Self
    {
        Self {
            native_offset,
            source_line,
            is_call,
        }
    }

    /// Whether this row is flagged as a call instruction.
    pub const fn is_call_instruction(&self) -> bool
    {
        self.is_call == 1
    }
}

impl From<(u32, u32, u32)> for LineEntry
{
    fn from((native_offset, source_line, is_call): (u32, u32, u32)) -> Self
    {
        Self::new(native_offset, source_line, is_call)
    }
}

/// Why the engine may stop at a given native offset.
///
/// The discriminants are the engine's bit values, so an array of
/// [`OffsetMapping`] can be handed over without conversion.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceReason
{
    /// No reason recorded.
    #[default]
    SourceTypeInvalid = 0x00,
    /// An explicit sequence point.
    SequencePoint = 0x01,
    /// The evaluation stack is empty here.
    StackEmpty = 0x02,
    /// The IL instruction is a call site.
    CallSite = 0x04,
    /// The native end offset is not known.
    NativeEndOffsetUnknown = 0x08,
    /// The native instruction is the call itself.
    CallInstruction = 0x10,
}

impl SourceReason
{
    /// Classify a line-table call flag.
    ///
    /// Only the exact value `1` marks a call. Every other value is an
    /// ordinary statement boundary.
    pub const fn from_call_flag(is_call: u32) -> Self
    {
        if is_call == 1 {
            SourceReason::CallInstruction
        } else {
            SourceReason::StackEmpty
        }
    }

    /// Raw engine value.
    pub const fn bits(self) -> u32
    {
        self as u32
    }
}

impl fmt::Display for SourceReason
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            SourceReason::SourceTypeInvalid => "SOURCE_TYPE_INVALID",
            SourceReason::SequencePoint => "SEQUENCE_POINT",
            SourceReason::StackEmpty => "STACK_EMPTY",
            SourceReason::CallSite => "CALL_SITE",
            SourceReason::NativeEndOffsetUnknown => "NATIVE_END_OFFSET_UNKNOWN",
            SourceReason::CallInstruction => "CALL_INSTRUCTION",
        };
        write!(f, "{label}")
    }
}

/// One native-to-IL offset record in the engine's native layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetMapping
{
    /// Native offset from the start of the method.
    pub native_offset: u32,
    /// IL offset the native offset maps back to.
    pub il_offset: u32,
    /// Why this position is interesting to the engine.
    pub source: SourceReason,
}

impl OffsetMapping
{
    /// Size of one record in the engine's native layout.
    pub const NATIVE_SIZE: usize = mem::size_of::<OffsetMapping>();

    /// Build a record from its parts.
    pub const fn new(native_offset: u32, il_offset: u32, source: SourceReason) -> Self
    {
        Self {
            native_offset,
            il_offset,
            source,
        }
    }

    /// The record describing the first row of a run.
    pub const fn from_entry(entry: &LineEntry) -> Self
    {
        Self::new(entry.native_offset, entry.source_line, SourceReason::from_call_flag(entry.is_call))
    }
}

impl fmt::Display for OffsetMapping
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "native {:#x} -> il {} ({})", self.native_offset, self.il_offset, self.source)
    }
}

/// Identifier the engine assigned to a compiled method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl From<u32> for MethodId
{
    fn from(value: u32) -> Self
    {
        MethodId(value)
    }
}

impl fmt::Display for MethodId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "method#{}", self.0)
    }
}
