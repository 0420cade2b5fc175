//! # Debug-Info Translator
//!
//! Turns one function's raw line table into the compact offset-mapping table
//! the execution engine consumes.
//!
//! The engine only cares where the source position *changes*, so each run of
//! consecutive rows sharing a source line collapses to a single record taken
//! from the run's first row. Later rows in the run carry no new information
//! and are dropped.
//!
//! ```text
//! rows:     (0, 10, 0) (4, 10, 0) (8, 11, 1)
//! runs:     [--- line 10 ---]     [line 11]
//! mappings: (0, 10, STACK_EMPTY)  (8, 11, CALL_INSTRUCTION)
//! ```
//!
//! The output is sized exactly: the translator counts runs first, asks the
//! engine for precisely that many records, then fills them on a second pass.

use tracing::trace;

use crate::engine::EngineAllocator;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{LineEntry, OffsetMapping};

/// Count the maximal runs of equal `source_line` in `entries`.
pub fn count_runs(entries: &[LineEntry]) -> usize
{
    let mut runs = 0;
    let mut last_line = None;
    for entry in entries {
        if last_line != Some(entry.source_line) {
            runs += 1;
            last_line = Some(entry.source_line);
        }
    }
    runs
}

/// Yield one [`OffsetMapping`] per run, built from the run's first row.
pub fn collapse_runs(entries: &[LineEntry]) -> impl Iterator<Item = OffsetMapping> + '_
{
    let mut last_line = None;
    entries.iter().filter_map(move |entry| {
        if last_line == Some(entry.source_line) {
            return None;
        }
        last_line = Some(entry.source_line);
        Some(OffsetMapping::from_entry(entry))
    })
}

/// Translate a line table into an engine-allocated offset-mapping table.
///
/// Returns `Ok(None)` when `entries` is empty; nothing is allocated in that
/// case and the caller must not deliver anything.
///
/// ## Errors
///
/// Propagates allocation failures from `allocator`, and reports
/// [`BridgeError::AllocationFailed`] if the engine returns a buffer of the
/// wrong length.
pub fn translate<A>(entries: &[LineEntry], allocator: &mut A) -> BridgeResult<Option<A::Buffer>>
where
    A: EngineAllocator + ?Sized,
{
    let count = count_runs(entries);
    if count == 0 {
        return Ok(None);
    }

    let bytes = count.saturating_mul(OffsetMapping::NATIVE_SIZE);
    let mut buffer = allocator.allocate_array(count)?;
    let slots = buffer.as_mut();
    if slots.len() != count {
        return Err(BridgeError::AllocationFailed { requested: count, bytes });
    }

    for (slot, mapping) in slots.iter_mut().zip(collapse_runs(entries)) {
        *slot = mapping;
    }

    trace!(rows = entries.len(), count, bytes, "collapsed line table");
    Ok(Some(buffer))
}

#[cfg(test)]
mod tests
{
    use proptest::prelude::*;

    use super::*;
    use crate::engine::RecordingEngine;
    use crate::types::SourceReason;

    fn rows(raw: &[(u32, u32, u32)]) -> Vec<LineEntry>
    {
        raw.iter().copied().map(LineEntry::from).collect()
    }

    /// Allocator that hands back one record too few.
    struct ShortAllocator;

    impl EngineAllocator for ShortAllocator
    {
        type Buffer = Vec<OffsetMapping>;

        fn allocate_array(&mut self, count: usize) -> BridgeResult<Self::Buffer>
        {
            Ok(vec![OffsetMapping::default(); count.saturating_sub(1)])
        }
    }

    #[test]
    fn test_empty_table_allocates_nothing()
    {
        let mut engine = RecordingEngine::new();
        let result = translate(&[], &mut engine).unwrap();
        assert!(result.is_none());
        assert_eq!(engine.allocations(), 0);
        assert!(engine.deliveries().is_empty());
    }

    #[test]
    fn test_single_run_keeps_first_row()
    {
        let mut engine = RecordingEngine::new();
        let entries = rows(&[(0, 5, 1), (4, 5, 0), (9, 5, 0)]);
        let mappings = translate(&entries, &mut engine).unwrap().unwrap();
        assert_eq!(mappings, vec![OffsetMapping::new(0, 5, SourceReason::CallInstruction)]);
        assert_eq!(engine.allocations(), 1);
    }

    #[test]
    fn test_call_flag_branches()
    {
        let mut engine = RecordingEngine::new();
        let entries = rows(&[(0, 1, 1), (2, 2, 0), (4, 3, 2)]);
        let mappings = translate(&entries, &mut engine).unwrap().unwrap();
        let reasons: Vec<_> = mappings.iter().map(|m| m.source).collect();
        assert_eq!(
            reasons,
            vec![SourceReason::CallInstruction, SourceReason::StackEmpty, SourceReason::StackEmpty]
        );
    }

    #[test]
    fn test_returning_line_starts_new_run()
    {
        let entries = rows(&[(0, 7, 0), (2, 8, 0), (4, 7, 0)]);
        assert_eq!(count_runs(&entries), 3);
    }

    #[test]
    fn test_allocation_failure_propagates()
    {
        let mut engine = RecordingEngine::with_allocation_budget(0);
        let err = translate(&rows(&[(0, 1, 0)]), &mut engine).unwrap_err();
        assert!(matches!(err, BridgeError::AllocationFailed { requested: 1, .. }));
    }

    #[test]
    fn test_short_buffer_is_rejected()
    {
        let err = translate(&rows(&[(0, 1, 0), (4, 2, 0)]), &mut ShortAllocator).unwrap_err();
        assert!(matches!(err, BridgeError::AllocationFailed { requested: 2, bytes: 24 }));
    }

    /// Reference model: indices of the first row of every run.
    fn run_heads(entries: &[LineEntry]) -> Vec<usize>
    {
        (0..entries.len())
            .filter(|&i| i == 0 || entries[i].source_line != entries[i - 1].source_line)
            .collect()
    }

    fn line_table() -> impl Strategy<Value = Vec<LineEntry>>
    {
        // Small line range so runs actually form.
        prop::collection::vec((0u32..4, 0u32..3), 0..64).prop_map(|rows| {
            let mut offset = 0;
            rows.into_iter()
                .map(|(line, is_call)| {
                    let entry = LineEntry::new(offset, line, is_call);
                    offset += 4;
                    entry
                })
                .collect()
        })
    }

    proptest! {
        /// K runs in, K records out, each matching the first row of its run.
        #[test]
        fn translate_emits_one_record_per_run(entries in line_table()) {
            let mut engine = RecordingEngine::new();
            let heads = run_heads(&entries);
            let result = translate(&entries, &mut engine).unwrap();

            match result {
                None => {
                    prop_assert!(heads.is_empty());
                    prop_assert_eq!(engine.allocations(), 0);
                }
                Some(mappings) => {
                    prop_assert_eq!(mappings.len(), heads.len());
                    for (mapping, &head) in mappings.iter().zip(&heads) {
                        prop_assert_eq!(*mapping, OffsetMapping::from_entry(&entries[head]));
                    }
                }
            }
        }

        /// Native offsets never go backwards within a function.
        #[test]
        fn translate_preserves_offset_order(entries in line_table()) {
            let collapsed: Vec<_> = collapse_runs(&entries).collect();
            prop_assert!(collapsed.windows(2).all(|pair| pair[0].native_offset <= pair[1].native_offset));
            prop_assert_eq!(collapsed.len(), count_runs(&entries));
        }
    }
}
