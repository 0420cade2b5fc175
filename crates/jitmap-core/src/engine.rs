//! Execution engine binding.
//!
//! The engine owns two things the bridge needs: the allocator used for
//! offset-mapping arrays, and the call that attaches a finished array to a
//! compiled method. Both sit behind traits so the listener can run against a
//! live engine binding or against [`RecordingEngine`] in tests.

use crate::error::{BridgeError, BridgeResult};
use crate::types::{FunctionSymbol, OffsetMapping};

/// Allocator for engine-owned offset-mapping arrays.
///
/// The translator calls this at most once per function and never allocates
/// the array anywhere else. Whatever the engine hands back lives as long as
/// the engine decides; the bridge never frees it.
pub trait EngineAllocator
{
    /// Engine-owned storage for a run of `OffsetMapping` records.
    type Buffer: AsRef<[OffsetMapping]> + AsMut<[OffsetMapping]>;

    /// Allocate exactly `count` records.
    ///
    /// ## Errors
    ///
    /// Returns [`BridgeError::AllocationFailed`] if the engine is out of memory.
    fn allocate_array(&mut self, count: usize) -> BridgeResult<Self::Buffer>;
}

/// Full engine binding: allocation plus delivery.
pub trait EngineBinding: EngineAllocator
{
    /// Attach `mappings` to the method compiled as `function`.
    ///
    /// `mappings` is never empty.
    ///
    /// ## Errors
    ///
    /// Returns [`BridgeError::DeliveryFailed`] if the engine rejects the table.
    fn notify_event(&mut self, function: &FunctionSymbol, mappings: Self::Buffer) -> BridgeResult<()>;
}

/// One `notify_event` call captured by [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery
{
    /// Function the table was delivered for.
    pub function: FunctionSymbol,
    /// The delivered table.
    pub mappings: Vec<OffsetMapping>,
}

/// Test double that records every allocation and delivery.
///
/// An optional allocation budget makes the allocator fail after a fixed number
/// of successful calls.
#[derive(Debug, Default)]
pub struct RecordingEngine
{
    deliveries: Vec<Delivery>,
    allocations: usize,
    allocation_budget: Option<usize>,
}

impl RecordingEngine
{
    /// Create an engine that never fails.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create an engine whose allocator fails once `budget` allocations have succeeded.
    #[must_use]
    pub fn with_allocation_budget(budget: usize) -> Self
    {
        Self {
            allocation_budget: Some(budget),
            ..Self::default()
        }
    }

    /// Every table delivered so far, in delivery order.
    pub fn deliveries(&self) -> &[Delivery]
    {
        &self.deliveries
    }

    /// Number of successful allocations.
    pub fn allocations(&self) -> usize
    {
        self.allocations
    }
}

impl EngineAllocator for RecordingEngine
{
    type Buffer = Vec<OffsetMapping>;

    fn allocate_array(&mut self, count: usize) -> BridgeResult<Self::Buffer>
    {
        if self.allocation_budget.is_some_and(|budget| self.allocations >= budget) {
            return Err(BridgeError::AllocationFailed {
                requested: count,
                bytes: count.saturating_mul(OffsetMapping::NATIVE_SIZE),
            });
        }
        self.allocations += 1;
        Ok(vec![OffsetMapping::default(); count])
    }
}

impl EngineBinding for RecordingEngine
{
    fn notify_event(&mut self, function: &FunctionSymbol, mappings: Self::Buffer) -> BridgeResult<()>
    {
        self.deliveries.push(Delivery {
            function: function.clone(),
            mappings,
        });
        Ok(())
    }
}
