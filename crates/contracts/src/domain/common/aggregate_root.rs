use super::EntityMetadata;

/// Trait implemented by every aggregate root
pub trait AggregateRoot {
    type Id;

    // ============================================================================
    // Instance data
    // ============================================================================

    fn id(&self) -> Self::Id;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    // ============================================================================
    // Class metadata
    // ============================================================================

    /// Aggregate index, e.g. "a003"
    fn aggregate_index() -> &'static str;

    /// Collection name, e.g. "product"
    fn collection_name() -> &'static str;

    /// Human readable name of a single element, used in error messages
    fn element_name() -> &'static str;

    // ============================================================================
    // Defaults
    // ============================================================================

    /// Table name, e.g. "a003_product"
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }

    fn is_deleted(&self) -> bool {
        self.metadata().is_deleted
    }
}
