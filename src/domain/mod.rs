// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Everything about orders that does not depend on HTTP, the model host or
// the storage backend.
//
// ============================================================================

pub mod order;
