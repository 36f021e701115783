// ============================================================================
// Order Domain - menu, actions, validation and their effects
// ============================================================================
//
// - Value objects (MenuItem, OrderLineItem, Order)
// - Commands (StructuredAction)
// - Errors (SchemaError, OrderError)
// - Schema validator (raw model JSON → StructuredAction)
// - Command handler (ActionInterpreter)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod schema;
pub mod command_handler;

pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use schema::validate_action;
pub use command_handler::*;
