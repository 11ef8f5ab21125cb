//! Credo FSM - Tick-driven state machine over the belief mesh.
//!
//! The engine holds a machine definition delivered over the control
//! plane, observes belief snapshots from the store, and advances at most
//! one transition per tick. Everything it does outward - state beliefs,
//! note-driven commits and sends - goes through the substrate's
//! capability surface.

pub mod definition;
pub mod engine;
pub mod intent;
pub mod registers;

pub use definition::{Definition, DefinitionError, Transition};
pub use engine::Fsm;
pub use intent::{CommitIntent, IntentNote, NullResolver, RegisterResolver};
pub use registers::FsmRegisters;
