//! Domain layer - pure types and invariants.
//!
//! No I/O lives here. The conversation log's sequencing rules, the persona
//! catalog's total-lookup contract, and the error taxonomy are defined in
//! this layer; the adapters that implement the ports enforce them.

pub mod conversation;
pub mod foundation;
pub mod persona;
