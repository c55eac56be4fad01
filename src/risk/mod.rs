//! Pure trade-planning calculators
//!
//! Stateless arithmetic consumed by the CLI and exposed as tool contracts to
//! chat integrations. The position sizer's share count feeds directly into
//! ledger order placement.

pub mod dca;
pub mod position;

pub use dca::{calculate_dca, DcaInputs, DcaResult};
pub use position::{calculate_position_size, PositionInputs, PositionResult};
