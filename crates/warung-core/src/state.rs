//! # Order State Machine
//!
//! Legal order status transitions and their guards.
//!
//! ## Transition Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │              ┌──────► PAID ──────► COMPLETED (terminal)             │
//! │              │          │                                           │
//! │   PENDING ───┤          │                                           │
//! │              │          ▼                                           │
//! │              └──────► CANCELLED (terminal)                          │
//! │                                                                     │
//! │  • CANCELLED / COMPLETED reject every further change                │
//! │  • PENDING → PAID happens only through payment settlement;          │
//! │    the generic status update refuses it                             │
//! │  • cancellation (from PENDING or PAID) restores stock               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

/// Checks whether `from → to` is a legal transition.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Paid) | (Pending, Cancelled) | (Paid, Completed) | (Paid, Cancelled)
    )
}

/// Validates a transition, failing with `InvalidTransition` when illegal.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

/// Validates a transition requested through the *generic* status update.
///
/// Same rules as [`validate_transition`], with one extra guard: advancing
/// to PAID is reserved for payment settlement, so a generic update may
/// never produce it. This keeps the payment validation unbypassable.
pub fn validate_generic_transition(from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if to == OrderStatus::Paid {
        return Err(CoreError::InvalidTransition { from, to });
    }
    validate_transition(from, to)
}

/// True for states that admit no further change.
pub fn is_terminal(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Completed | OrderStatus::Cancelled)
}

// =============================================================================
// Unit Tests
// =============================================================================
