//! Saga behavior toggles.

/// Configuration for the two order-lifecycle behaviors that are
/// deliberately switchable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// When the decrement fan-out of a checkout partially fails, roll
    /// back the decrements that did succeed before deleting the order
    /// row. Off reproduces the legacy behavior of leaving them applied.
    pub rollback_decrements_on_failure: bool,

    /// Decrement stock every time an admin moves an order into
    /// `processing`, even if it has been in `processing` before. On
    /// reproduces the legacy behavior; off restricts the decrement to
    /// the `pending → processing` transition.
    pub redecrement_on_reprocess: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            rollback_decrements_on_failure: true,
            redecrement_on_reprocess: true,
        }
    }
}
