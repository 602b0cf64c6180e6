use reveal_core::RoundSnapshot;

/// Events broadcast from the round actor to presentation subscribers.
#[derive(Debug, Clone)]
pub enum RoundEvent {
    /// Full state snapshot after any mutation.
    StateChanged(RoundSnapshot),
    /// The map should be rebuilt from scratch rather than updated in place.
    ViewportRemount { key: u64 },
    /// User-visible error message.
    Error(String),
}
