use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Display name used as the prefix of every diagnostic line
pub const MODULE_NAME: &str = "Palette Identification";

/// Hands out module ids to the puzzles created by one composer.
///
/// Ids only disambiguate log lines when several puzzles run side by side.
#[derive(Debug, Default)]
pub struct ModuleIdCounter {
    last: AtomicU32,
}

impl ModuleIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, starting at 1
    pub fn next_id(&self) -> u32 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Log context of one puzzle instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleLog {
    id: u32,
}

impl ModuleLog {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn info(&self, message: fmt::Arguments<'_>) {
        tracing::info!(module_id = self.id, "[{} #{}] {}", MODULE_NAME, self.id, message);
    }

    pub fn warn(&self, message: fmt::Arguments<'_>) {
        tracing::warn!(module_id = self.id, "[{} #{}] {}", MODULE_NAME, self.id, message);
    }
}
