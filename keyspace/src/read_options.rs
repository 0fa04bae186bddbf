//! Options for strict/lenient loading of locale directories into `KeySource`s.

/// Read behavior options for [`crate::source::read_locale_dir`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadOptions {
    /// Fail on the first unreadable or invalid category file instead of skipping it.
    pub strict: bool,
    /// Whether to record each file path as the source `origin`.
    pub attach_origin: bool,
}

impl ReadOptions {
    /// Creates default read options (lenient, no origin).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enables/disables origin capture.
    pub fn with_origin(mut self, attach_origin: bool) -> Self {
        self.attach_origin = attach_origin;
        self
    }
}
