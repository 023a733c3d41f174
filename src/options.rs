//! Configuration options for TOON encoding and decoding.
//!
//! - [`ToonOptions`]: encoder layout (spaces per nesting level)
//! - [`DecodeOptions`]: decoder leniency ([`DecodeMode`])
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::{from_str_with_options, to_string_with_options, DecodeOptions, ToonOptions};
//!
//! let toon = to_string_with_options(&vec![vec![1, 2]], ToonOptions::new().with_indent(4)).unwrap();
//! assert_eq!(toon, "[1]\n    [2]\n        1\n        2");
//!
//! let back: Vec<Vec<i32>> = from_str_with_options(&toon, DecodeOptions::strict()).unwrap();
//! assert_eq!(back, vec![vec![1, 2]]);
//! ```

/// Configuration options for TOON encoding.
///
/// # Examples
///
/// ```rust
/// use toon_codec::ToonOptions;
///
/// let options = ToonOptions::new();
/// assert_eq!(options.indent, 2);
///
/// let options = ToonOptions::new().with_indent(4);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToonOptions {
    /// Spaces emitted per nesting level.
    pub indent: usize,
}

impl Default for ToonOptions {
    fn default() -> Self {
        ToonOptions { indent: 2 }
    }
}

impl ToonOptions {
    /// Creates default options (2-space indent).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// The decoder finds the end of a block by its indentation, so an indent
    /// of 0 is raised to 1. The encoder applies the same floor when `indent`
    /// is set directly.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent.max(1);
        self
    }
}

/// How the decoder treats recoverable mismatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Skip tabular rows with the wrong part count and keys that resolve to
    /// no destination member.
    #[default]
    Lenient,
    /// Report both conditions as errors.
    Strict,
}

/// Configuration options for TOON decoding.
///
/// # Examples
///
/// ```rust
/// use toon_codec::{DecodeMode, DecodeOptions};
///
/// assert_eq!(DecodeOptions::new().mode, DecodeMode::Lenient);
/// assert!(DecodeOptions::strict().is_strict());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
}

impl DecodeOptions {
    /// Creates default options (lenient mode).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for strict validation.
    #[must_use]
    pub fn strict() -> Self {
        DecodeOptions {
            mode: DecodeMode::Strict,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        matches!(self.mode, DecodeMode::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_indent_is_raised_to_one() {
        assert_eq!(ToonOptions::new().with_indent(0).indent, 1);
        assert_eq!(ToonOptions::new().with_indent(3).indent, 3);
    }
}
