//! Names for storage backends.

use smol_str::SmolStr;
use std::fmt;

/// Short name of a storage backend, e.g. `moka` or `feoxdb`.
///
/// Shows up in [`ResponseSource::Backend`](crate::ResponseSource::Backend)
/// when a call was answered from storage, and as a metrics label.
///
/// ```
/// use pulse_core::BackendLabel;
///
/// let label = BackendLabel::new_static("feoxdb");
/// assert_eq!(label.to_string(), "feoxdb");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackendLabel(SmolStr);

impl BackendLabel {
    /// Creates a label from any string.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a label from a static string without allocating.
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the label as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BackendLabel {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for BackendLabel {
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for BackendLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
