//! The Typst preamble written at the top of every document.

use std::borrow::Cow;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::SettingsError;

static EMBEDDED: Lazy<Preamble> = Lazy::new(|| Preamble {
    bytes: Cow::Borrowed(include_bytes!("../../assets/preamble.typ")),
});

/// An opaque block of Typst source copied verbatim before the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    bytes: Cow<'static, [u8]>,
}

impl Preamble {
    /// The preamble shipped with the crate.
    pub fn embedded() -> &'static Preamble {
        &EMBEDDED
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Cow::Owned(bytes.into()),
        }
    }

    /// Read a preamble from a file. The file is read once; later edits are not seen.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Preamble {
    fn default() -> Self {
        Self::embedded().clone()
    }
}
