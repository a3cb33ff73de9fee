//! Script file encodings.
//!
//! Scripts are UTF-8 unless they start with a byte-order mark. UTF-16 files
//! written by Windows editors carry a BOM, which is the only way they are
//! recognized.

use crate::error::{DbError, DbResult};
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encoding of a script file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 little endian with BOM
    Utf16Le,
    /// UTF-16 big endian with BOM
    Utf16Be,
}

impl std::fmt::Display for ScriptEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptEncoding::Utf8 | ScriptEncoding::Utf8Bom => write!(f, "UTF-8"),
            ScriptEncoding::Utf16Le => write!(f, "UTF-16LE"),
            ScriptEncoding::Utf16Be => write!(f, "UTF-16BE"),
        }
    }
}

impl ScriptEncoding {
    /// Detect the encoding from the leading bytes
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            ScriptEncoding::Utf8Bom
        } else if bytes.starts_with(UTF16_LE_BOM) {
            ScriptEncoding::Utf16Le
        } else if bytes.starts_with(UTF16_BE_BOM) {
            ScriptEncoding::Utf16Be
        } else {
            ScriptEncoding::Utf8
        }
    }

    /// Detect the encoding of a file on disk
    pub fn detect_file(path: &Path) -> DbResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| script_read_error(path, e))?;
        Ok(Self::detect(&bytes))
    }

    /// Decode file contents, dropping the BOM
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            ScriptEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            ScriptEncoding::Utf8Bom => {
                String::from_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes).to_vec()).ok()
            }
            ScriptEncoding::Utf16Le => decode_utf16(
                bytes.strip_prefix(UTF16_LE_BOM).unwrap_or(bytes),
                u16::from_le_bytes,
            ),
            ScriptEncoding::Utf16Be => decode_utf16(
                bytes.strip_prefix(UTF16_BE_BOM).unwrap_or(bytes),
                u16::from_be_bytes,
            ),
        }
    }
}

/// Read a script file as text
pub fn read_script(path: &Path, encoding: ScriptEncoding) -> DbResult<String> {
    let bytes = std::fs::read(path).map_err(|e| script_read_error(path, e))?;
    encoding.decode(&bytes).ok_or_else(|| DbError::ScriptDecode {
        path: path.display().to_string(),
        encoding: encoding.to_string(),
    })
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).ok()
}

fn script_read_error(path: &Path, source: std::io::Error) -> DbError {
    DbError::ScriptRead {
        path: path.display().to_string(),
        source,
    }
}
