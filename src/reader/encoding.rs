// Mon Oct 19 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fmt;

/// Text encodings a fixed-width file may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl TextEncoding {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Some(TextEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Some(TextEncoding::Latin1),
            "ascii" | "us-ascii" => Some(TextEncoding::Ascii),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Whether `bytes` decode under this encoding.
    pub fn accepts(&self, bytes: &[u8]) -> bool {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).is_ok(),
            TextEncoding::Latin1 => true,
            TextEncoding::Ascii => bytes.is_ascii(),
        }
    }

    /// Strict decode. Latin-1 maps every byte and therefore never fails.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    std::str::from_utf8(bytes).ok().map(str::to_string)
                } else {
                    None
                }
            }
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::from_label(&label).ok_or_else(|| format!("unsupported encoding '{}'", label))
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn default_encodings() -> Vec<TextEncoding> {
    vec![TextEncoding::Utf8, TextEncoding::Latin1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_rejects_latin1_bytes() {
        let bytes = [b'0', b'1', 0xC7, b'A'];
        assert!(TextEncoding::Utf8.decode(&bytes).is_none());
        assert_eq!(TextEncoding::Latin1.decode(&bytes).unwrap(), "01ÇA");
    }

    #[test]
    fn test_ascii_is_strict() {
        assert!(TextEncoding::Ascii.decode("é".as_bytes()).is_none());
        assert_eq!(TextEncoding::Ascii.decode(b"0100").unwrap(), "0100");
    }

    #[test]
    fn test_from_label() {
        assert_eq!(TextEncoding::from_label("ISO-8859-1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::from_label("utf_8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("ebcdic"), None);
    }

    #[test]
    fn test_config_labels() {
        let parsed: Vec<TextEncoding> = serde_json::from_str(r#"["latin1", "ISO-8859-1", "utf-8"]"#).unwrap();
        assert_eq!(parsed, vec![TextEncoding::Latin1, TextEncoding::Latin1, TextEncoding::Utf8]);
        assert!(serde_json::from_str::<TextEncoding>(r#""cp1252""#).is_err());
        assert_eq!(serde_json::to_string(&TextEncoding::Latin1).unwrap(), r#""latin1""#);
    }

    #[test]
    fn test_windows_1252_is_not_latin1() {
        // 0x80 is the euro sign in cp1252 but a C1 control in ISO-8859-1.
        assert_eq!(TextEncoding::from_label("cp1252"), None);
        assert_eq!(TextEncoding::from_label("windows-1252"), None);
        assert_eq!(TextEncoding::Latin1.decode(&[0x80]).unwrap(), "\u{80}");
    }

    #[test]
    fn test_accepts_matches_decode() {
        let bytes = [b'0', b'1', 0xC7];
        assert!(!TextEncoding::Utf8.accepts(&bytes));
        assert!(!TextEncoding::Ascii.accepts(&bytes));
        assert!(TextEncoding::Latin1.accepts(&bytes));
    }
}
