//! Legacy double-byte code pages targeted by proxy allocation.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use encoding_rs::{BIG5, Encoding, GBK, SHIFT_JIS};

use crate::text::is_control_or_separator;

type ByteRanges = &'static [RangeInclusive<u8>];

const CP932_LEADS: ByteRanges = &[0x89..=0x9F, 0xE0..=0xEA];
const CP932_TRAILS: ByteRanges = &[0x40..=0x7E, 0x80..=0xFC];
const GBK_LEADS: ByteRanges = &[0xB0..=0xF7];
const GBK_TRAILS: ByteRanges = &[0xA1..=0xFE];
const BIG5_LEADS: ByteRanges = &[0xA4..=0xF9];
const BIG5_TRAILS: ByteRanges = &[0x40..=0x7E, 0xA1..=0xFE];

/// A legacy code page whose double-byte space supplies proxy characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodePage {
    /// Windows-31J, the Shift_JIS superset used by Japanese engines.
    #[default]
    Cp932,
    Gbk,
    Big5,
}

impl CodePage {
    pub fn encoding(self) -> &'static Encoding {
        match self {
            CodePage::Cp932 => SHIFT_JIS,
            CodePage::Gbk => GBK,
            CodePage::Big5 => BIG5,
        }
    }

    /// Encodes one character, or `None` when the code page cannot represent it.
    pub fn encode(self, ch: char) -> Option<Vec<u8>> {
        let mut buf = [0u8; 4];
        let (bytes, _, had_errors) = self.encoding().encode(ch.encode_utf8(&mut buf));
        (!had_errors).then(|| bytes.into_owned())
    }

    /// Encodes a whole string, or `None` if any character is unrepresentable.
    pub fn encode_text(self, text: &str) -> Option<Vec<u8>> {
        let (bytes, _, had_errors) = self.encoding().encode(text);
        (!had_errors).then(|| bytes.into_owned())
    }

    pub fn can_encode(self, ch: char) -> bool {
        self.encode(ch).is_some()
    }

    /// True when `ch` encodes to exactly two bytes.
    pub fn is_double_byte(self, ch: char) -> bool {
        self.encode(ch).is_some_and(|b| b.len() == 2)
    }

    /// Decodes a byte sequence that must yield exactly one character.
    pub fn decode_single(self, bytes: &[u8]) -> Option<char> {
        let text = self
            .encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)?;
        let mut chars = text.chars();
        let ch = chars.next()?;
        chars.next().is_none().then_some(ch)
    }

    /// Lead and trail byte ranges scanned when building the full proxy pool.
    ///
    /// The ranges cover the ideograph area of each code page and avoid the
    /// symbol rows, so proxies render as ordinary characters.
    pub fn proxy_ranges(self) -> (ByteRanges, ByteRanges) {
        match self {
            CodePage::Cp932 => (CP932_LEADS, CP932_TRAILS),
            CodePage::Gbk => (GBK_LEADS, GBK_TRAILS),
            CodePage::Big5 => (BIG5_LEADS, BIG5_TRAILS),
        }
    }

    /// Every printable character of the proxy ranges, in byte order.
    pub fn double_byte_characters(self) -> impl Iterator<Item = char> {
        let (leads, trails) = self.proxy_ranges();
        leads
            .iter()
            .flat_map(|r| r.clone())
            .flat_map(move |lead| {
                trails
                    .iter()
                    .flat_map(|r| r.clone())
                    .map(move |trail| [lead, trail])
            })
            .filter_map(move |pair| self.decode_single(&pair))
            .filter(|ch| !is_control_or_separator(*ch))
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodePage::Cp932 => "cp932",
            CodePage::Gbk => "gbk",
            CodePage::Big5 => "big5",
        };
        f.write_str(name)
    }
}

impl FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "cp932" | "shiftjis" | "sjis" | "windows31j" => Ok(CodePage::Cp932),
            "gbk" | "cp936" => Ok(CodePage::Gbk),
            "big5" | "cp950" => Ok(CodePage::Big5),
            other => Err(format!("unknown code page '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp932_encodability() {
        let cp = CodePage::Cp932;
        assert_eq!(cp.encode('A'), Some(vec![0x41]));
        assert_eq!(cp.encode('あ'), Some(vec![0x82, 0xA0]));
        assert!(cp.is_double_byte('漢'));
        assert!(!cp.can_encode('한'));
        assert!(!cp.can_encode('\u{1F600}'));
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(CodePage::Cp932.encode_text("aあ"), Some(vec![0x61, 0x82, 0xA0]));
        assert_eq!(CodePage::Cp932.encode_text("a한"), None);
    }

    #[test]
    fn test_decode_single() {
        let cp = CodePage::Cp932;
        assert_eq!(cp.decode_single(&[0x88, 0x9F]), Some('亜'));
        assert_eq!(cp.decode_single(&[0x41, 0x42]), None);
    }

    #[test]
    fn test_double_byte_scan_is_printable() {
        let chars: Vec<char> = CodePage::Cp932.double_byte_characters().collect();
        assert!(chars.len() > 5000);
        assert!(chars.iter().all(|c| CodePage::Cp932.is_double_byte(*c)));
        assert!(chars.iter().all(|c| !is_control_or_separator(*c)));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Shift_JIS".parse::<CodePage>(), Ok(CodePage::Cp932));
        assert_eq!("cp936".parse::<CodePage>(), Ok(CodePage::Gbk));
        assert!("latin1".parse::<CodePage>().is_err());
    }
}
