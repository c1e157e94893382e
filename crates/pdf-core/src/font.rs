//! Standard (non-embedded) fonts
//!
//! Overlay text is drawn with one of the PDF base-14 fonts, so nothing is
//! embedded or subsetted. Only the fixed-pitch Courier face is supported.

use lopdf::{Dictionary, Object};

/// A base-14 font referenced by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardFont {
    #[default]
    Courier,
}

impl StandardFont {
    /// PostScript name used as `/BaseFont`
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Courier => "Courier",
        }
    }

    /// Font dictionary to register in a page's `/Resources /Font`
    pub fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            (
                "BaseFont",
                Object::Name(self.base_font().as_bytes().to_vec()),
            ),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ])
    }

    /// Check whether every character has a WinAnsi code point
    pub fn can_encode(&self, text: &str) -> bool {
        text.chars().all(|c| win_ansi_byte(c).is_some())
    }

    /// Encode text as hex string for PDF Tj operator
    ///
    /// Characters outside WinAnsiEncoding are replaced by `?`.
    pub fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            let byte = win_ansi_byte(c).unwrap_or(b'?');
            result.push_str(&format!("{byte:02X}"));
        }
        result.push('>');
        result
    }
}

/// Map a character to its WinAnsiEncoding byte
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            'ƒ' => Some(0x83),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '†' => Some(0x86),
            '‡' => Some(0x87),
            'ˆ' => Some(0x88),
            '‰' => Some(0x89),
            'Š' => Some(0x8A),
            '‹' => Some(0x8B),
            'Œ' => Some(0x8C),
            'Ž' => Some(0x8E),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '˜' => Some(0x98),
            '™' => Some(0x99),
            'š' => Some(0x9A),
            '›' => Some(0x9B),
            'œ' => Some(0x9C),
            'ž' => Some(0x9E),
            'Ÿ' => Some(0x9F),
            _ => None,
        },
    }
}
