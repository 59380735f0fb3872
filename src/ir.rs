// Strongly-typed numeric IR and C rendering helpers. No serde_json::Value here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed-width C integer chosen for an integer-family node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeInt {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl NativeInt {
    pub const C_NAMES: [&'static str; 8] = [
        "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
    ];

    pub fn from_c_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8_t" => Self::I8,
            "int16_t" => Self::I16,
            "int32_t" => Self::I32,
            "int64_t" => Self::I64,
            "uint8_t" => Self::U8,
            "uint16_t" => Self::U16,
            "uint32_t" => Self::U32,
            "uint64_t" => Self::U64,
            _ => return None,
        })
    }

    /// Non-negative minimum ⇒ unsigned, anything else ⇒ signed.
    pub fn infer(minimum: Option<i128>) -> Self {
        match minimum {
            Some(m) if m >= 0 => Self::U64,
            _ => Self::I64,
        }
    }

    pub fn c_name(self) -> &'static str {
        match self {
            Self::I8 => "int8_t",
            Self::I16 => "int16_t",
            Self::I32 => "int32_t",
            Self::I64 => "int64_t",
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
            Self::U64 => "uint64_t",
        }
    }

    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    pub fn bits(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 | Self::U32 => 32,
            Self::I64 | Self::U64 => 64,
        }
    }

    /// Inclusive value range of the type.
    pub fn range(self) -> (i128, i128) {
        let bits = self.bits();
        if self.is_unsigned() {
            (0, (1i128 << bits) - 1)
        } else {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        }
    }

    /// Runtime primitive used to read the value before range checks.
    pub fn parser_fn(self) -> &'static str {
        if self.is_unsigned() { "builtin_parse_unsigned" } else { "builtin_parse_signed" }
    }

    /// 64-bit type the primitive parses into.
    pub fn parsed_type(self) -> &'static str {
        if self.is_unsigned() { "uint64_t" } else { "int64_t" }
    }

    pub fn format_macro(self) -> &'static str {
        if self.is_unsigned() { "PRIu64" } else { "PRId64" }
    }

    /// C literal of `value` in the 64-bit parse domain of this type.
    pub fn literal(self, value: i128) -> String {
        if self.is_unsigned() {
            format!("{value}ULL")
        } else if value == i64::MIN as i128 {
            // -9223372036854775808LL does not parse as a single literal
            "(-9223372036854775807LL - 1)".to_string()
        } else {
            format!("{value}LL")
        }
    }
}

/// Radix of a numeric string. `Auto` follows the C `strtol(.., 0)`
/// convention: `0x` prefix is hex, a leading `0` is octal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Auto,
    Decimal,
    Hex,
}

impl Radix {
    pub fn value(self) -> u32 {
        match self {
            Self::Auto => 0,
            Self::Decimal => 10,
            Self::Hex => 16,
        }
    }

    /// Parse a numeric string the way the runtime does, for defaults.
    pub fn parse(self, text: &str) -> Option<i128> {
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let strip_hex = |s: &str| -> Option<String> {
            s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).map(str::to_owned)
        };
        let (digits, radix) = match self {
            Self::Decimal => (body.to_owned(), 10),
            Self::Hex => (strip_hex(body).unwrap_or_else(|| body.to_owned()), 16),
            Self::Auto => match strip_hex(body) {
                Some(hex) => (hex, 16),
                None if body.len() > 1 && body.starts_with('0') => (body[1..].to_owned(), 8),
                None => (body.to_owned(), 10),
            },
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        let magnitude = i128::from_str_radix(&digits, radix).ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }
}

/// C rendering of a float default or bound.
pub fn float_literal(value: f64) -> String {
    let text = format!("{value:?}");
    if text.contains(['.', 'e', 'E']) { text } else { format!("{text}.0") }
}

static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());
static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Turn arbitrary text into a C identifier fragment.
pub fn c_identifier(text: &str) -> String {
    let ident = NON_IDENT.replace_all(text, "_").into_owned();
    match ident.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{ident}"),
        Some(_) => ident,
    }
}

/// `camelCased1` → `CAMEL_CASED1`, `value to s@nitize` → `VALUE_TO_S_NITIZE`.
pub fn enum_label(text: &str) -> String {
    let split = CAMEL_BOUNDARY.replace_all(text, "${1}_${2}");
    NON_ALNUM.replace_all(&split, "_").to_uppercase()
}

/// Escape text into a C string literal (quotes included). Non-ASCII bytes
/// are written as octal escapes so the literal is byte-exact.
pub fn c_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for byte in text.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            // keeps "??" sequences from being read as trigraphs
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out.push('"');
    out
}

/// Text safe to put inside a `/* */` comment.
pub fn comment_text(text: &str) -> String {
    text.replace("*/", "* /").replace(['\n', '\r'], " ")
}
