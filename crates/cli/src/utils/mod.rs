//! Argument parsing helpers for the cardfuzz CLI

pub(crate) mod reader;

/// ATR prefix a card must match
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtrPattern(pub Vec<u8>);

fn strip_hex(s: &str) -> String {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    s.chars().filter(|c| !c.is_whitespace() && *c != ':').collect()
}

/// Parse a single byte written in hex, with or without a `0x` prefix
pub(crate) fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = strip_hex(s);
    if digits.is_empty() || digits.len() > 2 {
        return Err(format!("'{s}' is not a single hex byte"));
    }
    u8::from_str_radix(&digits, 16).map_err(|e| format!("'{s}' is not a hex byte: {e}"))
}

/// Parse an ATR pattern such as `3B8F80` or `3B 8F 80`
pub(crate) fn parse_atr(s: &str) -> Result<AtrPattern, String> {
    let digits = strip_hex(s);
    if digits.is_empty() {
        return Err("ATR pattern cannot be empty".to_string());
    }
    hex::decode(&digits)
        .map(AtrPattern)
        .map_err(|e| format!("invalid ATR pattern '{s}': {e}"))
}
