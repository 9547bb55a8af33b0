//! # Value Objects
//!
//! Immutable token description: currency code and precision.

use rust_decimal::Decimal;
use std::fmt;

use super::errors::CurrencyError;

/// Classic XRPL account address (`r...`).
pub type AccountId = String;

/// XRPL currency code with both of its on-ledger spellings.
///
/// Codes other than three characters travel as a 160-bit value: the ASCII
/// bytes right-padded with zeros, hex encoded. `DROP` is therefore also
/// `44524F5000000000000000000000000000000000`. Three-character codes use
/// the standard layout instead, with the ASCII bytes at offsets 12 to 14
/// of an otherwise zero field. Both spellings denote the same currency and
/// [`CurrencyCode::matches`] accepts either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCode {
    symbol: String,
    hex: String,
}

impl CurrencyCode {
    /// Width of the currency field in bytes.
    pub const WIDTH: usize = 20;

    /// Byte offset of a standard three-character code.
    const STANDARD_OFFSET: usize = 12;
    const STANDARD_LEN: usize = 3;

    /// Build from a symbolic code such as `DROP`.
    pub fn new(symbol: &str) -> Result<Self, CurrencyError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(CurrencyError::Empty);
        }
        if !symbol.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(CurrencyError::NotAscii(symbol.to_string()));
        }
        if symbol.len() > Self::WIDTH {
            return Err(CurrencyError::TooLong {
                len: symbol.len(),
                max: Self::WIDTH,
            });
        }
        if symbol.eq_ignore_ascii_case("XRP") {
            return Err(CurrencyError::NativeAsset);
        }

        Ok(Self::encode(symbol))
    }

    /// Code for a symbol already known to be valid, such as a built-in default.
    pub(crate) fn known(symbol: &str) -> Self {
        debug_assert!(Self::new(symbol).is_ok(), "invalid built-in currency {symbol}");
        Self::encode(symbol)
    }

    fn encode(symbol: &str) -> Self {
        let mut bytes = [0u8; Self::WIDTH];
        let start = if symbol.len() == Self::STANDARD_LEN {
            Self::STANDARD_OFFSET
        } else {
            0
        };
        bytes[start..start + symbol.len()].copy_from_slice(symbol.as_bytes());
        Self {
            symbol: symbol.to_string(),
            hex: hex::encode_upper(bytes),
        }
    }

    /// Build from the 40-character hexadecimal spelling.
    pub fn from_hex(code: &str) -> Result<Self, CurrencyError> {
        let code = code.trim();
        let bytes = hex::decode(code).map_err(|_| CurrencyError::InvalidHex(code.to_string()))?;
        if bytes.len() != Self::WIDTH {
            return Err(CurrencyError::InvalidHex(code.to_string()));
        }

        // A leading zero byte marks the standard layout.
        let symbol = if bytes[0] == 0 {
            let (prefix, rest) = bytes.split_at(Self::STANDARD_OFFSET);
            let (symbol, suffix) = rest.split_at(Self::STANDARD_LEN);
            if prefix.iter().chain(suffix).any(|b| *b != 0) {
                return Err(CurrencyError::InvalidHex(code.to_string()));
            }
            if symbol.iter().all(|b| *b == 0) {
                return Err(CurrencyError::Empty);
            }
            symbol
        } else {
            let end = bytes
                .iter()
                .rposition(|b| *b != 0)
                .map(|idx| idx + 1)
                .unwrap_or(0);
            &bytes[..end]
        };
        let symbol =
            std::str::from_utf8(symbol).map_err(|_| CurrencyError::InvalidHex(code.to_string()))?;

        Self::new(symbol)
    }

    /// Accept either spelling.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let trimmed = code.trim();
        if trimmed.len() == Self::WIDTH * 2 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(trimmed)
        } else {
            Self::new(trimmed)
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Case-insensitive match against either spelling.
    pub fn matches(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(&self.symbol) || code.eq_ignore_ascii_case(&self.hex)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// What is being measured: the currency, its published precision and the
/// fixed supply cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub currency: CurrencyCode,
    pub decimals: u32,
    pub total_supply: Decimal,
}

impl TokenConfig {
    pub fn symbol(&self) -> &str {
        self.currency.symbol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DROP_HEX: &str = "44524F5000000000000000000000000000000000";

    #[test]
    fn test_symbol_derives_padded_hex() {
        let code = CurrencyCode::new("DROP").unwrap();
        assert_eq!(code.symbol(), "DROP");
        assert_eq!(code.hex(), DROP_HEX);
    }

    #[test]
    fn test_three_letter_codes_use_standard_layout() {
        let usd = CurrencyCode::new("USD").unwrap();
        assert_eq!(usd.hex(), "0000000000000000000000005553440000000000");
        assert_eq!(CurrencyCode::from_hex(usd.hex()).unwrap(), usd);
        assert!(usd.matches("usd"));
        assert!(usd.matches("0000000000000000000000005553440000000000"));
        assert!(!usd.matches("5553440000000000000000000000000000000000"));

        let short = CurrencyCode::new("AB").unwrap();
        assert_eq!(short.hex(), "4142000000000000000000000000000000000000");
    }

    #[test]
    fn test_standard_layout_rejects_stray_bytes() {
        assert!(matches!(
            CurrencyCode::from_hex("0000000000000000000000005553440000000001"),
            Err(CurrencyError::InvalidHex(_))
        ));
        assert_eq!(
            CurrencyCode::from_hex("0000000000000000000000000000000000000000"),
            Err(CurrencyError::Empty)
        );
        assert_eq!(
            CurrencyCode::from_hex("0000000000000000000000005852500000000000"),
            Err(CurrencyError::NativeAsset)
        );
    }

    #[test]
    fn test_from_hex_recovers_symbol() {
        let code = CurrencyCode::from_hex(&DROP_HEX.to_lowercase()).unwrap();
        assert_eq!(code.symbol(), "DROP");
        assert_eq!(code, CurrencyCode::new("DROP").unwrap());
    }

    #[test]
    fn test_parse_accepts_both_spellings() {
        assert_eq!(CurrencyCode::parse("DROP").unwrap().hex(), DROP_HEX);
        assert_eq!(CurrencyCode::parse(DROP_HEX).unwrap().symbol(), "DROP");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let code = CurrencyCode::new("DROP").unwrap();
        assert!(code.matches("DROP"));
        assert!(code.matches("drop"));
        assert!(code.matches("Drop"));
        assert!(code.matches(DROP_HEX));
        assert!(code.matches(&DROP_HEX.to_lowercase()));
        assert!(!code.matches("USD"));
        assert!(!code.matches(""));
        assert!(!code.matches("44524F5000000000000000000000000000000001"));
    }

    #[test]
    fn test_rejects_invalid_codes() {
        assert_eq!(CurrencyCode::new(""), Err(CurrencyError::Empty));
        assert_eq!(CurrencyCode::new("xrp"), Err(CurrencyError::NativeAsset));
        assert!(matches!(
            CurrencyCode::new("ABCDEFGHIJKLMNOPQRSTU"),
            Err(CurrencyError::TooLong { len: 21, max: 20 })
        ));
        assert!(matches!(
            CurrencyCode::from_hex("ZZ"),
            Err(CurrencyError::InvalidHex(_))
        ));
        assert!(matches!(
            CurrencyCode::from_hex("0000000000000000000000000000000000000000"),
            Err(CurrencyError::Empty)
        ));
    }

    proptest! {
        #[test]
        fn prop_symbol_and_hex_match_each_other(symbol in "[A-Z]{3,12}") {
            prop_assume!(symbol != "XRP");
            let code = CurrencyCode::new(&symbol).unwrap();
            prop_assert!(code.matches(&symbol.to_lowercase()));
            prop_assert!(code.matches(&code.hex().to_lowercase()));
            let round = CurrencyCode::from_hex(code.hex()).unwrap();
            prop_assert_eq!(round, code);
        }
    }
}
