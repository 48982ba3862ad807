//! Currency display symbols for revenue axis labels.

/// Where a currency symbol is placed relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Postfix,
}

/// Base currency used when settings have not provided one.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

const CURRENCY_SYMBOLS: &[(&str, &str, SymbolPosition)] = &[
    ("USD", "$", SymbolPosition::Prefix),
    ("GBP", "£", SymbolPosition::Prefix),
    ("JPY", "¥", SymbolPosition::Prefix),
    ("CNY", "¥", SymbolPosition::Prefix),
    ("INR", "₹", SymbolPosition::Prefix),
    ("AUD", "A$", SymbolPosition::Prefix),
    ("CAD", "CA$", SymbolPosition::Prefix),
    ("NZD", "NZ$", SymbolPosition::Prefix),
    ("HKD", "HK$", SymbolPosition::Prefix),
    ("SGD", "S$", SymbolPosition::Prefix),
    ("BRL", "R$", SymbolPosition::Prefix),
    ("MXN", "MX$", SymbolPosition::Prefix),
    ("KRW", "₩", SymbolPosition::Prefix),
    ("ILS", "₪", SymbolPosition::Prefix),
    ("PHP", "₱", SymbolPosition::Prefix),
    ("NGN", "₦", SymbolPosition::Prefix),
    ("CHF", "CHF", SymbolPosition::Prefix),
    ("EUR", "€", SymbolPosition::Postfix),
    ("SEK", "kr", SymbolPosition::Postfix),
    ("NOK", "kr", SymbolPosition::Postfix),
    ("DKK", "kr", SymbolPosition::Postfix),
    ("PLN", "zł", SymbolPosition::Postfix),
    ("CZK", "Kč", SymbolPosition::Postfix),
    ("HUF", "Ft", SymbolPosition::Postfix),
    ("RON", "lei", SymbolPosition::Postfix),
    ("RUB", "₽", SymbolPosition::Postfix),
    ("TRY", "₺", SymbolPosition::Postfix),
    ("VND", "₫", SymbolPosition::Postfix),
];

/// Resolved symbol for one currency code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySymbol {
    pub symbol: String,
    pub position: SymbolPosition,
}

impl CurrencySymbol {
    pub fn is_prefix(&self) -> bool {
        self.position == SymbolPosition::Prefix
    }

    /// Returns `(prefix, postfix)`; exactly one side is set.
    pub fn axis_affixes(&self) -> (Option<String>, Option<String>) {
        match self.position {
            SymbolPosition::Prefix => (Some(self.symbol.clone()), None),
            SymbolPosition::Postfix => (None, Some(self.symbol.clone())),
        }
    }
}

/// Looks up the display symbol for an ISO currency code.
///
/// Matching ignores case and surrounding whitespace. Unknown codes display
/// as the upper-cased code itself, after the amount.
pub fn currency_symbol(code: &str) -> CurrencySymbol {
    let normalized = code.trim().to_ascii_uppercase();
    match CURRENCY_SYMBOLS
        .iter()
        .find(|(known, _, _)| *known == normalized)
    {
        Some((_, symbol, position)) => CurrencySymbol {
            symbol: (*symbol).to_string(),
            position: *position,
        },
        None => CurrencySymbol {
            symbol: normalized,
            position: SymbolPosition::Postfix,
        },
    }
}
