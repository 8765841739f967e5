//! Column metadata read from a source table.
//!
//! [`ColumnDescriptor`] mirrors one row of SQLite's `PRAGMA table_info`.
//! Default values are classified into a [`DefaultValue`] so the statement
//! builder knows whether to quote them, instead of guessing from the first
//! character of the text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keywords SQLite accepts unquoted after `DEFAULT`.
const DEFAULT_KEYWORDS: &[&str] = &[
    "NULL",
    "TRUE",
    "FALSE",
    "CURRENT_TIME",
    "CURRENT_DATE",
    "CURRENT_TIMESTAMP",
];

/// A column default value, tagged by how it must be written back.
///
/// # Examples
///
/// ```
/// use schema_rename_core::DefaultValue;
///
/// assert_eq!(DefaultValue::classify("'active'"), DefaultValue::Text("active".into()));
/// assert_eq!(DefaultValue::classify("active").to_string(), "'active'");
/// assert_eq!(DefaultValue::classify("0").to_string(), "0");
/// assert_eq!(
///     DefaultValue::classify("(datetime('now'))"),
///     DefaultValue::Expression("(datetime('now'))".into()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// String value, stored unescaped. Written as a quoted SQL literal.
    Text(String),
    /// Signed integer, real, or hex literal. Written verbatim.
    Number(String),
    /// `NULL`, `TRUE`, `FALSE`, `CURRENT_*`, or a blob literal. Written verbatim.
    Keyword(String),
    /// Parenthesized expression such as `(datetime('now'))`. Written verbatim.
    Expression(String),
}

impl DefaultValue {
    /// Classifies the default text reported by `PRAGMA table_info`.
    ///
    /// SQLite reports the default exactly as it was written in the original
    /// `CREATE TABLE`, so a string default arrives as `'active'` with its
    /// quotes. Bare text that fits no other kind is treated as a string.
    pub fn classify(raw: &str) -> Self {
        let text = raw.trim();

        if let Some(value) = unquote(text, '\'') {
            return Self::Text(value);
        }
        if let Some(value) = unquote(text, '"') {
            return Self::Text(value);
        }
        if is_numeric_literal(text) {
            return Self::Number(text.to_string());
        }
        if is_keyword(text) || is_blob_literal(text) {
            return Self::Keyword(text.to_string());
        }
        if is_parenthesized(text) {
            return Self::Expression(text.to_string());
        }
        Self::Text(text.to_string())
    }

    /// Returns `true` for [`DefaultValue::Expression`].
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Number(raw) | Self::Keyword(raw) | Self::Expression(raw) => f.write_str(raw),
        }
    }
}

/// Strips one level of `quote` quoting and un-doubles embedded quotes.
///
/// Returns `None` unless the whole text is a single quoted token.
fn unquote(text: &str, quote: char) -> Option<String> {
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == quote {
            // A lone quote ends the token early, so this is not one literal.
            if chars.next() != Some(quote) {
                return None;
            }
        }
        out.push(ch);
    }
    Some(out)
}

fn is_numeric_literal(text: &str) -> bool {
    // SQLite keeps the space in `DEFAULT - 1`.
    let unsigned = text
        .strip_prefix(['+', '-'])
        .map_or(text, str::trim_start);
    if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    // f64 parsing alone would also accept "inf" and "NaN".
    let starts_numeric = unsigned
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    starts_numeric && unsigned.parse::<f64>().is_ok()
}

fn is_keyword(text: &str) -> bool {
    DEFAULT_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(text))
}

fn is_blob_literal(text: &str) -> bool {
    let Some(rest) = text.strip_prefix(['x', 'X']) else {
        return false;
    };
    unquote(rest, '\'').is_some_and(|hex| {
        hex.len() % 2 == 0 && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Whether `text` opens with `(` and its parentheses balance, ignoring any
/// inside single-quoted strings.
fn is_parenthesized(text: &str) -> bool {
    if !text.starts_with('(') || !text.ends_with(')') {
        return false;
    }
    let mut depth = 0i32;
    let mut in_string = false;
    for ch in text.chars() {
        match ch {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_string
}

/// Introspected metadata for one source column.
///
/// # Examples
///
/// ```
/// use schema_rename_core::{ColumnDescriptor, DefaultValue};
///
/// let id = ColumnDescriptor::new("c1", "INTEGER").primary_key(1);
/// assert!(id.is_primary_key());
///
/// let status = ColumnDescriptor::new("c9", "TEXT")
///     .not_null()
///     .with_default(DefaultValue::classify("'active'"));
/// assert!(status.not_null);
/// assert!(!status.is_primary_key());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name in the source table.
    pub name: String,
    /// Declared type, possibly empty.
    pub decl_type: String,
    /// `NOT NULL` constraint.
    pub not_null: bool,
    /// Default value, if the column declares one.
    pub default: Option<DefaultValue>,
    /// 1-based position within the primary key, or 0 if not a key column.
    pub pk_position: u32,
}

impl ColumnDescriptor {
    /// Creates a nullable, non-key column with no default.
    pub fn new(name: impl Into<String>, decl_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: decl_type.into(),
            not_null: false,
            default: None,
            pk_position: 0,
        }
    }

    /// Marks the column `NOT NULL`.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column as part of the primary key at `position` (1-based).
    pub fn primary_key(mut self, position: u32) -> Self {
        self.pk_position = position;
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns `true` if the column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.pk_position > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_string_is_text() {
        assert_eq!(
            DefaultValue::classify("'active'"),
            DefaultValue::Text("active".to_string())
        );
        assert_eq!(
            DefaultValue::classify("'it''s'"),
            DefaultValue::Text("it's".to_string())
        );
        assert_eq!(DefaultValue::classify("''"), DefaultValue::Text(String::new()));
    }

    #[test]
    fn test_bare_word_is_text() {
        let value = DefaultValue::classify("active");
        assert_eq!(value, DefaultValue::Text("active".to_string()));
        assert_eq!(value.to_string(), "'active'");
    }

    #[test]
    fn test_text_rendering_doubles_quotes() {
        let value = DefaultValue::Text("O'Brien".to_string());
        assert_eq!(value.to_string(), "'O''Brien'");
    }

    #[test]
    fn test_quoted_text_starting_with_paren_stays_text() {
        let value = DefaultValue::classify("'(none)'");
        assert_eq!(value, DefaultValue::Text("(none)".to_string()));
        assert_eq!(value.to_string(), "'(none)'");
        assert!(!value.is_expression());
    }

    #[test]
    fn test_parenthesized_expression() {
        let value = DefaultValue::classify("(datetime('now'))");
        assert!(value.is_expression());
        assert_eq!(value.to_string(), "(datetime('now'))");

        let nested = DefaultValue::classify("(strftime('%Y-%m-%d (x)', 'now'))");
        assert!(nested.is_expression());
    }

    #[test]
    fn test_unbalanced_parens_fall_back_to_text() {
        let value = DefaultValue::classify("(oops");
        assert_eq!(value, DefaultValue::Text("(oops".to_string()));
        assert_eq!(
            DefaultValue::classify("(a))"),
            DefaultValue::Text("(a))".to_string())
        );
    }

    #[test]
    fn test_numbers() {
        for raw in ["0", "42", "-1", "+7", "3.14", ".5", "1e10", "0x1F"] {
            assert_eq!(
                DefaultValue::classify(raw),
                DefaultValue::Number(raw.to_string()),
                "{raw}"
            );
        }
        assert_eq!(
            DefaultValue::classify("- 1"),
            DefaultValue::Number("- 1".to_string())
        );
        assert_eq!(DefaultValue::classify("- 1").to_string(), "- 1");
        assert!(matches!(DefaultValue::classify("- x"), DefaultValue::Text(_)));
        assert!(matches!(DefaultValue::classify("inf"), DefaultValue::Text(_)));
        assert!(matches!(DefaultValue::classify("NaN"), DefaultValue::Text(_)));
    }

    #[test]
    fn test_keywords_and_blobs() {
        assert_eq!(
            DefaultValue::classify("CURRENT_TIMESTAMP"),
            DefaultValue::Keyword("CURRENT_TIMESTAMP".to_string())
        );
        assert_eq!(
            DefaultValue::classify("null"),
            DefaultValue::Keyword("null".to_string())
        );
        assert_eq!(
            DefaultValue::classify("X'00ff'"),
            DefaultValue::Keyword("X'00ff'".to_string())
        );
        assert!(matches!(DefaultValue::classify("X'0'"), DefaultValue::Text(_)));
    }

    #[test]
    fn test_double_quoted_is_text() {
        assert_eq!(
            DefaultValue::classify("\"pending\""),
            DefaultValue::Text("pending".to_string())
        );
    }

    #[test]
    fn test_adjacent_literals_are_not_one_string() {
        // Two literals side by side are not a single quoted token.
        assert_eq!(unquote("'a' 'b'", '\''), None);
    }

    #[test]
    fn test_descriptor_builders() {
        let col = ColumnDescriptor::new("c2", "TEXT")
            .not_null()
            .with_default(DefaultValue::Number("0".into()));
        assert_eq!(col.name, "c2");
        assert!(col.not_null);
        assert!(!col.is_primary_key());
        assert_eq!(col.default, Some(DefaultValue::Number("0".into())));
    }
}
