//! Locale-specific number and date formatting.

use chrono::Datelike;
use serde::Serialize;

use crate::config::schema::FormatConfig;

/// Number and long-date formatting rules for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRules {
    pub decimal_separator: String,
    pub group_separator: String,
    pub min_fraction_digits: u8,
    pub max_fraction_digits: u8,
    pub date_pattern: String,
    pub month_names: Vec<String>,
}

impl FormatRules {
    pub fn from_config(config: &FormatConfig) -> Self {
        Self {
            decimal_separator: config.decimal_separator.clone(),
            group_separator: config.group_separator.clone(),
            min_fraction_digits: config.min_fraction_digits,
            max_fraction_digits: config.max_fraction_digits.max(config.min_fraction_digits),
            date_pattern: config.date_pattern.clone(),
            month_names: config.month_names.clone(),
        }
    }

    /// Format a decimal number, rounding to `max_fraction_digits` and
    /// trimming trailing zeros down to `min_fraction_digits`.
    pub fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            return value.to_string();
        }

        let fixed = format!("{:.*}", self.max_fraction_digits as usize, value.abs());
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (fixed.as_str(), ""),
        };

        let mut frac = frac_part.to_string();
        while frac.len() > self.min_fraction_digits as usize && frac.ends_with('0') {
            frac.pop();
        }

        let mut out = String::new();
        // Rounding can turn a tiny negative into zero; never print "-0".
        let is_zero = int_part.bytes().all(|b| b == b'0') && frac.bytes().all(|b| b == b'0');
        if value.is_sign_negative() && !is_zero {
            out.push('-');
        }
        out.push_str(&group_digits(int_part, &self.group_separator));
        if !frac.is_empty() {
            out.push_str(&self.decimal_separator);
            out.push_str(&frac);
        }
        out
    }

    /// Format a date with the long date pattern (e.g., "January 5, 2025").
    pub fn format_date<D: Datelike>(&self, date: &D) -> String {
        let month = self
            .month_names
            .get(date.month0() as usize)
            .cloned()
            .unwrap_or_else(|| date.month().to_string());

        self.date_pattern
            .replace("{day}", &date.day().to_string())
            .replace("{month}", &month)
            .replace("{year}", &date.year().to_string())
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}
