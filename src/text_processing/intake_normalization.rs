//! Field normalization for voice-transcribed intake data
//!
//! Each function takes whatever the transcription produced and returns a
//! best-effort canonical form. None of them can fail: unparseable input
//! falls back to an empty string or, for budgets, the untouched input.
//! - Email: "john attherate gmail dot com" → "john@gmail.com"
//! - Phone: "+1 (555) 123-4567" → "15551234567"
//! - Property type: "2 bhk" → "2BHK"
//! - Budget: "two million" → "$2000000", "1234567 dollars" → "$1,234,567"

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Spoken "@": "attherate", "at the rate", "at therate"...
    static ref AT_THE_RATE_REGEX: Regex = Regex::new(r"(?i)attherate|at\s*the\s*rate").unwrap();

    static ref AT_WORD_REGEX: Regex = Regex::new(r"(?i)\s?at\s?").unwrap();

    static ref SPACED_DOT_REGEX: Regex = Regex::new(r"(?i)\sdot\s").unwrap();

    static ref DOT_WORD_REGEX: Regex = Regex::new(r"(?i)dot").unwrap();

    /// Transcribers sometimes render a spoken "dot" as a comma
    static ref COMMA_RUN_REGEX: Regex = Regex::new(r",+").unwrap();

    static ref PERIOD_RUN_REGEX: Regex = Regex::new(r"\.{2,}").unwrap();

    /// Anything trailing a gmail domain is transcription noise
    /// Matches: "@gmail.com.thank you", "@Gmail.comok"
    static ref GMAIL_TAIL_REGEX: Regex = Regex::new(r"(?i)@gmail\.com.*$").unwrap();

    /// Room-count shorthand with arbitrary spacing
    /// Matches: 2 bhk, 2BHK, 3 B H K
    /// ASCII word boundaries, so "2bhkफ्लैट" and "é2 bhk" still match
    static ref BHK_REGEX: Regex =
        Regex::new(r"(?i)(?-u:\b)([0-9])\s*B\s*H\s*K(?-u:\b)").unwrap();

    static ref BUDGET_DISALLOWED_REGEX: Regex = Regex::new(r"[^a-z0-9., ]").unwrap();

    static ref MILLION_REGEX: Regex = Regex::new(r"([A-Za-z0-9_]+)\s*million").unwrap();

    static ref THOUSAND_REGEX: Regex = Regex::new(r"([A-Za-z0-9_]+)\s*thousand").unwrap();

    static ref DIGIT_RUN_REGEX: Regex = Regex::new(r"[0-9]{4,}").unwrap();
}

/// Normalize a spoken or garbled email address
///
/// Rules are applied in order, each acting on the previous output:
/// 1. Strip whitespace
/// 2. "attherate" / "at the rate" → "@"
/// 3. Remaining "at" → "@" (only while no "@" is present)
/// 4. " dot " and then any "dot" → "."
/// 5. Comma runs → ".", period runs → "."
/// 6. Drop anything after "@gmail.com"
/// 7. Lowercase
///
/// No validation is done; ambiguous input may still come out malformed.
pub fn normalize_email(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut result = strip_whitespace(text);
    result = AT_THE_RATE_REGEX.replace_all(&result, "@").into_owned();

    // A spoken "at" only stands in for the separator when there is none yet.
    // Without this guard "kate@gmail.com" would become "k@e@gmail.com".
    if !result.contains('@') {
        result = AT_WORD_REGEX.replace_all(&result, "@").into_owned();
    }

    result = SPACED_DOT_REGEX.replace_all(&result, ".").into_owned();
    result = DOT_WORD_REGEX.replace_all(&result, ".").into_owned();
    result = COMMA_RUN_REGEX.replace_all(&result, ".").into_owned();
    result = PERIOD_RUN_REGEX.replace_all(&result, ".").into_owned();
    result = GMAIL_TAIL_REGEX
        .replace_all(&result, "@gmail.com")
        .into_owned();

    result.to_lowercase()
}

/// Keep only the digits of a phone number
///
/// No length or country-code handling: "+1 (555) 123-4567" → "15551234567"
pub fn normalize_phone(text: &str) -> String {
    extract_digits(text)
}

/// Rewrite room-count shorthand to "<N>BHK", leaving other text untouched
pub fn normalize_property_type(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    BHK_REGEX.replace_all(text, "${1}BHK").into_owned()
}

/// Normalize a free-text budget into a dollar amount
///
/// Tried in order on a cleaned copy of the input:
/// 1. "<one..ten> million" → "$N000000" (no grouping)
/// 2. "<one..ten> thousand" → "$N000" (no grouping)
/// 3. First run of 4+ digits → "$1,234,567"
///
/// When nothing matches the original input is returned as-is.
pub fn normalize_budget(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = clean_budget_text(text);

    if let Some(amount) = scaled_word_amount(&cleaned, &MILLION_REGEX, 1_000_000) {
        return format!("${}", amount);
    }

    if let Some(amount) = scaled_word_amount(&cleaned, &THOUSAND_REGEX, 1_000) {
        return format!("${}", amount);
    }

    if let Some(digits) = DIGIT_RUN_REGEX.find(&cleaned) {
        return format!("${}", group_thousands(digits.as_str()));
    }

    text.to_string()
}

/// Lowercase, drop "x" transcription noise and any character outside
/// `[a-z0-9., ]`
fn clean_budget_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_x = lowered.trim().replace('x', "");

    BUDGET_DISALLOWED_REGEX
        .replace_all(&without_x, "")
        .trim()
        .to_string()
}

/// Only the first "<word> <scale>" match is considered; an unknown word
/// does not trigger a search for later matches.
fn scaled_word_amount(cleaned: &str, pattern: &Regex, scale: u64) -> Option<u64> {
    let caps = pattern.captures(cleaned)?;
    number_word_value(&caps[1]).map(|value| value * scale)
}

fn number_word_value(word: &str) -> Option<u64> {
    match word {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        _ => None,
    }
}

fn strip_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, "").into_owned()
}

fn extract_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Comma-group an ASCII digit string: "01234567" → "1,234,567"
///
/// Works on the text directly so arbitrarily long runs cannot overflow.
fn group_thousands(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };

    let len = trimmed.len();
    let mut grouped = String::with_capacity(len + len / 3);

    for (i, ch) in trimmed.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
