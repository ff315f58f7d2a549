use once_cell::sync::Lazy;
use regex::Regex;

/// Default email shape: `local@domain`, no validation beyond that.
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9+_.-]+@[a-zA-Z0-9.-]+";

/// Default phone shape: optional `+` and country code, optional parenthesised
/// area code, groups separated by space, dash, dot (or anything in between).
pub const PHONE_PATTERN: &str = r"\+?\d{1,3}?[ -.]?\(?\d{2,4}\)?[ -.]?\d{3,4}[ -.]?\d{4}";

pub(crate) static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(EMAIL_PATTERN).unwrap());
pub(crate) static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(PHONE_PATTERN).unwrap());

/// All non-overlapping matches of `re` in order of appearance. Duplicates are kept.
pub fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
