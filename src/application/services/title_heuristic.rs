use regex::Regex;
use std::sync::LazyLock;

pub const UNTITLED: &str = "Untitled Article";

const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 150;

static BYLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(by|author|written by|published|date)").unwrap());

/// Guesses a document title: the first non-empty line that looks like one.
///
/// First match wins; falls back to [`UNTITLED`].
pub fn guess_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| looks_like_title(line))
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn looks_like_title(line: &str) -> bool {
    let length = line.chars().count();

    length > MIN_TITLE_CHARS
        && length < MAX_TITLE_CHARS
        && !line.ends_with('.')
        && !line.contains("http")
        && !line.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && !BYLINE.is_match(line)
        && !line.contains('@')
        && !line.starts_with(['#', '*', '-'])
}

