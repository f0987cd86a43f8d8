// ABOUTME: Utility functions for slugging, text shaping and date ranges
// ABOUTME: Provides consistent filename generation and markdown-safe text

use chrono::{Datelike, Days, Months, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Matches `- `, `- [ ] `, `- [x] `, `- [~] ` and `- [^] ` list markers.
static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*(?:\[[x^~\s]\])?\s*").expect("valid regex"));

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^( {0,3})(#{1,6})([ \t]|$)").expect("valid regex"));

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{2}(?::\d{2})?").expect("valid regex"));

/// Slug of `text` no longer than `max_len`, cut at a word boundary when possible.
pub fn slugify(text: &str, max_len: usize) -> String {
    let full = slug::slugify(text);
    if full.len() <= max_len {
        return full;
    }

    let mut out = String::new();
    for word in full.split('-') {
        let needed = if out.is_empty() {
            word.len()
        } else {
            word.len() + 1
        };
        if out.len() + needed > max_len {
            break;
        }
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        // slug output is ASCII, so byte slicing is safe
        full[..max_len].trim_end_matches('-').to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod slug_tests {
    use super::*;

    #[test]
    fn test_slugify_short() {
        assert_eq!(slugify("Hello World", 32), "hello-world");
        assert_eq!(slugify("", 32), "");
    }

    #[test]
    fn test_slugify_word_boundary() {
        let slug = slugify(
            "I missed the morning bus again because of the alarm",
            32,
        );
        assert_eq!(slug, "i-missed-the-morning-bus-again");
        assert!(slug.len() <= 32);
    }

    #[test]
    fn test_slugify_single_long_word() {
        let slug = slugify(&"a".repeat(50), 32);
        assert_eq!(slug.len(), 32);
    }

    #[test]
    fn test_slugify_special_chars() {
        assert_eq!(slugify("Föö Bär", 32), "foo-bar");
    }
}

/// Re-render every non-blank line as a list item with `prefix`, dropping any existing marker.
pub fn listize(text: &str, prefix: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let item = LIST_MARKER.replace(line, "");
            format!("{}{}", prefix, escape_headings(&item))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First line of a multi-line text, marked with an ellipsis when more follows.
pub fn first_line(text: &str) -> String {
    match text.split_once('\n') {
        Some((first, _)) => format!("{}…", first.trim_end().trim_end_matches(['.', '…'])),
        None => text.to_string(),
    }
}

/// Backslash-escape lines that a markdown renderer would read as ATX headings.
///
/// `# note` becomes `\# note`; hashtags such as `#running` are left alone.
pub fn escape_headings(text: &str) -> String {
    ATX_HEADING.replace_all(text, r"$1\$2$3").into_owned()
}

/// First clock time (`H:MM` or `H:MM:SS`) mentioned in `text`.
pub fn find_clock_time(text: &str) -> Option<&str> {
    CLOCK_TIME.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod text_tests {
    use super::*;

    #[test]
    fn test_listize_strips_markers() {
        let text = "- [x] done\n- [ ] open\n\n  - plain\nbare";
        assert_eq!(
            listize(text, "- [ ] "),
            "- [ ] done\n- [ ] open\n- [ ] plain\n- [ ] bare"
        );
    }

    #[test]
    fn test_listize_escapes_heading_items() {
        assert_eq!(listize("# rest\n- ## sleep", "- "), "- \\# rest\n- \\## sleep");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line("first line...\nsecond"), "first line…");
        assert_eq!(first_line("first  \nsecond"), "first…");
    }

    #[test]
    fn test_escape_headings() {
        assert_eq!(escape_headings("# not a heading"), r"\# not a heading");
        assert_eq!(escape_headings("text\n  ## deeper\nmore"), "text\n  \\## deeper\nmore");
        assert_eq!(escape_headings("#\n"), "\\#\n");
    }

    #[test]
    fn test_escape_headings_keeps_hashtags() {
        assert_eq!(escape_headings("#running went well"), "#running went well");
        assert_eq!(escape_headings("    # code block"), "    # code block");
        assert_eq!(escape_headings("see issue # 4"), "see issue # 4");
    }

    #[test]
    fn test_find_clock_time() {
        assert_eq!(find_clock_time("woke up at 7:45 today"), Some("7:45"));
        assert_eq!(find_clock_time("at 12:30:15 sharp"), Some("12:30:15"));
        assert_eq!(find_clock_time("no time here"), None);
    }
}

fn has_link(text: &str) -> bool {
    ["](", "http://", "https://"].iter().any(|m| text.contains(m))
}

/// A word made only of `#` (one to six) would open an ATX heading at line start.
fn is_heading_marker(word: &str) -> bool {
    (1..=6).contains(&word.len()) && word.bytes().all(|b| b == b'#')
}

fn fill(line: &str, width: usize) -> String {
    let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
    let mut lines: Vec<String> = Vec::new();
    let mut current = indent.clone();

    for word in line.split_whitespace() {
        let current_len = current.chars().count();
        let has_words = current_len > indent.chars().count();
        let too_long = current_len + 1 + word.chars().count() > width;
        if has_words && too_long && !is_heading_marker(word) {
            lines.push(std::mem::replace(&mut current, indent.clone()));
        }
        if current.chars().count() > indent.chars().count() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines.join("\n")
}

/// Wrap long lines at `width` columns, keeping existing line breaks.
///
/// Lines with links and heading lines are never wrapped.
pub fn wrap_preserving_linebreaks(text: &str, width: usize) -> String {
    text.split('\n')
        .map(|line| {
            if line.chars().count() <= width || has_link(line) || line.starts_with('#') {
                line.to_string()
            } else {
                fill(line, width)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod wrap_tests {
    use super::*;

    #[test]
    fn test_wrap_short_lines_untouched() {
        let text = "short\n\n  - indented item";
        assert_eq!(wrap_preserving_linebreaks(text, 80), text);
    }

    #[test]
    fn test_wrap_long_line() {
        let text = "word ".repeat(30);
        let wrapped = wrap_preserving_linebreaks(text.trim_end(), 20);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 20));
        assert_eq!(wrapped.split_whitespace().count(), 30);
    }

    #[test]
    fn test_wrap_never_opens_a_heading() {
        let text = format!("{}# not a heading after wrap", "xxxxxxxxx ".repeat(8));
        let wrapped = wrap_preserving_linebreaks(&text, 80);

        assert!(wrapped.lines().count() > 1);
        assert!(!wrapped.lines().any(|l| ATX_HEADING.is_match(l)), "{}", wrapped);
        assert_eq!(wrapped.split_whitespace().count(), 14);
    }

    #[test]
    fn test_wrap_keeps_links() {
        let text = format!("{} https://example.com", "x ".repeat(60));
        assert_eq!(wrap_preserving_linebreaks(&text, 80), text);
    }
}

/// Every day from `from` to `to`, inclusive. Empty when `from > to`.
pub fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |day| *day <= to)
}

/// Monday and Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    (start, start + Days::new(6))
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date - Days::new(u64::from(date.day0()));
    let last = first + Months::new(1) - Days::new(1);
    (first, last)
}
