//! Keyword search over downloaded scripts and policies.
//!
//! Each resource type is searched in one subtree only, and the two report
//! at different granularity:
//!
//! - Scripts: the lines of `<script_contents>`, reported per line with a
//!   1-based line number.
//! - Policies: the flattened text of the `<scripts>` section, reported as a
//!   single presence hit. The section is a list of script assignments and
//!   parameters, not line-oriented text, so no line detail is produced.

use std::fmt;

use crate::client::normalize_base_url;
use crate::xml::Element;

/// What to look for and how to compare.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    keyword: String,
    case_sensitive: bool,
    needle: String,
}

impl SearchOptions {
    /// Builds options for `keyword`. Unless `case_sensitive` is set, both
    /// the keyword and the searched text are lower-cased before comparing.
    pub fn new(keyword: &str, case_sensitive: bool) -> Self {
        let needle = if case_sensitive {
            keyword.to_string()
        } else {
            keyword.to_lowercase()
        };
        SearchOptions {
            keyword: keyword.to_string(),
            case_sensitive,
            needle,
        }
    }

    /// The keyword exactly as supplied.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Whether comparison is case-sensitive.
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Substring test under this option's case rule.
    pub fn matches(&self, haystack: &str) -> bool {
        if self.case_sensitive {
            haystack.contains(&self.needle)
        } else {
            haystack.to_lowercase().contains(&self.needle)
        }
    }
}

/// Splits on universal newline boundaries.
///
/// `\r\n` counts as one break. A trailing break does not produce an empty
/// final line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Console deep link to a script.
pub fn script_url(base_url: &str, id: &str) -> String {
    format!(
        "{}/view/settings/computer-management/scripts/{id}?tab=script",
        normalize_base_url(base_url)
    )
}

/// Console deep link to a policy.
pub fn policy_url(base_url: &str, id: &str) -> String {
    format!("{}/policies.html?id={id}&o=r", normalize_base_url(base_url))
}

/// One matching line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-based line number.
    pub number: usize,
    /// The line with surrounding whitespace trimmed.
    pub text: String,
}

/// A script containing the keyword on at least one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptMatch {
    /// Script id from the document.
    pub id: String,
    /// Script display name.
    pub name: String,
    /// Console deep link, see [`script_url`].
    pub url: String,
    /// Matching lines in original order. Never empty.
    pub lines: Vec<LineMatch>,
}

/// A policy whose `<scripts>` section contains the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMatch {
    /// Policy id from `<general>`.
    pub id: String,
    /// Policy display name from `<general>`.
    pub name: String,
    /// Console deep link, see [`policy_url`].
    pub url: String,
}

/// Searches a `<script>` document's `<script_contents>` line by line.
///
/// Returns `None` when the document lacks `<id>` or `<name>`, or when no
/// line matches. A missing or empty `<script_contents>` never matches.
pub fn search_script(
    root: &Element,
    options: &SearchOptions,
    base_url: &str,
) -> Option<ScriptMatch> {
    let id = root.child_text("id")?;
    let name = root.child_text("name")?;
    let contents = root.child_text("script_contents").unwrap_or_default();

    let lines: Vec<LineMatch> = split_lines(&contents)
        .into_iter()
        .enumerate()
        .filter(|(_, line)| options.matches(line))
        .map(|(idx, line)| LineMatch {
            number: idx + 1,
            text: line.trim().to_string(),
        })
        .collect();

    if lines.is_empty() {
        return None;
    }
    Some(ScriptMatch {
        url: script_url(base_url, &id),
        id,
        name,
        lines,
    })
}

/// Searches the flattened text of a `<policy>` document's `<scripts>` section.
///
/// Returns `None` when `<general>`, its `<id>`/`<name>`, or the `<scripts>`
/// section is missing, or when the keyword does not occur.
pub fn search_policy(
    root: &Element,
    options: &SearchOptions,
    base_url: &str,
) -> Option<PolicyMatch> {
    let general = root.child("general")?;
    let id = general.child_text("id")?;
    let name = general.child_text("name")?;
    let scripts = root.child("scripts")?;

    if !options.matches(&scripts.flattened_text()) {
        return None;
    }
    Some(PolicyMatch {
        url: policy_url(base_url, &id),
        id,
        name,
    })
}

/// A search hit of either kind, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRecord {
    /// Per-line hits in a script.
    Script(ScriptMatch),
    /// Presence hit in a policy.
    Policy(PolicyMatch),
}

impl MatchRecord {
    /// Pairs the record with the keyword for display.
    pub fn report<'a>(&'a self, keyword: &'a str) -> Report<'a> {
        Report {
            record: self,
            keyword,
        }
    }
}

/// Human-readable rendering of a [`MatchRecord`], one line per row.
pub struct Report<'a> {
    record: &'a MatchRecord,
    keyword: &'a str,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record {
            MatchRecord::Script(m) => {
                writeln!(f, "Keyword '{}' found in {} Script", self.keyword, m.name)?;
                writeln!(f, "  - URL: {}", m.url)?;
                for line in &m.lines {
                    writeln!(f, "    - Line {}: {}", line.number, line.text)?;
                }
                Ok(())
            }
            MatchRecord::Policy(m) => {
                writeln!(f, "Keyword '{}' found in {} Policy", self.keyword, m.name)?;
                writeln!(f, "  - URL: {}", m.url)
            }
        }
    }
}
