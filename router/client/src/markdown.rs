use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

/// Rewrites `**text**` spans into `<strong>text</strong>`.
///
/// Matching is non-greedy and stays on one line; nested or unbalanced markers
/// are left as they are.
pub fn bold_to_html(text: &str) -> String {
    BOLD.replace_all(text, "<strong>$1</strong>").into_owned()
}
