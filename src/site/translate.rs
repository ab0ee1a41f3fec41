//! Light localization of English wire copy for the generated pages.
//!
//! A fixed table of terms is substituted into titles (whole words, case
//! insensitive), then titles and descriptions are shortened for the cards.

use crate::utils::{escape_html, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;

pub const TITLE_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 100;

pub const DEFAULT_DESCRIPTION: &str = "本文详细介绍了最新的AI技术发展和行业动态。";
pub const EMPTY_DESCRIPTION_CONTENT: &str = "<p>这是一篇关于AI技术发展的重要新闻，详细介绍了行业最新动态。</p>";
pub const DEFAULT_CONTENT: &str = "<p>本文介绍了AI领域的最新进展和技术突破。</p>";

const TERMS: &[(&str, &str)] = &[
    ("artificial intelligence", "人工智能"),
    ("machine learning", "机器学习"),
    ("deep learning", "深度学习"),
    ("neural network", "神经网络"),
    ("Google", "谷歌"),
    ("Microsoft", "微软"),
];

static TERM_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    TERMS
        .iter()
        .filter_map(|(en, zh)| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(en)))
                .ok()
                .map(|re| (re, *zh))
        })
        .collect()
});

/// Apply the term table to `text`.
pub fn substitute_terms(text: &str) -> String {
    TERM_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, (re, zh)| re.replace_all(&acc, *zh).into_owned())
}

pub fn translate_title(title: &str) -> String {
    truncate_chars(&substitute_terms(title), TITLE_MAX_CHARS)
}

pub fn translate_description(description: Option<&str>) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => truncate_chars(d, DESCRIPTION_MAX_CHARS),
        None => DEFAULT_DESCRIPTION.to_string(),
    }
}

/// Turn a description into an HTML fragment, one `<p>` per sentence.
///
/// Sentences are split on `". "`; each gets its full stop back.
pub fn generate_content(description: Option<&str>) -> String {
    let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
        return EMPTY_DESCRIPTION_CONTENT.to_string();
    };
    let paragraphs: Vec<String> = description
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let stop = if s.contains('.') { "" } else { "." };
            format!("<p>{}{stop}</p>", escape_html(s))
        })
        .collect();
    if paragraphs.is_empty() {
        DEFAULT_CONTENT.to_string()
    } else {
        paragraphs.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_terms() {
        assert_eq!(
            substitute_terms("Google bets on Artificial Intelligence and deep learning"),
            "谷歌 bets on 人工智能 and 深度学习"
        );
        // whole words only
        assert_eq!(substitute_terms("Googleplex"), "Googleplex");
        assert_eq!(substitute_terms("OpenAI and ChatGPT"), "OpenAI and ChatGPT");
    }

    #[test]
    fn test_translate_title_truncates() {
        let long = "Microsoft ".repeat(20);
        let title = translate_title(&long);
        assert!(title.starts_with("微软 微软"));
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert_eq!(translate_title("Short"), "Short");
    }

    #[test]
    fn test_translate_description() {
        assert_eq!(translate_description(None), DEFAULT_DESCRIPTION);
        assert_eq!(translate_description(Some("  ")), DEFAULT_DESCRIPTION);
        let long = "x".repeat(150);
        assert_eq!(translate_description(Some(&long)).chars().count(), 103);
    }

    #[test]
    fn test_generate_content_paragraphs() {
        assert_eq!(
            generate_content(Some("First point. Second point. Third v1.2")),
            "<p>First point.</p>\n<p>Second point.</p>\n<p>Third v1.2</p>"
        );
        assert_eq!(generate_content(None), EMPTY_DESCRIPTION_CONTENT);
        assert_eq!(generate_content(Some(". ")), DEFAULT_CONTENT);
        assert_eq!(generate_content(Some("a < b")), "<p>a &lt; b.</p>");
    }
}
