//! Produce the spoken copy of a displayed line.
//!
//! Model output is Markdown, sometimes with inline HTML. The display copy is
//! rendered as-is while narration should only hear the words.

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Parser, Tag};
use regex::{Captures, Regex};
use shared::Utterance;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--.*?-->|</?([A-Za-z][A-Za-z0-9-]*)(?:\s[^<>]*)?/?>").expect("valid regex")
});

/// Tags that separate words when removed.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
    "tr", "td", "th", "hr", "pre", "section", "article",
];

/// Remove HTML tags from `text`, keeping the words between them.
fn strip_tags(text: &str) -> String {
    HTML_TAG
        .replace_all(text, |caps: &Captures| {
            let name = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
            let block = name.is_some_and(|name| BLOCK_TAGS.contains(&name.as_str()));
            if block { " " } else { "" }
        })
        .into_owned()
}

/// Remove Markdown formatting and HTML tags from `text`.
///
/// ```
/// use lingproc::strip_markup;
///
/// assert_eq!(strip_markup("**Key point:** <b>read</b> `this`"), "Key point: read this");
/// assert_eq!(strip_markup("<li>Point one</li>"), "Point one");
/// ```
pub fn strip_markup(text: &str) -> String {
    let text = strip_tags(text);
    let mut out = String::new();
    // Next number of each open list; `None` for bullet lists.
    let mut lists: Vec<Option<u64>> = Vec::new();
    for event in Parser::new(&text) {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::Start(Tag::List(start)) => lists.push(start),
            Event::End(Tag::List(_)) => {
                lists.pop();
                out.push(' ');
            }
            Event::Start(Tag::Item) => {
                if let Some(Some(n)) = lists.last_mut() {
                    out.push_str(&format!("{n}. "));
                    *n += 1;
                }
            }
            Event::End(
                Tag::Paragraph | Tag::Heading(..) | Tag::Item | Tag::BlockQuote | Tag::CodeBlock(_),
            ) => out.push(' '),
            _ => {}
        }
    }
    let out = out.replace(['*', '`'], "");
    WHITESPACE.replace_all(out.trim(), " ").into_owned()
}

/// Copy of `utterance` suitable for narration, keeping its index.
pub fn narration_copy(utterance: &Utterance) -> Utterance {
    Utterance::new(strip_markup(&utterance.text), utterance.index)
}
