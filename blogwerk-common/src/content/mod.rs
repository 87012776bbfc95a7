//! Splitting of post bodies into Markdown text and inline block directives.

pub mod block;
pub mod render;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::OnceLock};

pub const EMPTY_CONTENT_PLACEHOLDER: &str = "No content";
pub const DIRECTIVE_NAME_ATTRIBUTE: &str = "name";

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Segment {
    Markdown(String),
    Block(Directive),
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct Directive {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl Directive {
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn from_attributes(attributes: BTreeMap<String, String>) -> Option<Self> {
        let name = attributes.get(DIRECTIVE_NAME_ATTRIBUTE)?.clone();
        Some(Self { name, attributes })
    }
}

fn directive_regex() -> &'static Regex {
    static DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE_REGEX.get_or_init(|| {
        Regex::new(r"\{\{block\s+([^}]*)\}\}").expect("Invalid directive regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9_]+)=["']([^"']+)["']"#).expect("Invalid attribute regex")
    })
}

/// Parses `key="value"` and `key='value'` pairs. Later keys win.
#[must_use]
pub fn parse_attributes(attribute_list: &str) -> BTreeMap<String, String> {
    attribute_regex()
        .captures_iter(attribute_list)
        .map(|captures| (captures[1].to_owned(), captures[2].to_owned()))
        .collect()
}

#[must_use]
pub fn parse_content(content: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last_end = 0;

    for captures in directive_regex().captures_iter(content) {
        let (Some(whole), Some(attribute_list)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        push_markdown(&mut segments, &content[last_end..whole.start()]);

        if let Some(directive) = Directive::from_attributes(parse_attributes(attribute_list.as_str()))
        {
            segments.push(Segment::Block(directive));
        }

        last_end = whole.end();
    }

    push_markdown(&mut segments, &content[last_end..]);

    if segments.is_empty() {
        segments.push(Segment::Markdown(EMPTY_CONTENT_PLACEHOLDER.to_owned()));
    }

    segments
}

fn push_markdown(segments: &mut Vec<Segment>, text: &str) {
    if !text.trim().is_empty() {
        segments.push(Segment::Markdown(text.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use crate::content::{
        Directive, EMPTY_CONTENT_PLACEHOLDER, Segment, block::Block, parse_attributes,
        parse_content,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn markdown(text: &str) -> Segment {
        Segment::Markdown(text.to_owned())
    }

    fn block(pairs: &[(&str, &str)]) -> Segment {
        let attributes: BTreeMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        Segment::Block(Directive::from_attributes(attributes).unwrap())
    }

    #[test]
    fn plain_markdown_is_a_single_segment() {
        let content = "# Title\n\nSome *text*.\n";
        assert_eq!(parse_content(content), vec![markdown(content)]);
    }

    #[test]
    fn empty_or_blank_content_yields_placeholder() {
        for content in ["", "   ", "\n\t\n"] {
            assert_eq!(
                parse_content(content),
                vec![markdown(EMPTY_CONTENT_PLACEHOLDER)]
            );
        }
    }

    #[test]
    fn directives_split_markdown_in_document_order() {
        let content = "Intro\n{{block name=\"Quote\" text=\"Hi\" author='Bob'}}\nMiddle\n\
                       {{block name=\"Top Picks\" products=\"A, B\"}}Outro";

        assert_eq!(
            parse_content(content),
            vec![
                markdown("Intro\n"),
                block(&[("name", "Quote"), ("text", "Hi"), ("author", "Bob")]),
                markdown("\nMiddle\n"),
                block(&[("name", "Top Picks"), ("products", "A, B")]),
                markdown("Outro"),
            ]
        );
    }

    #[test]
    fn whitespace_between_directives_is_dropped() {
        let content = "  {{block name=\"A\"}} \n {{block name=\"B\"}}\n";

        assert_eq!(
            parse_content(content),
            vec![block(&[("name", "A")]), block(&[("name", "B")])]
        );
    }

    #[test]
    fn directive_without_name_is_dropped_entirely() {
        let content = "Before {{block text=\"orphan\"}} after";

        assert_eq!(
            parse_content(content),
            vec![markdown("Before "), markdown(" after")]
        );
    }

    #[test]
    fn only_nameless_directives_yield_placeholder() {
        assert_eq!(
            parse_content("{{block foo=\"bar\"}}"),
            vec![markdown(EMPTY_CONTENT_PLACEHOLDER)]
        );
    }

    #[test]
    fn malformed_directives_stay_markdown() {
        for content in [
            "{{block name=\"Quote\"",
            "{{block}}",
            "{{blockname=\"Quote\"}}",
            "{block name=\"Quote\"}}",
        ] {
            assert_eq!(parse_content(content), vec![markdown(content)]);
        }
    }

    #[test]
    fn directive_count_matches_named_directives() {
        let content = "{{block name=\"A\"}} x {{block nope=\"1\"}} y {{block name=\"C\"}}";
        let blocks = parse_content(content)
            .into_iter()
            .filter(|segment| matches!(segment, Segment::Block(_)))
            .count();

        assert_eq!(blocks, 2);
    }

    #[test]
    fn attributes_keep_unknown_keys_and_skip_unquoted_values() {
        let attributes = parse_attributes("name=\"Quote\" mood='sunny' bare=value empty=\"\"");

        assert_eq!(attributes.get("name").map(String::as_str), Some("Quote"));
        assert_eq!(attributes.get("mood").map(String::as_str), Some("sunny"));
        assert!(!attributes.contains_key("bare"));
        assert!(!attributes.contains_key("empty"));
    }

    #[test]
    fn later_duplicate_attributes_overwrite_earlier_ones() {
        let attributes = parse_attributes("name=\"A\" text='one' name=\"B\" text=\"two\"");

        assert_eq!(attributes.get("name").map(String::as_str), Some("B"));
        assert_eq!(attributes.get("text").map(String::as_str), Some("two"));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn second_name_selects_the_block() {
        let segments =
            parse_content("{{block name=\"Top Picks\" text=\"Hi\" name=\"Quote\"}}");

        assert_eq!(segments, vec![block(&[("name", "Quote"), ("text", "Hi")])]);
        let Segment::Block(directive) = &segments[0] else {
            panic!("expected a block segment");
        };
        assert_eq!(
            Block::resolve(directive),
            Block::Quote {
                text: "Hi".to_owned(),
                author: None,
            }
        );
    }

    #[test]
    fn segments_serialize_with_type_tag() {
        let json = serde_json::to_value(markdown("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "markdown", "value": "hi" }));
    }
}
