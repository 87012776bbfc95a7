use crate::content::{Segment, block::Block, parse_content};
use html_escape::{encode_double_quoted_attribute, encode_text};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

pub const SNIPPET_LENGTH: usize = 200;

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

const SAFE_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    match url.find([':', '/', '?', '#']) {
        Some(index) if url[index..].starts_with(':') => SAFE_URL_SCHEMES
            .iter()
            .any(|scheme| url[..index].eq_ignore_ascii_case(scheme)),
        _ => true,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) { url } else { CowStr::Borrowed("") }
}

// Raw HTML is shown as text.
fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        event => event,
    }
}

#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut output,
        Parser::new_ext(markdown, markdown_options()).map(sanitize),
    );
    output
}

impl Block {
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Block::TopPicks { image, products } => {
                let image = image
                    .as_deref()
                    .filter(|image| is_safe_url(image))
                    .map(|image| {
                        format!(
                            r#"<img src="{}" alt="Top Picks">"#,
                            encode_double_quoted_attribute(image)
                        )
                    })
                    .unwrap_or_default();

                format!(
                    r#"<div class="block block-top-picks">{image}<h3>Top Picks</h3><p>Products: {}</p></div>"#,
                    encode_text(products)
                )
            }
            Block::Quote { text, author } => {
                let author = author
                    .as_deref()
                    .map(|author| {
                        format!(
                            r#"<p class="quote-author">&mdash; {}</p>"#,
                            encode_text(author)
                        )
                    })
                    .unwrap_or_default();

                format!(
                    r#"<blockquote class="block block-quote"><p>{}</p>{author}</blockquote>"#,
                    encode_text(text)
                )
            }
            Block::Unknown { name } => format!(
                r#"<div class="block block-unknown">Unknown block: {}</div>"#,
                encode_text(name)
            ),
        }
    }
}

#[must_use]
pub fn render_html(content: &str) -> String {
    parse_content(content)
        .iter()
        .map(|segment| match segment {
            Segment::Markdown(markdown) => render_markdown(markdown),
            Segment::Block(directive) => Block::resolve(directive).to_html(),
        })
        .collect()
}

#[must_use]
pub fn snippet(content: &str) -> String {
    let mut text = String::new();

    for segment in parse_content(content) {
        let Segment::Markdown(markdown) = segment else {
            continue;
        };

        for event in Parser::new_ext(&markdown, markdown_options()) {
            match event {
                Event::Text(value) | Event::Code(value) => text.push_str(&value),
                Event::SoftBreak
                | Event::HardBreak
                | Event::End(
                    TagEnd::Paragraph
                    | TagEnd::Heading(_)
                    | TagEnd::Item
                    | TagEnd::CodeBlock
                    | TagEnd::BlockQuote(_)
                    | TagEnd::TableCell,
                ) => text.push(' '),
                _ => {}
            }
        }
        text.push(' ');
    }

    let plain = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if plain.chars().count() > SNIPPET_LENGTH {
        let mut truncated: String = plain.chars().take(SNIPPET_LENGTH).collect();
        truncated.push_str("...");
        truncated
    } else {
        plain
    }
}
