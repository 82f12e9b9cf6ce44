//! HTML reader/writer for [`Document`].
//!
//! Reading is driven by the WHATWG tokenizer from `html5gum`; this module only builds the tree.
//! The tree builder is not the full HTML5 insertion-mode machine. It understands what the
//! site's pages use: void elements, raw-text `script`/`style`, comments, a doctype and
//! implicitly closed paragraphs and list items. Malformed input never fails; stray end tags are
//! ignored and unclosed elements are closed at end of input. Parsed attributes come out in name
//! order.

use crate::dom::{Attribute, Document, NodeId, NodeKind};
use html5gum::{State, Token, Tokenizer};

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose contents are stored verbatim (no tags, no character references).
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements implicitly closed when a sibling with the same tag opens.
const SELF_NESTING_CLOSED: &[&str] = &["p", "li", "option", "dt", "dd", "tr", "td", "th"];

/// Returns `true` if `tag` is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Returns `true` if `tag` holds raw text.
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

struct TreeBuilder {
    doc: Document,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.doc.root())
    }

    fn append(&mut self, node: NodeId) {
        let parent = self.current();
        // Containers on the open stack always accept children.
        let _ = self.doc.append_child(parent, node);
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current();
        if let Some(&last) = self.doc.children(parent).last()
            && let Some(existing) = self.doc.text(last)
        {
            let merged = format!("{existing}{text}");
            let _ = self.doc.set_text(last, merged);
            return;
        }
        let node = self.doc.create_text(text);
        self.append(node);
    }

    /// Open an element. Returns `true` if it stays open and collects children.
    fn open_element(&mut self, name: String, attrs: Vec<Attribute>, self_closing: bool) -> bool {
        if SELF_NESTING_CLOSED.contains(&name.as_str())
            && self.doc.tag_name(self.current()) == Some(name.as_str())
        {
            self.open.pop();
        }
        let stays_open = !self_closing && !is_void(&name);
        let node = self.doc.create_element_with_attrs(name, attrs);
        self.append(node);
        if stays_open {
            self.open.push(node);
        }
        stays_open
    }

    fn close_element(&mut self, name: &str) {
        let found = self
            .open
            .iter()
            .rposition(|&id| self.doc.tag_name(id) == Some(name));
        if let Some(index) = found
            && index > 0
        {
            self.open.truncate(index);
        }
    }
}

/// Parse `input` into a new [`Document`].
pub fn parse(input: &str) -> Document {
    let mut builder = TreeBuilder::new();
    let mut tokenizer = Tokenizer::new(input);

    while let Some(token) = tokenizer.next() {
        let Ok(token) = token;
        match token {
            Token::StartTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                let attrs: Vec<Attribute> = tag
                    .attributes
                    .iter()
                    .map(|(k, v)| {
                        Attribute::new(
                            String::from_utf8_lossy(k).to_ascii_lowercase(),
                            String::from_utf8_lossy(v).into_owned(),
                        )
                    })
                    .collect();

                let stays_open = builder.open_element(name.clone(), attrs, tag.self_closing);
                if stays_open {
                    // The tree builder owns tokenizer state switching for raw text.
                    match name.as_str() {
                        "script" | "style" => tokenizer.set_state(State::ScriptData),
                        "textarea" | "title" => tokenizer.set_state(State::RcData),
                        _ => {}
                    }
                }
            }
            Token::EndTag(tag) => {
                let name = String::from_utf8_lossy(&tag.name).to_ascii_lowercase();
                builder.close_element(&name);
            }
            Token::String(text) => builder.push_text(&String::from_utf8_lossy(&text)),
            Token::Comment(text) => {
                let node = builder.doc.create_comment(String::from_utf8_lossy(&text));
                builder.append(node);
            }
            Token::Doctype(doctype) => {
                let name = String::from_utf8_lossy(&doctype.name).to_ascii_lowercase();
                let node = builder.doc.create_doctype(name);
                builder.append(node);
            }
            Token::Error(error) => tracing::trace!(?error, "html tokenizer error"),
        }
    }

    builder.doc
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(kind) = doc.kind(id) else {
        return;
    };
    match kind {
        NodeKind::Document => write_children(doc, id, out),
        NodeKind::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Text(text) => {
            let raw = doc
                .parent(id)
                .and_then(|p| doc.tag_name(p))
                .is_some_and(is_raw_text);
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for attr in &element.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if is_void(&element.tag) {
                return;
            }
            write_children(doc, id, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn write_children(doc: &Document, id: NodeId, out: &mut String) {
    for &child in doc.children(id) {
        write_node(doc, child, out);
    }
}

/// Serialize `id` and its subtree (the node's "outer HTML").
pub fn serialize(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

/// Serialize only the children of `id` (the node's "inner HTML").
pub fn serialize_children(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_children(doc, id, &mut out);
    out
}

impl Document {
    /// Parse HTML into a document. See [`parse`].
    pub fn parse_html(input: &str) -> Self {
        parse(input)
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        serialize(self, self.root())
    }

    /// Serialize the children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        serialize_children(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_simple_page() {
        let html = "<!DOCTYPE html><html><head><title>Snippets</title></head>\
                    <body><p class=\"lead\">Hello world</p><br><img src=\"a.png\"></body></html>";
        let doc = parse(html);
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_attributes_quoted_unquoted_and_bare() {
        let doc = parse("<input id=search-input type='text' required>");
        let input = doc.get_element_by_id("search-input").unwrap();
        let el = doc.element(input).unwrap();
        assert_eq!(el.attr("type"), Some("text"));
        assert_eq!(el.attr("required"), Some(""));
        assert_eq!(doc.children(input).len(), 0);
    }

    #[test]
    fn test_script_and_style_are_raw_text() {
        let html = "<body><script>if (a < b && c) { x = \"</p>\"; }</script>\
                    <style>p > a { color: red; }</style></body>";
        let doc = parse(html);
        let script = doc.elements_by_tag("script")[0];
        assert_eq!(
            doc.text_content(script),
            "if (a < b && c) { x = \"</p>\"; }"
        );
        assert_eq!(doc.to_html(), html);
    }

    #[test]
    fn test_script_ends_only_at_its_own_end_tag() {
        let html = "<body><script>var s = \"</scripts>\"; var t = \"</script \";</script>\
                    <p>after</p></body>";
        let doc = parse(html);
        let script = doc.elements_by_tag("script")[0];
        assert_eq!(doc.children(script).len(), 1);
        assert_eq!(doc.text_content(script), "var s = \"</scripts>\"; var t = \"");
        assert_eq!(doc.elements_by_tag("p").len(), 1);
    }

    #[test]
    fn test_title_is_text_only() {
        let doc = parse("<title>a <b> &amp; c</title>");
        let title = doc.elements_by_tag("title")[0];
        assert_eq!(doc.text_content(title), "a <b> & c");
        assert!(doc.elements_by_tag("b").is_empty());
    }

    #[test]
    fn test_attributes_in_name_order() {
        let doc = parse("<a href=\"/add.html\" class=\"nav-link\" HREF=\"/dup\">Add</a>");
        let a = doc.elements_by_tag("a")[0];
        let names: Vec<&str> = doc
            .element(a)
            .unwrap()
            .attrs
            .iter()
            .map(|attr| attr.name.as_str())
            .collect();
        assert_eq!(names, vec!["class", "href"]);
        assert_eq!(doc.element(a).unwrap().attr("href"), Some("/add.html"));
    }

    #[test]
    fn test_entities_decode_and_reencode() {
        let doc = parse("<p>a &amp; b &lt;tag&gt; &#65;&#x42; &bogus;</p>");
        let p = doc.elements_by_tag("p")[0];
        assert_eq!(doc.text_content(p), "a & b <tag> AB &bogus;");
        assert_eq!(
            doc.inner_html(p),
            "a &amp; b &lt;tag&gt; AB &amp;bogus;"
        );
    }

    #[test]
    fn test_stray_and_unclosed_tags() {
        let doc = parse("<div><p>one<p>two</span></div>tail");
        assert_eq!(doc.to_html(), "<div><p>one</p><p>two</p></div>tail");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = parse("<p>1 < 2</p>");
        let p = doc.elements_by_tag("p")[0];
        assert_eq!(doc.text_content(p), "1 < 2");
        assert_eq!(doc.children(p).len(), 1);
    }

    #[test]
    fn test_comments_preserved() {
        let html = "<body><!-- nav --><p>x</p></body>";
        assert_eq!(parse(html).to_html(), html);
    }

    #[test]
    fn test_multibyte_text() {
        let html = "<p>héllo 👋 wörld</p>";
        assert_eq!(parse(html).to_html(), html);
    }
}
