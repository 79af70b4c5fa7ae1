//! Text access over scraper's tree that ignores non-rendered elements.

use scraper::{ElementRef, Node};

const NON_RENDERED: [&str; 3] = ["script", "style", "template"];

/// Every visible text node under `el`, in document order, untrimmed.
pub fn text_nodes<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    let root = el.id();
    el.descendants().filter_map(move |node| {
        let Node::Text(text) = node.value() else {
            return None;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root)
            .chain(std::iter::once(*el))
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|element| NON_RENDERED.contains(&element.name()));
        (!hidden).then_some(&**text)
    })
}

/// Concatenated visible text, as a browser would run it together.
pub fn raw_text(el: ElementRef<'_>) -> String {
    text_nodes(el).collect()
}

/// Visible text with each text node trimmed, empty ones dropped, and a line
/// break between the rest.
pub fn text_lines(el: ElementRef<'_>) -> String {
    let lines: Vec<&str> = text_nodes(el)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.join("\n")
}
