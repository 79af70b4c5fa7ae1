use std::fs;
use url::Url;

use crate::extractor::{ContentKind, ExtractError, Extractor, ExtractionTier, SelectionStrategy};
use crate::fetcher::types::PageResponse;

const TOPIC_URL: &str = "https://www.douban.com/group/topic/301234567/";

fn extractor() -> Extractor {
    Extractor::with_defaults(Url::parse("https://www.douban.com").unwrap()).unwrap()
}

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn summary(items: &[crate::extractor::ContentItem]) -> Vec<(ContentKind, &str, u32)> {
    items
        .iter()
        .map(|item| (item.kind, item.value.as_str(), item.order))
        .collect()
}

#[test]
fn test_extract_topic_page_interleaves_text_and_images() {
    let response = PageResponse::from_html(fixture("topic.html"), TOPIC_URL);
    let extraction = extractor().extract_page(&response).unwrap();

    assert_eq!(extraction.strategy, SelectionStrategy::Signature(0));
    assert_eq!(extraction.tier, ExtractionTier::Paragraph);
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Text, "天气很好，适合出门走走。", 1),
            (
                ContentKind::Image,
                "https://img9.doubanio.com/view/group_topic/l/public/p1.webp",
                2
            ),
            (ContentKind::Text, "温室里的 热带植物 长得特别茂盛。", 3),
            (
                ContentKind::Image,
                "https://www.douban.com/view/group_topic/l/public/p2.webp",
                4
            ),
            (ContentKind::Text, "下次还想再去一次！", 5),
        ]
    );
    assert_eq!(extraction.text_count(), 3);
    assert_eq!(extraction.image_count(), 2);
}

#[test]
fn test_minimal_paragraph_and_root_relative_image() {
    let html = r#"<html><body><div class="topic-doc"><p>Hello</p><img src="/x.jpg"></div></body></html>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::Paragraph);
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Text, "Hello", 1),
            (ContentKind::Image, "https://www.douban.com/x.jpg", 2),
        ]
    );
}

#[test]
fn test_plain_text_post_uses_line_split() {
    let response = PageResponse::from_html(fixture("plain_text.html"), TOPIC_URL);
    let extraction = extractor().extract_page(&response).unwrap();

    assert_eq!(extraction.tier, ExtractionTier::LineSplit);
    assert_eq!(
        summary(&extraction.items),
        vec![
            (
                ContentKind::Text,
                "First paragraph of a post written without markup.",
                1
            ),
            (ContentKind::Text, "Second paragraph follows a blank line.", 2),
        ]
    );
}

#[test]
fn test_line_split_keeps_leading_image_ahead_of_second_segment() {
    let html = "<div class=\"topic-doc\"><img src=\"https://img1.doubanio.com/a.jpg\">opening words here\n\nclosing words here</div>";
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::LineSplit);
    // Image sits at position 0 and wins the tie with segment 0.
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Image, "https://img1.doubanio.com/a.jpg", 1),
            (ContentKind::Text, "opening words here", 2),
            (ContentKind::Text, "closing words here", 3),
        ]
    );
}

#[test]
fn test_single_paragraph_falls_back_to_coarse() {
    let response = PageResponse::from_html(fixture("sparse.html"), TOPIC_URL);
    let extraction = extractor().extract_page(&response).unwrap();

    assert_eq!(extraction.strategy, SelectionStrategy::Signature(3));
    assert_eq!(extraction.tier, ExtractionTier::Coarse);
    // The lazy-loaded <span> background is not an image and the avatar is
    // denylisted, so only the text line survives.
    assert_eq!(
        summary(&extraction.items),
        vec![(ContentKind::Text, "Only one real paragraph.", 1)]
    );
}

#[test]
fn test_coarse_tier_ignores_non_img_sources() {
    let html = r#"<div class="topic-doc">
        <p>Only one real paragraph.</p>
        <iframe data-src="https://player.example.com/video/1"></iframe>
        <video data-src="https://media.example.com/clip.mp4"></video>
        <img data-src="//img1.doubanio.com/view/lazy.jpg">
    </div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::Paragraph);
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Text, "Only one real paragraph.", 1),
            (ContentKind::Image, "https://img1.doubanio.com/view/lazy.jpg", 2),
        ]
    );

    let html = r#"<div class="topic-doc"><p>Only one real paragraph.</p><iframe data-src="https://player.example.com/video/1"></iframe></div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::Coarse);
    assert_eq!(
        summary(&extraction.items),
        vec![(ContentKind::Text, "Only one real paragraph.", 1)]
    );
}

#[test]
fn test_uppercase_scheme_image_is_normalized() {
    let html = r#"<div class="topic-doc"><p>Hello world</p><img src="HTTP://IMG.EXAMPLE.COM/A.JPG"></div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Text, "Hello world", 1),
            (ContentKind::Image, "http://img.example.com/A.JPG", 2),
        ]
    );
    assert!(extraction.items[1].value.starts_with("http://"));
}

#[test]
fn test_coarse_tier_puts_images_before_all_text() {
    let html = r#"<div class="topic-doc">
        <div>first line of text</div>
        <img src="/photo/1.jpg">
        <div>second line of text</div>
        <img src="/emoji/ok.png">
    </div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    // No blank line between the text nodes, so line-split yields a single
    // segment plus one image: two items, accepted.
    assert_eq!(extraction.tier, ExtractionTier::LineSplit);

    let html = r#"<div class="topic-doc"><p>lonely paragraph</p><img src="/emoji/ok.png"><div>tail text line</div></div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    // Coarse denylist drops only icon/avatar, so the emoji image survives.
    assert_eq!(extraction.tier, ExtractionTier::Coarse);
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Image, "https://www.douban.com/emoji/ok.png", 1),
            (ContentKind::Text, "lonely paragraph", 2),
            (ContentKind::Text, "tail text line", 3),
        ]
    );
}

#[test]
fn test_empty_container_yields_no_items() {
    let html = r#"<div class="topic-doc">  <span>hi</span> </div>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::Coarse);
    assert!(extraction.items.is_empty());
}

#[test]
fn test_no_container_is_an_error() {
    let response = PageResponse::from_html(fixture("no_container.html"), TOPIC_URL);
    let result = extractor().extract_page(&response);

    assert_eq!(result.unwrap_err(), ExtractError::ContainerNotFound);
}

#[test]
fn test_largest_text_fallback_container() {
    let html = r#"<html><body>
        <div class="side-content"><p>short aside</p></div>
        <div class="post-doc">
            <p>The main body is clearly the longest block of text on this page.</p>
            <p>It continues for a second paragraph as well.</p>
        </div>
    </body></html>"#;
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.strategy, SelectionStrategy::LargestText);
    assert_eq!(extraction.items.len(), 2);
    assert!(extraction.items[0].value.starts_with("The main body"));
}

#[test]
fn test_extraction_is_deterministic() {
    let html = fixture("topic.html");
    let url = Url::parse(TOPIC_URL).unwrap();
    let extractor = extractor();

    let first = extractor.extract(&html, &url).unwrap();
    let second = extractor.extract(&html, &url).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_html() {
    let html = "<div class=\"topic-doc\"><p>Unclosed paragraph<p>Another <b>one<img src=\"/a.png\">";
    let extraction = extractor()
        .extract(html, &Url::parse(TOPIC_URL).unwrap())
        .unwrap();

    assert_eq!(extraction.tier, ExtractionTier::Paragraph);
    assert_eq!(extraction.items[0].value, "Unclosed paragraph");
    assert!(
        extraction
            .items
            .iter()
            .any(|item| item.value == "https://www.douban.com/a.png")
    );
}

#[test]
fn test_custom_signatures_and_denylist() {
    let options = crate::extractor::ExtractionOptions {
        container_signatures: vec!["main.post".to_string()],
        image_denylist: vec!["thumb".to_string()],
        ..Default::default()
    };
    let extractor =
        Extractor::new(Url::parse("https://forum.example.org").unwrap(), options).unwrap();
    let html = r#"<main class="post"><p>Custom layout body</p><img src="/thumb/1.jpg"><img src="/full/1.jpg"></main>"#;

    let extraction = extractor
        .extract(html, &Url::parse("https://forum.example.org/t/1").unwrap())
        .unwrap();
    assert_eq!(
        summary(&extraction.items),
        vec![
            (ContentKind::Text, "Custom layout body", 1),
            (ContentKind::Image, "https://forum.example.org/full/1.jpg", 2),
        ]
    );
}

#[test]
fn test_invalid_selector_is_rejected_up_front() {
    let options = crate::extractor::ExtractionOptions {
        paragraph_selector: "p[".to_string(),
        ..Default::default()
    };
    let result = Extractor::new(Url::parse("https://www.douban.com").unwrap(), options);
    assert!(matches!(
        result,
        Err(ExtractError::InvalidSelector { .. })
    ));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    fn block() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z ]{0,20}".prop_map(|t| format!("<p>{t}</p>")),
            "[a-z]{1,8}".prop_map(|p| format!("<img src=\"/{p}.jpg\">")),
            "[a-z]{1,8}".prop_map(|p| format!("<img data-src=\"//cdn.example.com/{p}.png\">")),
            "[a-zA-Z \n]{0,30}".prop_map(|t| format!("<div>{t}</div>")),
            "[a-zA-Z \n]{0,30}",
        ]
    }

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extractor().extract(&html, &Url::parse(TOPIC_URL).unwrap());
        }

        #[test]
        fn test_items_hold_invariants(blocks in prop::collection::vec(block(), 0..12)) {
            let html = format!("<div class=\"topic-doc\">{}</div>", blocks.concat());
            let url = Url::parse(TOPIC_URL).unwrap();
            let extractor = extractor();
            let extraction = extractor.extract(&html, &url).unwrap();

            for (index, item) in extraction.items.iter().enumerate() {
                prop_assert_eq!(item.order as usize, index + 1);
                match item.kind {
                    ContentKind::Image => {
                        prop_assert!(item.value.starts_with("http"));
                        let lower = item.value.to_lowercase();
                        prop_assert!(!lower.contains("icon") && !lower.contains("avatar"));
                    }
                    ContentKind::Text => {
                        prop_assert!(item.value.chars().count() > 3);
                        prop_assert!(!item.value.contains("  "));
                        prop_assert_eq!(item.value.trim(), item.value.as_str());
                    }
                }
            }

            prop_assert_eq!(extractor.extract(&html, &url).unwrap(), extraction);
        }
    }
}
