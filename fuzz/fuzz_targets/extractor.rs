#![no_main]

use libfuzzer_sys::fuzz_target;
use url::Url;

use topicscrape::extractor::Extractor;

fuzz_target!(|data: &[u8]| {
    let html = String::from_utf8_lossy(data);
    let origin = Url::parse("https://www.douban.com").unwrap();
    let page_url = origin.join("/group/topic/1/").unwrap();
    let extractor = Extractor::with_defaults(origin).unwrap();

    // Errors are fine, panics and broken ordering are not.
    if let Ok(extraction) = extractor.extract(&html, &page_url) {
        for (idx, item) in extraction.items.iter().enumerate() {
            assert_eq!(item.order as usize, idx + 1);
            assert!(!item.value.is_empty());
        }
    }
});
