use crate::error::Error;
use crate::extract::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Page with an inline script carrying `gallery` as the initial color images
fn page_with_gallery(gallery: &str) -> String {
    format!(
        "<html><head><script>\nP.when('A').register(\"ImageBlockATF\", function(A){{\n\
         var data = {{\n'colorImages': {{ 'initial': {gallery}}},\n'colorToAsin': {{}}\n}};\n\
         }});</script></head><body></body></html>"
    )
}

/// Page with only the main image element
fn page_with_main_image(attrs: &str) -> String {
    format!(
        r#"<html><body><div id="main"><div id="imgTagWrapperId" class="imgTagWrapper">
        <img alt="Product" src="https://cdn.example/small.jpg" {attrs}>
        </div></div></body></html>"#
    )
}

struct Fixed(Option<&'static str>);

impl ExtractionStrategy for Fixed {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract(&self, _html: &str) -> crate::error::Result<Option<String>> {
        Ok(self.0.map(str::to_string))
    }
}

struct Broken;

impl ExtractionStrategy for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn extract(&self, _html: &str) -> crate::error::Result<Option<String>> {
        Err(Error::EmbeddedFormat("broken".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Embedded JSON stage
// ---------------------------------------------------------------------------

#[test]
fn embedded_reads_hires_of_first_entry() {
    let html = page_with_gallery(
        r#"[{"hiRes":"https://cdn.example/I/first._SL1500_.jpg","thumb":"t1.jpg","variant":"MAIN"},{"hiRes":"https://cdn.example/I/second.jpg","variant":"PT01"}]"#,
    );

    let link = EmbeddedJsonStrategy::default().extract(&html).unwrap();
    assert_eq!(
        link.as_deref(),
        Some("https://cdn.example/I/first._SL1500_.jpg")
    );
}

#[test]
fn embedded_missing_markers_is_absence() {
    let strategy = EmbeddedJsonStrategy::default();
    assert_eq!(
        strategy.extract("<html><body></body></html>").unwrap(),
        None
    );
    // start marker present, end marker missing
    assert_eq!(
        strategy
            .extract("'colorImages': { 'initial': [{\"hiRes\":\"x\"")
            .unwrap(),
        None
    );
}

#[test]
fn embedded_null_or_blank_hires_is_absence() {
    let strategy = EmbeddedJsonStrategy::default();
    for gallery in [
        r#"[{"hiRes":null,"large":"l.jpg"}]"#,
        r#"[{"hiRes":"  ","large":"l.jpg"}]"#,
        r#"[{"large":"l.jpg"}]"#,
    ] {
        assert_eq!(
            strategy.extract(&page_with_gallery(gallery)).unwrap(),
            None,
            "gallery: {gallery}"
        );
    }
}

#[test]
fn embedded_malformed_json_is_fatal() {
    let html = page_with_gallery(r#"[{"hiRes": https://unquoted}]"#);
    let err = EmbeddedJsonStrategy::default().extract(&html).unwrap_err();
    assert!(matches!(err, Error::EmbeddedFormat(_)));
    assert!(!err.is_known());
}

#[test]
fn embedded_unexpected_shapes_are_fatal() {
    let strategy = EmbeddedJsonStrategy::default();
    assert!(matches!(
        strategy.extract(&page_with_gallery(r#"[{"hiRes":42}]"#)),
        Err(Error::EmbeddedFormat(_))
    ));
    assert!(matches!(
        strategy.extract(&page_with_gallery(r#"[["a"],{"hiRes":"x"}]"#)),
        Err(Error::EmbeddedFormat(_))
    ));
}

#[test]
fn embedded_custom_markers() {
    let strategy = EmbeddedJsonStrategy::new("gallery = ", "}];", "url");
    let html = r#"<script>var gallery = [{"url":"/img/a.png"}];</script>"#;
    assert_eq!(
        strategy.extract(html).unwrap().as_deref(),
        Some("/img/a.png")
    );
}

// ---------------------------------------------------------------------------
// Attribute stage
// ---------------------------------------------------------------------------

#[test]
fn attribute_reads_old_hires() {
    let html = page_with_main_image(r#"data-old-hires="https://cdn.example/I/main.jpg""#);
    assert_eq!(
        AttributeStrategy::default()
            .extract(&html)
            .unwrap()
            .as_deref(),
        Some("https://cdn.example/I/main.jpg")
    );
}

#[test]
fn attribute_absent_or_blank_is_absence() {
    let strategy = AttributeStrategy::default();
    assert_eq!(strategy.extract(&page_with_main_image("")).unwrap(), None);
    assert_eq!(
        strategy
            .extract(&page_with_main_image(r#"data-old-hires="""#))
            .unwrap(),
        None
    );
    assert_eq!(
        strategy
            .extract(r#"<div id="other"><img data-old-hires="x.jpg"></div>"#)
            .unwrap(),
        None
    );
}

#[test]
fn attribute_custom_selector() {
    let strategy = AttributeStrategy::new("img.hero", "data-src").unwrap();
    let html = r#"<img class="hero" data-src="/hero.jpg">"#;
    assert_eq!(
        strategy.extract(html).unwrap().as_deref(),
        Some("/hero.jpg")
    );
}

#[test]
fn attribute_invalid_selector_rejected() {
    assert!(matches!(
        AttributeStrategy::new("div[[", "src"),
        Err(Error::Config { .. })
    ));
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

#[test]
fn default_chain_prefers_embedded_json() {
    let mut html = page_with_gallery(r#"[{"hiRes":"https://cdn.example/embedded.jpg"}]"#);
    html.push_str(&page_with_main_image(
        r#"data-old-hires="https://cdn.example/attribute.jpg""#,
    ));

    let link = ImageLinkExtractor::default().extract(&html).unwrap();
    assert_eq!(link.as_deref(), Some("https://cdn.example/embedded.jpg"));
}

#[test]
fn default_chain_falls_back_to_attribute() {
    let html = page_with_main_image(r#"data-old-hires="https://cdn.example/attribute.jpg""#);
    let link = ImageLinkExtractor::default().extract(&html).unwrap();
    assert_eq!(link.as_deref(), Some("https://cdn.example/attribute.jpg"));
}

#[test]
fn default_chain_finds_nothing() {
    let html = "<html><body><p>Robot check</p></body></html>";
    assert_eq!(ImageLinkExtractor::default().extract(html).unwrap(), None);
}

#[test]
fn malformed_embedded_data_does_not_fall_back() {
    let mut html = page_with_gallery(r#"[{"hiRes": nope}]"#);
    html.push_str(&page_with_main_image(
        r#"data-old-hires="https://cdn.example/attribute.jpg""#,
    ));
    assert!(matches!(
        ImageLinkExtractor::default().extract(&html),
        Err(Error::EmbeddedFormat(_))
    ));
}

#[test]
fn chain_order_is_respected() {
    let extractor = ImageLinkExtractor::new(vec![
        Box::new(Fixed(None)),
        Box::new(Fixed(Some("second"))),
        Box::new(Broken),
    ]);
    assert_eq!(extractor.extract("").unwrap().as_deref(), Some("second"));
    assert_eq!(
        extractor.strategy_names(),
        vec!["fixed", "fixed", "broken"]
    );

    let failing = ImageLinkExtractor::new(vec![Box::new(Fixed(None)), Box::new(Broken)]);
    assert!(failing.extract("").is_err());

    let empty = ImageLinkExtractor::new(Vec::new());
    assert_eq!(empty.extract("x").unwrap(), None);
}
