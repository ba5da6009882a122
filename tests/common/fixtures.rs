//! Page fixtures and mock product site helpers

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fake JPEG payload served for images
pub const IMAGE_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Product page carrying the gallery JSON with `hi_res` as the first entry's link
pub fn page_with_gallery(hi_res: &str) -> String {
    format!(
        "<html><head><script>\nvar data = {{\n'colorImages': {{ 'initial': \
         [{{\"hiRes\":\"{hi_res}\",\"thumb\":\"t.jpg\",\"variant\":\"MAIN\"}}]}},\n\
         'colorToAsin': {{}}\n}};\n</script></head><body></body></html>"
    )
}

/// Product page carrying only the main image element with `link` as its attribute
pub fn page_with_main_image(link: &str) -> String {
    format!(
        r#"<html><body><div id="imgTagWrapperId"><img src="small.jpg" data-old-hires="{link}"></div></body></html>"#
    )
}

/// Page with no image link at all
pub fn page_without_image() -> String {
    "<html><body><p>Type the characters you see in this image</p></body></html>".to_string()
}

/// Serve `html` at `/dp/{id}`
pub async fn mount_page(server: &MockServer, id: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(format!("/dp/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Serve [`IMAGE_BYTES`] at `image_path`
pub async fn mount_image(server: &MockServer, image_path: &str) {
    Mock::given(method("GET"))
        .and(path(image_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(IMAGE_BYTES.to_vec()),
        )
        .mount(server)
        .await;
}

/// Serve a product page at `/dp/{id}` whose image is at `/images/{id}.jpg`
pub async fn mount_product(server: &MockServer, id: &str) {
    let image_path = format!("/images/{id}.jpg");
    let link = format!("{}{}", server.uri(), image_path);
    mount_page(server, id, page_with_gallery(&link)).await;
    mount_image(server, &image_path).await;
}

/// Product URL on the mock server
pub fn product_url(server: &MockServer, id: &str) -> String {
    format!("{}/dp/{id}", server.uri())
}
