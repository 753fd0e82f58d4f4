use serde_json::Value;

/// Pulls image URLs out of a chat-completion response. Anything that does not
/// have the expected shape is skipped, never treated as an error.
///
/// Per choice, `message.images[*].image_url.url` is read before
/// `message.content[*].image_url.url`. URLs are kept in traversal order and are
/// not deduplicated across the two locations.
pub fn extract_images(payload: Option<&Value>) -> Vec<String> {
    let choices = payload
        .and_then(|p| p.get("choices"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut images = Vec::new();
    for choice in choices {
        let message = choice.get("message");
        for field in ["images", "content"] {
            let parts = message
                .and_then(|m| m.get(field))
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            images.extend(
                parts
                    .iter()
                    .filter_map(image_url_of)
                    .filter(|url| is_accepted_url(url))
                    .map(String::from),
            );
        }
    }

    images
}

fn image_url_of(part: &Value) -> Option<&str> {
    part.get("image_url")?.get("url")?.as_str()
}

/// Prefix check only; the rest of the string is passed through as-is.
pub fn is_accepted_url(url: &str) -> bool {
    url.starts_with("data:image/") || url.starts_with("http")
}
