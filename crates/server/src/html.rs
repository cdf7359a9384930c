//! Frame HTML: a card rendered as `fc:frame` meta tags.

use auction_module::FrameRoute;
use auction_types::{ButtonAction, Card, CardImage};
use reqwest::Url;

use crate::image::escape_xml;

pub const FRAME_VERSION: &str = "vNext";
pub const BASE_PATH: &str = "/api";
pub const IMAGE_PATH: &str = "/api/image";

/// Turns route-relative targets into absolute URLs under the public origin.
#[derive(Clone, Debug)]
pub struct FrameUrls {
    origin: String,
}

impl FrameUrls {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL of a frame route (`/join` -> `{origin}/api/join`).
    pub fn route(&self, path: &str) -> String {
        let path = path.trim_end_matches('/');
        format!("{}{}{}", self.origin, BASE_PATH, path)
    }

    /// URL of the server-rendered image for a status text.
    pub fn text_image(&self, text: &str) -> String {
        let base = format!("{}{}", self.origin, IMAGE_PATH);
        match Url::parse_with_params(&base, &[("text", text)]) {
            Ok(url) => url.into(),
            Err(_) => base,
        }
    }

    pub fn image(&self, image: &CardImage) -> String {
        match image {
            CardImage::Url(url) => url.clone(),
            CardImage::Text(text) => self.text_image(text),
        }
    }
}

/// Render `card` as a frame HTML document.
pub fn render_frame(card: &Card, urls: &FrameUrls, title: &str) -> String {
    let image = urls.image(&card.image);

    let mut meta = Vec::new();
    meta.push(("fc:frame", FRAME_VERSION.to_string()));
    meta.push(("fc:frame:image", image.clone()));
    meta.push(("og:image", image));
    meta.push(("og:title", title.to_string()));
    meta.push(("fc:frame:post_url", urls.route(FrameRoute::Home.path())));

    let mut tags = String::new();
    for (property, content) in meta {
        push_meta(&mut tags, property, &content);
    }

    for (i, button) in card.buttons.iter().enumerate() {
        let key = format!("fc:frame:button:{}", i + 1);
        push_meta(&mut tags, &key, &button.label);

        let (action, target) = match &button.action {
            ButtonAction::Post { target } => ("post", urls.route(target)),
            ButtonAction::Reset => ("post", urls.route(FrameRoute::Home.path())),
            ButtonAction::Transaction { target } => ("tx", urls.route(target)),
            ButtonAction::Link { href } => ("link", href.clone()),
        };
        push_meta(&mut tags, &format!("{}:action", key), action);
        push_meta(&mut tags, &format!("{}:target", key), &target);
        if action == "tx" {
            // Wallet callback after the transaction is sent
            push_meta(
                &mut tags,
                &format!("{}:post_url", key),
                &urls.route(FrameRoute::Home.path()),
            );
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n{}</head>\n<body></body>\n</html>\n",
        escape_xml(title),
        tags
    )
}

fn push_meta(out: &mut String, property: &str, content: &str) {
    out.push_str(&format!(
        "<meta property=\"{}\" content=\"{}\" />\n",
        escape_xml(property),
        escape_xml(content)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_types::Button;

    fn urls() -> FrameUrls {
        FrameUrls::new("https://frame.example/")
    }

    #[test]
    fn test_route_urls() {
        let urls = urls();
        assert_eq!(urls.route("/"), "https://frame.example/api");
        assert_eq!(urls.route("/join"), "https://frame.example/api/join");
    }

    #[test]
    fn test_text_image_is_query_encoded() {
        assert_eq!(
            urls().text_image("Current bid: 0.05"),
            "https://frame.example/api/image?text=Current+bid%3A+0.05"
        );
    }

    #[test]
    fn test_render_buttons() {
        let card = Card::new(CardImage::Url("https://img.example/1.png".into()))
            .with_button(Button::post("join BuilderDAO", "/join"))
            .with_button(Button::transaction("Bid 0.025", "/mint"))
            .with_button(Button::link("Share", "https://warpcast.com/~/compose?text=a&b"));
        let html = render_frame(&card, &urls(), "Auction");

        assert!(html.contains(r#"<meta property="fc:frame" content="vNext" />"#));
        assert!(html.contains(
            r#"<meta property="fc:frame:image" content="https://img.example/1.png" />"#
        ));
        assert!(html.contains(
            r#"<meta property="fc:frame:button:1:target" content="https://frame.example/api/join" />"#
        ));
        assert!(html.contains(r#"<meta property="fc:frame:button:2:action" content="tx" />"#));
        assert!(html.contains(
            r#"<meta property="fc:frame:button:2:target" content="https://frame.example/api/mint" />"#
        ));
        assert!(html.contains(r#"<meta property="fc:frame:button:3:action" content="link" />"#));
        assert!(html.contains("compose?text=a&amp;b"));
        assert!(!html.contains("fc:frame:button:4"));
    }

    #[test]
    fn test_reset_posts_home() {
        let card = Card::new(CardImage::Text("Error, refresh frame".into()))
            .with_button(Button::reset("Reset"));
        let html = render_frame(&card, &urls(), "Auction");

        assert!(html.contains(r#"<meta property="fc:frame:button:1:action" content="post" />"#));
        assert!(html.contains(
            r#"<meta property="fc:frame:button:1:target" content="https://frame.example/api" />"#
        ));
        assert!(html.contains("/api/image?text=Error%2C+refresh+frame"));
    }
}
