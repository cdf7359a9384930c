//! The cards the frame can show.

use alloy::primitives::U256;
use auction_types::{format_ether, Button, Card, CardImage};

use crate::call::FrameRoute;
use crate::config::FrameConfig;

pub const ERROR_TEXT: &str = "Error, refresh frame";
pub const NO_AUCTION_TEXT: &str = "There are no active auctions, start the next one";

/// Fixed failure card with a single reset button.
pub fn error_card() -> Card {
    Card::new(CardImage::Text(ERROR_TEXT.to_string())).with_button(Button::reset("Reset"))
}

/// Token artwork with the button into the auction view.
pub fn artwork_card(image: String) -> Card {
    Card::new(CardImage::Url(image))
        .with_button(Button::post("join BuilderDAO", FrameRoute::Join.path()))
}

/// Shown once the auction end time has passed.
pub fn no_auction_card(config: &FrameConfig) -> Card {
    Card::new(CardImage::Text(NO_AUCTION_TEXT.to_string()))
        .with_button(Button::transaction(
            "Start next auction",
            FrameRoute::StartAuction.path(),
        ))
        .with_button(Button::link(
            "builderDAOToken Auction page",
            &config.auction_page_url,
        ))
        .with_button(Button::link("Share", &config.share_url_start))
}

/// Running auction: current bid and a button bidding the minimum.
pub fn bid_card(config: &FrameConfig, current_bid: U256, minimum_bid: U256) -> Card {
    Card::new(CardImage::Text(format!(
        "Current bid: {}",
        format_ether(current_bid)
    )))
    .with_button(Button::transaction(
        format!("Bid {}", format_ether(minimum_bid)),
        FrameRoute::Mint.path(),
    ))
    .with_button(Button::link(
        "BuilderDAOToken Auction page",
        &config.auction_page_url,
    ))
    .with_button(Button::link("Share", &config.share_url_bid))
}
