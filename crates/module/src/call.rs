//! Routes a frame interaction can resolve to.

use std::fmt;

/// The four frame entry points, relative to the frame's base path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRoute {
    /// Token artwork with a "join" button
    Home,
    /// Bid card, or "start next auction" once the auction has ended
    Join,
    /// Transaction: settle the ended auction and open the next one
    StartAuction,
    /// Transaction: bid the minimum on the running auction
    Mint,
}

impl FrameRoute {
    pub const ALL: [FrameRoute; 4] = [Self::Home, Self::Join, Self::StartAuction, Self::Mint];

    /// Path relative to the base path (`/`, `/join`, ...).
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Join => "/join",
            Self::StartAuction => "/startAuction",
            Self::Mint => "/mint",
        }
    }

    /// Whether the route answers with a transaction rather than a card.
    pub fn is_transaction(self) -> bool {
        matches!(self, Self::StartAuction | Self::Mint)
    }
}

impl fmt::Display for FrameRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_routes() {
        assert!(FrameRoute::StartAuction.is_transaction());
        assert!(FrameRoute::Mint.is_transaction());
        assert!(!FrameRoute::Home.is_transaction());
        assert!(!FrameRoute::Join.is_transaction());
    }
}
