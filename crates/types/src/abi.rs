//! Solidity bindings for the BuilderDAO auction house and metadata renderer.
//!
//! `startTime`/`endTime` are `uint40` on chain. They are declared as full
//! words here; the ABI encoding is identical and the values are narrowed
//! to `u64` when converted into [`crate::AuctionState`].

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IAuction {
        function auction()
            external
            view
            returns (
                uint256 tokenId,
                uint256 highestBid,
                address highestBidder,
                uint256 startTime,
                uint256 endTime,
                bool settled
            );

        function minBidIncrement() external view returns (uint256);

        function reservePrice() external view returns (uint256);

        function settleCurrentAndCreateNewAuction() external;

        function createBidWithReferral(uint256 tokenId, address referral) external payable;
    }

    #[sol(rpc)]
    interface IMetadataRenderer {
        function tokenURI(uint256 tokenId) external view returns (string);
    }
}
