//! HTTP surface of the BuilderDAO auction frame.
//!
//! Serves the frame cards as `fc:frame` HTML, the wallet transaction
//! descriptors as JSON and the status images the cards point at.

pub mod html;
pub mod hub;
pub mod image;
pub mod payload;
pub mod routes;

pub use html::{render_frame, FrameUrls};
pub use hub::{HubClient, HubError, ValidatedMessage, VerifyMode};
pub use payload::FrameActionPayload;
pub use routes::{router, AppState};
