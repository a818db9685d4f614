//! Greeting card shown beside the finished bouquet.

use crate::sketch::GiftDetails;

pub const DEFAULT_MESSAGE: &str = "Thinking of you with these hand-drawn blooms.";
pub const DEFAULT_SIGNATURE: &str = "An Artist";
pub const EYEBROW: &str = "Original Digital Art";
pub const SIGN_OFF: &str = "Signed with Love";

/// Text content of the card, with fallbacks for blank fields applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingCard {
    pub heading: String,
    pub message: String,
    pub signature: String,
}

impl GreetingCard {
    pub fn from_details(details: &GiftDetails) -> Self {
        let or_default = |value: &str, fallback: &str| {
            let value = value.trim();
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            heading: format!("For {}", details.recipient.trim()),
            message: or_default(&details.message, DEFAULT_MESSAGE),
            signature: or_default(&details.sender, DEFAULT_SIGNATURE),
        }
    }

    /// Plain-text layout of the card
    pub fn render_text(&self) -> String {
        let rule = "-".repeat(40);
        format!(
            "{EYEBROW}\n{heading}\n\n\u{201C}{message}\u{201D}\n\n{rule}\n{SIGN_OFF}\n{signature}\n",
            heading = self.heading,
            message = self.message,
            signature = self.signature,
        )
    }
}
