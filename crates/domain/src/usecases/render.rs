//! Rendering use case - turns a wish into the rich message handed to the messenger

use time::OffsetDateTime;
use time::macros::format_description;

use crate::model::{Category, NotificationPayload};

/// Accent colors, one per category plus a default
pub const HINDU_COLOR: u32 = 0xFFB300;
pub const MUSLIM_COLOR: u32 = 0x2E7D32;
pub const CHRISTIAN_COLOR: u32 = 0x1565C0;
pub const DEFAULT_COLOR: u32 = 0x7E57C2;

/// Fixed marker appended to every footer
pub const FOOTER_MARKER: &str = "Auto-generated festival wishes";

/// Maximum embed description length accepted by the platform
pub const MAX_DESCRIPTION_CHARS: usize = 4096;

/// Accent color for a category
pub fn accent_color(category: Option<Category>) -> u32 {
    match category {
        Some(Category::Hindu) => HINDU_COLOR,
        Some(Category::Muslim) => MUSLIM_COLOR,
        Some(Category::Christian) => CHRISTIAN_COLOR,
        None => DEFAULT_COLOR,
    }
}

/// Build the notification for one event
pub fn render_notification(
    event_name: &str,
    category: Option<Category>,
    wish_text: &str,
    image_url: &str,
    now: OffsetDateTime,
) -> NotificationPayload {
    let image_url = if image_url.trim().is_empty() {
        None
    } else {
        Some(image_url.to_string())
    };

    NotificationPayload {
        title: format!("{} — Wishes", event_name),
        description: truncate_chars(wish_text, MAX_DESCRIPTION_CHARS),
        color: accent_color(category),
        footer: format!("{} • {}", human_date(now), FOOTER_MARKER),
        image_url,
    }
}

/// "Sunday, 8 November 2026"
pub fn human_date(now: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:long], [day padding:none] [month repr:long] [year]"
    );
    now.format(&format).unwrap_or_else(|_| now.date().to_string())
}

/// Truncate on a character boundary, marking the cut with an ellipsis
fn truncate_chars(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let kept: String = content.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
