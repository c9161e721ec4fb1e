//! Application use cases / business logic

pub mod commands;
pub mod daily_run;
pub mod images;
pub mod render;
pub mod wishes;

pub use commands::{CommandReply, DestinationCommand, DestinationCommands};
pub use daily_run::{DailyRun, DailyRunConfig, DailyRunError, GuildPreview};
pub use images::FestivalImages;
pub use render::render_notification;
pub use wishes::{WishConfig, WishText, WishWriter};
