pub mod category;
pub mod compose;
pub mod filters;
pub mod intent;
pub mod location;
pub mod models;
pub mod text;

pub use category::{match_category, match_mood, MoodMatch};
pub use filters::extract_filters;
pub use intent::find_intent;
pub use location::validate_location;
pub use models::*;
pub use text::clean;
