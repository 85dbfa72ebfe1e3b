//! Entity structs for the study configuration graph and the derived game session.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` and use
//! camelCase field names on the wire.

mod game;
mod image;
mod post;
mod settings;
mod source;
mod study;

pub use game::{Game, GamePost, GameSource, GameState, Interaction, Participant};
pub use image::StudyImage;
pub use post::{Post, PostComment, PostContent};
pub use settings::{
    AdvancedSettings, BasicSettings, PagesSettings, SourcePostSelectionMethod, TruncatedNormal,
    UiSettings,
};
pub use source::Source;
pub use study::{Study, next_modified_time, next_modified_time_now};
