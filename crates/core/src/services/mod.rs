//! Application-level operations on top of a [`PodcastRepository`].
//!
//! Every function takes the repository explicitly; nothing here holds state.
//!
//! [`PodcastRepository`]: crate::repository::PodcastRepository

pub mod authentication;
pub mod catalogue;
pub mod episodes;
pub mod playlist;
pub mod reviews;
mod types;

pub use types::*;
