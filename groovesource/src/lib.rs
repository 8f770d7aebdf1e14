//! # GrooveSource
//!
//! Content model and capability traits shared between a media-player host and
//! its music extensions.
//!
//! The host owns these definitions: an extension converts whatever its remote
//! service returns into [`Track`], [`Album`] and [`Streamable`] values, and
//! exposes them by implementing one or more capability traits
//! ([`SearchFeedClient`], [`HomeFeedClient`], [`TrackClient`], ...).
//!
//! ## Features
//!
//! - **Plain data model**: every entity is owned, `Clone` and serde-friendly so
//!   hosts can persist handles (`extras`) between calls.
//! - **Capability traits**: one `async_trait` per host feature, implemented
//!   independently on a single adapter type.
//! - **Feeds and pages**: tabbed feeds and continuation-based paging.
//! - **Send + Sync**: every trait object can be shared across async tasks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use groovesource::{HomeFeedClient, Shelf};
//!
//! let feed = extension.load_home_feed().await?;
//! for shelf in &feed.page(None).items {
//!     println!("{}", shelf.title());
//! }
//! ```

pub mod clients;
pub mod feed;
pub mod models;
pub mod settings;

pub use clients::{
    AlbumClient, ExtensionClient, HomeFeedClient, LibraryFeedClient, QuickSearchClient,
    SearchFeedClient, TrackClient,
};
pub use feed::{Feed, Page, Tab};
pub use models::{
    Album, Artist, Date, Extras, MediaItem, MediaType, QuickSearchItem, Shelf, Source,
    SourceType, Streamable, StreamableMedia, Track,
};
pub use settings::{MemorySettings, Setting, Settings};

/// Error types returned to the host by capability traits
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    /// Error raised by the extension itself, kept intact for downcasting
    #[error(transparent)]
    Extension(Box<dyn std::error::Error + Send + Sync>),
}

impl ClientError {
    /// Wraps any extension error
    pub fn extension<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Extension(Box::new(error))
    }

    /// Returns the extension error if it has the requested type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Extension(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Result type for capability trait operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_extension_error_downcast() {
        let err = ClientError::extension(Boom);
        assert!(err.downcast_ref::<Boom>().is_some());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_not_found_has_no_inner_error() {
        let err = ClientError::NotFound("track".into());
        assert!(err.downcast_ref::<Boom>().is_none());
    }
}
