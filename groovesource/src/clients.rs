//! Capability traits implemented by extensions
//!
//! Each host feature is a separate trait so an extension only implements what
//! it supports. All methods are async and the traits are object safe.

use crate::feed::{Feed, Page};
use crate::models::{Album, QuickSearchItem, Shelf, Streamable, StreamableMedia, Track};
use crate::settings::{Setting, Settings};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Base contract every extension implements
#[async_trait]
pub trait ExtensionClient: Send + Sync {
    /// Settings shown on the extension's settings screen
    async fn setting_items(&self) -> Vec<Setting>;

    /// Gives the extension access to the user's setting values
    fn set_settings(&self, settings: Arc<dyn Settings>);
}

#[async_trait]
pub trait QuickSearchClient: Send + Sync {
    async fn quick_search(&self, query: &str) -> Result<Vec<QuickSearchItem>>;
}

#[async_trait]
pub trait SearchFeedClient: Send + Sync {
    async fn load_search_feed(&self, query: &str) -> Result<Feed<Shelf>>;
}

#[async_trait]
pub trait HomeFeedClient: Send + Sync {
    async fn load_home_feed(&self) -> Result<Feed<Shelf>>;
}

#[async_trait]
pub trait LibraryFeedClient: Send + Sync {
    async fn load_library_feed(&self) -> Result<Feed<Shelf>>;
}

#[async_trait]
pub trait TrackClient: Send + Sync {
    /// Completes a placeholder track (from a listing) with playable details
    async fn load_track(&self, track: &Track, is_download: bool) -> Result<Track>;

    /// Resolves a stream handle into concrete sources
    async fn load_streamable_media(
        &self,
        streamable: &Streamable,
        is_download: bool,
    ) -> Result<StreamableMedia>;

    /// Feed shown below the player (related tracks, ...)
    async fn load_track_feed(&self, track: &Track) -> Result<Feed<Shelf>>;
}

#[async_trait]
pub trait AlbumClient: Send + Sync {
    async fn load_album(&self, album: &Album) -> Result<Album>;

    /// Lists album tracks; `continuation` is the value returned by the previous page
    async fn load_tracks(&self, album: &Album, continuation: Option<&str>) -> Result<Page<Track>>;

    async fn load_album_feed(&self, album: &Album) -> Result<Option<Feed<Shelf>>>;
}
