//! Groove music extension
//!
//! This crate plugs the Groove catalogue (Indian film and pop music, scraped by
//! a worker API) into a host media player. It searches songs and albums, builds
//! the home and library feeds from the latest releases and a configured list of
//! categories, and resolves songs to direct MP3 links.
//!
//! # Architecture
//!
//! - [`client`]: `GrooveApi`, one GET per worker endpoint, typed payloads
//! - [`queries`]: the `Catalog` seam and search normalization
//! - [`converter`]: pure mapping from payloads to host entities
//! - [`cache`] / [`resilience`]: caches, retry, pacing and page walking
//! - [`extension`]: `GrooveExtension`, the host-facing façade
//! - [`config_ext`]: typed access to the `sources.groove` configuration
//!
//! # Example
//!
//! ```no_run
//! use groove::GrooveExtension;
//! use groovesource::{HomeFeedClient, QuickSearchClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extension = GrooveExtension::new()?;
//!
//!     let items = extension.quick_search("arijit").await?;
//!     println!("{} suggestions", items.len());
//!
//!     let home = extension.load_home_feed().await?;
//!     for shelf in &home.page(None).items {
//!         println!("{} ({} items)", shelf.title(), shelf.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Resilience
//!
//! | Resource | Policy |
//! |----------|--------|
//! | song details | cached per URL for the extension lifetime, 2 attempts 300 ms apart |
//! | category listing | 60 s TTL, stale entry served when a refresh fails or is empty |
//! | album pages | at most 5 hops, cycle detection, sentinel page 2025 ignored |
//! | home feed | 250 ms pause between category fetches |
//!
//! All values come from the configuration (see [`GrooveConfigExt`]).

pub mod cache;
pub mod client;
pub mod config_ext;
pub mod converter;
pub mod error;
pub mod extension;
pub mod models;
pub mod queries;
pub mod resilience;

// Re-exports
pub use cache::{CategoryCache, CategoryCacheEntry, SongCache};
pub use client::{ClientBuilder, GrooveApi};
pub use config_ext::{CategoryConfig, GrooveConfig, GrooveConfigExt};
pub use converter::Converter;
pub use error::{GrooveError, Result};
pub use extension::{GrooveExtension, SHOW_COVER_ART_BACKGROUND};
pub use models::{
    AlbumPageResponse, AlbumPageResult, CategoryFeedResponse, LatestReleaseResponse, SearchAlbum,
    SearchResponsePayload, SearchResult, SearchSong, SongDetailsResponse, SongDetailsResult,
};
pub use queries::{Catalog, GrooveQueries};
pub use resilience::RetryPolicy;
