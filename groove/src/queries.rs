//! Query layer between the façade and the worker API
//!
//! [`Catalog`] is the seam the façade is written against; [`GrooveQueries`]
//! implements it on top of [`GrooveApi`]. Apart from search, every operation
//! forwards to the matching endpoint unchanged.

use crate::client::GrooveApi;
use crate::converter::{extract_slug, split_title_artist};
use crate::error::Result;
use crate::models::{
    AlbumPageResponse, CategoryFeedResponse, LatestReleaseResponse, SearchAlbum,
    SearchResponsePayload, SearchResult, SearchSong, SongDetailsResponse,
};
use async_trait::async_trait;
use tracing::debug;

/// Source of Groove content
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Searches songs and albums, returning only usable hits
    async fn search(&self, query: &str) -> Result<SearchResult>;

    async fn album_page(&self, url: &str) -> Result<AlbumPageResponse>;

    async fn song_details(&self, url: &str) -> Result<SongDetailsResponse>;

    async fn latest_releases(&self) -> Result<LatestReleaseResponse>;

    async fn category_feed(&self, url: &str) -> Result<CategoryFeedResponse>;
}

/// [`Catalog`] backed by the worker API
#[derive(Debug, Clone)]
pub struct GrooveQueries {
    api: GrooveApi,
}

impl GrooveQueries {
    pub fn new(api: GrooveApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Catalog for GrooveQueries {
    async fn search(&self, query: &str) -> Result<SearchResult> {
        let payload = self.api.search(query).await?;
        let result = normalize_search(payload);
        debug!(
            query,
            songs = result.songs.len(),
            albums = result.albums.len(),
            "Search normalized"
        );
        Ok(result)
    }

    async fn album_page(&self, url: &str) -> Result<AlbumPageResponse> {
        self.api.album(url).await
    }

    async fn song_details(&self, url: &str) -> Result<SongDetailsResponse> {
        self.api.song(url).await
    }

    async fn latest_releases(&self) -> Result<LatestReleaseResponse> {
        self.api.latest().await
    }

    async fn category_feed(&self, url: &str) -> Result<CategoryFeedResponse> {
        self.api.category(url).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Turns a raw search payload into [`SearchResult`]
///
/// Hits without a URL or a title are dropped. Song titles of the form
/// `"<title> - <artist>"` are split; this is the only artist information a
/// search hit carries.
pub fn normalize_search(payload: SearchResponsePayload) -> SearchResult {
    let albums = payload
        .albums
        .into_iter()
        .filter_map(|album| {
            let url = non_blank(album.url)?;
            let title = non_blank(album.title)?;
            Some(SearchAlbum {
                slug: extract_slug(&url),
                title,
                url,
                category: non_blank(album.category),
                image: non_blank(album.cover_image),
            })
        })
        .collect();

    let songs = payload
        .songs
        .into_iter()
        .filter_map(|song| {
            let url = non_blank(song.url)?;
            let raw_title = non_blank(song.title)?;
            let (title, artist) = split_title_artist(&raw_title);
            Some(SearchSong {
                slug: extract_slug(&url),
                title,
                artist,
                album: non_blank(song.album),
                url,
                image: non_blank(song.cover_image),
                category: non_blank(song.category),
            })
        })
        .collect();

    SearchResult { albums, songs }
}
