//! Data models for the worker API
//!
//! The first part mirrors the JSON payloads returned by the five endpoints.
//! Every field is optional: the upstream scraper omits whatever it could not
//! find on the page, and decoding must not fail for that.
//!
//! The second part holds the internal shapes produced by the query layer and
//! the façade.

use groovesource::{Album, Track};
use serde::{Deserialize, Serialize};

// ============================================================================
// Search
// ============================================================================

/// Response of `GET /search?q=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponsePayload {
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub albums: Vec<SearchAlbumPayload>,
    #[serde(default)]
    pub songs: Vec<SearchSongPayload>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchAlbumPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Song hit; `title` is usually `"<title> - <artists>"`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchSongPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

// ============================================================================
// Latest releases
// ============================================================================

/// Response of `GET /latest`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestReleaseResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub latest_release_songs: Vec<LatestReleaseSongPayload>,
    #[serde(default)]
    pub recent_bollywood_albums: Vec<LatestReleaseAlbumPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestReleaseSongPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub singers: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LatestReleaseAlbumPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

// ============================================================================
// Category feeds
// ============================================================================

/// Response of `GET /category?url=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFeedResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub songs: Vec<CategorySongPayload>,
    #[serde(default)]
    pub albums: Vec<CategoryAlbumPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySongPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAlbumPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

// ============================================================================
// Song details
// ============================================================================

/// Response of `GET /song?url=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongDetailsResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub song: Option<SongPayload>,
    #[serde(default)]
    pub related_songs: Vec<RelatedSongPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub singers: Option<String>,
    #[serde(default)]
    pub lead_stars: Option<String>,
    #[serde(default)]
    pub composer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub downloads: Option<DownloadLinksPayload>,
}

/// Direct download links, one per bitrate tier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DownloadLinksPayload {
    #[serde(default, rename = "url128kbps")]
    pub url_128: Option<String>,
    #[serde(default, rename = "url320kbps")]
    pub url_320: Option<String>,
}

impl DownloadLinksPayload {
    /// Available tiers as `(label, url)`, highest quality first
    pub fn tiers(&self) -> Vec<(&'static str, &str)> {
        [("320kbps", self.url_320.as_deref()), ("128kbps", self.url_128.as_deref())]
            .into_iter()
            .filter_map(|(label, url)| {
                url.map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(|u| (label, u))
            })
            .collect()
    }
}

/// Related song; `title` is usually `"<title> - <artists>"`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSongPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

// ============================================================================
// Album pages
// ============================================================================

/// Response of `GET /album?url=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPageResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub album: Option<AlbumPageInfo>,
    #[serde(default)]
    pub songs: Vec<AlbumSongPayload>,
    #[serde(default)]
    pub total_songs_on_page: Option<u32>,
    #[serde(default)]
    pub has_pagination: Option<bool>,
    #[serde(default)]
    pub pagination_pages: Vec<AlbumPaginationPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPageInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub starcast: Option<String>,
    #[serde(default)]
    pub composers: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSongPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Candidate page listed at the bottom of an album page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlbumPaginationPayload {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

// ============================================================================
// Internal shapes
// ============================================================================

/// Normalized album hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchAlbum {
    pub slug: String,
    pub title: String,
    pub url: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

/// Normalized song hit, with the artist split out of the title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSong {
    pub slug: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub url: String,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Result of one search query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub albums: Vec<SearchAlbum>,
    pub songs: Vec<SearchSong>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty() && self.songs.is_empty()
    }
}

/// Converted song details, cached per source URL
#[derive(Debug, Clone, PartialEq)]
pub struct SongDetailsResult {
    pub track: Track,
    pub related_tracks: Vec<Track>,
}

/// Converted album page
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumPageResult {
    pub album: Album,
    pub tracks: Vec<Track>,
    pub next_page_url: Option<String>,
}
