//! Scripted catalog shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use groove::models::{
    AlbumPageInfo, AlbumPaginationPayload, AlbumSongPayload, CategoryAlbumPayload,
    DownloadLinksPayload, LatestReleaseAlbumPayload, LatestReleaseSongPayload, RelatedSongPayload,
    SongPayload,
};
use groove::{
    AlbumPageResponse, Catalog, CategoryConfig, CategoryFeedResponse, GrooveConfig, GrooveError,
    LatestReleaseResponse, Result, SearchResult, SongDetailsResponse,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// Scripted answer of the fake catalog
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Fails with an upstream HTTP error carrying this status
    Fail(u16),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Fail(status) => Err(GrooveError::UpstreamHttp {
                status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

/// Queue of replies; the last one is repeated once the others are consumed
struct Script<T>(VecDeque<Reply<T>>);

impl<T: Clone> Script<T> {
    fn next(&mut self) -> Reply<T> {
        if self.0.len() > 1 {
            self.0.pop_front().unwrap_or(Reply::Fail(500))
        } else {
            self.0.front().cloned().unwrap_or(Reply::Fail(404))
        }
    }
}

/// In-memory [`Catalog`] recording every call with its (paused) time
#[derive(Default)]
pub struct ScriptedCatalog {
    search: Mutex<Option<Reply<SearchResult>>>,
    latest: Mutex<Option<Reply<LatestReleaseResponse>>>,
    songs: Mutex<HashMap<String, Script<SongDetailsResponse>>>,
    albums: Mutex<HashMap<String, AlbumPageResponse>>,
    categories: Mutex<HashMap<String, Script<CategoryFeedResponse>>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(self, result: SearchResult) -> Self {
        *self.search.lock().unwrap() = Some(Reply::Ok(result));
        self
    }

    pub fn with_latest(self, reply: Reply<LatestReleaseResponse>) -> Self {
        *self.latest.lock().unwrap() = Some(reply);
        self
    }

    pub fn with_song(self, url: &str, replies: Vec<Reply<SongDetailsResponse>>) -> Self {
        self.songs
            .lock()
            .unwrap()
            .insert(url.to_string(), Script(replies.into()));
        self
    }

    pub fn with_album_page(self, url: &str, page: AlbumPageResponse) -> Self {
        self.albums.lock().unwrap().insert(url.to_string(), page);
        self
    }

    pub fn with_category(self, url: &str, replies: Vec<Reply<CategoryFeedResponse>>) -> Self {
        self.categories
            .lock()
            .unwrap()
            .insert(url.to_string(), Script(replies.into()));
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    /// Calls whose description starts with `prefix`
    pub fn calls_to(&self, prefix: &str) -> Vec<(Instant, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, call)| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls_to(prefix).len()
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn search(&self, query: &str) -> Result<SearchResult> {
        self.record(format!("search:{}", query));
        let reply = self.search.lock().unwrap().clone();
        reply.unwrap_or(Reply::Ok(SearchResult::default())).into_result()
    }

    async fn album_page(&self, url: &str) -> Result<AlbumPageResponse> {
        self.record(format!("album:{}", url));
        let page = self.albums.lock().unwrap().get(url).cloned();
        page.map_or(Reply::Fail(404), Reply::Ok).into_result()
    }

    async fn song_details(&self, url: &str) -> Result<SongDetailsResponse> {
        self.record(format!("song:{}", url));
        let reply = self
            .songs
            .lock()
            .unwrap()
            .get_mut(url)
            .map_or(Reply::Fail(404), Script::next);
        reply.into_result()
    }

    async fn latest_releases(&self) -> Result<LatestReleaseResponse> {
        self.record("latest".to_string());
        let reply = self.latest.lock().unwrap().clone();
        reply.unwrap_or(Reply::Fail(503)).into_result()
    }

    async fn category_feed(&self, url: &str) -> Result<CategoryFeedResponse> {
        self.record(format!("category:{}", url));
        let reply = self
            .categories
            .lock()
            .unwrap()
            .get_mut(url)
            .map_or(Reply::Fail(404), Script::next);
        reply.into_result()
    }
}

// ============================================================================
// Payload builders
// ============================================================================

pub const BOLLYWOOD: &str = "https://pagalnew.com/category/bollywood-mp3-songs.html";
pub const PUNJABI: &str = "https://pagalnew.com/category/punjabi-mp3-songs.html";

/// Configuration with the given categories and the default policies
pub fn config_with(categories: &[(&str, &str)]) -> GrooveConfig {
    GrooveConfig {
        categories: categories
            .iter()
            .map(|(name, url)| CategoryConfig::new(*name, *url))
            .collect(),
        ..GrooveConfig::default()
    }
}

pub fn category_response(names: &[&str]) -> CategoryFeedResponse {
    CategoryFeedResponse {
        timestamp: Some("2025-06-01T10:00:00Z".to_string()),
        albums: names
            .iter()
            .map(|name| CategoryAlbumPayload {
                title: Some(name.to_string()),
                url: Some(format!("https://pagalnew.com/album/{}.html", name.to_lowercase())),
                artists: Some("Various".to_string()),
                cover_image: Some(format!("../images/{}.jpg", name.to_lowercase())),
            })
            .collect(),
        ..Default::default()
    }
}

pub fn latest_response() -> LatestReleaseResponse {
    LatestReleaseResponse {
        timestamp: Some("2025-06-01T10:00:00Z".to_string()),
        latest_release_songs: vec![LatestReleaseSongPayload {
            title: Some("Sahiba".to_string()),
            url: Some("https://pagalnew.com/songs/sahiba.html".to_string()),
            singers: Some("Jasleen Royal & Stebin Ben".to_string()),
            ..Default::default()
        }],
        recent_bollywood_albums: vec![LatestReleaseAlbumPayload {
            title: Some("Saiyaara".to_string()),
            url: Some("https://pagalnew.com/album/saiyaara.html".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

pub fn song_response(url: &str, name: &str) -> SongDetailsResponse {
    SongDetailsResponse {
        url: Some(url.to_string()),
        song: Some(SongPayload {
            name: Some(name.to_string()),
            singers: Some("Arijit Singh".to_string()),
            cover_image: Some("../images/cover.jpg".to_string()),
            downloads: Some(DownloadLinksPayload {
                url_128: Some(format!("https://cdn.example/128/{}.mp3", name)),
                url_320: Some(format!("https://cdn.example/320/{}.mp3", name)),
            }),
            ..Default::default()
        }),
        related_songs: vec![RelatedSongPayload {
            title: Some("Sun Raha Hai - Ankit Tiwari".to_string()),
            url: Some("https://pagalnew.com/songs/sun-raha-hai.html".to_string()),
            cover_image: None,
        }],
        ..Default::default()
    }
}

/// Album page with `tracks` songs and the given `(page, url)` pagination
pub fn album_response(url: &str, tracks: usize, pages: &[(u32, &str)]) -> AlbumPageResponse {
    AlbumPageResponse {
        url: Some(url.to_string()),
        album: Some(AlbumPageInfo {
            name: Some("Aashiqui 2".to_string()),
            artists: Some("Mithoon".to_string()),
            year: Some("2013".to_string()),
            ..Default::default()
        }),
        songs: (0..tracks)
            .map(|i| AlbumSongPayload {
                title: Some(format!("Song {}, Aashiqui 2", i)),
                artists: None,
                url: Some(format!("https://pagalnew.com/songs/song-{}.html", i)),
            })
            .collect(),
        pagination_pages: pages
            .iter()
            .map(|(page, url)| AlbumPaginationPayload {
                page: Some(*page),
                url: Some(url.to_string()),
            })
            .collect(),
        ..Default::default()
    }
}
