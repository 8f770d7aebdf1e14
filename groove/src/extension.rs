//! Groove extension façade
//!
//! [`GrooveExtension`] implements the host capability traits on top of a
//! [`Catalog`], adding the resilience policies:
//!
//! - song details are cached for the lifetime of the extension and fetched
//!   with a bounded retry
//! - category listings are cached with a TTL and fall back to the stale entry
//!   when a refresh fails or comes back empty
//! - album pages are walked for a bounded number of hops until one has tracks
//! - category fetches of the home feed are paced
//!
//! Feed operations degrade to partial or empty feeds; `load_track` and
//! `load_album` report errors. Cancellation is always reported.

use crate::cache::{CategoryCache, SongCache};
use crate::client::GrooveApi;
use crate::config_ext::{CategoryConfig, GrooveConfig, GrooveConfigExt};
use crate::converter::{stable_id_from_url, Converter, DIRECT_URL_KEY, SOURCE_URL_KEY};
use crate::error::{GrooveError, Result};
use crate::models::{AlbumPageResult, SearchResult, SongDetailsResult};
use crate::queries::{Catalog, GrooveQueries};
use crate::resilience::{cancellable, pause, retry_with_delay, walk_pages, RetryPolicy};
use async_trait::async_trait;
use grooveconfig::Config;
use groovesource::{
    Album, AlbumClient, ExtensionClient, Extras, Feed, HomeFeedClient, LibraryFeedClient,
    MediaItem, MediaType, Page, QuickSearchClient, QuickSearchItem, SearchFeedClient, Setting,
    Settings, Shelf, Source, SourceType, Streamable, StreamableMedia, Tab, Track, TrackClient,
};
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Key of the cover art background switch
pub const SHOW_COVER_ART_BACKGROUND: &str = "show_cover_art_background";

/// Items of each kind proposed by quick search
const QUICK_SEARCH_LIMIT: usize = 5;

/// Quality reported when a streamable carries none
const DEFAULT_STREAM_QUALITY: u32 = 128;

/// The Groove extension
pub struct GrooveExtension {
    catalog: Arc<dyn Catalog>,
    config: GrooveConfig,
    settings: RwLock<Option<Arc<dyn Settings>>>,
    songs: SongCache,
    categories: CategoryCache,
    cancel: Mutex<CancellationToken>,
}

impl GrooveExtension {
    /// Extension built from the embedded default configuration
    pub fn new() -> Result<Self> {
        let config = Config::from_defaults()?;
        Self::from_config(&config)
    }

    /// Extension talking to the worker API described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let groove = config.get_groove_config()?;
        let api = GrooveApi::builder()
            .base_url(groove.base_url.clone())
            .timeout(groove.timeout)
            .user_agent(groove.user_agent.clone())
            .build()?;

        Ok(Self::with_catalog(Arc::new(GrooveQueries::new(api)), groove))
    }

    /// Extension on top of any [`Catalog`]
    pub fn with_catalog(catalog: Arc<dyn Catalog>, config: GrooveConfig) -> Self {
        let categories = CategoryCache::new(config.category_ttl);
        Self {
            catalog,
            config,
            settings: RwLock::new(None),
            songs: SongCache::new(),
            categories,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn config(&self) -> &GrooveConfig {
        &self.config
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    fn token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Cancels every in-flight and future network wait
    ///
    /// Operations return [`GrooveError::Cancelled`] until
    /// [`reset_cancellation`](Self::reset_cancellation) is called.
    pub fn cancel(&self) {
        self.token().cancel();
    }

    /// Re-arms the extension after [`cancel`](Self::cancel)
    pub fn reset_cancellation(&self) {
        let mut token = self
            .cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token().is_cancelled()
    }

    // ========================================================================
    // Settings
    // ========================================================================

    fn show_background(&self) -> bool {
        self.settings
            .read()
            .ok()
            .and_then(|settings| settings.as_ref()?.get_bool(SHOW_COVER_ART_BACKGROUND))
            .unwrap_or(self.config.show_cover_art_background)
    }

    fn converter(&self) -> Converter {
        Converter::new(self.config.image_base_url.clone()).with_background(self.show_background())
    }

    // ========================================================================
    // Resilient fetches
    // ========================================================================

    async fn search(&self, query: &str) -> Result<SearchResult> {
        cancellable(&self.token(), self.catalog.search(query)).await
    }

    /// Song details for `url`, from the cache or fetched with retry
    pub async fn song_details(&self, url: &str) -> Result<SongDetailsResult> {
        let url = url.trim();
        if url.is_empty() {
            return Err(GrooveError::invalid_argument("song url must not be blank"));
        }

        let converter = self.converter();
        if let Some(response) = self.songs.get(url).await {
            debug!(url, "Song details cache hit");
            return converter.song_details(&response, url);
        }

        let policy = RetryPolicy::new(self.config.song_retry_attempts, self.config.song_retry_delay);
        let catalog = &self.catalog;
        let response = retry_with_delay(policy, &self.token(), move || catalog.song_details(url)).await?;

        let details = converter.song_details(&response, url)?;
        self.songs.put(url.to_string(), response).await;
        Ok(details)
    }

    /// First page with tracks reachable from `url`
    ///
    /// Returns the last page fetched when none has tracks, and `None` when
    /// not even the first page could be fetched. The continuation of the
    /// returned page never points back at a page visited by this walk.
    pub async fn album_page(&self, url: &str) -> Result<Option<AlbumPageResult>> {
        let catalog = &self.catalog;
        let converter = self.converter();
        let converter = &converter;

        let walk = walk_pages(
            url,
            self.config.max_page_hops,
            &self.token(),
            move |page_url| async move {
                let response = catalog.album_page(&page_url).await?;
                Ok(converter.album_page(&response, &page_url))
            },
            |page: &AlbumPageResult| !page.tracks.is_empty(),
            |page: &AlbumPageResult| page.next_page_url.clone(),
        )
        .await?;

        debug!(url, end = ?walk.end, next = ?walk.next_url, "Album walk finished");
        Ok(walk.page.map(|mut page| {
            page.next_page_url = walk.next_url;
            page
        }))
    }

    /// Albums of one category, honouring the TTL and the stale fallback
    ///
    /// `paced` tells whether a category was already fetched during this feed
    /// assembly; the pacing delay is applied before any further fetch.
    async fn category_albums(&self, category: &CategoryConfig, paced: &mut bool) -> Result<Vec<Album>> {
        let url = category.url.as_str();

        if let Some(albums) = self.categories.fresh(url).await {
            debug!(category = %category.name, "Category cache hit");
            return Ok(albums);
        }

        let token = self.token();
        if *paced {
            pause(self.config.category_delay, &token).await?;
        }
        *paced = true;

        let converter = self.converter();
        match cancellable(&token, self.catalog.category_feed(url)).await {
            Ok(response) => {
                let timestamp = response.timestamp.as_deref();
                let albums: Vec<Album> = response
                    .albums
                    .iter()
                    .filter_map(|a| converter.category_album_to_album(a, &category.name, timestamp))
                    .collect();

                if !albums.is_empty() {
                    self.categories.store(url, &category.name, albums.clone()).await;
                    return Ok(albums);
                }

                match self.categories.any(url).await {
                    Some(stale) => {
                        warn!(category = %category.name, "Category came back empty, serving stale cache");
                        Ok(stale)
                    }
                    None => Ok(Vec::new()),
                }
            }
            Err(e) if e.is_cancelled() => Err(e),
            Err(e) => match self.categories.any(url).await {
                Some(stale) => {
                    warn!(category = %category.name, error = %e, "Category fetch failed, serving stale cache");
                    Ok(stale)
                }
                None => {
                    warn!(category = %category.name, error = %e, "Category fetch failed, skipping");
                    Ok(Vec::new())
                }
            },
        }
    }

    async fn latest_shelves(&self) -> Result<Vec<Shelf>> {
        let response = cancellable(&self.token(), self.catalog.latest_releases()).await?;
        let converter = self.converter();
        let timestamp = response.timestamp.as_deref();

        let tracks: Vec<Track> = response
            .latest_release_songs
            .iter()
            .filter_map(|song| converter.latest_song_to_track(song, timestamp))
            .collect();
        let albums: Vec<MediaItem> = response
            .recent_bollywood_albums
            .iter()
            .filter_map(|album| converter.latest_album_to_album(album, timestamp))
            .map(MediaItem::from)
            .collect();

        let mut shelves = Vec::new();
        if !tracks.is_empty() {
            shelves.push(Shelf::Tracks {
                id: "latest_songs".to_string(),
                title: "Latest Releases".to_string(),
                list: tracks,
            });
        }
        if !albums.is_empty() {
            shelves.push(Shelf::Items {
                id: "latest_albums".to_string(),
                title: "Recent Bollywood Albums".to_string(),
                list: albums,
            });
        }
        Ok(shelves)
    }

    /// Home feed shelves: latest releases first, then one shelf per category
    pub async fn home_shelves(&self) -> Result<Vec<Shelf>> {
        let mut shelves = match self.latest_shelves().await {
            Ok(shelves) => shelves,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(error = %e, "Latest releases unavailable, skipping");
                Vec::new()
            }
        };

        let mut paced = false;
        for category in &self.config.categories {
            let albums = self.category_albums(category, &mut paced).await?;
            if albums.is_empty() {
                continue;
            }
            shelves.push(Shelf::Items {
                id: stable_id_from_url("category", &category.url),
                title: category.name.clone(),
                list: albums.into_iter().map(MediaItem::from).collect(),
            });
        }

        info!(shelves = shelves.len(), "Home feed assembled");
        Ok(shelves)
    }
}

/// URL handle of a track or album
fn source_url<'a>(extras: &'a Extras, id: &'a str) -> Option<&'a str> {
    extras
        .get("url")
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .or_else(|| Some(id.trim()).filter(|id| id.starts_with("http://") || id.starts_with("https://")))
}

fn prefer<T>(placeholder: T, detail: T, is_empty: impl Fn(&T) -> bool) -> T {
    if is_empty(&placeholder) { detail } else { placeholder }
}

fn merge_extras(placeholder: &Extras, detail: Extras) -> Extras {
    let mut merged = placeholder.clone();
    merged.extend(detail);
    merged
}

/// Placeholder fields win when set; stream data always comes from `detail`
fn merge_track(placeholder: &Track, detail: Track) -> Track {
    Track {
        id: prefer(placeholder.id.clone(), detail.id, |s| s.trim().is_empty()),
        title: prefer(placeholder.title.clone(), detail.title, |s| s.trim().is_empty()),
        artists: prefer(placeholder.artists.clone(), detail.artists, Vec::is_empty),
        album: placeholder.album.clone().or(detail.album),
        cover: placeholder.cover.clone().or(detail.cover),
        background: placeholder.background.clone().or(detail.background),
        subtitle: placeholder.subtitle.clone().or(detail.subtitle),
        release_date: placeholder.release_date.or(detail.release_date),
        extras: merge_extras(&placeholder.extras, detail.extras),
        streamables: detail.streamables,
        is_playable: detail.is_playable,
    }
}

fn merge_album(placeholder: &Album, detail: Album) -> Album {
    Album {
        id: prefer(placeholder.id.clone(), detail.id, |s| s.trim().is_empty()),
        title: prefer(placeholder.title.clone(), detail.title, |s| s.trim().is_empty()),
        artists: prefer(placeholder.artists.clone(), detail.artists, Vec::is_empty),
        cover: placeholder.cover.clone().or(detail.cover),
        background: placeholder.background.clone().or(detail.background),
        subtitle: placeholder.subtitle.clone().or(detail.subtitle),
        description: placeholder.description.clone().or(detail.description),
        release_date: placeholder.release_date.or(detail.release_date),
        track_count: detail.track_count.or(placeholder.track_count),
        extras: merge_extras(&placeholder.extras, detail.extras),
    }
}

/// Degrades a feed error to `fallback`, except cancellation
fn degrade<T>(result: Result<T>, fallback: T, what: &str) -> groovesource::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_cancelled() => Err(e.into()),
        Err(e) => {
            warn!(error = %e, "{} failed, returning empty result", what);
            Ok(fallback)
        }
    }
}

#[async_trait]
impl ExtensionClient for GrooveExtension {
    async fn setting_items(&self) -> Vec<Setting> {
        vec![Setting::Switch {
            key: SHOW_COVER_ART_BACKGROUND.to_string(),
            title: "Show Cover Art Background".to_string(),
            summary: Some("Enable cover art as background by default during playback".to_string()),
            default: self.config.show_cover_art_background,
        }]
    }

    fn set_settings(&self, settings: Arc<dyn Settings>) {
        if let Ok(mut current) = self.settings.write() {
            *current = Some(settings);
        }
    }
}

#[async_trait]
impl QuickSearchClient for GrooveExtension {
    async fn quick_search(&self, query: &str) -> groovesource::Result<Vec<QuickSearchItem>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let result = self.search(query).await.map(|result| {
            let converter = self.converter();
            let songs = result
                .songs
                .iter()
                .take(QUICK_SEARCH_LIMIT)
                .map(|song| MediaItem::from(converter.search_song_to_track(song)));
            let albums = result
                .albums
                .iter()
                .take(QUICK_SEARCH_LIMIT)
                .map(|album| MediaItem::from(converter.search_album_to_album(album)));

            songs
                .chain(albums)
                .map(|item| QuickSearchItem::Media {
                    item,
                    searched: false,
                })
                .collect()
        });

        degrade(result, Vec::new(), "Quick search")
    }
}

#[async_trait]
impl SearchFeedClient for GrooveExtension {
    async fn load_search_feed(&self, query: &str) -> groovesource::Result<Feed<Shelf>> {
        if query.trim().is_empty() {
            return Ok(Feed::empty());
        }

        let result = match self.search(query).await {
            Ok(result) if result.is_empty() => return Ok(Feed::empty()),
            other => other,
        };

        let feed = result.map(|result| {
            let converter = self.converter();
            let tracks: Vec<Track> = result
                .songs
                .iter()
                .map(|song| converter.search_song_to_track(song))
                .collect();
            let albums: Vec<MediaItem> = result
                .albums
                .iter()
                .map(|album| converter.search_album_to_album(album).into())
                .collect();

            let songs_shelf = (!tracks.is_empty()).then(|| Shelf::Tracks {
                id: "search_songs".to_string(),
                title: "Songs".to_string(),
                list: tracks,
            });
            let albums_shelf = (!albums.is_empty()).then(|| Shelf::Items {
                id: "search_albums".to_string(),
                title: "Albums".to_string(),
                list: albums,
            });

            let all: Vec<Shelf> = songs_shelf.iter().chain(albums_shelf.iter()).cloned().collect();
            Feed::tabbed(
                vec![
                    Tab::new("all", "All"),
                    Tab::new("songs", "Songs"),
                    Tab::new("albums", "Albums"),
                ],
                Page::last(all),
                [
                    ("songs".to_string(), Page::last(songs_shelf.into_iter().collect())),
                    ("albums".to_string(), Page::last(albums_shelf.into_iter().collect())),
                ],
            )
        });

        degrade(feed, Feed::empty(), "Search feed")
    }
}

#[async_trait]
impl HomeFeedClient for GrooveExtension {
    async fn load_home_feed(&self) -> groovesource::Result<Feed<Shelf>> {
        Ok(Feed::single(self.home_shelves().await?))
    }
}

#[async_trait]
impl LibraryFeedClient for GrooveExtension {
    async fn load_library_feed(&self) -> groovesource::Result<Feed<Shelf>> {
        let shelves = self
            .config
            .categories
            .iter()
            .map(|category| Shelf::Category {
                id: stable_id_from_url("category", &category.url),
                title: category.name.clone(),
                subtitle: None,
                extras: Extras::from([
                    ("url".to_string(), category.url.clone()),
                    ("category".to_string(), category.name.clone()),
                ]),
            })
            .collect();
        Ok(Feed::single(shelves))
    }
}

#[async_trait]
impl TrackClient for GrooveExtension {
    async fn load_track(&self, track: &Track, _is_download: bool) -> groovesource::Result<Track> {
        let url = source_url(&track.extras, &track.id).ok_or_else(|| {
            GrooveError::invalid_argument(format!("track {} has no source url", track.id))
        })?;

        let details = self.song_details(url).await?;
        Ok(merge_track(track, details.track))
    }

    async fn load_streamable_media(
        &self,
        streamable: &Streamable,
        _is_download: bool,
    ) -> groovesource::Result<StreamableMedia> {
        match streamable.media_type {
            MediaType::Server => {}
            MediaType::Background => {
                return Err(GrooveError::Unsupported("background streamables".into()).into());
            }
            MediaType::Subtitle => {
                return Err(GrooveError::Unsupported("subtitles".into()).into());
            }
        }

        let url = [DIRECT_URL_KEY, SOURCE_URL_KEY]
            .iter()
            .filter_map(|key| streamable.extras.get(*key))
            .map(|u| u.trim())
            .find(|u| !u.is_empty())
            .ok_or_else(|| {
                GrooveError::not_found(format!("no direct url for streamable {}", streamable.id))
            })?;

        let quality = match streamable.quality {
            0 => streamable
                .extras
                .get("quality")
                .and_then(|q| q.parse().ok())
                .unwrap_or(DEFAULT_STREAM_QUALITY),
            quality => quality,
        };

        Ok(StreamableMedia::Server {
            sources: vec![Source {
                url: url.to_string(),
                source_type: SourceType::Progressive,
                quality,
                title: Some(format!("{}kbps", quality)),
                seekable: false,
            }],
            merged: false,
        })
    }

    async fn load_track_feed(&self, track: &Track) -> groovesource::Result<Feed<Shelf>> {
        let Some(url) = source_url(&track.extras, &track.id) else {
            return Ok(Feed::empty());
        };

        let feed = self.song_details(url).await.map(|details| {
            if details.related_tracks.is_empty() {
                return Feed::empty();
            }
            Feed::single(vec![Shelf::Tracks {
                id: "related_songs".to_string(),
                title: "Related Songs".to_string(),
                list: details.related_tracks,
            }])
        });

        degrade(feed, Feed::empty(), "Related songs")
    }
}

#[async_trait]
impl AlbumClient for GrooveExtension {
    async fn load_album(&self, album: &Album) -> groovesource::Result<Album> {
        let url = source_url(&album.extras, &album.id).ok_or_else(|| {
            GrooveError::invalid_argument(format!("album {} has no source url", album.id))
        })?;

        let page = self
            .album_page(url)
            .await?
            .ok_or_else(|| GrooveError::not_found(format!("album page {}", url)))?;
        Ok(merge_album(album, page.album))
    }

    async fn load_tracks(
        &self,
        album: &Album,
        continuation: Option<&str>,
    ) -> groovesource::Result<Page<Track>> {
        let start = continuation
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or_else(|| source_url(&album.extras, &album.id))
            .ok_or_else(|| {
                GrooveError::invalid_argument(format!("album {} has no source url", album.id))
            })?;

        match self.album_page(start).await? {
            Some(page) => Ok(Page::new(page.tracks, page.next_page_url)),
            None => {
                info!(url = start, "No album page could be fetched");
                Ok(Page::empty())
            }
        }
    }

    async fn load_album_feed(&self, _album: &Album) -> groovesource::Result<Option<Feed<Shelf>>> {
        Ok(None)
    }
}
