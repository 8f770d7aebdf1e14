//! Mapping from worker API payloads to host entities
//!
//! Everything here is pure and deterministic. Missing optional fields degrade
//! to `None` or empty collections; a whole record is dropped (`None`) only when
//! its URL is absent, since the URL is the handle every later call relies on.
//!
//! # Extras
//!
//! Converted tracks and albums carry the keys below in their `extras` map:
//!
//! | Key | Content |
//! |-----|---------|
//! | `slug` | trailing URL segment without extension |
//! | `url` | source page URL, used to re-fetch details |
//! | `category` | upstream category label |
//! | `artists` | raw artist string as returned upstream |
//! | `timestamp` | scrape timestamp of the payload |
//! | `source` | listing the entity comes from (`search`, `latest`, ...) |
//!
//! Streamables carry `directUrl` and `source` (both the playable URL),
//! `quality` and `coverUrl`.

use crate::error::{GrooveError, Result};
use crate::models::{
    AlbumPageResponse, AlbumPaginationPayload, AlbumPageResult, AlbumSongPayload,
    CategoryAlbumPayload, LatestReleaseAlbumPayload, LatestReleaseSongPayload,
    RelatedSongPayload, SearchAlbum, SearchSong, SongDetailsResponse, SongDetailsResult,
};
use chrono::NaiveDate;
use groovesource::{Album, Artist, Date, Extras, Streamable, Track};
use once_cell::sync::Lazy;
use regex::Regex;

/// Extras key holding the direct playable URL
pub const DIRECT_URL_KEY: &str = "directUrl";
/// Secondary extras key holding the same URL
pub const SOURCE_URL_KEY: &str = "source";

/// Page number the upstream lists on every album page without it existing
pub const SENTINEL_PAGE: u32 = 2025;

/// Date layouts seen in upstream payloads, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%b %d, %Y"];

static ARTIST_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" (?:-|&|feat\.|feat|x) ").expect("artist separator pattern"));
static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern"));

// ============================================================================
// Pure helpers
// ============================================================================

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Resolves an upstream image path to an absolute URL
///
/// Leading `../` segments are collapsed, then relative paths are joined onto
/// `base`. Absolute URLs are returned unchanged, so applying this twice gives
/// the same result as applying it once.
pub fn sanitize_image_url(raw: Option<&str>, base: &str) -> Option<String> {
    let mut path = non_blank(raw)?;

    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }
    if let Some(rest) = path.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }

    while let Some(rest) = path.strip_prefix("../") {
        path = rest;
    }
    let path = path.trim_start_matches("./").trim_start_matches('/');
    if path.is_empty() {
        return None;
    }

    Some(format!("{}/{}", base.trim_end_matches('/'), path))
}

/// Lowercase slug of an artist name, falling back to the name itself
pub fn artist_id(name: &str) -> String {
    let lower = name.to_lowercase();
    let slug = NON_ALPHANUMERIC.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        name.to_string()
    } else {
        slug.to_string()
    }
}

/// Splits an upstream artist string into artists
///
/// `" - "`, `" & "`, `" feat. "`, `" feat "` and `" x "` are treated as commas.
/// Separators are matched case-sensitively: `" X "` is part of a name.
pub fn parse_artists(raw: Option<&str>) -> Vec<Artist> {
    let Some(raw) = non_blank(raw) else {
        return Vec::new();
    };

    let normalized = ARTIST_SEPARATORS.replace_all(raw, ",");

    normalized
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Artist::new(artist_id(name), name))
        .collect()
}

/// Trailing path segment of a URL without its extension
///
/// The query string and fragment are ignored. When the segment is empty the
/// whole (trimmed) URL is returned.
pub fn extract_slug(url: &str) -> String {
    let url = url.trim();
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    let stem = match segment.rfind('.') {
        Some(dot) if dot > 0 => &segment[..dot],
        _ => segment,
    };

    if stem.is_empty() {
        url.to_string()
    } else {
        stem.to_string()
    }
}

/// Java-style string hash over UTF-16 code units
fn string_hash(value: &str) -> u32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32)) as u32
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Deterministic id `<prefix>_<base36 hash>` for entries without a natural id
///
/// The URL is lower-cased and trimmed before hashing.
pub fn stable_id_from_url(prefix: &str, url: &str) -> String {
    let normalized = url.trim().to_lowercase();
    format!("{}_{}", prefix, to_base36(string_hash(&normalized)))
}

/// Leading digit run of a quality label (`"320kbps"` gives 320), 0 otherwise
pub fn parse_quality(label: &str) -> u32 {
    let digits: String = label
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Page number encoded in the trailing segment of an album page URL
pub fn current_page_number(url: &str) -> u32 {
    extract_slug(url).parse().unwrap_or(1)
}

/// URL of the smallest listed page after the current one
///
/// The sentinel page and entries without a URL are ignored.
pub fn next_page_url(current_url: &str, pages: &[AlbumPaginationPayload]) -> Option<String> {
    let current = current_page_number(current_url);

    pages
        .iter()
        .filter_map(|p| Some((p.page?, non_blank(p.url.as_deref())?)))
        .filter(|(page, _)| *page != SENTINEL_PAGE && *page > current)
        .min_by_key(|(page, _)| *page)
        .map(|(_, url)| url.to_string())
}

/// Album track titles sometimes carry metadata after a comma
pub fn clean_album_track_title(title: &str) -> String {
    let head = title.split(',').next().unwrap_or(title).trim();
    if head.is_empty() {
        title.trim().to_string()
    } else {
        head.to_string()
    }
}

/// Splits `"<title> - <artist>"` once
pub fn split_title_artist(raw: &str) -> (String, Option<String>) {
    match raw.split_once(" - ") {
        Some((title, artist)) if !title.trim().is_empty() => {
            let artist = artist.trim();
            (
                title.trim().to_string(),
                (!artist.is_empty()).then(|| artist.to_string()),
            )
        }
        _ => (raw.trim().to_string(), None),
    }
}

/// Parses the date layouts the upstream uses, down to a bare year
pub fn parse_release_date(raw: Option<&str>) -> Option<Date> {
    use chrono::Datelike;

    let raw = non_blank(raw)?;
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(Date::ymd(date.year(), date.month(), date.day()));
        }
    }

    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse().ok().map(Date::year);
    }
    None
}

/// Extras builder skipping blank values
#[derive(Default)]
struct ExtrasBuilder(Extras);

impl ExtrasBuilder {
    fn put(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = non_blank(value) {
            self.0.insert(key.to_string(), value.to_string());
        }
        self
    }

    fn build(self) -> Extras {
        self.0
    }
}

// ============================================================================
// Converter
// ============================================================================

/// Maps payloads to host entities
///
/// Holds the two inputs that are not part of the payloads: the base URL for
/// relative images and whether covers are also used as backgrounds.
#[derive(Debug, Clone)]
pub struct Converter {
    image_base_url: String,
    show_background: bool,
}

impl Converter {
    pub fn new(image_base_url: impl Into<String>) -> Self {
        Self {
            image_base_url: image_base_url.into(),
            show_background: true,
        }
    }

    /// Enables or disables cover art backgrounds
    pub fn with_background(mut self, show_background: bool) -> Self {
        self.show_background = show_background;
        self
    }

    pub fn image_url(&self, raw: Option<&str>) -> Option<String> {
        sanitize_image_url(raw, &self.image_base_url)
    }

    fn background(&self, cover: &Option<String>) -> Option<String> {
        if self.show_background {
            cover.clone()
        } else {
            None
        }
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn search_song_to_track(&self, song: &SearchSong) -> Track {
        let mut track = Track::new(song.slug.clone(), song.title.clone());
        track.artists = parse_artists(song.artist.as_deref());
        track.cover = self.image_url(song.image.as_deref());
        track.background = self.background(&track.cover);
        track.subtitle = song.album.clone().or_else(|| song.artist.clone());
        track.extras = ExtrasBuilder::default()
            .put("slug", Some(&song.slug))
            .put("url", Some(&song.url))
            .put("category", song.category.as_deref())
            .put("artists", song.artist.as_deref())
            .put("source", Some("search"))
            .build();
        track
    }

    pub fn search_album_to_album(&self, hit: &SearchAlbum) -> Album {
        let mut album = Album::new(hit.slug.clone(), hit.title.clone());
        album.cover = self.image_url(hit.image.as_deref());
        album.background = self.background(&album.cover);
        album.subtitle = hit.category.clone();
        album.extras = ExtrasBuilder::default()
            .put("slug", Some(&hit.slug))
            .put("url", Some(&hit.url))
            .put("category", hit.category.as_deref())
            .put("source", Some("search"))
            .build();
        album
    }

    // ------------------------------------------------------------------------
    // Latest releases and categories
    // ------------------------------------------------------------------------

    pub fn latest_song_to_track(
        &self,
        song: &LatestReleaseSongPayload,
        timestamp: Option<&str>,
    ) -> Option<Track> {
        let url = non_blank(song.url.as_deref())?;
        let slug = extract_slug(url);
        let title = non_blank(song.title.as_deref()).map_or_else(|| slug.clone(), str::to_string);
        let artists_raw = non_blank(song.singers.as_deref()).or(non_blank(song.artists.as_deref()));

        let mut track = Track::new(stable_id_from_url("latest_song", url), title);
        track.artists = parse_artists(artists_raw);
        track.cover = self.image_url(song.cover_image.as_deref());
        track.background = self.background(&track.cover);
        track.subtitle = artists_raw.map(str::to_string);
        track.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("category", song.category.as_deref())
            .put("artists", artists_raw)
            .put("timestamp", timestamp)
            .put("source", Some("latest"))
            .build();
        Some(track)
    }

    pub fn latest_album_to_album(
        &self,
        payload: &LatestReleaseAlbumPayload,
        timestamp: Option<&str>,
    ) -> Option<Album> {
        self.listed_album(
            "latest_album",
            payload.url.as_deref(),
            payload.title.as_deref(),
            payload.artists.as_deref(),
            payload.cover_image.as_deref(),
            None,
            timestamp,
            "latest",
        )
    }

    /// Album from a category listing; `category` is the configured name
    pub fn category_album_to_album(
        &self,
        payload: &CategoryAlbumPayload,
        category: &str,
        timestamp: Option<&str>,
    ) -> Option<Album> {
        self.listed_album(
            "category_album",
            payload.url.as_deref(),
            payload.title.as_deref(),
            payload.artists.as_deref(),
            payload.cover_image.as_deref(),
            Some(category),
            timestamp,
            "category",
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn listed_album(
        &self,
        prefix: &str,
        url: Option<&str>,
        title: Option<&str>,
        artists: Option<&str>,
        cover: Option<&str>,
        category: Option<&str>,
        timestamp: Option<&str>,
        source: &str,
    ) -> Option<Album> {
        let url = non_blank(url)?;
        let slug = extract_slug(url);
        let title = non_blank(title).map_or_else(|| slug.clone(), str::to_string);

        let mut album = Album::new(stable_id_from_url(prefix, url), title);
        album.artists = parse_artists(artists);
        album.cover = self.image_url(cover);
        album.background = self.background(&album.cover);
        album.subtitle = non_blank(artists).map(str::to_string);
        album.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("category", category)
            .put("artists", artists)
            .put("timestamp", timestamp)
            .put("source", Some(source))
            .build();
        Some(album)
    }

    // ------------------------------------------------------------------------
    // Song details
    // ------------------------------------------------------------------------

    /// Converts a song page
    ///
    /// `requested_url` stands in when the payload does not echo its URL.
    /// Fails with [`GrooveError::NotFound`] when the song block is absent.
    pub fn song_details(
        &self,
        response: &SongDetailsResponse,
        requested_url: &str,
    ) -> Result<SongDetailsResult> {
        let song = response
            .song
            .as_ref()
            .ok_or_else(|| GrooveError::not_found(format!("song data missing for {}", requested_url)))?;

        let url = non_blank(response.url.as_deref()).unwrap_or(requested_url.trim());
        let slug = extract_slug(url);
        let title = non_blank(song.name.as_deref())
            .or(non_blank(response.page_title.as_deref()))
            .map_or_else(|| slug.clone(), str::to_string);
        let cover = self.image_url(song.cover_image.as_deref());

        let streamables = song
            .downloads
            .as_ref()
            .map(|downloads| {
                downloads
                    .tiers()
                    .into_iter()
                    .map(|(label, direct_url)| self.streamable(url, label, direct_url, &cover))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut track = Track::new(slug.clone(), title);
        track.artists = parse_artists(song.singers.as_deref());
        track.cover = cover;
        track.background = self.background(&track.cover);
        track.subtitle = non_blank(song.lead_stars.as_deref())
            .or(non_blank(song.category.as_deref()))
            .map(str::to_string);
        track.is_playable = !streamables.is_empty();
        track.streamables = streamables;
        track.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("category", song.category.as_deref())
            .put("artists", song.singers.as_deref())
            .put("composer", song.composer.as_deref())
            .put("leadStars", song.lead_stars.as_deref())
            .put("timestamp", response.timestamp.as_deref())
            .put("source", Some("song"))
            .build();

        let related_tracks = response
            .related_songs
            .iter()
            .filter_map(|related| self.related_song_to_track(related))
            .collect();

        Ok(SongDetailsResult {
            track,
            related_tracks,
        })
    }

    fn streamable(
        &self,
        song_url: &str,
        label: &str,
        direct_url: &str,
        cover: &Option<String>,
    ) -> Streamable {
        let quality = parse_quality(label);
        let extras = ExtrasBuilder::default()
            .put(DIRECT_URL_KEY, Some(direct_url))
            .put(SOURCE_URL_KEY, Some(direct_url))
            .put("quality", Some(&quality.to_string()))
            .put("coverUrl", cover.as_deref())
            .build();

        Streamable::server(
            stable_id_from_url(&format!("server_{}", quality), song_url),
            quality,
            Some(label.to_string()),
            extras,
        )
    }

    pub fn related_song_to_track(&self, related: &RelatedSongPayload) -> Option<Track> {
        let url = non_blank(related.url.as_deref())?;
        let slug = extract_slug(url);
        let (title, artist) = match non_blank(related.title.as_deref()) {
            Some(raw) => split_title_artist(raw),
            None => (slug.clone(), None),
        };

        let mut track = Track::new(slug.clone(), title);
        track.artists = parse_artists(artist.as_deref());
        track.cover = self.image_url(related.cover_image.as_deref());
        track.background = self.background(&track.cover);
        track.subtitle = artist.clone();
        track.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("artists", artist.as_deref())
            .put("source", Some("related"))
            .build();
        Some(track)
    }

    // ------------------------------------------------------------------------
    // Album pages
    // ------------------------------------------------------------------------

    /// Converts one album page, including the URL of the following page
    ///
    /// The page number is read from `requested_url`, since the upstream may
    /// echo the album URL on every page. `requested_url` itself is never
    /// returned as the following page.
    pub fn album_page(&self, response: &AlbumPageResponse, requested_url: &str) -> AlbumPageResult {
        let url = non_blank(response.url.as_deref()).unwrap_or(requested_url.trim());
        let slug = extract_slug(url);
        let info = response.album.clone().unwrap_or_default();

        let title = non_blank(info.name.as_deref())
            .or(non_blank(response.page_title.as_deref()))
            .map_or_else(|| slug.clone(), str::to_string);

        let mut album = Album::new(slug.clone(), title);
        album.artists = parse_artists(info.artists.as_deref());
        album.cover = self.image_url(info.cover_image.as_deref());
        album.background = self.background(&album.cover);
        album.subtitle = non_blank(info.year.as_deref())
            .or(non_blank(info.category.as_deref()))
            .map(str::to_string);
        album.description = album_description(info.starcast.as_deref(), info.composers.as_deref());
        album.release_date = parse_release_date(info.year.as_deref());
        album.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("category", info.category.as_deref())
            .put("artists", info.artists.as_deref())
            .put("year", info.year.as_deref())
            .put("timestamp", response.timestamp.as_deref())
            .put("source", Some("album"))
            .build();

        let tracks: Vec<Track> = response
            .songs
            .iter()
            .filter_map(|song| self.album_song_to_track(song, &album))
            .collect();
        album.track_count = Some(tracks.len() as u64);

        let page_url = non_blank(Some(requested_url)).unwrap_or(url);
        let next_page_url =
            next_page_url(page_url, &response.pagination_pages).filter(|next| next.as_str() != page_url);

        AlbumPageResult {
            next_page_url,
            album,
            tracks,
        }
    }

    /// Track listed on an album page; inherits the album's cover and artists
    pub fn album_song_to_track(&self, song: &AlbumSongPayload, album: &Album) -> Option<Track> {
        let url = non_blank(song.url.as_deref())?;
        let slug = extract_slug(url);
        let title = non_blank(song.title.as_deref())
            .map(clean_album_track_title)
            .unwrap_or_else(|| slug.clone());

        let artists = parse_artists(song.artists.as_deref());
        let mut track = Track::new(slug.clone(), title);
        track.artists = if artists.is_empty() {
            album.artists.clone()
        } else {
            artists
        };
        track.cover = album.cover.clone();
        track.background = self.background(&track.cover);
        track.subtitle = Some(album.title.clone());
        track.album = Some(Album {
            extras: album
                .extras
                .iter()
                .filter(|(key, _)| matches!(key.as_str(), "slug" | "url"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            ..album.clone()
        });
        track.extras = ExtrasBuilder::default()
            .put("slug", Some(&slug))
            .put("url", Some(url))
            .put("category", album.extras.get("category").map(String::as_str))
            .put("artists", song.artists.as_deref())
            .put("source", Some("album"))
            .build();
        Some(track)
    }
}

fn album_description(starcast: Option<&str>, composers: Option<&str>) -> Option<String> {
    let lines: Vec<String> = [("Starcast", starcast), ("Composers", composers)]
        .into_iter()
        .filter_map(|(label, value)| non_blank(value).map(|v| format!("{}: {}", label, v)))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
