//! Content entities exchanged between the host and its extensions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form string map attached to entities
///
/// Extensions store their re-fetch handles here (source URL, slug, ...). The
/// host persists the map verbatim and hands it back on later calls.
pub type Extras = BTreeMap<String, String>;

/// An artist credited on a track or an album
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub extras: Extras,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extras: Extras::new(),
        }
    }
}

/// Calendar date with optional precision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Date {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl Date {
    /// Year-only date
    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }
}

/// An album as displayed by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Album {
    /// Identifier, stable for a given source URL
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,
    /// Background image URL
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_date: Option<Date>,
    #[serde(default)]
    pub track_count: Option<u64>,
    #[serde(default)]
    pub extras: Extras,
}

impl Album {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A playable track
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Identifier, stable for a given source URL
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Option<Album>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub release_date: Option<Date>,
    /// Stream handles, resolved lazily through [`crate::TrackClient::load_streamable_media`]
    #[serde(default)]
    pub streamables: Vec<Streamable>,
    #[serde(default)]
    pub is_playable: bool,
    #[serde(default)]
    pub extras: Extras,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_playable: true,
            ..Default::default()
        }
    }
}

/// Kind of media a [`Streamable`] resolves to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaType {
    /// Audio served by a remote server
    Server,
    /// Visual background (video loops, canvases)
    Background,
    /// Subtitles or lyrics
    Subtitle,
}

/// Lazy handle to a stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Streamable {
    pub id: String,
    /// Quality hint (bitrate in kbps for audio)
    pub quality: u32,
    pub media_type: MediaType,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub extras: Extras,
}

impl Streamable {
    /// Audio streamable served over HTTP
    pub fn server(id: impl Into<String>, quality: u32, title: Option<String>, extras: Extras) -> Self {
        Self {
            id: id.into(),
            quality,
            media_type: MediaType::Server,
            title,
            extras,
        }
    }
}

/// Transport of a concrete media source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceType {
    Progressive,
    Hls,
    Dash,
}

/// Concrete media source the host player can open
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub url: String,
    pub source_type: SourceType,
    pub quality: u32,
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the host may issue range requests to seek
    pub seekable: bool,
}

/// Resolved form of a [`Streamable`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StreamableMedia {
    Server { sources: Vec<Source>, merged: bool },
}

impl StreamableMedia {
    pub fn sources(&self) -> &[Source] {
        match self {
            StreamableMedia::Server { sources, .. } => sources,
        }
    }
}

/// Any item that can appear in a shelf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MediaItem {
    Track(Track),
    Album(Album),
}

impl MediaItem {
    pub fn id(&self) -> &str {
        match self {
            MediaItem::Track(track) => &track.id,
            MediaItem::Album(album) => &album.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Track(track) => &track.title,
            MediaItem::Album(album) => &album.title,
        }
    }
}

impl From<Track> for MediaItem {
    fn from(track: Track) -> Self {
        MediaItem::Track(track)
    }
}

impl From<Album> for MediaItem {
    fn from(album: Album) -> Self {
        MediaItem::Album(album)
    }
}

/// Presentation container shown in a feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Shelf {
    /// Vertical track list
    Tracks {
        id: String,
        title: String,
        list: Vec<Track>,
    },
    /// Horizontal row of mixed items
    Items {
        id: String,
        title: String,
        list: Vec<MediaItem>,
    },
    /// Placeholder pointing to a category the host can open later
    Category {
        id: String,
        title: String,
        subtitle: Option<String>,
        extras: Extras,
    },
}

impl Shelf {
    pub fn id(&self) -> &str {
        match self {
            Shelf::Tracks { id, .. } | Shelf::Items { id, .. } | Shelf::Category { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Shelf::Tracks { title, .. }
            | Shelf::Items { title, .. }
            | Shelf::Category { title, .. } => title,
        }
    }

    /// Number of media items carried by the shelf
    pub fn len(&self) -> usize {
        match self {
            Shelf::Tracks { list, .. } => list.len(),
            Shelf::Items { list, .. } => list.len(),
            Shelf::Category { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entry proposed while the user types a query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum QuickSearchItem {
    Media { item: MediaItem, searched: bool },
}
