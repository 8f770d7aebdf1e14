mod common;

use common::*;
use groove::models::SearchSong;
use groove::{GrooveError, GrooveExtension, SearchAlbum, SearchResult, SHOW_COVER_ART_BACKGROUND};
use groovesource::{
    Album, AlbumClient, ClientError, ExtensionClient, Extras, HomeFeedClient, LibraryFeedClient,
    MediaItem, MediaType, MemorySettings, QuickSearchClient, QuickSearchItem, SearchFeedClient,
    Shelf, Streamable, Track, TrackClient,
};
use std::sync::Arc;
use std::time::Duration;

const SONG_URL: &str = "https://pagalnew.com/songs/tum-hi-ho.html";
const ALBUM_URL: &str = "https://pagalnew.com/album/aashiqui-2.html";
const ALBUM_PAGE_2: &str = "https://pagalnew.com/album/aashiqui-2/2.html";

fn extension(catalog: &Arc<ScriptedCatalog>, categories: &[(&str, &str)]) -> GrooveExtension {
    GrooveExtension::with_catalog(catalog.clone(), config_with(categories))
}

fn shelf_titles(shelves: &[Shelf]) -> Vec<&str> {
    shelves.iter().map(Shelf::title).collect()
}

fn placeholder_track(url: &str) -> Track {
    let mut track = Track::new("latest_song_x", "");
    track.extras.insert("url".to_string(), url.to_string());
    track
}

fn placeholder_album(url: &str) -> Album {
    let mut album = Album::new("category_album_x", "Aashiqui 2 (2013)");
    album.extras.insert("url".to_string(), url.to_string());
    album
}

fn groove_error(err: &ClientError) -> Option<&GrooveError> {
    err.downcast_ref::<GrooveError>()
}

// ============================================================================
// Category cache
// ============================================================================

#[tokio::test(start_paused = true)]
async fn category_cache_serves_fresh_entries_without_fetching() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_category(BOLLYWOOD, vec![Reply::Ok(category_response(&["Aashiqui", "Rockstar"]))]),
    );
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD)]);

    let first = extension.load_home_feed().await?;
    assert_eq!(catalog.count("category:"), 1);

    tokio::time::advance(Duration::from_secs(30)).await;
    let second = extension.load_home_feed().await?;
    assert_eq!(catalog.count("category:"), 1);
    assert_eq!(first.page(None).items, second.page(None).items);

    tokio::time::advance(Duration::from_secs(31)).await;
    extension.load_home_feed().await?;
    assert_eq!(catalog.count("category:"), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn category_failure_falls_back_to_stale_entry() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new().with_category(
        BOLLYWOOD,
        vec![Reply::Ok(category_response(&["Aashiqui", "Rockstar"])), Reply::Fail(500)],
    ));
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD)]);

    extension.load_home_feed().await?;
    tokio::time::advance(Duration::from_secs(61)).await;

    let feed = extension.load_home_feed().await?;
    let shelves = &feed.page(None).items;
    assert_eq!(catalog.count("category:"), 2);
    assert_eq!(shelf_titles(shelves), vec!["Bollywood"]);
    assert_eq!(shelves[0].len(), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn empty_category_refresh_falls_back_to_stale_entry() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new().with_category(
        BOLLYWOOD,
        vec![
            Reply::Ok(category_response(&["Aashiqui"])),
            Reply::Ok(category_response(&[])),
        ],
    ));
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD)]);

    extension.load_home_feed().await?;
    tokio::time::advance(Duration::from_secs(61)).await;

    let feed = extension.load_home_feed().await?;
    assert_eq!(feed.page(None).items[0].len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_category_without_cache_is_skipped() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_latest(Reply::Ok(latest_response()))
            .with_category(BOLLYWOOD, vec![Reply::Fail(502)])
            .with_category(PUNJABI, vec![Reply::Ok(category_response(&["Jatt"]))]),
    );
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD), ("Punjabi", PUNJABI)]);

    let feed = extension.load_home_feed().await?;
    assert_eq!(
        shelf_titles(&feed.page(None).items),
        vec!["Latest Releases", "Recent Bollywood Albums", "Punjabi"]
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn home_feed_survives_latest_failure_and_paces_categories() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_latest(Reply::Fail(503))
            .with_category(BOLLYWOOD, vec![Reply::Ok(category_response(&["Aashiqui"]))])
            .with_category(PUNJABI, vec![Reply::Ok(category_response(&["Jatt"]))]),
    );
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD), ("Punjabi", PUNJABI)]);

    let feed = extension.load_home_feed().await?;
    assert_eq!(shelf_titles(&feed.page(None).items), vec!["Bollywood", "Punjabi"]);

    let calls = catalog.calls_to("category:");
    assert_eq!(calls.len(), 2);
    assert!(calls[0].1.ends_with(BOLLYWOOD));
    assert!(calls[1].0 - calls[0].0 >= Duration::from_millis(250));

    Ok(())
}

#[tokio::test]
async fn library_feed_lists_configured_categories() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new());
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD), ("Punjabi", PUNJABI)]);

    let feed = extension.load_library_feed().await?;
    let shelves = &feed.page(None).items;
    assert_eq!(shelf_titles(shelves), vec!["Bollywood", "Punjabi"]);

    match &shelves[0] {
        Shelf::Category { id, extras, .. } => {
            assert!(id.starts_with("category_"));
            assert_eq!(extras["url"], BOLLYWOOD);
        }
        other => panic!("unexpected shelf {:?}", other),
    }
    assert_eq!(catalog.count(""), 0);

    Ok(())
}

// ============================================================================
// Song details
// ============================================================================

#[tokio::test(start_paused = true)]
async fn song_details_retry_once_then_succeed() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new().with_song(
        SONG_URL,
        vec![Reply::Fail(503), Reply::Ok(song_response(SONG_URL, "Tum Hi Ho"))],
    ));
    let extension = extension(&catalog, &[]);

    let track = extension.load_track(&placeholder_track(SONG_URL), false).await?;
    assert_eq!(track.title, "Tum Hi Ho");
    assert_eq!(track.id, "latest_song_x");
    assert_eq!(track.streamables.len(), 2);
    assert!(track.is_playable);
    assert_eq!(catalog.count("song:"), 2);

    // Cached: no further upstream call
    extension.load_track(&placeholder_track(SONG_URL), false).await?;
    extension.load_track_feed(&placeholder_track(SONG_URL)).await?;
    assert_eq!(catalog.count("song:"), 2);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn song_details_give_up_after_two_attempts() {
    let catalog = Arc::new(ScriptedCatalog::new().with_song(SONG_URL, vec![Reply::Fail(503)]));
    let extension = extension(&catalog, &[]);

    let err = extension
        .load_track(&placeholder_track(SONG_URL), false)
        .await
        .unwrap_err();
    assert!(matches!(
        groove_error(&err),
        Some(GrooveError::UpstreamHttp { status: 503, .. })
    ));
    assert_eq!(catalog.count("song:"), 2);
}

#[tokio::test]
async fn load_track_without_url_is_invalid() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let extension = extension(&catalog, &[]);

    let err = extension
        .load_track(&Track::new("tum-hi-ho", "Tum Hi Ho"), false)
        .await
        .unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::InvalidArgument(_))));
    assert_eq!(catalog.count(""), 0);
}

#[tokio::test(start_paused = true)]
async fn track_feed_lists_related_songs() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_song(SONG_URL, vec![Reply::Ok(song_response(SONG_URL, "Tum Hi Ho"))]),
    );
    let extension = extension(&catalog, &[]);

    let feed = extension.load_track_feed(&placeholder_track(SONG_URL)).await?;
    match &feed.page(None).items[..] {
        [Shelf::Tracks { title, list, .. }] => {
            assert_eq!(title, "Related Songs");
            assert_eq!(list[0].title, "Sun Raha Hai");
            assert_eq!(list[0].artists[0].name, "Ankit Tiwari");
        }
        other => panic!("unexpected shelves {:?}", other),
    }

    // Unknown song: empty feed rather than an error
    let feed = extension
        .load_track_feed(&placeholder_track("https://pagalnew.com/songs/missing.html"))
        .await?;
    assert!(feed.is_empty());

    Ok(())
}

#[tokio::test]
async fn cover_background_follows_host_setting() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_song(SONG_URL, vec![Reply::Ok(song_response(SONG_URL, "Tum Hi Ho"))]),
    );
    let extension = extension(&catalog, &[]);

    let settings = Arc::new(MemorySettings::new());
    settings.set_bool(SHOW_COVER_ART_BACKGROUND, false);
    extension.set_settings(settings);

    let items = extension.setting_items().await;
    assert_eq!(items[0].key(), SHOW_COVER_ART_BACKGROUND);

    let track = extension.load_track(&placeholder_track(SONG_URL), false).await?;
    assert!(track.cover.is_some());
    assert_eq!(track.background, None);

    Ok(())
}

#[tokio::test]
async fn cached_song_follows_later_setting_changes() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_song(SONG_URL, vec![Reply::Ok(song_response(SONG_URL, "Tum Hi Ho"))]),
    );
    let extension = extension(&catalog, &[]);
    let settings = Arc::new(MemorySettings::new());
    settings.set_bool(SHOW_COVER_ART_BACKGROUND, true);
    extension.set_settings(settings.clone());

    let track = extension.load_track(&placeholder_track(SONG_URL), false).await?;
    assert!(track.background.is_some());

    settings.set_bool(SHOW_COVER_ART_BACKGROUND, false);
    let track = extension.load_track(&placeholder_track(SONG_URL), false).await?;
    assert!(track.cover.is_some());
    assert_eq!(track.background, None);

    settings.set_bool(SHOW_COVER_ART_BACKGROUND, true);
    let track = extension.load_track(&placeholder_track(SONG_URL), false).await?;
    assert_eq!(track.background, track.cover);
    assert_eq!(catalog.count("song:"), 1);

    Ok(())
}

// ============================================================================
// Streamables
// ============================================================================

#[tokio::test]
async fn streamable_resolves_to_progressive_source() -> anyhow::Result<()> {
    let extension = extension(&Arc::new(ScriptedCatalog::new()), &[]);

    let primary = Streamable::server(
        "server_320_x",
        320,
        None,
        Extras::from([("directUrl".to_string(), "https://cdn.example/320.mp3".to_string())]),
    );
    let media = extension.load_streamable_media(&primary, false).await?;
    let source = &media.sources()[0];
    assert_eq!(source.url, "https://cdn.example/320.mp3");
    assert_eq!(source.quality, 320);
    assert!(!source.seekable);

    let secondary = Streamable::server(
        "server_0_x",
        0,
        None,
        Extras::from([("source".to_string(), "https://cdn.example/any.mp3".to_string())]),
    );
    let media = extension.load_streamable_media(&secondary, false).await?;
    assert_eq!(media.sources()[0].url, "https://cdn.example/any.mp3");
    assert_eq!(media.sources()[0].quality, 128);

    Ok(())
}

#[tokio::test]
async fn streamable_without_url_or_of_other_type_fails() {
    let extension = extension(&Arc::new(ScriptedCatalog::new()), &[]);

    let bare = Streamable::server("s", 128, None, Extras::new());
    let err = extension.load_streamable_media(&bare, false).await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::NotFound(_))));

    let mut background = bare.clone();
    background.media_type = MediaType::Background;
    let err = extension
        .load_streamable_media(&background, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotSupported(_)));
}

// ============================================================================
// Albums
// ============================================================================

#[tokio::test]
async fn album_pagination_stops_on_cycles() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_album_page(ALBUM_URL, album_response(ALBUM_URL, 0, &[(2, ALBUM_PAGE_2)]))
            .with_album_page(ALBUM_PAGE_2, album_response(ALBUM_PAGE_2, 0, &[(3, ALBUM_URL)])),
    );
    let extension = extension(&catalog, &[]);

    let page = extension.load_tracks(&placeholder_album(ALBUM_URL), None).await?;
    assert!(page.items.is_empty());
    assert_eq!(page.continuation, None);
    assert!(!page.has_more());
    assert_eq!(catalog.count("album:"), 2);

    Ok(())
}

#[tokio::test]
async fn album_page_echoing_album_url_does_not_continue_to_itself() -> anyhow::Result<()> {
    let page_3 = "https://pagalnew.com/album/aashiqui-2/3.html";
    let listing = [(1, ALBUM_URL), (2, ALBUM_PAGE_2), (3, page_3)];
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_album_page(ALBUM_PAGE_2, album_response(ALBUM_URL, 2, &listing))
            .with_album_page(page_3, album_response(ALBUM_URL, 1, &listing[..2])),
    );
    let extension = extension(&catalog, &[]);
    let album = placeholder_album(ALBUM_URL);

    let second = extension.load_tracks(&album, Some(ALBUM_PAGE_2)).await?;
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.continuation.as_deref(), Some(page_3));

    let third = extension.load_tracks(&album, Some(page_3)).await?;
    assert_eq!(third.items.len(), 1);
    assert_eq!(third.continuation, None);
    assert_eq!(catalog.count("album:"), 2);

    Ok(())
}

#[tokio::test]
async fn album_tracks_keep_album_handle() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new().with_album_page(ALBUM_URL, album_response(ALBUM_URL, 1, &[])),
    );
    let extension = extension(&catalog, &[]);

    let page = extension.load_tracks(&placeholder_album(ALBUM_URL), None).await?;
    let album = page.items[0].album.as_ref().expect("nested album");
    assert_eq!(album.extras["url"], ALBUM_URL);
    assert_eq!(album.extras["slug"], "aashiqui-2");

    let reloaded = extension.load_album(album).await?;
    assert_eq!(reloaded.track_count, Some(1));
    assert_eq!(catalog.count("album:"), 2);

    Ok(())
}

#[tokio::test]
async fn album_pagination_skips_sentinel_page() -> anyhow::Result<()> {
    let junk = "https://pagalnew.com/album/aashiqui-2/2025.html";
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_album_page(
                ALBUM_URL,
                album_response(ALBUM_URL, 0, &[(1, ALBUM_URL), (2025, junk), (2, ALBUM_PAGE_2)]),
            )
            .with_album_page(ALBUM_PAGE_2, album_response(ALBUM_PAGE_2, 3, &[])),
    );
    let extension = extension(&catalog, &[]);

    let page = extension.load_tracks(&placeholder_album(ALBUM_URL), None).await?;
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].title, "Song 0");
    assert!(!page.has_more());
    assert_eq!(catalog.count(&format!("album:{}", junk)), 0);

    Ok(())
}

#[tokio::test]
async fn album_tracks_continue_from_next_page() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_album_page(ALBUM_URL, album_response(ALBUM_URL, 2, &[(2, ALBUM_PAGE_2)]))
            .with_album_page(ALBUM_PAGE_2, album_response(ALBUM_PAGE_2, 1, &[(1, ALBUM_URL)])),
    );
    let extension = extension(&catalog, &[]);
    let album = placeholder_album(ALBUM_URL);

    let first = extension.load_tracks(&album, None).await?;
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.continuation.as_deref(), Some(ALBUM_PAGE_2));

    let second = extension
        .load_tracks(&album, first.continuation.as_deref())
        .await?;
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.continuation, None);

    Ok(())
}

#[tokio::test]
async fn unreachable_album_yields_empty_page_but_load_album_fails() {
    let catalog = Arc::new(ScriptedCatalog::new());
    let extension = extension(&catalog, &[]);
    let album = placeholder_album(ALBUM_URL);

    let page = extension.load_tracks(&album, None).await.unwrap();
    assert!(page.items.is_empty());

    let err = extension.load_album(&album).await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::NotFound(_))));
}

#[tokio::test]
async fn load_album_merges_page_details() -> anyhow::Result<()> {
    let catalog = Arc::new(
        ScriptedCatalog::new().with_album_page(ALBUM_URL, album_response(ALBUM_URL, 4, &[])),
    );
    let extension = extension(&catalog, &[]);

    let album = extension.load_album(&placeholder_album(ALBUM_URL)).await?;
    assert_eq!(album.id, "category_album_x");
    assert_eq!(album.title, "Aashiqui 2 (2013)");
    assert_eq!(album.artists[0].name, "Mithoon");
    assert_eq!(album.track_count, Some(4));
    assert_eq!(album.extras["url"], ALBUM_URL);
    assert_eq!(album.extras["source"], "album");
    assert!(extension.load_album_feed(&album).await?.is_none());

    Ok(())
}

// ============================================================================
// Search
// ============================================================================

fn search_result(songs: usize, albums: usize) -> SearchResult {
    SearchResult {
        songs: (0..songs)
            .map(|i| SearchSong {
                slug: format!("song-{}", i),
                title: format!("Song {}", i),
                artist: Some("Arijit Singh".to_string()),
                album: None,
                url: format!("https://pagalnew.com/songs/song-{}.html", i),
                image: None,
                category: None,
            })
            .collect(),
        albums: (0..albums)
            .map(|i| SearchAlbum {
                slug: format!("album-{}", i),
                title: format!("Album {}", i),
                url: format!("https://pagalnew.com/album/album-{}.html", i),
                category: Some("Bollywood".to_string()),
                image: None,
            })
            .collect(),
    }
}

#[tokio::test]
async fn quick_search_takes_five_songs_then_five_albums() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new().with_search(search_result(7, 6)));
    let extension = extension(&catalog, &[]);

    let items = extension.quick_search("arijit").await?;
    assert_eq!(items.len(), 10);
    assert!(matches!(
        &items[0],
        QuickSearchItem::Media { item: MediaItem::Track(_), searched: false }
    ));
    assert!(matches!(
        &items[5],
        QuickSearchItem::Media { item: MediaItem::Album(_), .. }
    ));

    assert!(extension.quick_search("  ").await?.is_empty());
    assert_eq!(catalog.count("search:"), 1);

    Ok(())
}

#[tokio::test]
async fn search_feed_has_tabs() -> anyhow::Result<()> {
    let catalog = Arc::new(ScriptedCatalog::new().with_search(search_result(2, 1)));
    let extension = extension(&catalog, &[]);

    let feed = extension.load_search_feed("arijit").await?;
    let tab_ids: Vec<&str> = feed.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(tab_ids, vec!["all", "songs", "albums"]);
    assert_eq!(shelf_titles(&feed.page(Some("all")).items), vec!["Songs", "Albums"]);
    assert_eq!(shelf_titles(&feed.page(Some("songs")).items), vec!["Songs"]);
    assert_eq!(shelf_titles(&feed.page(Some("albums")).items), vec!["Albums"]);

    assert!(extension.load_search_feed("").await?.is_empty());

    Ok(())
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn cancellation_is_reported_not_degraded() {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_search(search_result(1, 1))
            .with_category(BOLLYWOOD, vec![Reply::Ok(category_response(&["Aashiqui"]))]),
    );
    let extension = extension(&catalog, &[("Bollywood", BOLLYWOOD)]);
    extension.cancel();

    let err = extension.quick_search("arijit").await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::Cancelled)));

    let err = extension.load_home_feed().await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::Cancelled)));

    extension.reset_cancellation();
    assert_eq!(extension.quick_search("arijit").await.unwrap().len(), 2);
}

#[tokio::test]
async fn cancelled_album_paging_is_an_error_not_an_empty_page() {
    let catalog = Arc::new(
        ScriptedCatalog::new()
            .with_album_page(ALBUM_URL, album_response(ALBUM_URL, 0, &[(2, ALBUM_PAGE_2)]))
            .with_album_page(ALBUM_PAGE_2, album_response(ALBUM_PAGE_2, 3, &[])),
    );
    let extension = extension(&catalog, &[]);
    let album = placeholder_album(ALBUM_URL);
    extension.cancel();

    let err = extension.load_tracks(&album, None).await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::Cancelled)));

    let err = extension
        .load_tracks(&album, Some(ALBUM_PAGE_2))
        .await
        .unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::Cancelled)));

    let err = extension.load_album(&album).await.unwrap_err();
    assert!(matches!(groove_error(&err), Some(GrooveError::Cancelled)));
    assert_eq!(catalog.count("album:"), 0);

    extension.reset_cancellation();
    let page = extension.load_tracks(&album, None).await.unwrap();
    assert_eq!(page.items.len(), 3);
}
