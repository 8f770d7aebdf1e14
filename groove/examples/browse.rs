//! Browses the Groove catalogue the way a host player would
//!
//! Runs a quick search, prints the home feed, then resolves the first song
//! found down to a playable URL.
//!
//! Usage:
//! ```bash
//! cargo run --example browse -- "arijit singh"
//! RUST_LOG=groove=debug cargo run --example browse
//! ```

use grooveconfig::Config;
use groove::GrooveExtension;
use groovesource::{HomeFeedClient, MediaItem, QuickSearchClient, QuickSearchItem, TrackClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_defaults()?;

    let level = config.get_log_min_level()?.to_lowercase();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "arijit".to_string());
    let extension = GrooveExtension::from_config(&config)?;

    println!("=== Quick search: {} ===\n", query);
    let items = extension.quick_search(&query).await?;
    let mut first_track = None;
    for QuickSearchItem::Media { item, .. } in &items {
        match item {
            MediaItem::Track(track) => {
                let artists: Vec<&str> = track.artists.iter().map(|a| a.name.as_str()).collect();
                println!("  ♪ {} ({})", track.title, artists.join(", "));
                first_track.get_or_insert_with(|| track.clone());
            }
            MediaItem::Album(album) => println!("  ◉ {}", album.title),
        }
    }

    println!("\n=== Home feed ===\n");
    let home = extension.load_home_feed().await?;
    for shelf in &home.page(None).items {
        println!("  {} [{}] {} items", shelf.title(), shelf.id(), shelf.len());
    }

    let Some(track) = first_track else {
        println!("\nNo song to play");
        return Ok(());
    };

    println!("\n=== Resolving {} ===\n", track.title);
    let track = extension.load_track(&track, false).await?;
    for streamable in &track.streamables {
        let media = extension.load_streamable_media(streamable, false).await?;
        for source in media.sources() {
            println!("  {} -> {}", source.title.as_deref().unwrap_or("?"), source.url);
        }
    }

    Ok(())
}
