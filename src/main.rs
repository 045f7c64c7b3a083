//! Main entry point for the tubetap CLI

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubetap::cli::{Args, Command, OutputFormatter};
use tubetap::extractor::{
    ChannelExtractor, CommentsExtractor, ListExtractor, PlaylistExtractor, SearchExtractor,
    StreamExtractor, TrendingExtractor,
};
use tubetap::model::channel::ChannelTab;
use tubetap::platform::{HttpClientConfig, InnerTube, PlatformClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let args = Args::parse();
    info!("Starting tubetap with args: {:?}", args);

    let formatter = OutputFormatter::new(args.json);
    let tube = build_innertube(&args);

    match &args.command {
        Command::Info { url, streams } => {
            let mut extractor = StreamExtractor::with_innertube(tube);
            let stream_info = extractor.fetch(url).await?;
            formatter.print_stream_info(&stream_info, *streams)?;
        }
        Command::Search { query, filter } => {
            let mut extractor =
                SearchExtractor::with_innertube(tube, query).with_filter((*filter).into());
            let mut result = extractor.fetch().await?;
            let mut next = result.next_page.take();
            for _ in 1..args.pages {
                let Some(page) = next else { break };
                let mut batch = extractor.page(&page).await?;
                result.items.append(&mut batch.items);
                next = batch.next_page;
            }
            result.next_page = next;
            formatter.print_search_result(&result)?;
        }
        Command::Channel { url, tab } => {
            let channel_tab: ChannelTab = (*tab).into();
            let mut extractor =
                ChannelExtractor::with_innertube(tube, url).with_tab(channel_tab);
            let channel_info = extractor.fetch_info().await?;
            formatter.print_channel_info(&channel_info)?;
            println!();

            if channel_tab == ChannelTab::Playlists {
                let mut page = extractor.playlists().await?;
                let mut items = std::mem::take(&mut page.items);
                let mut next = page.next_page;
                for _ in 1..args.pages {
                    let Some(cursor) = next else { break };
                    let mut batch = extractor.playlists_page(&cursor).await?;
                    items.append(&mut batch.items);
                    next = batch.next_page;
                }
                formatter.print_playlist_items(&items)?;
            } else {
                let items = fetch_pages(&mut extractor, args.pages).await?;
                formatter.print_stream_items(&items)?;
            }
        }
        Command::Playlist { url } => {
            let mut extractor = PlaylistExtractor::with_innertube(tube, url);
            let (playlist_info, mut page) = extractor.fetch_info().await?;
            formatter.print_playlist_info(&playlist_info)?;
            println!();

            let mut items = std::mem::take(&mut page.items);
            let mut next = page.next_page;
            for _ in 1..args.pages {
                let Some(cursor) = next else { break };
                let mut batch = extractor.page(&cursor).await?;
                items.append(&mut batch.items);
                next = batch.next_page;
            }
            formatter.print_stream_items(&items)?;
        }
        Command::Comments { url } => {
            let mut extractor = CommentsExtractor::with_innertube(tube, url);
            let comments = fetch_pages(&mut extractor, args.pages).await?;
            formatter.print_comments(&comments)?;
        }
        Command::Trending => {
            let mut extractor = TrendingExtractor::with_innertube(tube);
            let items = fetch_pages(&mut extractor, args.pages).await?;
            formatter.print_stream_items(&items)?;
        }
    }

    Ok(())
}

fn build_innertube(args: &Args) -> InnerTube {
    let config = HttpClientConfig {
        timeout: args.timeout_duration(),
        max_retries: args.retries,
        ..Default::default()
    };
    InnerTube::with_client(PlatformClient::with_config(config))
}

/// Drain up to `pages` pages from a list extractor into one item list
async fn fetch_pages<E>(extractor: &mut E, pages: u32) -> tubetap::Result<Vec<E::Item>>
where
    E: ListExtractor + Send,
    E::Item: Send,
{
    let mut first = extractor.initial_page().await?;
    let mut items = std::mem::take(&mut first.items);
    let mut next = first.next_page;
    for _ in 1..pages {
        let Some(page) = next else { break };
        let mut batch = extractor.page(&page).await?;
        items.append(&mut batch.items);
        next = batch.next_page;
    }
    Ok(items)
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();

    Ok(())
}
