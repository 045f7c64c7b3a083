//! Output formatting for extraction results

use colored::Colorize;
use serde::Serialize;

use crate::error::ExtractError;
use crate::model::channel::ChannelInfo;
use crate::model::comment::CommentInfo;
use crate::model::item::{PlaylistInfoItem, StreamInfoItem};
use crate::model::playlist::PlaylistInfo;
use crate::model::search::{SearchItem, SearchResult};
use crate::model::stream::StreamInfo;

/// Formatter for the CLI, either human-readable text or JSON
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<(), ExtractError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn print_stream_info(
        &self,
        info: &StreamInfo,
        with_streams: bool,
    ) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(info);
        }

        println!("{}", info.title.bold());
        println!("  {}", info.url.dimmed());
        if let Some(uploader) = &info.uploader_name {
            let verified = if info.uploader_verified { " ✓" } else { "" };
            println!("  by {}{}", uploader.cyan(), verified.green());
        }
        if info.is_live() {
            println!("  {}", "LIVE".red().bold());
        } else {
            println!("  duration: {}", format_duration(info.duration));
        }
        if let Some(views) = info.view_count {
            println!("  views: {}", format_count(views));
        }
        if let Some(likes) = info.like_count {
            println!("  likes: {}", format_count(likes));
        }
        if let Some(date) = &info.upload_date_text {
            println!("  published: {date}");
        }
        if let Some(category) = &info.category {
            println!("  category: {category}");
        }

        if with_streams {
            println!("\n{}", "Video streams".bold());
            for stream in &info.video_streams {
                let audio = if stream.is_video_only { "video only" } else { "with audio" };
                println!(
                    "  itag {:>3}  {:>8}  {}  {}",
                    stream.itag,
                    stream.resolution,
                    audio,
                    stream.url.dimmed()
                );
            }
            println!("\n{}", "Audio streams".bold());
            for stream in &info.audio_streams {
                println!(
                    "  itag {:>3}  {:>4} kbit/s  {}",
                    stream.itag,
                    stream.average_bitrate,
                    stream.url.dimmed()
                );
            }
            if let Some(hls) = &info.hls_url {
                println!("\n  HLS: {}", hls.dimmed());
            }
        } else {
            println!(
                "  streams: {} video, {} audio",
                info.video_streams.len(),
                info.audio_streams.len()
            );
        }
        Ok(())
    }

    pub fn print_stream_items(&self, items: &[StreamInfoItem]) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(&items);
        }
        for item in items {
            let duration = item
                .duration
                .map(format_duration)
                .unwrap_or_else(|| "live".to_string());
            println!(
                "{:>8}  {}  {}",
                duration,
                item.title.bold(),
                item.uploader_name.as_deref().unwrap_or("").cyan()
            );
            println!("          {}", item.url.dimmed());
        }
        Ok(())
    }

    pub fn print_search_result(&self, result: &SearchResult) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(result);
        }

        if let Some(corrected) = &result.corrected_query {
            if result.is_corrected {
                println!("{} {}", "Showing results for".yellow(), corrected.bold());
            } else {
                println!("{} {}", "Did you mean".yellow(), corrected.bold());
            }
        }
        self.print_search_items(&result.items)
    }

    pub fn print_search_items(&self, items: &[SearchItem]) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(&items);
        }
        for item in items {
            match item {
                SearchItem::Stream(s) => {
                    println!("{}  {}", "video   ".green(), s.title.bold());
                    println!("          {}", s.url.dimmed());
                }
                SearchItem::Channel(c) => {
                    let subscribers = c
                        .subscriber_count
                        .map(|n| format!(" ({} subscribers)", format_count(n)))
                        .unwrap_or_default();
                    println!("{}  {}{}", "channel ".blue(), c.name.bold(), subscribers);
                    println!("          {}", c.url.dimmed());
                }
                SearchItem::Playlist(p) => {
                    let count = p
                        .stream_count
                        .map(|n| format!(" ({n} videos)"))
                        .unwrap_or_default();
                    println!("{}  {}{}", "playlist".magenta(), p.name.bold(), count);
                    println!("          {}", p.url.dimmed());
                }
            }
        }
        Ok(())
    }

    pub fn print_channel_info(&self, info: &ChannelInfo) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(info);
        }
        let verified = if info.verified { " ✓" } else { "" };
        println!("{}{}", info.name.bold(), verified.green());
        if let Some(handle) = &info.handle {
            println!("  {handle}");
        }
        println!("  {}", info.url.dimmed());
        if let Some(subscribers) = info.subscriber_count {
            println!("  subscribers: {}", format_count(subscribers));
        }
        if !info.tabs.is_empty() {
            let tabs: Vec<&str> = info.tabs.iter().map(|t| t.path()).collect();
            println!("  tabs: {}", tabs.join(", "));
        }
        if let Some(description) = &info.description {
            println!("\n{}", truncate(description, 300));
        }
        Ok(())
    }

    pub fn print_playlist_info(&self, info: &PlaylistInfo) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(info);
        }
        println!("{}", info.name.bold());
        println!("  {}", info.url.dimmed());
        if let Some(uploader) = &info.uploader_name {
            println!("  by {}", uploader.cyan());
        }
        if let Some(count) = info.stream_count {
            println!("  videos: {count}");
        }
        if let Some(views) = info.view_count {
            println!("  views: {}", format_count(views));
        }
        Ok(())
    }

    pub fn print_playlist_items(&self, items: &[PlaylistInfoItem]) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(&items);
        }
        for item in items {
            let count = item
                .stream_count
                .map(|n| format!(" ({n} videos)"))
                .unwrap_or_default();
            println!("{}{}", item.name.bold(), count);
            println!("  {}", item.url.dimmed());
        }
        Ok(())
    }

    pub fn print_comments(&self, comments: &[CommentInfo]) -> Result<(), ExtractError> {
        if self.json {
            return self.print_json(&comments);
        }
        for comment in comments {
            let author = comment.author_name.as_deref().unwrap_or("unknown");
            let mut markers = String::new();
            if comment.is_pinned {
                markers.push_str(" [pinned]");
            }
            if comment.is_hearted {
                markers.push_str(" [♥]");
            }
            println!(
                "{}{}  {}",
                author.cyan(),
                markers.yellow(),
                comment.published_text.as_deref().unwrap_or("").dimmed()
            );
            println!("  {}", truncate(&comment.text, 500));
            let likes = comment.like_count.unwrap_or(0);
            let replies = comment.reply_count.unwrap_or(0);
            println!("  {}", format!("{likes} likes, {replies} replies").dimmed());
            println!();
        }
        Ok(())
    }
}

/// Seconds as H:MM:SS or M:SS
fn format_duration(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// Counts with thousands separators
fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "0:45");
        assert_eq!(format_duration(201), "3:21");
        assert_eq!(format_duration(3723), "1:02:03");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(1234), "1,234");
        assert_eq!(format_count(1456123456), "1,456,123,456");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789abc", 10), "0123456789…");
    }
}
