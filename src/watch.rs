use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::time::{interval, MissedTickBehavior};

use crate::constants::{BIND_ADDR, ROTATE_INTERVAL_MS, TICKER_CAP};
use crate::logging;
use crate::model::NewsRecord;
use crate::sse::SseDecoder;
use crate::ticker::TickerBuffer;

#[derive(Debug, Args, Clone)]
pub struct WatchArgs {
    /// Base URL of the news server
    #[arg(short, long, default_value_t = format!("http://{BIND_ADDR}"))]
    pub server: String,

    /// Stop after receiving this many pushed items
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Seconds between rotation ticks
    #[arg(short, long, default_value_t = ROTATE_INTERVAL_MS / 1000)]
    pub rotate_secs: u64,
}

#[derive(Deserialize)]
struct NewsListResponse {
    success: bool,
    #[serde(default)]
    data: Vec<NewsRecord>,
}

/// Terminal ticker client: seed the buffer from the list endpoint, follow
/// the live feed, and rotate the displayed headline on a fixed cadence.
///
/// There is deliberately no reconnect loop; a failed stream ends the command
/// and the caller decides whether to run it again.
pub async fn run(args: WatchArgs) -> Result<()> {
    let client = reqwest::Client::new();
    let mut buffer = TickerBuffer::new(TICKER_CAP);

    let listing: NewsListResponse = client
        .get(format!("{}/api/news", args.server))
        .query(&[("limit", TICKER_CAP.to_string())])
        .send()
        .await
        .context("failed to fetch the initial news batch")?
        .json()
        .await
        .context("failed to decode the news listing")?;
    if !listing.success {
        bail!("news listing request was rejected by the server");
    }
    buffer.seed(listing.data);

    let response = client
        .get(format!("{}/api/news/stream", args.server))
        .send()
        .await
        .context("failed to open the live feed stream")?;
    let mut body = response.bytes_stream().boxed();
    let mut decoder = SseDecoder::new();

    let rotate_period = Duration::from_secs(args.rotate_secs.max(1));
    let mut rotation = interval(rotate_period);
    rotation.set_missed_tick_behavior(MissedTickBehavior::Skip);
    rotation.reset();

    println!(
        "Connected to {}; rotating every {}s, cap {TICKER_CAP}",
        args.server,
        rotate_period.as_secs()
    );
    print_current(&buffer);

    let mut received = 0usize;
    loop {
        tokio::select! {
            _ = rotation.tick() => {
                if buffer.rotate().is_some() {
                    print_current(&buffer);
                }
            }
            chunk = body.next() => {
                match chunk {
                    Some(Ok(bytes)) => {
                        received += ingest_payloads(&mut buffer, decoder.feed(&bytes));
                        if let Some(limit) = args.limit {
                            if received >= limit {
                                break;
                            }
                        }
                    }
                    Some(Err(err)) => {
                        logging::warn(
                            "watch.stream_error",
                            "Live feed stream failed",
                            json!({ "error": err.to_string() }),
                        );
                        break;
                    }
                    None => {
                        logging::info_simple(
                            "watch.stream_closed",
                            "Live feed stream closed by the server",
                        );
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Land decoded feed payloads in the buffer, newest first. A frame that does
/// not parse as a record is logged and dropped; the rest of the batch and
/// the rotation state are untouched by it. Returns how many records landed.
fn ingest_payloads<I>(buffer: &mut TickerBuffer, payloads: I) -> usize
where
    I: IntoIterator<Item = String>,
{
    let mut accepted = 0usize;
    for payload in payloads {
        match serde_json::from_str::<NewsRecord>(&payload) {
            Ok(record) => {
                println!("+ breaking: [{}] {}", record.category, record.title);
                buffer.prepend(record);
                accepted += 1;
            }
            Err(err) => {
                logging::warn(
                    "watch.malformed_frame",
                    "Dropping malformed pushed record",
                    json!({ "error": err.to_string() }),
                );
            }
        }
    }
    accepted
}

fn print_current(buffer: &TickerBuffer) {
    let Some(item) = buffer.current() else {
        return;
    };
    let (position, total) = buffer.position();
    println!(
        "[{position}/{total}] {:>12} | {:>11} | {}",
        item.category.to_uppercase(),
        time_ago(item.created_at),
        item.title
    );
}

/// Human "x min ago" labels for headline timestamps.
pub fn time_ago(created_at: DateTime<Utc>) -> String {
    time_ago_at(created_at, Utc::now())
}

fn time_ago_at(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hr ago");
    }
    let days = hours / 24;
    format!("{days} day{} ago", if days > 1 { "s" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, title: &str) -> NewsRecord {
        NewsRecord {
            key: format!("{id:024x}"),
            id,
            title: title.into(),
            category: "Technology".into(),
            details: "details".into(),
            created_at: Utc.timestamp_millis_opt(1_716_400_000_000 + id).unwrap(),
        }
    }

    #[test]
    fn malformed_payload_is_dropped_without_disturbing_the_buffer() {
        let mut buffer = TickerBuffer::new(8);
        let payloads = vec![
            serde_json::to_string(&record(1, "first")).unwrap(),
            "{ not json at all".to_string(),
            serde_json::to_string(&record(2, "second")).unwrap(),
        ];

        let accepted = ingest_payloads(&mut buffer, payloads);

        assert_eq!(accepted, 2);
        assert_eq!(buffer.len(), 2);
        let titles: Vec<_> = buffer.items().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
        // Rotation still works after the bad frame.
        assert!(buffer.rotate().is_some());
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc.timestamp_opt(1_716_400_000, 0).unwrap();
        let at = |secs_back: i64| now - chrono::Duration::seconds(secs_back);

        assert_eq!(time_ago_at(at(30), now), "Just now");
        assert_eq!(time_ago_at(at(5 * 60), now), "5 min ago");
        assert_eq!(time_ago_at(at(3 * 3600), now), "3 hr ago");
        assert_eq!(time_ago_at(at(25 * 3600), now), "1 day ago");
        assert_eq!(time_ago_at(at(49 * 3600), now), "2 days ago");
    }
}
