pub const BIND_ADDR: &str = "127.0.0.1:9040";
pub const DATA_PATH: &str = "news_items.jsonl";
pub const TICKER_CAP: usize = 8;
pub const ROTATE_INTERVAL_MS: u64 = 4_000;
pub const FEED_CHANNEL_CAPACITY: usize = 64;
