use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single published news item. Immutable once stored; the live feed only
/// ever observes insertions, never updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    /// Store-assigned native identifier, 24 hex characters.
    #[serde(rename = "_id")]
    pub key: String,
    /// Application-assigned integer id, derived from the creation timestamp.
    pub id: i64,
    pub title: String,
    pub category: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Payload accepted by the create endpoint and the `post` subcommand.
///
/// Absent fields deserialize to empty strings so they are rejected by
/// `normalized` like explicitly empty ones, keeping the validation outcome
/// inside the API's response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateNewsRequest {
    pub title: String,
    pub category: String,
    pub details: String,
}

impl CreateNewsRequest {
    /// Trim the text fields, rejecting the request when any ends up empty.
    pub fn normalized(self) -> Option<CreateNewsRequest> {
        let title = self.title.trim().to_string();
        let category = self.category.trim().to_string();
        let details = self.details.trim().to_string();
        if title.is_empty() || category.is_empty() || details.is_empty() {
            return None;
        }
        Some(CreateNewsRequest {
            title,
            category,
            details,
        })
    }
}

/// Identifier accepted by the fetch and delete endpoints.
///
/// Parsed exactly once at the API boundary into one of the two lookup
/// strategies; an input matching neither shape is a not-found outcome for the
/// caller, not a server error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsKey {
    /// The store's native 24-hex-character key.
    Native(String),
    /// The application-assigned integer id.
    AppId(i64),
}

impl NewsKey {
    pub fn parse(raw: &str) -> Option<NewsKey> {
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Some(NewsKey::Native(raw.to_ascii_lowercase()));
        }
        raw.parse::<i64>().ok().map(NewsKey::AppId)
    }

    pub fn matches(&self, record: &NewsRecord) -> bool {
        match self {
            NewsKey::Native(key) => record.key == *key,
            NewsKey::AppId(id) => record.id == *id,
        }
    }
}

/// Query filter for the list endpoint and the "related items" contract.
#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    pub category: Option<String>,
    pub exclude: Option<NewsKey>,
    pub limit: Option<usize>,
}

impl NewsFilter {
    pub fn accepts(&self, record: &NewsRecord) -> bool {
        if let Some(ref category) = self.category {
            if record.category != *category {
                return false;
            }
        }
        if let Some(ref exclude) = self.exclude {
            if exclude.matches(record) {
                return false;
            }
        }
        true
    }
}

/// Timestamp-derived integer id, as assigned by the original feed. The random
/// offset keeps ids apart within a millisecond most of the time; collisions
/// under concurrent writers remain possible and are tolerated.
pub fn generate_app_id<R: Rng>(rng: &mut R) -> i64 {
    Utc::now().timestamp_millis() + rng.gen_range(0..1_000)
}

/// Store-native key: creation seconds plus random tail, 24 hex characters.
pub fn generate_native_key<R: Rng>(rng: &mut R) -> String {
    let secs = Utc::now().timestamp() as u32;
    format!("{secs:08x}{:016x}", rng.gen::<u64>())
}
