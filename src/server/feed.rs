use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::stream::{self, Stream};
use serde_json::json;
use tokio::sync::watch;

use crate::logging;
use crate::store::InsertSubscription;

use super::{AppState, ShutdownSignal};

/// Live feed endpoint: one long-lived SSE connection per client, each backed
/// by its own insert subscription.
///
/// The subscription travels inside the response stream, so a client
/// disconnect drops it the moment the connection task is torn down; no
/// subscription outlives its connection. Healthy idle connections are never
/// pinged.
pub(super) async fn stream_inserts(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.store.watch_inserts();
    logging::info(
        "feed.client.connected",
        "Live feed client connected",
        json!({ "active": state.store.active_watchers() }),
    );
    Sse::new(insert_events(subscription, state.shutdown.clone()))
}

/// Logs the end of a feed connection whichever way it ends: client
/// disconnect, upstream loss, or server shutdown.
struct ConnectionGuard;

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        logging::info_simple("feed.client.closed", "Live feed client connection closed");
    }
}

/// Forward insert notifications as SSE events until the subscription ends or
/// the server shuts down. Each event carries one full record as a JSON frame,
/// in insertion order. Ending the stream closes the client's channel, which
/// is the error signal the client acts on.
fn insert_events(
    subscription: InsertSubscription,
    shutdown: watch::Receiver<ShutdownSignal>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let guard = ConnectionGuard;
    stream::unfold(
        (subscription, shutdown, guard),
        |(mut subscription, mut shutdown, guard)| async move {
            loop {
                tokio::select! {
                    next = subscription.next() => {
                        let record = next?;
                        match serde_json::to_string(&record) {
                            Ok(payload) => {
                                return Some((
                                    Ok(Event::default().data(payload)),
                                    (subscription, shutdown, guard),
                                ));
                            }
                            Err(err) => {
                                logging::warn(
                                    "feed.serialize_error",
                                    "Failed to serialise pushed record, closing stream",
                                    json!({ "error": err.to_string() }),
                                );
                                return None;
                            }
                        }
                    }
                    changed = shutdown.changed() => {
                        // A dropped sender means the server itself is going away.
                        if changed.is_err() || !matches!(*shutdown.borrow(), ShutdownSignal::None) {
                            return None;
                        }
                    }
                }
            }
        },
    )
}
