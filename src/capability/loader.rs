//! Script bootstrap: readiness signal for the mapping library.
//!
//! The loader does not inject scripts itself. It builds the script URL,
//! remembers that a load was requested so it is not requested twice, and
//! publishes the loaded [`MapsApi`] through a `tokio::sync::watch` channel so
//! any number of elements can wait for it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tokio::sync::watch;
use url::Url;

use super::api::MapsApi;
use crate::error::LoaderError;

/// Base URL of the library script.
pub const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Build the script URL, with `key=<api_key>` when a non-empty key is given.
pub fn script_url(api_key: Option<&str>) -> Result<Url, LoaderError> {
    let mut url = Url::parse(MAPS_SCRIPT_URL)?;
    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        url.query_pairs_mut().append_pair("key", key);
    }
    Ok(url)
}

type Slot = Option<Rc<dyn MapsApi>>;

/// Shared readiness signal for the mapping library.
pub struct MapsLoader {
    tx: watch::Sender<Slot>,
    requested: RefCell<Option<Url>>,
}

impl MapsLoader {
    /// Create a loader with no library loaded yet.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx,
            requested: RefCell::new(None),
        }
    }

    /// Request the script for `api_key`.
    ///
    /// Returns the URL to load, or `None` if the library is already present or
    /// a load is already in flight.
    pub fn request(&self, api_key: &str) -> Result<Option<Url>, LoaderError> {
        if self.available().is_some() || self.requested.borrow().is_some() {
            return Ok(None);
        }
        let url = script_url(Some(api_key))?;
        tracing::debug!(%url, "requesting maps script");
        *self.requested.borrow_mut() = Some(url.clone());
        Ok(Some(url))
    }

    /// The URL of the load in flight, if any.
    pub fn requested_url(&self) -> Option<Url> {
        self.requested.borrow().clone()
    }

    /// Publish the loaded library. Every waiting subscriber wakes up.
    pub fn resolve(&self, api: Rc<dyn MapsApi>) {
        tracing::debug!("maps library available");
        self.tx.send_replace(Some(api));
    }

    /// The loaded library, if it is present.
    pub fn available(&self) -> Option<Rc<dyn MapsApi>> {
        self.tx.borrow().clone()
    }

    /// Subscribe to readiness changes.
    pub fn subscribe(&self) -> watch::Receiver<Slot> {
        self.tx.subscribe()
    }

    /// Wait until the library is present.
    ///
    /// There is no timeout: if the script never loads this never resolves,
    /// and elements stay unbound.
    pub async fn ready(&self) -> Result<Rc<dyn MapsApi>, LoaderError> {
        let mut rx = self.subscribe();
        let slot = rx.wait_for(Option::is_some).await.map_err(|_| LoaderError::Closed)?;
        slot.clone().ok_or(LoaderError::Closed)
    }
}

impl Default for MapsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapsLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsLoader")
            .field("loaded", &self.tx.borrow().is_some())
            .field("requested", &self.requested.borrow())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMaps;

    #[test]
    fn url_with_key() {
        let url = script_url(Some("abc123")).unwrap();
        assert_eq!(url.as_str(), "https://maps.googleapis.com/maps/api/js?key=abc123");
    }

    #[test]
    fn url_without_key() {
        let url = script_url(None).unwrap();
        assert_eq!(url.as_str(), "https://maps.googleapis.com/maps/api/js");
        assert_eq!(script_url(Some("")).unwrap(), url);
    }

    #[test]
    fn request_is_deduplicated() {
        let loader = MapsLoader::new();
        assert!(loader.request("k").unwrap().is_some());
        assert!(loader.request("k").unwrap().is_none());
        assert!(loader.requested_url().is_some());
    }

    #[test]
    fn request_skipped_when_loaded() {
        let loader = MapsLoader::new();
        loader.resolve(Rc::new(FakeMaps::new()));
        assert!(loader.request("k").unwrap().is_none());
    }

    #[test]
    fn ready_resolves_after_publish() {
        let loader = MapsLoader::new();
        assert!(loader.available().is_none());
        loader.resolve(Rc::new(FakeMaps::new()));
        let api = tokio_test::block_on(loader.ready());
        assert!(api.is_ok());
    }

    #[test]
    fn ready_pending_until_publish() {
        let loader = MapsLoader::new();
        let mut task = tokio_test::task::spawn(loader.ready());
        assert!(task.poll().is_pending());
        loader.resolve(Rc::new(FakeMaps::new()));
        assert!(task.is_woken());
        assert!(matches!(task.poll(), std::task::Poll::Ready(Ok(_))));
    }
}
