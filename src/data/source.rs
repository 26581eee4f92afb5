use crate::data::geojson::GeoJson;
use crate::Result;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Shared blocking HTTP client with a custom User-Agent so that public
/// servers (e.g. OpenStreetMap) don't reject the request. Building the
/// client once avoids the cost of TLS and connection pool setup for every
/// download.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("beredskapskart/0.1 (+https://github.com/example/beredskapskart)")
        .build()
        .expect("failed to build reqwest blocking client")
});

/// A fixed-URL GeoJSON data source, fetched at most once per session.
///
/// The download runs on a detached thread; the parsed document is handed
/// back over a channel and picked up with [`FeatureSource::try_take`] on
/// the UI thread. A failed fetch is logged and yields nothing, leaving the
/// consuming layer empty.
pub struct FeatureSource {
    url: String,
    tx: Option<Sender<GeoJson>>,
    rx: Receiver<GeoJson>,
}

impl FeatureSource {
    /// Creates a source for the given URL. No network activity happens
    /// until [`FeatureSource::start`] is called.
    pub fn new(url: impl Into<String>) -> Self {
        let (tx, rx) = channel();
        Self {
            url: url.into(),
            tx: Some(tx),
            rx,
        }
    }

    /// Creates a source whose document is already in memory. Used by tests
    /// and offline demos in place of a network fetch.
    pub fn preloaded(url: impl Into<String>, data: GeoJson) -> Self {
        let (tx, rx) = channel();
        let _ = tx.send(data);
        Self {
            url: url.into(),
            tx: None,
            rx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether the fetch has been started (or the data was preloaded)
    pub fn started(&self) -> bool {
        self.tx.is_none()
    }

    /// Starts the background download. Calling this more than once is a
    /// no-op; the dataset is fetched once and cached for the session.
    pub fn start(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        let url = self.url.clone();
        thread::spawn(move || {
            log::debug!("fetching dataset {}", url);
            match fetch_document(&url) {
                Ok(data) => {
                    let _ = tx.send(data);
                }
                Err(e) => {
                    log::warn!("dataset fetch failed for {}: {}", url, e);
                }
            }
        });
    }

    /// Takes the fetched document if it has arrived
    pub fn try_take(&mut self) -> Option<GeoJson> {
        self.rx.try_recv().ok()
    }
}

fn fetch_document(url: &str) -> Result<GeoJson> {
    let resp = HTTP_CLIENT.get(url).send()?;
    if !resp.status().is_success() {
        return Err(format!("HTTP {}", resp.status()).into());
    }
    let body = resp.text()?;
    GeoJson::from_str(&body)
}
