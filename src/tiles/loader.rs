use super::TileSource;
use crate::core::geo::TileCoord;
use crate::data::source::HTTP_CLIENT;
use crate::Result;
use std::sync::mpsc::Sender;
use std::thread;

/// Downloads tiles on detached background threads and sends the resulting
/// bytes back over an `mpsc` channel.
pub struct TileLoader {
    tx: Sender<(TileCoord, Vec<u8>)>,
}

impl TileLoader {
    /// Create a new tile loader given a sender to report completed downloads.
    pub fn new(tx: Sender<(TileCoord, Vec<u8>)>) -> Self {
        Self { tx }
    }

    /// Start downloading the specified tile. The download occurs on a
    /// detached thread so that it does not block the caller. On success the
    /// sender receives the tile bytes; a tile that fails both attempts is
    /// given up on for the session.
    pub fn start_download(&self, source: &dyn TileSource, coord: TileCoord) {
        let url = source.url(coord);
        let tx = self.tx.clone();

        thread::spawn(move || {
            const MAX_ATTEMPTS: usize = 2;
            for attempt in 1..=MAX_ATTEMPTS {
                log::debug!("fetch tile {:?} attempt {}", coord, attempt);
                let result: Result<Vec<u8>> = (|| {
                    let resp = HTTP_CLIENT.get(&url).send()?;
                    if !resp.status().is_success() {
                        return Err(format!("HTTP {}", resp.status()).into());
                    }
                    Ok(resp.bytes()?.to_vec())
                })();

                match result {
                    Ok(data) => {
                        let _ = tx.send((coord, data));
                        return;
                    }
                    Err(e) => {
                        log::warn!("tile {:?} download failed on attempt {}: {}", coord, attempt, e);
                        if attempt < MAX_ATTEMPTS {
                            thread::sleep(std::time::Duration::from_millis(100));
                        }
                    }
                }
            }
        });
    }
}
