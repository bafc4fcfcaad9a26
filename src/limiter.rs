use anyhow::anyhow;
use log::{debug, warn};
use std::{
    collections::{hash_map, HashMap},
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::error::ApiError;

#[derive(Clone, Copy, Debug)]
struct Attempts {
    count: u32,
    window_start: Instant,
}

/// Fixed-size attempt windows per client address.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    window: Duration,
    max_attempts: u32,
    entries: Arc<Mutex<HashMap<IpAddr, Attempts>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_attempts: u32) -> RateLimiter {
        RateLimiter {
            window,
            max_attempts,
            entries: Default::default(),
        }
    }

    pub fn check(&self, client: IpAddr) -> Result<(), ApiError> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), ApiError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_err| anyhow!("couldn't lock rate limiter"))?;

        let entry = match entries.entry(client) {
            hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Attempts {
                    count: 1,
                    window_start: now,
                });
                return Ok(());
            }
            hash_map::Entry::Occupied(occupied) => occupied.into_mut(),
        };

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed > self.window {
            entry.count = 1;
            entry.window_start = now;
            return Ok(());
        }

        if entry.count >= self.max_attempts {
            let remaining = (self.window - elapsed).as_millis() as u64;
            let minutes = (remaining + 59_999) / 60_000;

            warn!("Rate limited {} for another {} minutes", client, minutes);
            return Err(ApiError::RateLimited { minutes });
        }

        entry.count += 1;
        Ok(())
    }

    /// Forgets clients whose window has run out, returning how many were
    /// dropped.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(_err) => return 0,
        };

        let before = entries.len();
        let window = self.window;
        entries.retain(|_client, entry| now.saturating_duration_since(entry.window_start) <= window);

        before - entries.len()
    }

    pub async fn sweep_every(self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let swept = self.sweep_at(Instant::now());
            if swept > 0 {
                debug!("Swept {} idle rate limit entries", swept);
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// The address a client is limited by. Connections without a known peer
/// share one bucket.
pub fn client_key(remote: Option<SocketAddr>) -> IpAddr {
    remote
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
