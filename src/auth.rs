//! Admin auth gate: password login issuing opaque bearer tokens.
//!
//! Tokens live in a server-side table with an optional expiry. Logout revokes
//! the token server-side. The table holds at most `max_sessions` entries; when full,
//! the oldest session is evicted on the next login.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::error::{ServiceError, ServiceResult};

const TOKEN_LEN: usize = 48;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Clone, Copy, Debug)]
struct Session {
  issued_at: Instant,
  expires_at: Option<Instant>,
}

impl Session {
  fn is_live(&self, now: Instant) -> bool {
    self.expires_at.map_or(true, |t| now < t)
  }
}

pub struct AuthGate {
  secret_digest: [u8; 32],
  ttl: Option<Duration>,
  max_sessions: usize,
  sessions: RwLock<HashMap<String, Session>>,
}

impl std::fmt::Debug for AuthGate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AuthGate").field("ttl", &self.ttl).finish_non_exhaustive()
  }
}

fn digest(input: &[u8]) -> [u8; 32] {
  let mut out = [0u8; 32];
  out.copy_from_slice(&Sha256::digest(input));
  out
}

/// Fixed-length comparison without short-circuiting on the first differing byte.
fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
  a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl AuthGate {
  /// `ttl = None` means issued tokens never expire; they then leave the table only by
  /// logout or by eviction once `max_sessions` is reached.
  pub fn new(secret: &str, ttl: Option<Duration>) -> Self {
    Self {
      secret_digest: digest(secret.as_bytes()),
      ttl,
      max_sessions: DEFAULT_MAX_SESSIONS,
      sessions: RwLock::new(HashMap::new()),
    }
  }

  pub fn with_session_limit(mut self, max_sessions: usize) -> Self {
    self.max_sessions = max_sessions.max(1);
    self
  }

  #[instrument(level = "info", skip_all)]
  pub async fn login(&self, password: &str) -> ServiceResult<String> {
    // Hash first so the comparison time does not depend on the secret's length.
    let matches = digests_match(&digest(password.as_bytes()), &self.secret_digest);
    if password.is_empty() || !matches {
      warn!(target: "auth", "Admin login rejected");
      return Err(ServiceError::Auth("Incorrect password.".into()));
    }

    let token: String = rand::thread_rng()
      .sample_iter(&Alphanumeric)
      .take(TOKEN_LEN)
      .map(char::from)
      .collect();
    let now = Instant::now();
    let session = Session { issued_at: now, expires_at: self.ttl.map(|ttl| now + ttl) };

    let mut sessions = self.sessions.write().await;
    sessions.retain(|_, s| s.is_live(now));
    while sessions.len() >= self.max_sessions {
      let oldest = sessions.iter().min_by_key(|(_, s)| s.issued_at).map(|(t, _)| t.clone());
      match oldest {
        Some(t) => {
          sessions.remove(&t);
          info!(target: "auth", "Session table full; oldest admin token evicted");
        }
        None => break,
      }
    }
    sessions.insert(token.clone(), session);
    info!(target: "auth", active_sessions = sessions.len(), "Admin login accepted");
    Ok(token)
  }

  /// True if `token` was issued here, not revoked, and not expired.
  pub async fn verify(&self, token: &str) -> bool {
    let now = Instant::now();
    let live = { self.sessions.read().await.get(token).map(|s| s.is_live(now)) };
    match live {
      Some(true) => true,
      Some(false) => {
        self.sessions.write().await.remove(token);
        info!(target: "auth", "Expired admin token pruned");
        false
      }
      None => false,
    }
  }

  /// Server-side logout. Returns whether the token was known.
  #[instrument(level = "info", skip_all)]
  pub async fn revoke(&self, token: &str) -> bool {
    let removed = self.sessions.write().await.remove(token).is_some();
    if removed {
      info!(target: "auth", "Admin token revoked");
    }
    removed
  }

  #[cfg(test)]
  async fn session_count(&self) -> usize {
    self.sessions.read().await.len()
  }
}
