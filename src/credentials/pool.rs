//! Round-robin API key pool with failure tracking.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::CredentialSupplier;
use crate::error::CredentialError;

struct PoolState {
    cursor: usize,
    failures: HashMap<String, u32>,
}

/// Statuses that blame the key itself: bad, revoked, or rate-limited.
pub const KEY_FAULT_STATUSES: [u16; 3] = [401, 403, 429];

/// Whether a failed call with this status counts against the key.
pub fn blames_key(status_code: u16) -> bool {
    KEY_FAULT_STATUSES.contains(&status_code)
}

/// Rotates through a fixed set of keys, skipping keys that failed
/// `max_failures` times in a row with a key-fault status. A success resets
/// the key's counter. When every key is retired the least-failed key is
/// handed out anyway, so the pool never locks routing out for good.
pub struct KeyPool {
    keys: Vec<String>,
    max_failures: u32,
    state: Mutex<PoolState>,
}

impl KeyPool {
    pub fn new(keys: Vec<String>, max_failures: u32) -> Self {
        Self {
            keys,
            max_failures: max_failures.max(1),
            state: Mutex::new(PoolState {
                cursor: 0,
                failures: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current consecutive failure count for a key.
    pub fn failure_count(&self, key: &str) -> u32 {
        self.lock().failures.get(key).copied().unwrap_or(0)
    }

    /// Pick the next key whose failure count is under the limit, or the
    /// least-failed key when all of them are retired.
    fn next_working_key(&self) -> Result<String, CredentialError> {
        if self.keys.is_empty() {
            return Err(CredentialError::Empty);
        }

        let mut state = self.lock();
        let total = self.keys.len();
        let start = state.cursor % total;

        let candidates: Vec<(usize, u32)> = (0..total)
            .map(|offset| (start + offset) % total)
            .map(|idx| (idx, state.failures.get(&self.keys[idx]).copied().unwrap_or(0)))
            .collect();

        let chosen = match candidates.iter().find(|(_, failures)| *failures < self.max_failures) {
            Some(&(idx, _)) => idx,
            None => {
                // min_by_key keeps the first of equal minimums, i.e. the next in rotation.
                let Some(&(idx, failures)) = candidates.iter().min_by_key(|(_, f)| *f) else {
                    return Err(CredentialError::Empty);
                };
                warn!(
                    "All {} API keys are out of rotation, retrying key #{} with {} failures",
                    total, idx, failures
                );
                idx
            }
        };

        for &(idx, failures) in candidates.iter().take_while(|(idx, _)| *idx != chosen) {
            debug!("Skipping key #{} with {} failures", idx, failures);
        }

        state.cursor = (chosen + 1) % total;
        Ok(self.keys[chosen].clone())
    }

    // A poisoned lock only means another caller panicked mid-update; the
    // counters are still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CredentialSupplier for KeyPool {
    async fn next_credential(&self) -> Result<String, CredentialError> {
        self.next_working_key()
    }

    async fn report_success(&self, credential: &str) {
        self.lock().failures.remove(credential);
    }

    async fn report_failure(&self, credential: &str, status_code: u16) {
        if !blames_key(status_code) {
            debug!(
                "Status {} for key {} is not a key fault, not counting it",
                status_code,
                redact_key(credential)
            );
            return;
        }

        let mut state = self.lock();
        let count = state.failures.entry(credential.to_string()).or_insert(0);
        *count += 1;
        if *count >= self.max_failures {
            warn!(
                "API key {} reached {} failures (last status {}), taking it out of rotation",
                redact_key(credential),
                count,
                status_code
            );
        }
    }
}

/// Show only the tail of a key in logs.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("...{}", tail)
}
