//! In-memory linking-code registry.
//!
//! The registry is the only process-wide mutable state in the product. All
//! mutating operations take the single inner lock, which serializes
//! concurrent `verify` calls on the same code: exactly one caller observes
//! the Pending state and claims it.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use mitra_core::config::{LINK_CODE_LEN, LINK_CODE_TTL_SECS};

use crate::error::{LinkingError, Result};
use crate::types::{CodeState, LinkedIdentity, LinkingCode};

/// Code alphabet — uppercase alphanumerics minus confusables (0/O, 1/I).
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub struct LinkingRegistry {
    ttl: Duration,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Active codes keyed by code string.
    by_code: HashMap<String, LinkingCode>,
    /// Index: Telegram user id → their current code.
    code_for_user: HashMap<i64, String>,
}

impl Default for LinkingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkingRegistry {
    /// Registry with the standard 10-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl_secs(LINK_CODE_TTL_SECS)
    }

    pub fn with_ttl_secs(ttl_secs: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Issue a fresh code for `telegram_user_id`, superseding any code the
    /// same user already holds. The superseded code is removed and will
    /// never verify.
    pub fn issue(&self, telegram_user_id: i64) -> LinkingCode {
        self.issue_at(telegram_user_id, Utc::now())
    }

    /// Claim a code for `app_user_id`. Exactly one `verify` per code can
    /// succeed; later callers see `AlreadyClaimed`, absent codes `NotFound`,
    /// and codes past their TTL `Expired`.
    pub fn verify(&self, code: &str, app_user_id: &str) -> Result<LinkedIdentity> {
        self.verify_at(code, app_user_id, Utc::now())
    }

    /// Claim a code without an application account id: the owning Telegram
    /// user id (stringified) becomes the app user id. This is the path the
    /// web client uses when it verifies with only the code.
    pub fn claim(&self, code: &str) -> Result<LinkedIdentity> {
        self.claim_at(code, None, Utc::now())
    }

    /// Remove any code held by `telegram_user_id`, whatever its state.
    /// Used on /unlink.
    pub fn revoke(&self, telegram_user_id: i64) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if let Some(code) = inner.code_for_user.remove(&telegram_user_id) {
            inner.by_code.remove(&code);
            info!(telegram_user_id, "linking code revoked");
        }
    }

    /// Clock-injected issue, used directly by TTL tests.
    pub fn issue_at(&self, telegram_user_id: i64, now: DateTime<Utc>) -> LinkingCode {
        let mut inner = self.inner.lock().expect("registry lock poisoned");

        // Supersede, not append: the previous code for this user is dropped.
        if let Some(old) = inner.code_for_user.remove(&telegram_user_id) {
            inner.by_code.remove(&old);
            debug!(telegram_user_id, "superseded previous linking code");
        }

        let mut code = generate_code();
        // Regenerate on the off chance of a collision within the active set.
        while inner.by_code.contains_key(&code) {
            code = generate_code();
        }

        let entry = LinkingCode {
            code: code.clone(),
            issued_to: telegram_user_id,
            app_user_id: None,
            issued_at: now,
            expires_at: now + self.ttl,
            state: CodeState::Pending,
        };
        inner.code_for_user.insert(telegram_user_id, code.clone());
        inner.by_code.insert(code, entry.clone());
        info!(telegram_user_id, expires_at = %entry.expires_at, "linking code issued");
        entry
    }

    /// Clock-injected verify, used directly by TTL tests.
    pub fn verify_at(
        &self,
        code: &str,
        app_user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkedIdentity> {
        self.claim_at(code, Some(app_user_id), now)
    }

    fn claim_at(
        &self,
        code: &str,
        app_user_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<LinkedIdentity> {
        let mut guard = self.inner.lock().expect("registry lock poisoned");
        let inner = &mut *guard;

        let entry = inner.by_code.get_mut(code).ok_or(LinkingError::NotFound)?;

        match entry.state {
            CodeState::Claimed => return Err(LinkingError::AlreadyClaimed),
            CodeState::Expired => return Err(LinkingError::Expired),
            CodeState::Pending => {}
        }

        // Lazy expiry: a Pending code past its deadline is never matched.
        if now > entry.expires_at {
            let issued_to = entry.issued_to;
            inner.code_for_user.remove(&issued_to);
            inner.by_code.remove(code);
            return Err(LinkingError::Expired);
        }

        let app_user_id = app_user_id
            .map(str::to_string)
            .unwrap_or_else(|| entry.issued_to.to_string());
        entry.state = CodeState::Claimed;
        entry.app_user_id = Some(app_user_id.clone());
        let identity = LinkedIdentity {
            app_user_id,
            telegram_user_id: entry.issued_to,
        };
        info!(
            telegram_user_id = identity.telegram_user_id,
            app_user_id = %identity.app_user_id,
            "linking code claimed"
        );
        Ok(identity)
    }
}

/// Derive a 6-character code from UUIDv4 random bytes.
fn generate_code() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    bytes[..LINK_CODE_LEN]
        .iter()
        .map(|b| CODE_CHARSET[*b as usize % CODE_CHARSET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_code_is_six_chars_from_charset() {
        let reg = LinkingRegistry::new();
        let code = reg.issue(1001).code;
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn verify_unknown_code_is_not_found() {
        let reg = LinkingRegistry::new();
        assert_eq!(reg.verify("ABC123", "9"), Err(LinkingError::NotFound));
    }

    #[test]
    fn exactly_one_verify_succeeds() {
        let reg = LinkingRegistry::new();
        let code = reg.issue(42).code;

        let first = reg.verify(&code, "app-1");
        assert_eq!(
            first,
            Ok(LinkedIdentity {
                app_user_id: "app-1".to_string(),
                telegram_user_id: 42,
            })
        );

        assert_eq!(
            reg.verify(&code, "app-2"),
            Err(LinkingError::AlreadyClaimed)
        );
    }

    #[test]
    fn concurrent_verify_claims_at_most_once() {
        use std::sync::Arc;

        let reg = Arc::new(LinkingRegistry::new());
        let code = reg.issue(7).code;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let reg = Arc::clone(&reg);
                let code = code.clone();
                std::thread::spawn(move || reg.verify(&code, &format!("app-{i}")))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| r == &Err(LinkingError::AlreadyClaimed)));
    }

    #[test]
    fn verify_after_ttl_is_expired() {
        let reg = LinkingRegistry::new();
        let now = Utc::now();
        let code = reg.issue_at(5, now).code;

        let later = now + Duration::minutes(10) + Duration::seconds(1);
        assert_eq!(reg.verify_at(&code, "app", later), Err(LinkingError::Expired));
        // An expired code is gone entirely, not just unclaimed.
        assert_eq!(reg.verify_at(&code, "app", later), Err(LinkingError::NotFound));
    }

    #[test]
    fn verify_within_ttl_succeeds() {
        let reg = LinkingRegistry::new();
        let now = Utc::now();
        let code = reg.issue_at(5, now).code;

        let later = now + Duration::minutes(9);
        assert!(reg.verify_at(&code, "app", later).is_ok());
    }

    #[test]
    fn code_only_claim_defaults_app_id_to_owner() {
        let reg = LinkingRegistry::new();
        let code = reg.issue(314).code;
        let identity = reg.claim(&code).expect("claim");
        assert_eq!(identity.app_user_id, "314");
        assert_eq!(identity.telegram_user_id, 314);
    }

    #[test]
    fn reissue_supersedes_pending_code() {
        let reg = LinkingRegistry::new();
        let old = reg.issue(11).code;
        let new = reg.issue(11).code;
        assert_ne!(old, new);

        assert_eq!(reg.verify(&old, "app"), Err(LinkingError::NotFound));
        assert!(reg.verify(&new, "app").is_ok());
    }

    #[test]
    fn revoke_removes_pending_and_claimed() {
        let reg = LinkingRegistry::new();
        let pending = reg.issue(21).code;
        reg.revoke(21);
        assert_eq!(reg.verify(&pending, "app"), Err(LinkingError::NotFound));

        let claimed = reg.issue(22).code;
        reg.verify(&claimed, "app").expect("claim");
        reg.revoke(22);
        assert_eq!(reg.verify(&claimed, "again"), Err(LinkingError::NotFound));
    }
}
