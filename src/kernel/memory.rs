//! In-memory backend.
//!
//! Backs the test harness and the no-database demo mode. All three stores
//! share one [`MemoryDb`] so cross-entity reads (parent expansion, cascades)
//! see a consistent view.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{ChildId, InjuryId, UploadId, UserId};
use crate::domains::auth::JwtService;
use crate::domains::children::models::{Child, OwnerRef, ParentSummary};
use crate::domains::injuries::models::{ChildRef, ChildSummary, Injury, RecoveryStatus};
use crate::domains::users::models::{User, UserCounts, UserWithChildCount};
use crate::kernel::deps::ServerDeps;
use crate::kernel::response_cache::ResponseCache;
use crate::kernel::traits::{
    BaseAssistant, BaseChildStore, BaseImageStore, BaseInjuryStore, BaseMailer, BaseUserStore,
    ChatMessage,
};

#[derive(Default)]
pub struct MemoryDb {
    pub users: HashMap<UserId, User>,
    pub children: HashMap<ChildId, Child>,
    pub injuries: HashMap<InjuryId, Injury>,
}

type SharedDb = Arc<Mutex<MemoryDb>>;

fn lock(db: &SharedDb) -> std::sync::MutexGuard<'_, MemoryDb> {
    db.lock().unwrap_or_else(|e| e.into_inner())
}

fn parent_summary(db: &MemoryDb, id: UserId) -> OwnerRef {
    match db.users.get(&id) {
        Some(user) => OwnerRef::Expanded(ParentSummary {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
        }),
        None => OwnerRef::Id(id),
    }
}

fn child_summary(db: &MemoryDb, id: ChildId, expand_parent: bool) -> ChildRef {
    match db.children.get(&id) {
        Some(child) => ChildRef::Expanded(ChildSummary {
            id,
            name: child.name.clone(),
            age: child.age,
            parent: if expand_parent {
                parent_summary(db, child.parent.id())
            } else {
                OwnerRef::Id(child.parent.id())
            },
        }),
        None => ChildRef::Id(id),
    }
}

// =============================================================================
// Stores
// =============================================================================

#[derive(Clone)]
pub struct MemoryUserStore {
    db: SharedDb,
}

#[async_trait]
impl BaseUserStore for MemoryUserStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(lock(&self.db).users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let wanted = email.trim().to_lowercase();
        Ok(lock(&self.db)
            .users
            .values()
            .find(|u| u.email == wanted)
            .cloned())
    }

    async fn find_by_verification_digest(&self, digest: &str) -> Result<Option<User>> {
        Ok(lock(&self.db)
            .users
            .values()
            .find(|u| u.email_verification_digest.as_deref() == Some(digest))
            .cloned())
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>> {
        Ok(lock(&self.db)
            .users
            .values()
            .find(|u| u.password_reset_digest.as_deref() == Some(digest))
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<()> {
        lock(&self.db).users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        lock(&self.db).users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list_with_child_counts(&self) -> Result<Vec<UserWithChildCount>> {
        let db = lock(&self.db);
        let mut users: Vec<_> = db.users.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .map(|user| {
                let count = db
                    .children
                    .values()
                    .filter(|c| c.parent.id() == user.id)
                    .count() as i64;
                UserWithChildCount {
                    user: user.public(),
                    children_count: count,
                }
            })
            .collect())
    }

    async fn counts(&self) -> Result<UserCounts> {
        let db = lock(&self.db);
        let total = db.users.len() as i64;
        let verified = db.users.values().filter(|u| u.is_email_verified).count() as i64;
        Ok(UserCounts {
            total_users: total,
            verified_users: verified,
            unverified_users: total - verified,
        })
    }
}

#[derive(Clone)]
pub struct MemoryChildStore {
    db: SharedDb,
}

#[async_trait]
impl BaseChildStore for MemoryChildStore {
    async fn find_by_id(&self, id: ChildId) -> Result<Option<Child>> {
        Ok(lock(&self.db).children.get(&id).cloned())
    }

    async fn find_by_parent(&self, parent_id: UserId) -> Result<Vec<Child>> {
        let db = lock(&self.db);
        let mut out: Vec<_> = db
            .children
            .values()
            .filter(|c| c.parent.id() == parent_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_all_expanded(&self) -> Result<Vec<Child>> {
        let db = lock(&self.db);
        let mut out: Vec<_> = db
            .children
            .values()
            .map(|c| {
                let mut child = c.clone();
                child.parent = parent_summary(&db, c.parent.id());
                child
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn insert(&self, child: &Child) -> Result<()> {
        lock(&self.db).children.insert(child.id, child.clone());
        Ok(())
    }

    async fn update(&self, child: &Child) -> Result<()> {
        lock(&self.db).children.insert(child.id, child.clone());
        Ok(())
    }

    async fn delete_cascading(&self, id: ChildId) -> Result<()> {
        let mut db = lock(&self.db);
        db.children.remove(&id);
        db.injuries.retain(|_, i| i.child.id() != id);
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(lock(&self.db).children.len() as i64)
    }
}

#[derive(Clone)]
pub struct MemoryInjuryStore {
    db: SharedDb,
}

#[async_trait]
impl BaseInjuryStore for MemoryInjuryStore {
    async fn find_by_id(&self, id: InjuryId) -> Result<Option<Injury>> {
        let db = lock(&self.db);
        Ok(db.injuries.get(&id).map(|i| {
            let mut injury = i.clone();
            injury.child = child_summary(&db, i.child.id(), false);
            injury
        }))
    }

    async fn find_by_child(&self, child_id: ChildId) -> Result<Vec<Injury>> {
        let db = lock(&self.db);
        let mut out: Vec<_> = db
            .injuries
            .values()
            .filter(|i| i.child.id() == child_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_for_parent(&self, parent_id: UserId) -> Result<Vec<Injury>> {
        let db = lock(&self.db);
        let mut out: Vec<_> = db
            .injuries
            .values()
            .filter(|i| {
                db.children
                    .get(&i.child.id())
                    .is_some_and(|c| c.parent.id() == parent_id)
            })
            .map(|i| {
                let mut injury = i.clone();
                injury.child = child_summary(&db, i.child.id(), false);
                injury
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn find_all_expanded(&self) -> Result<Vec<Injury>> {
        let db = lock(&self.db);
        let mut out: Vec<_> = db
            .injuries
            .values()
            .map(|i| {
                let mut injury = i.clone();
                injury.child = child_summary(&db, i.child.id(), true);
                injury
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn insert(&self, injury: &Injury) -> Result<()> {
        lock(&self.db).injuries.insert(injury.id, injury.clone());
        Ok(())
    }

    async fn update(&self, injury: &Injury) -> Result<()> {
        lock(&self.db).injuries.insert(injury.id, injury.clone());
        Ok(())
    }

    async fn delete(&self, id: InjuryId) -> Result<()> {
        lock(&self.db).injuries.remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        Ok(lock(&self.db).injuries.len() as i64)
    }

    async fn count_active(&self) -> Result<i64> {
        Ok(lock(&self.db)
            .injuries
            .values()
            .filter(|i| i.recovery_status != RecoveryStatus::FullPlay)
            .count() as i64)
    }

    async fn find_needing_reminder(&self, stale_after: DateTime<Utc>) -> Result<Vec<Injury>> {
        let db = lock(&self.db);
        Ok(db
            .injuries
            .values()
            .filter(|i| {
                i.recovery_status != RecoveryStatus::FullPlay
                    && i.updated_at < stale_after
                    && i.last_reminder_sent.is_none_or(|at| at < stale_after)
            })
            .map(|i| {
                let mut injury = i.clone();
                injury.child = child_summary(&db, i.child.id(), true);
                injury
            })
            .collect())
    }

    async fn mark_reminder_sent(&self, id: InjuryId, at: DateTime<Utc>) -> Result<()> {
        let mut db = lock(&self.db);
        if let Some(injury) = db.injuries.get_mut(&id) {
            injury.last_reminder_sent = Some(at);
        }
        Ok(())
    }
}

// =============================================================================
// Recording mailer, image store, assistant
// =============================================================================

/// One captured outbound email.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub kind: &'static str,
    /// Verification or reset link for flows that carry one.
    pub link: Option<String>,
}

/// Mailer that records instead of sending. Tests inspect `sent`.
#[derive(Default)]
pub struct MemoryMailer {
    pub sent: Mutex<Vec<SentMail>>,
}

impl MemoryMailer {
    fn record(&self, to: &str, kind: &'static str, link: Option<String>) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentMail {
                to: to.to_string(),
                kind,
                link,
            });
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|m| m.to == to)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseMailer for MemoryMailer {
    async fn send_verification_email(&self, to: &str, _name: &str, verify_url: &str) -> Result<()> {
        self.record(to, "verification", Some(verify_url.to_string()));
        Ok(())
    }

    async fn send_welcome_email(&self, to: &str, _name: &str) -> Result<()> {
        self.record(to, "welcome", None);
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        _name: &str,
        reset_url: &str,
    ) -> Result<()> {
        self.record(to, "password_reset", Some(reset_url.to_string()));
        Ok(())
    }

    async fn send_injury_reminder_email(
        &self,
        to: &str,
        _parent_name: &str,
        _child_name: &str,
        _injury_kind: &str,
    ) -> Result<()> {
        self.record(to, "injury_reminder", None);
        Ok(())
    }
}

/// Image store that keeps uploads in a map and hands back fake URLs.
#[derive(Default)]
pub struct MemoryImageStore {
    pub stored: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl BaseImageStore for MemoryImageStore {
    async fn store(&self, extension: &str, bytes: Vec<u8>) -> Result<String> {
        let name = format!("{}.{}", UploadId::new(), extension);
        let url = format!("/uploads/{name}");
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name, bytes);
        Ok(url)
    }
}

/// Assistant with a fixed reply, for tests.
pub struct FixedAssistant(pub String);

#[async_trait]
impl BaseAssistant for FixedAssistant {
    async fn reply(&self, _messages: &[ChatMessage]) -> Result<String> {
        Ok(self.0.clone())
    }
}

// =============================================================================
// Wiring
// =============================================================================

/// Everything a test needs: the deps container plus handles onto the raw
/// database and the recording mailer.
pub struct MemoryBackend {
    pub deps: ServerDeps,
    pub db: SharedDb,
    pub mailer: Arc<MemoryMailer>,
}

/// Build a fully in-memory [`ServerDeps`].
pub fn memory_deps(jwt_secret: &str, issuer: &str, app_base_url: &str) -> MemoryBackend {
    let db: SharedDb = Arc::new(Mutex::new(MemoryDb::default()));
    let mailer = Arc::new(MemoryMailer::default());
    let deps = ServerDeps {
        users: Arc::new(MemoryUserStore { db: db.clone() }),
        children: Arc::new(MemoryChildStore { db: db.clone() }),
        injuries: Arc::new(MemoryInjuryStore { db: db.clone() }),
        mailer: mailer.clone(),
        images: Arc::new(MemoryImageStore::default()),
        assistant: Arc::new(crate::kernel::assistant::SafetyAssistant),
        jwt: Arc::new(JwtService::new(jwt_secret, issuer)),
        chat_cache: Arc::new(ResponseCache::new(Duration::from_secs(24 * 60 * 60))),
        app_base_url: app_base_url.to_string(),
        backend: "memory",
    };
    MemoryBackend { deps, db, mailer }
}
