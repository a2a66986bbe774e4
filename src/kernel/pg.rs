//! Postgres backend.
//!
//! Row structs mirror the table layout; enum columns are stored as text and
//! parsed through the domain `FromStr` impls on the way out, so a bad value
//! in the database surfaces as an error instead of a silent default.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::{ChildId, InjuryId, UserId};
use crate::domains::children::models::{Child, Gender, OwnerRef, ParentSummary};
use crate::domains::injuries::models::{
    ChildRef, ChildSummary, Injury, RecoveryStatus, Severity,
};
use crate::domains::users::models::{PublicUser, User, UserCounts, UserWithChildCount};
use crate::kernel::traits::{BaseChildStore, BaseInjuryStore, BaseUserStore};

// =============================================================================
// Rows
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    is_email_verified: bool,
    email_verification_digest: Option<String>,
    email_verification_expires: Option<DateTime<Utc>>,
    password_reset_digest: Option<String>,
    password_reset_expires: Option<DateTime<Utc>>,
    consent_accepted: bool,
    consent_version: String,
    consent_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role.parse().context("users.role")?,
            is_email_verified: row.is_email_verified,
            email_verification_digest: row.email_verification_digest,
            email_verification_expires: row.email_verification_expires,
            password_reset_digest: row.password_reset_digest,
            password_reset_expires: row.password_reset_expires,
            consent_accepted: row.consent_accepted,
            consent_version: row.consent_version,
            consent_at: row.consent_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChildRow {
    id: ChildId,
    name: String,
    age: i32,
    gender: String,
    sport: String,
    notes: String,
    parent_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Populated only by the expanded queries.
    #[sqlx(default)]
    parent_name: Option<String>,
    #[sqlx(default)]
    parent_email: Option<String>,
}

impl TryFrom<ChildRow> for Child {
    type Error = anyhow::Error;

    fn try_from(row: ChildRow) -> Result<Self> {
        let gender: Gender = row.gender.parse().context("children.gender")?;
        let parent = match (row.parent_name, row.parent_email) {
            (Some(name), Some(email)) => OwnerRef::Expanded(ParentSummary {
                id: row.parent_id,
                name,
                email,
            }),
            _ => OwnerRef::Id(row.parent_id),
        };
        Ok(Child {
            id: row.id,
            name: row.name,
            age: row.age,
            gender,
            sport: row.sport,
            notes: row.notes,
            parent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InjuryRow {
    id: InjuryId,
    child_id: ChildId,
    kind: String,
    description: String,
    date: DateTime<Utc>,
    location: String,
    severity: String,
    recovery_status: String,
    photos: Vec<String>,
    notes: String,
    suggested_timeline_days: i32,
    last_reminder_sent: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Populated only by the expanded queries.
    #[sqlx(default)]
    child_name: Option<String>,
    #[sqlx(default)]
    child_age: Option<i32>,
    #[sqlx(default)]
    child_parent_id: Option<UserId>,
    #[sqlx(default)]
    parent_name: Option<String>,
    #[sqlx(default)]
    parent_email: Option<String>,
}

impl TryFrom<InjuryRow> for Injury {
    type Error = anyhow::Error;

    fn try_from(row: InjuryRow) -> Result<Self> {
        let severity: Severity = row.severity.parse().context("injuries.severity")?;
        let recovery_status: RecoveryStatus = row
            .recovery_status
            .parse()
            .context("injuries.recovery_status")?;

        let child = match (row.child_name, row.child_age, row.child_parent_id) {
            (Some(name), Some(age), Some(parent_id)) => {
                let parent = match (row.parent_name, row.parent_email) {
                    (Some(pname), Some(pemail)) => OwnerRef::Expanded(ParentSummary {
                        id: parent_id,
                        name: pname,
                        email: pemail,
                    }),
                    _ => OwnerRef::Id(parent_id),
                };
                ChildRef::Expanded(ChildSummary {
                    id: row.child_id,
                    name,
                    age,
                    parent,
                })
            }
            _ => ChildRef::Id(row.child_id),
        };

        Ok(Injury {
            id: row.id,
            child,
            kind: row.kind,
            description: row.description,
            date: row.date,
            location: row.location,
            severity,
            recovery_status,
            photos: row.photos,
            notes: row.notes,
            suggested_timeline_days: row.suggested_timeline_days,
            last_reminder_sent: row.last_reminder_sent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, is_email_verified, \
     email_verification_digest, email_verification_expires, password_reset_digest, \
     password_reset_expires, consent_accepted, consent_version, consent_at, \
     created_at, updated_at";

const INJURY_COLUMNS: &str = "i.id, i.child_id, i.kind, i.description, i.date, i.location, \
     i.severity, i.recovery_status, i.photos, i.notes, i.suggested_timeline_days, \
     i.last_reminder_sent, i.created_at, i.updated_at";

// =============================================================================
// User store
// =============================================================================

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, clause: &str, value: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl BaseUserStore for PgUserStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.fetch_one_by("email", &email.trim().to_lowercase())
            .await
    }

    async fn find_by_verification_digest(&self, digest: &str) -> Result<Option<User>> {
        self.fetch_one_by("email_verification_digest", digest).await
    }

    async fn find_by_reset_digest(&self, digest: &str) -> Result<Option<User>> {
        self.fetch_one_by("password_reset_digest", digest).await
    }

    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, is_email_verified,
                email_verification_digest, email_verification_expires,
                password_reset_digest, password_reset_expires,
                consent_accepted, consent_version, consent_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_email_verified)
        .bind(&user.email_verification_digest)
        .bind(user.email_verification_expires)
        .bind(&user.password_reset_digest)
        .bind(user.password_reset_expires)
        .bind(user.consent_accepted)
        .bind(&user.consent_version)
        .bind(user.consent_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET email = $2, name = $3, password_hash = $4, role = $5,
                is_email_verified = $6, email_verification_digest = $7,
                email_verification_expires = $8, password_reset_digest = $9,
                password_reset_expires = $10, consent_accepted = $11,
                consent_version = $12, consent_at = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_email_verified)
        .bind(&user.email_verification_digest)
        .bind(user.email_verification_expires)
        .bind(&user.password_reset_digest)
        .bind(user.password_reset_expires)
        .bind(user.consent_accepted)
        .bind(&user.consent_version)
        .bind(user.consent_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_with_child_counts(&self) -> Result<Vec<UserWithChildCount>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: UserId,
            email: String,
            name: String,
            role: String,
            is_email_verified: bool,
            created_at: DateTime<Utc>,
            children_count: i64,
        }

        let rows = sqlx::query_as::<_, Row>(
            r#"
            SELECT u.id, u.email, u.name, u.role, u.is_email_verified, u.created_at,
                   COUNT(c.id) AS children_count
            FROM users u
            LEFT JOIN children c ON c.parent_id = u.id
            GROUP BY u.id
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(UserWithChildCount {
                    user: PublicUser {
                        id: row.id,
                        email: row.email,
                        name: row.name,
                        role: row.role.parse().context("users.role")?,
                        is_email_verified: row.is_email_verified,
                        created_at: row.created_at,
                    },
                    children_count: row.children_count,
                })
            })
            .collect()
    }

    async fn counts(&self) -> Result<UserCounts> {
        let (total, verified): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_email_verified) FROM users",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(UserCounts {
            total_users: total,
            verified_users: verified,
            unverified_users: total - verified,
        })
    }
}

// =============================================================================
// Child store
// =============================================================================

#[derive(Clone)]
pub struct PgChildStore {
    pool: PgPool,
}

impl PgChildStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseChildStore for PgChildStore {
    async fn find_by_id(&self, id: ChildId) -> Result<Option<Child>> {
        let row = sqlx::query_as::<_, ChildRow>(
            "SELECT id, name, age, gender, sport, notes, parent_id, created_at, updated_at \
             FROM children WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Child::try_from).transpose()
    }

    async fn find_by_parent(&self, parent_id: UserId) -> Result<Vec<Child>> {
        let rows = sqlx::query_as::<_, ChildRow>(
            "SELECT id, name, age, gender, sport, notes, parent_id, created_at, updated_at \
             FROM children WHERE parent_id = $1 ORDER BY created_at DESC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Child::try_from).collect()
    }

    async fn find_all_expanded(&self) -> Result<Vec<Child>> {
        let rows = sqlx::query_as::<_, ChildRow>(
            r#"
            SELECT c.id, c.name, c.age, c.gender, c.sport, c.notes, c.parent_id,
                   c.created_at, c.updated_at,
                   u.name AS parent_name, u.email AS parent_email
            FROM children c
            JOIN users u ON u.id = c.parent_id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Child::try_from).collect()
    }

    async fn insert(&self, child: &Child) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO children (id, name, age, gender, sport, notes, parent_id,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(child.id)
        .bind(&child.name)
        .bind(child.age)
        .bind(child.gender.as_str())
        .bind(&child.sport)
        .bind(&child.notes)
        .bind(child.parent.id())
        .bind(child.created_at)
        .bind(child.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, child: &Child) -> Result<()> {
        sqlx::query(
            "UPDATE children SET name = $2, age = $3, gender = $4, sport = $5, \
             notes = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(child.id)
        .bind(&child.name)
        .bind(child.age)
        .bind(child.gender.as_str())
        .bind(&child.sport)
        .bind(&child.notes)
        .bind(child.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_cascading(&self, id: ChildId) -> Result<()> {
        // injuries.child_id has ON DELETE CASCADE.
        sqlx::query("DELETE FROM children WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM children")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Injury store
// =============================================================================

#[derive(Clone)]
pub struct PgInjuryStore {
    pool: PgPool,
}

impl PgInjuryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseInjuryStore for PgInjuryStore {
    async fn find_by_id(&self, id: InjuryId) -> Result<Option<Injury>> {
        let sql = format!(
            "SELECT {INJURY_COLUMNS}, c.name AS child_name, c.age AS child_age, \
             c.parent_id AS child_parent_id \
             FROM injuries i JOIN children c ON c.id = i.child_id WHERE i.id = $1"
        );
        let row = sqlx::query_as::<_, InjuryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Injury::try_from).transpose()
    }

    async fn find_by_child(&self, child_id: ChildId) -> Result<Vec<Injury>> {
        let sql = format!(
            "SELECT {INJURY_COLUMNS} FROM injuries i WHERE i.child_id = $1 \
             ORDER BY i.created_at DESC"
        );
        let rows = sqlx::query_as::<_, InjuryRow>(&sql)
            .bind(child_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Injury::try_from).collect()
    }

    async fn find_for_parent(&self, parent_id: UserId) -> Result<Vec<Injury>> {
        let sql = format!(
            "SELECT {INJURY_COLUMNS}, c.name AS child_name, c.age AS child_age, \
             c.parent_id AS child_parent_id \
             FROM injuries i JOIN children c ON c.id = i.child_id \
             WHERE c.parent_id = $1 ORDER BY i.created_at DESC"
        );
        let rows = sqlx::query_as::<_, InjuryRow>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Injury::try_from).collect()
    }

    async fn find_all_expanded(&self) -> Result<Vec<Injury>> {
        let sql = format!(
            "SELECT {INJURY_COLUMNS}, c.name AS child_name, c.age AS child_age, \
             c.parent_id AS child_parent_id, u.name AS parent_name, u.email AS parent_email \
             FROM injuries i \
             JOIN children c ON c.id = i.child_id \
             JOIN users u ON u.id = c.parent_id \
             ORDER BY i.created_at DESC"
        );
        let rows = sqlx::query_as::<_, InjuryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Injury::try_from).collect()
    }

    async fn insert(&self, injury: &Injury) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO injuries (id, child_id, kind, description, date, location,
                severity, recovery_status, photos, notes, suggested_timeline_days,
                last_reminder_sent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(injury.id)
        .bind(injury.child.id())
        .bind(&injury.kind)
        .bind(&injury.description)
        .bind(injury.date)
        .bind(&injury.location)
        .bind(injury.severity.as_str())
        .bind(injury.recovery_status.as_str())
        .bind(&injury.photos)
        .bind(&injury.notes)
        .bind(injury.suggested_timeline_days)
        .bind(injury.last_reminder_sent)
        .bind(injury.created_at)
        .bind(injury.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, injury: &Injury) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE injuries SET kind = $2, description = $3, date = $4, location = $5,
                severity = $6, recovery_status = $7, photos = $8, notes = $9,
                last_reminder_sent = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(injury.id)
        .bind(&injury.kind)
        .bind(&injury.description)
        .bind(injury.date)
        .bind(&injury.location)
        .bind(injury.severity.as_str())
        .bind(injury.recovery_status.as_str())
        .bind(&injury.photos)
        .bind(&injury.notes)
        .bind(injury.last_reminder_sent)
        .bind(injury.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: InjuryId) -> Result<()> {
        sqlx::query("DELETE FROM injuries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM injuries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_active(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM injuries WHERE recovery_status <> $1")
                .bind(RecoveryStatus::FullPlay.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn find_needing_reminder(&self, stale_after: DateTime<Utc>) -> Result<Vec<Injury>> {
        let sql = format!(
            "SELECT {INJURY_COLUMNS}, c.name AS child_name, c.age AS child_age, \
             c.parent_id AS child_parent_id, u.name AS parent_name, u.email AS parent_email \
             FROM injuries i \
             JOIN children c ON c.id = i.child_id \
             JOIN users u ON u.id = c.parent_id \
             WHERE i.recovery_status <> $1 \
               AND i.updated_at < $2 \
               AND (i.last_reminder_sent IS NULL OR i.last_reminder_sent < $2)"
        );
        let rows = sqlx::query_as::<_, InjuryRow>(&sql)
            .bind(RecoveryStatus::FullPlay.as_str())
            .bind(stale_after)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Injury::try_from).collect()
    }

    async fn mark_reminder_sent(&self, id: InjuryId, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE injuries SET last_reminder_sent = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
