//! Injuries CRUD actions and the recovery reminder sweep.

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::common::auth::{Access, Actor};
use crate::common::InjuryId;
use crate::domains::injuries::models::{Injury, NewInjury, UpdateInjury};
use crate::domains::ActionError;
use crate::kernel::ServerDeps;

/// An injury older than this without a check-in gets a reminder email.
const REMINDER_STALE_DAYS: i64 = 3;

pub async fn list_injuries(actor: &Actor, deps: &ServerDeps) -> Result<Vec<Injury>, ActionError> {
    let injuries = if actor.is_admin() {
        deps.injuries.find_all_expanded().await?
    } else {
        deps.injuries.find_for_parent(actor.id).await?
    };
    Ok(injuries)
}

pub async fn get_injury(
    actor: &Actor,
    id: InjuryId,
    deps: &ServerDeps,
) -> Result<Injury, ActionError> {
    Ok(actor.can(Access::Read).injury(id, deps).await?)
}

/// Create an injury against one of the caller's children.
///
/// The target child goes through a read-access ownership check first, so a
/// parent naming someone else's child sees "Child not found" rather than
/// learning the id was valid.
pub async fn create_injury(
    actor: &Actor,
    input: NewInjury,
    deps: &ServerDeps,
) -> Result<Injury, ActionError> {
    actor.require_parent("create injuries")?;
    input.validate().map_err(ActionError::Validation)?;

    let child_id = input
        .child_id
        .parse()
        .map_err(|_| ActionError::Validation("Invalid child ID format".to_string()))?;
    let child = actor.can(Access::Read).child(child_id, deps).await?;

    let injury = Injury::new(input, child.id);
    deps.injuries.insert(&injury).await?;
    info!(injury_id = %injury.id, child_id = %child.id, "injury logged");
    Ok(injury)
}

pub async fn update_injury(
    actor: &Actor,
    id: InjuryId,
    input: UpdateInjury,
    deps: &ServerDeps,
) -> Result<Injury, ActionError> {
    input.validate().map_err(ActionError::Validation)?;

    let mut injury = actor.can(Access::Update).injury(id, deps).await?;
    injury.apply(input);
    deps.injuries.update(&injury).await?;
    Ok(injury)
}

pub async fn delete_injury(
    actor: &Actor,
    id: InjuryId,
    deps: &ServerDeps,
) -> Result<(), ActionError> {
    let injury = actor.can(Access::Delete).injury(id, deps).await?;
    deps.injuries.delete(injury.id).await?;
    info!(injury_id = %injury.id, "injury deleted");
    Ok(())
}

/// Sweep active injuries and email parents who have not checked in lately.
/// Returns how many reminders went out.
pub async fn send_reminders(deps: &ServerDeps) -> Result<usize, ActionError> {
    let stale_after = Utc::now() - Duration::days(REMINDER_STALE_DAYS);
    let due = deps.injuries.find_needing_reminder(stale_after).await?;

    let mut sent = 0;
    for injury in due {
        let Some(child) = injury.child.expanded() else {
            warn!(injury_id = %injury.id, "reminder skipped: child not expanded");
            continue;
        };
        let Some(parent) = child.parent.expanded() else {
            warn!(injury_id = %injury.id, "reminder skipped: parent not expanded");
            continue;
        };

        deps.mailer
            .send_injury_reminder_email(&parent.email, &parent.name, &child.name, &injury.kind)
            .await?;
        deps.injuries
            .mark_reminder_sent(injury.id, Utc::now())
            .await?;
        sent += 1;
    }

    if sent > 0 {
        info!(sent, "recovery reminders sent");
    }
    Ok(sent)
}
