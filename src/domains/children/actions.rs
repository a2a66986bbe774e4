//! Children CRUD actions.
//!
//! Every per-record operation goes through `actor.can(..)`; list reads fan
//! out by role instead (parents see their own, admins see everything).

use serde::Serialize;
use tracing::info;

use crate::common::auth::{Access, Actor};
use crate::common::ChildId;
use crate::domains::children::models::{Child, ChildInput};
use crate::domains::injuries::models::Injury;
use crate::domains::ActionError;
use crate::kernel::ServerDeps;

/// A child with their injury history attached, as the API returns it.
#[derive(Debug, Serialize)]
pub struct ChildWithInjuries {
    #[serde(flatten)]
    pub child: Child,
    pub injuries: Vec<Injury>,
}

async fn with_injuries(child: Child, deps: &ServerDeps) -> Result<ChildWithInjuries, ActionError> {
    let injuries = deps.injuries.find_by_child(child.id).await?;
    Ok(ChildWithInjuries { child, injuries })
}

pub async fn list_children(
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Vec<ChildWithInjuries>, ActionError> {
    let children = if actor.is_admin() {
        deps.children.find_all_expanded().await?
    } else {
        deps.children.find_by_parent(actor.id).await?
    };

    let mut out = Vec::with_capacity(children.len());
    for child in children {
        out.push(with_injuries(child, deps).await?);
    }
    Ok(out)
}

pub async fn get_child(
    actor: &Actor,
    id: ChildId,
    deps: &ServerDeps,
) -> Result<ChildWithInjuries, ActionError> {
    let child = actor.can(Access::Read).child(id, deps).await?;
    with_injuries(child, deps).await
}

pub async fn create_child(
    actor: &Actor,
    input: ChildInput,
    deps: &ServerDeps,
) -> Result<Child, ActionError> {
    actor.require_parent("add children")?;
    input.validate().map_err(ActionError::Validation)?;

    let child = Child::new(input, actor.id);
    deps.children.insert(&child).await?;
    info!(child_id = %child.id, parent_id = %actor.id, "child created");
    Ok(child)
}

pub async fn update_child(
    actor: &Actor,
    id: ChildId,
    input: ChildInput,
    deps: &ServerDeps,
) -> Result<Child, ActionError> {
    input.validate().map_err(ActionError::Validation)?;

    let mut child = actor.can(Access::Update).child(id, deps).await?;
    child.apply(input);
    deps.children.update(&child).await?;
    Ok(child)
}

pub async fn delete_child(
    actor: &Actor,
    id: ChildId,
    deps: &ServerDeps,
) -> Result<(), ActionError> {
    let child = actor.can(Access::Delete).child(id, deps).await?;
    deps.children.delete_cascading(child.id).await?;
    info!(child_id = %child.id, "child deleted with injury history");
    Ok(())
}
