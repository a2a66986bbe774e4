use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ChildId, InjuryId, UserId};
use crate::domains::children::models::OwnerRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            other => Err(anyhow::anyhow!("unknown severity: {other}")),
        }
    }
}

/// Recovery stage. Forward progression (Resting -> Light Activity -> Full
/// Play) is the convention, but the data layer accepts any transition,
/// including backward ones. See DESIGN.md before tightening this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStatus {
    Resting,
    #[serde(rename = "Light Activity")]
    LightActivity,
    #[serde(rename = "Full Play")]
    FullPlay,
}

impl RecoveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStatus::Resting => "Resting",
            RecoveryStatus::LightActivity => "Light Activity",
            RecoveryStatus::FullPlay => "Full Play",
        }
    }

    /// Rough recovery progress shown in the UI and exports.
    pub fn progress_percentage(&self) -> u8 {
        match self {
            RecoveryStatus::Resting => 33,
            RecoveryStatus::LightActivity => 66,
            RecoveryStatus::FullPlay => 100,
        }
    }
}

impl Default for RecoveryStatus {
    fn default() -> Self {
        RecoveryStatus::Resting
    }
}

impl fmt::Display for RecoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecoveryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Resting" => Ok(RecoveryStatus::Resting),
            "Light Activity" => Ok(RecoveryStatus::LightActivity),
            "Full Play" => Ok(RecoveryStatus::FullPlay),
            other => Err(anyhow::anyhow!("unknown recovery status: {other}")),
        }
    }
}

/// Child summary attached when an injury is loaded with its child expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSummary {
    pub id: ChildId,
    pub name: String,
    pub age: i32,
    pub parent: OwnerRef,
}

/// Reference to the child an injury belongs to: bare id or expanded summary.
///
/// Ownership of an injury is transitive (injury -> child -> parent), so the
/// owner can only be read directly off an expanded reference; with a bare id
/// the child record has to be loaded first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildRef {
    Id(ChildId),
    Expanded(ChildSummary),
}

impl ChildRef {
    /// Canonical child id regardless of reference shape.
    pub fn id(&self) -> ChildId {
        match self {
            ChildRef::Id(id) => *id,
            ChildRef::Expanded(child) => child.id,
        }
    }

    /// Owning parent id, when the child is expanded.
    pub fn owner(&self) -> Option<UserId> {
        match self {
            ChildRef::Id(_) => None,
            ChildRef::Expanded(child) => Some(child.parent.id()),
        }
    }

    pub fn expanded(&self) -> Option<&ChildSummary> {
        match self {
            ChildRef::Id(_) => None,
            ChildRef::Expanded(child) => Some(child),
        }
    }
}

/// An injury logged against a child.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Injury {
    pub id: InjuryId,
    pub child: ChildRef,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub severity: Severity,
    pub recovery_status: RecoveryStatus,
    pub photos: Vec<String>,
    pub notes: String,
    pub suggested_timeline_days: i32,
    pub last_reminder_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Injury {
    pub fn new(input: NewInjury, child: ChildId) -> Self {
        let now = Utc::now();
        let suggested = input
            .suggested_timeline_days
            .unwrap_or_else(|| crate::domains::injuries::timelines::suggested_days(&input.kind));
        Self {
            id: InjuryId::new(),
            child: ChildRef::Id(child),
            kind: input.kind,
            description: input.description,
            date: input.date.unwrap_or(now),
            location: input.location,
            severity: input.severity,
            recovery_status: RecoveryStatus::Resting,
            photos: input.photos.unwrap_or_default(),
            notes: input.notes.unwrap_or_default(),
            suggested_timeline_days: suggested,
            last_reminder_sent: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update payload; the child edge is untouched.
    pub fn apply(&mut self, input: UpdateInjury) {
        self.kind = input.kind;
        self.description = input.description;
        if let Some(date) = input.date {
            self.date = date;
        }
        self.location = input.location;
        self.severity = input.severity;
        self.recovery_status = input.recovery_status;
        if let Some(photos) = input.photos {
            self.photos = photos;
        }
        if let Some(notes) = input.notes {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
    }
}

/// Creation payload. The caller sets the owning child after the ownership
/// check; there is no create-on-behalf-of.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInjury {
    pub child_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    pub severity: Severity,
    pub photos: Option<Vec<String>>,
    pub notes: Option<String>,
    #[serde(rename = "suggestedTimeline")]
    pub suggested_timeline_days: Option<i32>,
}

impl NewInjury {
    pub fn validate(&self) -> Result<(), String> {
        if self.child_id.trim().is_empty()
            || self.kind.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        Ok(())
    }
}

/// Update payload. Requires the full set of editable fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInjury {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    pub severity: Severity,
    pub recovery_status: RecoveryStatus,
    pub photos: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl UpdateInjury {
    pub fn validate(&self) -> Result<(), String> {
        if self.kind.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::children::models::ParentSummary;

    fn new_input(child: ChildId) -> NewInjury {
        NewInjury {
            child_id: child.to_string(),
            kind: "Ankle Sprain".to_string(),
            description: "Rolled ankle at practice".to_string(),
            date: None,
            location: "Left ankle".to_string(),
            severity: Severity::Moderate,
            photos: None,
            notes: None,
            suggested_timeline_days: None,
        }
    }

    #[test]
    fn test_new_injury_defaults() {
        let child = ChildId::new();
        let injury = Injury::new(new_input(child), child);
        assert_eq!(injury.child.id(), child);
        assert_eq!(injury.recovery_status, RecoveryStatus::Resting);
        // Known injury type gets its suggested timeline.
        assert_eq!(injury.suggested_timeline_days, 14);
        assert!(injury.last_reminder_sent.is_none());
    }

    #[test]
    fn test_unknown_injury_type_defaults_to_seven_days() {
        let child = ChildId::new();
        let mut input = new_input(child);
        input.kind = "Mystery ailment".to_string();
        let injury = Injury::new(input, child);
        assert_eq!(injury.suggested_timeline_days, 7);
    }

    #[test]
    fn test_recovery_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RecoveryStatus::LightActivity).unwrap(),
            "\"Light Activity\""
        );
        let status: RecoveryStatus = serde_json::from_str("\"Full Play\"").unwrap();
        assert_eq!(status, RecoveryStatus::FullPlay);
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(RecoveryStatus::Resting.progress_percentage(), 33);
        assert_eq!(RecoveryStatus::LightActivity.progress_percentage(), 66);
        assert_eq!(RecoveryStatus::FullPlay.progress_percentage(), 100);
    }

    #[test]
    fn test_backward_transition_is_accepted() {
        let child = ChildId::new();
        let mut injury = Injury::new(new_input(child), child);
        injury.recovery_status = RecoveryStatus::FullPlay;

        injury.apply(UpdateInjury {
            kind: injury.kind.clone(),
            description: injury.description.clone(),
            date: None,
            location: injury.location.clone(),
            severity: injury.severity,
            recovery_status: RecoveryStatus::Resting,
            photos: None,
            notes: None,
        });

        assert_eq!(injury.recovery_status, RecoveryStatus::Resting);
    }

    #[test]
    fn test_child_ref_owner_requires_expansion() {
        let child = ChildId::new();
        let parent = UserId::new();

        let bare = ChildRef::Id(child);
        assert_eq!(bare.id(), child);
        assert!(bare.owner().is_none());

        let expanded = ChildRef::Expanded(ChildSummary {
            id: child,
            name: "Sam".to_string(),
            age: 10,
            parent: OwnerRef::Expanded(ParentSummary {
                id: parent,
                name: "Pat".to_string(),
                email: "pat@example.com".to_string(),
            }),
        });
        assert_eq!(expanded.id(), child);
        assert_eq!(expanded.owner(), Some(parent));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let child = ChildId::new();
        let mut input = new_input(child);
        input.description = String::new();
        assert_eq!(input.validate().unwrap_err(), "Missing required fields");
    }
}
