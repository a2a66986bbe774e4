use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ChildId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(anyhow::anyhow!("unknown gender: {other}")),
        }
    }
}

/// Summary of the owning parent, attached when a record is loaded with its
/// parent expanded (admin listings, exports, reminder emails).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Reference to the owning parent: either a bare id or an expanded summary.
///
/// Stored documents carry the bare id; reads may expand it. Ownership checks
/// must go through [`OwnerRef::id`] so both shapes compare identically -
/// comparing an expanded object against an id silently never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(UserId),
    Expanded(ParentSummary),
}

impl OwnerRef {
    /// Canonical owner id regardless of reference shape.
    pub fn id(&self) -> UserId {
        match self {
            OwnerRef::Id(id) => *id,
            OwnerRef::Expanded(parent) => parent.id,
        }
    }

    /// Expanded details, when this reference carries them.
    pub fn expanded(&self) -> Option<&ParentSummary> {
        match self {
            OwnerRef::Id(_) => None,
            OwnerRef::Expanded(parent) => Some(parent),
        }
    }
}

/// A child registered by a parent. The ownership edge is set at creation and
/// never changes; there is no reparenting operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: ChildId,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub sport: String,
    pub notes: String,
    pub parent: OwnerRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    pub fn new(input: ChildInput, parent: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: ChildId::new(),
            name: input.name,
            age: input.age,
            gender: input.gender.unwrap_or_default(),
            sport: input.sport.unwrap_or_default(),
            notes: input.notes.unwrap_or_default(),
            parent: OwnerRef::Id(parent),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update payload; the ownership edge is untouched.
    pub fn apply(&mut self, input: ChildInput) {
        self.name = input.name;
        self.age = input.age;
        if let Some(gender) = input.gender {
            self.gender = gender;
        }
        if let Some(sport) = input.sport {
            self.sport = sport;
        }
        if let Some(notes) = input.notes {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
    }
}

/// Create/update payload for a child record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i32,
    pub gender: Option<Gender>,
    pub sport: Option<String>,
    pub notes: Option<String>,
}

impl ChildInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.age == 0 {
            return Err("Name and age are required".to_string());
        }
        if !(0..=18).contains(&self.age) {
            return Err("Age must be between 0 and 18".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_ref_normalizes_bare_id() {
        let parent = UserId::new();
        let child = Child::new(
            ChildInput {
                name: "Sam".to_string(),
                age: 10,
                gender: None,
                sport: None,
                notes: None,
            },
            parent,
        );
        assert_eq!(child.parent.id(), parent);
        assert!(child.parent.expanded().is_none());
    }

    #[test]
    fn test_owner_ref_normalizes_expanded_shape() {
        let parent = UserId::new();
        let owner = OwnerRef::Expanded(ParentSummary {
            id: parent,
            name: "Pat".to_string(),
            email: "pat@example.com".to_string(),
        });
        assert_eq!(owner.id(), parent);
        assert_eq!(owner.expanded().unwrap().email, "pat@example.com");
    }

    #[test]
    fn test_owner_ref_deserializes_both_shapes() {
        let parent = UserId::new();

        let bare: OwnerRef = serde_json::from_str(&format!("\"{parent}\"")).unwrap();
        assert_eq!(bare.id(), parent);

        let expanded: OwnerRef = serde_json::from_value(serde_json::json!({
            "id": parent.to_string(),
            "name": "Pat",
            "email": "pat@example.com",
        }))
        .unwrap();
        assert_eq!(expanded.id(), parent);
        assert_eq!(bare.id(), expanded.id());
    }

    #[test]
    fn test_input_validation() {
        let valid = ChildInput {
            name: "Sam".to_string(),
            age: 10,
            gender: None,
            sport: None,
            notes: None,
        };
        assert!(valid.validate().is_ok());

        let no_name = ChildInput {
            name: "".to_string(),
            age: 10,
            gender: None,
            sport: None,
            notes: None,
        };
        assert!(no_name.validate().is_err());

        let too_old = ChildInput {
            name: "Sam".to_string(),
            age: 19,
            gender: None,
            sport: None,
            notes: None,
        };
        assert_eq!(
            too_old.validate().unwrap_err(),
            "Age must be between 0 and 18"
        );
    }

    #[test]
    fn test_apply_preserves_ownership() {
        let parent = UserId::new();
        let mut child = Child::new(
            ChildInput {
                name: "Sam".to_string(),
                age: 10,
                gender: None,
                sport: Some("Soccer".to_string()),
                notes: None,
            },
            parent,
        );

        child.apply(ChildInput {
            name: "Samuel".to_string(),
            age: 11,
            gender: Some(Gender::Other),
            sport: None,
            notes: Some("sprained ankle in May".to_string()),
        });

        assert_eq!(child.name, "Samuel");
        assert_eq!(child.age, 11);
        assert_eq!(child.gender, Gender::Other);
        // Omitted fields keep their previous values.
        assert_eq!(child.sport, "Soccer");
        assert_eq!(child.parent.id(), parent);
    }
}
