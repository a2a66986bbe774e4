//! CSV report builders.
//!
//! Parents export a per-child injury report; admins export platform-wide
//! children and injury dumps. Output opens cleanly in Excel, hence the BOM.

use chrono::{DateTime, Utc};

use crate::domains::children::models::Child;
use crate::domains::injuries::models::Injury;

const BOM: &str = "\u{feff}";

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Per-child injury report for the owning parent.
pub fn child_injury_report(child: &Child, injuries: &[Injury]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&row(&["Injury Report", &child.name]));
    out.push('\n');
    out.push_str(&row(&["Age", &child.age.to_string()]));
    out.push('\n');
    out.push_str(&row(&["Sport", &child.sport]));
    out.push('\n');
    out.push_str(&row(&["Generated", &date(Utc::now())]));
    out.push_str("\n\n");

    out.push_str(&row(&[
        "Date",
        "Type",
        "Location",
        "Severity",
        "Recovery Status",
        "Progress (%)",
        "Suggested Timeline (days)",
        "Notes",
    ]));
    out.push('\n');

    for injury in injuries {
        out.push_str(&row(&[
            &date(injury.date),
            &injury.kind,
            &injury.location,
            injury.severity.as_str(),
            injury.recovery_status.as_str(),
            &injury.recovery_status.progress_percentage().to_string(),
            &injury.suggested_timeline_days.to_string(),
            &injury.notes,
        ]));
        out.push('\n');
    }
    out
}

/// Platform-wide children dump for admins. Expects parent-expanded records.
pub fn admin_children_csv(children: &[Child]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&row(&[
        "Name",
        "Age",
        "Gender",
        "Sport",
        "Parent Name",
        "Parent Email",
        "Created",
    ]));
    out.push('\n');

    for child in children {
        let (parent_name, parent_email) = match child.parent.expanded() {
            Some(parent) => (parent.name.as_str(), parent.email.as_str()),
            None => ("", ""),
        };
        out.push_str(&row(&[
            &child.name,
            &child.age.to_string(),
            child.gender.as_str(),
            &child.sport,
            parent_name,
            parent_email,
            &date(child.created_at),
        ]));
        out.push('\n');
    }
    out
}

/// Platform-wide injuries dump for admins. Expects child-and-parent-expanded
/// records.
pub fn admin_injuries_csv(injuries: &[Injury]) -> String {
    let mut out = String::from(BOM);
    out.push_str(&row(&[
        "Child",
        "Parent Email",
        "Type",
        "Date",
        "Location",
        "Severity",
        "Recovery Status",
        "Suggested Timeline (days)",
        "Created",
    ]));
    out.push('\n');

    for injury in injuries {
        let child = injury.child.expanded();
        let child_name = child.map(|c| c.name.as_str()).unwrap_or("");
        let parent_email = child
            .and_then(|c| c.parent.expanded())
            .map(|p| p.email.as_str())
            .unwrap_or("");
        out.push_str(&row(&[
            child_name,
            parent_email,
            &injury.kind,
            &date(injury.date),
            &injury.location,
            injury.severity.as_str(),
            injury.recovery_status.as_str(),
            &injury.suggested_timeline_days.to_string(),
            &date(injury.created_at),
        ]));
        out.push('\n');
    }
    out
}
