//! Built-in recovery assistant.
//!
//! Rule-based: answers from the same timeline table the injury form uses and
//! always steers urgent symptoms toward a clinician. No external model calls.

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::injuries::timelines;
use crate::kernel::traits::{BaseAssistant, ChatMessage};

const DISCLAIMER: &str =
    "This is general information, not medical advice. For diagnosis or treatment, \
     please talk to your child's doctor or athletic trainer.";

const RED_FLAGS: [&str; 6] = [
    "numb",
    "can't move",
    "cannot move",
    "severe pain",
    "vomit",
    "unconscious",
];

pub struct SafetyAssistant;

#[async_trait]
impl BaseAssistant for SafetyAssistant {
    async fn reply(&self, messages: &[ChatMessage]) -> Result<String> {
        let question = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        if RED_FLAGS.iter().any(|flag| question.contains(flag)) {
            return Ok(format!(
                "Those symptoms can be signs of something serious. Please seek medical \
                 care right away rather than waiting it out. {DISCLAIMER}"
            ));
        }

        for (kind, days) in timelines::all() {
            if question.contains(&kind.to_lowercase()) {
                return Ok(format!(
                    "A typical {} takes around {} days of recovery before a gradual \
                     return to play, starting with rest and easing back through light \
                     activity as symptoms allow. {DISCLAIMER}",
                    kind.to_lowercase(),
                    days
                ));
            }
        }

        Ok(format!(
            "Recovery works best in stages: rest until pain settles, reintroduce light \
             activity, and only return to full play once your child moves comfortably \
             without symptoms. {DISCLAIMER}"
        ))
    }
}
