//! Quick topics: canned answers composed locally from portfolio data.
//!
//! These never reach the reasoning service and never touch the state token.

use std::sync::Arc;

use folio_core::Portfolio;

/// Shortcut offered while the session is ready and idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuickTopic {
    Experience,
    Projects,
    Skills,
    Contact,
}

impl QuickTopic {
    pub const ALL: [QuickTopic; 4] = [
        QuickTopic::Experience,
        QuickTopic::Projects,
        QuickTopic::Skills,
        QuickTopic::Contact,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuickTopic::Experience => "Experience",
            QuickTopic::Projects => "Projects",
            QuickTopic::Skills => "Skills",
            QuickTopic::Contact => "Contact",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|topic| topic.label().eq_ignore_ascii_case(raw))
    }

    /// User turn recorded for this shortcut.
    pub fn prompt(&self) -> String {
        format!("Tell me about {}", self.label().to_lowercase())
    }
}

/// Composes quick-topic answers from the portfolio.
#[derive(Debug, Clone)]
pub struct QuickAnswerer {
    portfolio: Arc<Portfolio>,
}

impl QuickAnswerer {
    pub fn new(portfolio: Arc<Portfolio>) -> Self {
        Self { portfolio }
    }

    pub fn answer(&self, topic: QuickTopic) -> String {
        let p = &self.portfolio;
        match topic {
            QuickTopic::Experience => {
                let roles: Vec<String> = p
                    .experience
                    .iter()
                    .map(|e| format!("{} at {} ({})\n{}", e.role, e.company, e.period, e.description))
                    .collect();
                format!("I have {} key roles:\n\n{}", roles.len(), roles.join("\n\n"))
            }
            QuickTopic::Projects => {
                let projects: Vec<String> = p
                    .projects
                    .iter()
                    .map(|proj| format!("• {}\nTech: {}\n{}", proj.name, proj.tech, proj.description))
                    .collect();
                format!("Here are my notable projects:\n\n{}", projects.join("\n\n"))
            }
            QuickTopic::Skills => {
                let groups: Vec<String> = p
                    .skills
                    .iter()
                    .map(|g| format!("{}: {}", g.category, g.skills.join(", ")))
                    .collect();
                format!("My technical skills:\n\n{}", groups.join("\n"))
            }
            QuickTopic::Contact => format!(
                "You can reach me at:\nEmail: {}\nLinkedIn: {}\nGitHub: {}",
                p.email, p.linkedin, p.github
            ),
        }
    }
}
