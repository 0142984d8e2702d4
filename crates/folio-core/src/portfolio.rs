//! Portfolio records and the selectable catalog derived from them.
//!
//! The catalog is built once per session and never mutated afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FolioError, Result};
use crate::types::{Category, SelectableItem};

/// One role held by the portfolio owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRecord {
    pub id: String,
    /// Engagement type, e.g. "Internship".
    #[serde(default)]
    pub kind: String,
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub description: String,
}

/// One project in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tech: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

/// A named group of skills, e.g. "Languages".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<String>,
}

/// Static portfolio data the assistant answers questions about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub experience: Vec<ExperienceRecord>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub skills: Vec<SkillGroup>,
}

impl Portfolio {
    /// Load a portfolio from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let portfolio: Portfolio = serde_json::from_str(&content)?;
        portfolio.validate()?;
        info!(
            path = %path.display(),
            experience = portfolio.experience.len(),
            projects = portfolio.projects.len(),
            "Portfolio loaded"
        );
        Ok(portfolio)
    }

    /// Reject records that would produce ambiguous selections.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for id in self
            .experience
            .iter()
            .map(|e| &e.id)
            .chain(self.projects.iter().map(|p| &p.id))
        {
            if id.trim().is_empty() {
                return Err(FolioError::Portfolio("record with empty id".to_string()));
            }
            if !seen.insert(id.as_str()) {
                return Err(FolioError::Portfolio(format!("duplicate id {}", id)));
            }
        }
        Ok(())
    }

    /// Built-in sample portfolio used when no data file is configured.
    pub fn sample() -> Self {
        Self {
            name: "Your Name".to_string(),
            title: "AI/GenAI Engineer / FullStack".to_string(),
            email: "hello@example.com".to_string(),
            linkedin: "https://www.linkedin.com/in/your-name".to_string(),
            github: "https://github.com/your-name".to_string(),
            experience: vec![
                ExperienceRecord {
                    id: "e1".to_string(),
                    kind: "Internship".to_string(),
                    role: "AI Intern".to_string(),
                    company: "10xScale.ai".to_string(),
                    period: "06/2025 - 12/2025".to_string(),
                    description: "Led development of GenAI applications using LLMs. Built RAG systems and fine-tuned models for production use.".to_string(),
                },
                ExperienceRecord {
                    id: "e2".to_string(),
                    kind: "Internship".to_string(),
                    role: "FullStack Developer".to_string(),
                    company: "MDDTI Southern Railways, Bangalore".to_string(),
                    period: "06/2024 - 08/2024".to_string(),
                    description: "Developed machine learning models for recommendation systems.".to_string(),
                },
            ],
            projects: vec![
                ProjectRecord {
                    id: "p1".to_string(),
                    name: "Clean CSV".to_string(),
                    tech: "Python, LangGraph, FastAPI, React, Tailwind".to_string(),
                    description: "AI-powered web tool that cleans CSV and Excel files from plain English instructions.".to_string(),
                    period: Some("2025".to_string()),
                    github: None,
                },
                ProjectRecord {
                    id: "p2".to_string(),
                    name: "Custom LLM Fine-tuning".to_string(),
                    tech: "PyTorch, Transformers, LoRA".to_string(),
                    description: "Fine-tuned open-source LLMs for domain-specific tasks with 40% accuracy improvement.".to_string(),
                    period: None,
                    github: None,
                },
                ProjectRecord {
                    id: "p3".to_string(),
                    name: "Computer Vision Pipeline".to_string(),
                    tech: "TensorFlow, OpenCV, Docker".to_string(),
                    description: "Real-time object detection system processing 1000+ images/second.".to_string(),
                    period: None,
                    github: None,
                },
            ],
            skills: vec![
                SkillGroup {
                    category: "AI/ML".to_string(),
                    skills: vec!["LLMs", "RAG", "Fine-tuning", "Prompt Engineering", "LangChain"]
                        .into_iter()
                        .map(String::from)
                        .collect(),
                },
                SkillGroup {
                    category: "Languages".to_string(),
                    skills: vec!["Python", "JavaScript", "SQL"]
                        .into_iter()
                        .map(String::from)
                        .collect(),
                },
                SkillGroup {
                    category: "Tools".to_string(),
                    skills: vec!["Docker", "AWS", "Git", "Vector DBs"]
                        .into_iter()
                        .map(String::from)
                        .collect(),
                },
            ],
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Read-only set of selectable items, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    experiences: Vec<SelectableItem>,
    projects: Vec<SelectableItem>,
}

impl Catalog {
    pub fn new(experiences: Vec<SelectableItem>, projects: Vec<SelectableItem>) -> Self {
        Self {
            experiences,
            projects,
        }
    }

    /// Derive the catalog from portfolio records.
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let experiences = portfolio
            .experience
            .iter()
            .map(|exp| SelectableItem {
                category: Category::Experience,
                id: exp.id.clone(),
                label: format!("{} - {}", exp.company, exp.role),
                display_text: exp.company.clone(),
                period_or_meta: exp.period.clone(),
            })
            .collect();

        let projects = portfolio
            .projects
            .iter()
            .map(|proj| SelectableItem {
                category: Category::Project,
                id: proj.id.clone(),
                label: proj.name.clone(),
                display_text: proj.name.clone(),
                period_or_meta: proj.period.clone().unwrap_or_else(|| proj.tech.clone()),
            })
            .collect();

        Self::new(experiences, projects)
    }

    pub fn experiences(&self) -> &[SelectableItem] {
        &self.experiences
    }

    pub fn projects(&self) -> &[SelectableItem] {
        &self.projects
    }

    /// Experiences first, then projects.
    pub fn all(&self) -> Vec<SelectableItem> {
        self.experiences
            .iter()
            .chain(self.projects.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.experiences.len() + self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
