//! Application-level configuration loading, including the runtime badge catalogue.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "EUROLYTICS_BACK_CONFIG_PATH";

/// Threshold an activity aggregate must meet for a badge to unlock.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRequirement {
    /// Submitted at least this many ideas, in any review status.
    MinIdeas(u32),
    /// At least this many ideas approved by a reviewer.
    MinApprovedIdeas(u32),
    /// Completed at least this many quiz attempts.
    MinCompletedQuizzes(u32),
    /// Holds an all-time ranking position at or above this rank.
    TopRank(u32),
}

/// One badge definition from the catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeRule {
    /// Stable identifier used by clients.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// One-line description shown on the profile page.
    pub description: String,
    /// Icon identifier understood by the frontend.
    pub icon: String,
    /// Unlock threshold.
    pub requirement: BadgeRequirement,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    badges: Vec<BadgeRule>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the baked-in badge catalogue.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config = Self { badges: raw.badges };
                    info!(
                        path = %path.display(),
                        count = app_config.badges.len(),
                        "loaded badge catalogue from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Badge catalogue in display order.
    pub fn badges(&self) -> &[BadgeRule] {
        &self.badges
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            badges: default_badges(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    badges: Vec<BadgeRule>,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in badge catalogue shipped with the binary.
fn default_badges() -> Vec<BadgeRule> {
    vec![
        BadgeRule {
            slug: "first-idea".into(),
            name: "First Idea".into(),
            description: "Submitted a first idea to the portal".into(),
            icon: "lightbulb".into(),
            requirement: BadgeRequirement::MinIdeas(1),
        },
        BadgeRule {
            slug: "quiz-master".into(),
            name: "Quiz Master".into(),
            description: "Completed three or more quizzes".into(),
            icon: "graduation-cap".into(),
            requirement: BadgeRequirement::MinCompletedQuizzes(3),
        },
        BadgeRule {
            slug: "innovator".into(),
            name: "Innovator".into(),
            description: "Had three or more ideas approved".into(),
            icon: "rocket".into(),
            requirement: BadgeRequirement::MinApprovedIdeas(3),
        },
        BadgeRule {
            slug: "collaborator".into(),
            name: "Collaborator".into(),
            description: "Submitted ten or more ideas".into(),
            icon: "users".into(),
            requirement: BadgeRequirement::MinIdeas(10),
        },
        BadgeRule {
            slug: "leader".into(),
            name: "Leader".into(),
            description: "Holds a top-five position in the all-time ranking".into(),
            icon: "trophy".into(),
            requirement: BadgeRequirement::TopRank(5),
        },
    ]
}
