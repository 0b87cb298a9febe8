// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Settings, read from `studyaid.toml` in the collection directory. Every
//! field is optional.

use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::study::scheduler::SchedulerConfig;

pub const CONFIG_FILE: &str = "studyaid.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub oracle: OracleConfig,
    pub planner: PlannerConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Context limit for flashcards, quizzes and questions.
    pub max_context_chars: usize,
    /// Context limit for topic extraction and plan narration.
    pub planner_context_chars: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
            max_context_chars: 8000,
            planner_context_chars: 5000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    #[serde(flatten)]
    pub schedule: SchedulerConfig,
    /// Exam date used when a request names none, in days from today.
    pub default_exam_offset_days: u32,
    pub max_horizon_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            schedule: SchedulerConfig::default(),
            default_exam_offset_days: 30,
            max_horizon_days: 365,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load the config file in `directory`, or the defaults if there is none.
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No config file at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        log::debug!("Loading config from {}.", path.display());
        let text = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&text)?;
        config.planner.validate()?;
        Ok(config)
    }
}

impl PlannerConfig {
    /// Break days fall on every sixth or seventh day, and review intervals
    /// must actually grow.
    fn validate(&self) -> Fallible<()> {
        let schedule = &self.schedule;
        if !(6..=7).contains(&schedule.break_every) {
            return fail(format!(
                "planner.break_every must be 6 or 7, got {}.",
                schedule.break_every
            ));
        }
        if schedule.spacing_factor < 2 {
            return fail(format!(
                "planner.spacing_factor must be at least 2, got {}.",
                schedule.spacing_factor
            ));
        }
        if schedule.daily_budget_minutes == 0 {
            return fail("planner.daily_budget_minutes must be positive.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() -> Fallible<()> {
        let dir = tempdir()?;
        let config = Config::load(dir.path())?;
        assert_eq!(config, Config::default());
        assert_eq!(config.planner.schedule.daily_budget_minutes, 120);
        assert_eq!(config.server.port, 8000);
        Ok(())
    }

    #[test]
    fn test_partial_file() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[oracle]\nmodel = \"gpt-4o\"\n\n[planner]\ndaily_budget_minutes = 90\nmax_horizon_days = 60\n",
        )?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.oracle.model, "gpt-4o");
        assert_eq!(config.oracle.max_context_chars, 8000);
        assert_eq!(config.planner.schedule.daily_budget_minutes, 90);
        assert_eq!(config.planner.schedule.break_every, 7);
        assert_eq!(config.planner.max_horizon_days, 60);
        assert_eq!(config.planner.default_exam_offset_days, 30);
        assert_eq!(config.server, ServerConfig::default());
        Ok(())
    }

    #[test]
    fn test_break_day_every_sixth_day() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE), "[planner]\nbreak_every = 6\n")?;
        let config = Config::load(dir.path())?;
        assert_eq!(config.planner.schedule.break_every, 6);
        Ok(())
    }

    #[test]
    fn test_rejects_schedule_without_break_days() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE), "[planner]\nbreak_every = 0\n")?;
        let err = Config::load(dir.path()).unwrap_err();
        assert_eq!(err.message(), "planner.break_every must be 6 or 7, got 0.");
        Ok(())
    }

    #[test]
    fn test_rejects_flat_spacing() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE), "[planner]\nspacing_factor = 1\n")?;
        let err = Config::load(dir.path()).unwrap_err();
        assert_eq!(err.message(), "planner.spacing_factor must be at least 2, got 1.");
        Ok(())
    }

    #[test]
    fn test_rejects_empty_budget() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[planner]\ndaily_budget_minutes = 0\n",
        )?;
        assert!(Config::load(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_file() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(CONFIG_FILE), "[server]\nport = \"eighty\"\n")?;
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
        Ok(())
    }
}
