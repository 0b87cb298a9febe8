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

//! Spaced-repetition revision planning.
//!
//! Every topic gets a priority weight, `weight * (1 - mastery)`, where
//! mastery defaults to 0.5 for topics with no recorded performance. The
//! priorities are normalized into time shares, and each topic's share of the
//! daily budget becomes its study block.
//!
//! Days are filled one at a time. A topic is due on day 1, and after its
//! `n`-th review it is not due again for `spacing_factor^(n - 1)` days.
//! Each day takes the due topics in priority order while their blocks fit
//! the daily budget. Every `break_every`-th day is a light review day that
//! only revisits already-studied high-focus topics. A day with nothing to
//! do is a rest day.

use serde::Deserialize;

use crate::study::PlanAdvisory;
use crate::study::StudyError;
use crate::study::check_score;
use crate::study::topic_performance::TopicPerformance;
use crate::types::date::Date;
use crate::types::plan::DayKind;
use crate::types::plan::Focus;
use crate::types::plan::RevisionDayPlan;
use crate::types::plan::RevisionPlan;
use crate::types::plan::TopicAllocation;
use crate::types::topic::Topic;

/// Assumed mastery of a topic with no recorded performance.
const NEUTRAL_MASTERY: f64 = 0.5;

/// Light review days get this fraction of the daily budget, and each topic
/// this fraction of its usual block.
const LIGHT_REVIEW_DIVISOR: u32 = 4;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ceiling on study minutes per day.
    pub daily_budget_minutes: u32,
    /// Every n-th day is a light review day. Zero disables them.
    pub break_every: u32,
    /// Growth factor of the review interval.
    pub spacing_factor: u32,
    /// Smallest block of time a topic is given on a study day.
    pub min_block_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            daily_budget_minutes: 120,
            break_every: 7,
            spacing_factor: 2,
            min_block_minutes: 15,
        }
    }
}

/// A plan, plus anything the caller should know about how it was built.
#[derive(Clone, Debug)]
pub struct Schedule {
    pub plan: RevisionPlan,
    pub advisory: Option<PlanAdvisory>,
}

pub struct RevisionScheduler {
    config: SchedulerConfig,
}

/// Scheduling state for one topic.
struct Candidate<'a> {
    name: &'a str,
    focus: Focus,
    block_minutes: u32,
    reviews: u32,
    next_due: u32,
}

impl RevisionScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Lay out `horizon_days` days of revision starting on `start_date`.
    ///
    /// The summary is left empty: narrating the plan is up to the caller.
    pub fn build_plan(
        &self,
        topics: &[Topic],
        performance: &TopicPerformance,
        horizon_days: i64,
        start_date: Date,
    ) -> Result<Schedule, StudyError> {
        if horizon_days < 1 {
            return Err(StudyError::InvalidHorizon(horizon_days));
        }
        let horizon =
            u32::try_from(horizon_days).map_err(|_| StudyError::InvalidHorizon(horizon_days))?;
        for (topic, score) in performance {
            check_score(topic, *score)?;
        }

        let mut candidates = self.rank(topics, performance);
        let advisory = if candidates.is_empty() {
            Some(PlanAdvisory::DegeneratePlan)
        } else {
            None
        };

        let days = (1..=horizon)
            .map(|day| {
                let date = start_date.plus_days(u64::from(day - 1));
                if candidates.is_empty() {
                    rest_day(day, date)
                } else if self.is_light_day(day) {
                    self.light_day(day, date, &candidates)
                } else {
                    self.study_day(day, date, &mut candidates)
                }
            })
            .collect();

        let plan = RevisionPlan {
            days,
            summary: String::new(),
            exam_date: start_date.plus_days(u64::from(horizon)),
            horizon_days: horizon,
        };
        Ok(Schedule { plan, advisory })
    }

    /// Compute priorities, time blocks and focus tiers, and return the topics
    /// ordered from highest to lowest priority. Ties keep input order.
    fn rank<'a>(
        &self,
        topics: &'a [Topic],
        performance: &TopicPerformance,
    ) -> Vec<Candidate<'a>> {
        let priorities: Vec<f64> = topics
            .iter()
            .map(|topic| {
                let mastery = performance
                    .get(&topic.name)
                    .copied()
                    .unwrap_or(NEUTRAL_MASTERY);
                topic.weight * (1.0 - mastery)
            })
            .collect();
        let total: f64 = priorities.iter().sum();
        let budget = self.config.daily_budget_minutes;

        let mut order: Vec<usize> = (0..topics.len()).collect();
        order.sort_by(|a, b| priorities[*b].total_cmp(&priorities[*a]));

        let count = topics.len();
        order
            .into_iter()
            .enumerate()
            .map(|(rank, index)| {
                let share = if total > 0.0 {
                    priorities[index] / total
                } else {
                    1.0 / count as f64
                };
                let block = (share * f64::from(budget)).round() as u32;
                Candidate {
                    name: &topics[index].name,
                    focus: focus_for_rank(rank, count),
                    block_minutes: block.max(self.config.min_block_minutes).min(budget),
                    reviews: 0,
                    next_due: 1,
                }
            })
            .collect()
    }

    fn is_light_day(&self, day: u32) -> bool {
        self.config.break_every > 0 && day % self.config.break_every == 0
    }

    fn study_day(&self, day: u32, date: Date, candidates: &mut [Candidate]) -> RevisionDayPlan {
        let budget = self.config.daily_budget_minutes;
        let mut used = 0;
        let mut allocations = Vec::new();
        for candidate in candidates.iter_mut() {
            if candidate.next_due > day || used + candidate.block_minutes > budget {
                continue;
            }
            used += candidate.block_minutes;
            candidate.reviews += 1;
            candidate.next_due = day.saturating_add(self.interval(candidate.reviews));
            allocations.push(TopicAllocation {
                topic: candidate.name.to_string(),
                minutes: candidate.block_minutes,
                focus: candidate.focus,
            });
        }
        if allocations.is_empty() {
            return rest_day(day, date);
        }
        let focus = allocations
            .iter()
            .map(|a| a.focus)
            .max()
            .unwrap_or(Focus::Low);
        day_plan(day, date, DayKind::Study, focus, allocations)
    }

    /// Light reinforcement of the high-focus topics already studied. Never
    /// introduces a topic, and does not advance any topic's spacing.
    fn light_day(&self, day: u32, date: Date, candidates: &[Candidate]) -> RevisionDayPlan {
        let ceiling = self.config.daily_budget_minutes / LIGHT_REVIEW_DIVISOR;
        let mut used = 0;
        let mut allocations = Vec::new();
        for candidate in candidates {
            if candidate.reviews == 0 || candidate.focus != Focus::High {
                continue;
            }
            let minutes = (candidate.block_minutes / LIGHT_REVIEW_DIVISOR).max(1);
            if used + minutes > ceiling {
                continue;
            }
            used += minutes;
            allocations.push(TopicAllocation {
                topic: candidate.name.to_string(),
                minutes,
                focus: Focus::Low,
            });
        }
        if allocations.is_empty() {
            return rest_day(day, date);
        }
        day_plan(day, date, DayKind::Review, Focus::Low, allocations)
    }

    /// Days until a topic is due again after its `reviews`-th review.
    fn interval(&self, reviews: u32) -> u32 {
        self.config
            .spacing_factor
            .max(1)
            .saturating_pow(reviews.saturating_sub(1))
    }
}

/// Top third of the ranking is high focus, middle third medium, bottom
/// third low.
fn focus_for_rank(rank: usize, count: usize) -> Focus {
    match rank * 3 / count {
        0 => Focus::High,
        1 => Focus::Medium,
        _ => Focus::Low,
    }
}

fn day_plan(
    day: u32,
    date: Date,
    kind: DayKind,
    focus: Focus,
    allocations: Vec<TopicAllocation>,
) -> RevisionDayPlan {
    RevisionDayPlan {
        day,
        date,
        topics: allocations.iter().map(|a| a.topic.clone()).collect(),
        duration_minutes: allocations.iter().map(|a| a.minutes).sum(),
        focus,
        kind,
        allocations,
    }
}

fn rest_day(day: u32, date: Date) -> RevisionDayPlan {
    day_plan(day, date, DayKind::Rest, Focus::Low, Vec::new())
}
