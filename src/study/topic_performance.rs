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

use std::collections::HashMap;

use crate::study::StudyError;
use crate::study::check_score;
use crate::types::performance::PerformanceRecord;

/// Average score per topic name.
pub type TopicPerformance = HashMap<String, f64>;

/// Average the scores of each topic. Topics without records are absent from
/// the result. Every score must lie in `[0, 1]`; the first one that does not
/// is reported rather than clamped.
pub fn aggregate_by_topic(records: &[PerformanceRecord]) -> Result<TopicPerformance, StudyError> {
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        check_score(&record.topic, record.score)?;
        let entry = sums.entry(record.topic.as_str()).or_insert((0.0, 0));
        entry.0 += record.score;
        entry.1 += 1;
    }
    let averages = sums
        .into_iter()
        .map(|(topic, (sum, count))| (topic.to_string(), sum / count as f64))
        .collect();
    Ok(averages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::performance::MetricKind;

    fn record(topic: &str, score: f64) -> PerformanceRecord {
        PerformanceRecord::new(topic, score, MetricKind::Quiz)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_average_per_topic() -> Result<(), StudyError> {
        let records = vec![
            record("algebra", 0.8),
            record("algebra", 0.6),
            record("geometry", 0.4),
        ];
        let perf = aggregate_by_topic(&records)?;
        assert_eq!(perf.len(), 2);
        assert!(approx(perf["algebra"], 0.7));
        assert!(approx(perf["geometry"], 0.4));
        assert!(!perf.contains_key("calculus"));
        Ok(())
    }

    #[test]
    fn test_empty_input() -> Result<(), StudyError> {
        assert!(aggregate_by_topic(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_mixed_metric_kinds() -> Result<(), StudyError> {
        let records = vec![
            record("biology", 1.0),
            PerformanceRecord::new("biology", 0.0, MetricKind::Flashcard),
        ];
        let perf = aggregate_by_topic(&records)?;
        assert!(approx(perf["biology"], 0.5));
        Ok(())
    }

    #[test]
    fn test_invalid_score() {
        let records = vec![record("algebra", 0.8), record("geometry", 1.5)];
        let result = aggregate_by_topic(&records);
        assert_eq!(
            result,
            Err(StudyError::InvalidScore {
                topic: "geometry".to_string(),
                score: 1.5
            })
        );
    }

    #[test]
    fn test_idempotent() -> Result<(), StudyError> {
        let records = vec![
            record("algebra", 0.3),
            record("history", 0.9),
            record("algebra", 0.6),
        ];
        let first = aggregate_by_topic(&records)?;
        let second = aggregate_by_topic(&records)?;
        assert_eq!(first, second);
        Ok(())
    }
}
