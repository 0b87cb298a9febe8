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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use serde::Serialize;

use crate::error::Fallible;
use crate::study::check_score;
use crate::study::difficulty::DifficultyLevel;
use crate::study::topic_performance::TopicPerformance;
use crate::study::topic_performance::aggregate_by_topic;
use crate::types::document_id::DocumentId;
use crate::types::document_id::FlashcardId;
use crate::types::performance::PerformanceRecord;
use crate::types::plan::RevisionPlan;
use crate::types::quiz::QaPair;
use crate::types::timestamp::Timestamp;

/// Flashcards with at least this mastery count as mastered.
const MASTERED_THRESHOLD: f64 = 0.8;

pub type PlanId = i64;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub context_id: DocumentId,
    pub filename: String,
    pub text_length: usize,
    pub uploaded_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Flashcard {
    pub flashcard_id: FlashcardId,
    pub context_id: DocumentId,
    pub question: String,
    pub answer: String,
    pub topic: Option<String>,
    pub review_count: u32,
    pub mastery_level: f64,
    pub last_reviewed_at: Option<Timestamp>,
}

#[derive(Clone, Debug)]
pub struct QuizResult {
    pub document_id: DocumentId,
    pub topic: Option<String>,
    pub difficulty: DifficultyLevel,
    /// Fraction of questions answered correctly.
    pub score: f64,
    pub total_questions: usize,
    pub taken_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoredPlan {
    pub plan_id: PlanId,
    pub context_id: DocumentId,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub plan: RevisionPlan,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub total_quizzes: usize,
    /// `None` until a quiz has been taken.
    pub average_quiz_score: Option<f64>,
    pub total_flashcards: usize,
    pub mastered_flashcards: usize,
    pub topic_performance: TopicPerformance,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Store a document's text. Documents are keyed by their text, so adding
    /// the same text twice keeps the first upload and returns its id.
    pub fn add_document(&self, filename: &str, text: &str) -> Fallible<DocumentId> {
        let document_id = DocumentId::of_text(text);
        log::debug!("Adding document {filename}: {document_id}");
        let conn = self.acquire();
        let sql = "insert or ignore into documents (document_id, filename, text, uploaded_at) values (?, ?, ?, ?);";
        conn.execute(sql, (document_id, filename, text, Timestamp::now()))?;
        Ok(document_id)
    }

    pub fn get_document_text(&self, document_id: DocumentId) -> Fallible<Option<String>> {
        let conn = self.acquire();
        let sql = "select text from documents where document_id = ?;";
        let text = conn
            .query_row(sql, [document_id], |row| row.get(0))
            .optional()?;
        Ok(text)
    }

    pub fn list_documents(&self) -> Fallible<Vec<DocumentSummary>> {
        let conn = self.acquire();
        let sql = "select document_id, filename, length(text), uploaded_at from documents order by uploaded_at, document_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let text_length: i64 = row.get(2)?;
            documents.push(DocumentSummary {
                context_id: row.get(0)?,
                filename: row.get(1)?,
                text_length: usize::try_from(text_length)?,
                uploaded_at: row.get(3)?,
            });
        }
        Ok(documents)
    }

    /// Store generated flashcards, skipping any the document already has.
    /// Returns the stored version of every given pair.
    pub fn add_flashcards(
        &self,
        document_id: DocumentId,
        pairs: &[QaPair],
    ) -> Fallible<Vec<Flashcard>> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let mut ids = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let flashcard_id = FlashcardId::of_flashcard(document_id, &pair.q, &pair.a);
            let sql = "insert or ignore into flashcards (flashcard_id, document_id, question, answer, topic) values (?, ?, ?, ?, ?);";
            tx.execute(
                sql,
                (flashcard_id, document_id, &pair.q, &pair.a, &pair.topic),
            )?;
            ids.push(flashcard_id);
        }
        let cards = ids
            .into_iter()
            .map(|id| select_flashcard(&tx, id))
            .collect::<Fallible<Vec<Option<Flashcard>>>>()?;
        tx.commit()?;
        log::debug!("Stored {} flashcards for {document_id}.", cards.len());
        Ok(cards.into_iter().flatten().collect())
    }

    /// Record one review of a flashcard with a score in `[0, 1]`. Mastery is
    /// the mean of all review scores. Returns `None` if there is no such
    /// card.
    pub fn record_flashcard_review(
        &self,
        flashcard_id: FlashcardId,
        score: f64,
    ) -> Fallible<Option<Flashcard>> {
        check_score(&flashcard_id.to_hex(), score)?;
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let Some(card) = select_flashcard(&tx, flashcard_id)? else {
            return Ok(None);
        };
        let reviews = f64::from(card.review_count);
        let mastery = (card.mastery_level * reviews + score) / (reviews + 1.0);
        let sql = "update flashcards set review_count = review_count + 1, mastery_level = ?, last_reviewed_at = ? where flashcard_id = ?;";
        tx.execute(sql, (mastery, Timestamp::now(), flashcard_id))?;
        let card = select_flashcard(&tx, flashcard_id)?;
        tx.commit()?;
        Ok(card)
    }

    pub fn add_quiz_result(&self, result: &QuizResult) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "insert into quiz_results (document_id, topic, difficulty, score, total_questions, taken_at) values (?, ?, ?, ?, ?, ?);";
        conn.execute(
            sql,
            (
                result.document_id,
                &result.topic,
                result.difficulty,
                result.score,
                i64::try_from(result.total_questions)?,
                result.taken_at,
            ),
        )?;
        Ok(())
    }

    pub fn add_performance_record(
        &self,
        document_id: DocumentId,
        record: &PerformanceRecord,
    ) -> Fallible<()> {
        check_score(&record.topic, record.score)?;
        let conn = self.acquire();
        let sql = "insert into performance_records (document_id, topic, score, metric_kind, recorded_at) values (?, ?, ?, ?, ?);";
        conn.execute(
            sql,
            (
                document_id,
                &record.topic,
                record.score,
                record.metric_kind,
                record.recorded_at,
            ),
        )?;
        Ok(())
    }

    /// All performance records of a document, oldest first.
    pub fn performance_records(
        &self,
        document_id: DocumentId,
    ) -> Fallible<Vec<PerformanceRecord>> {
        let conn = self.acquire();
        let sql = "select topic, score, metric_kind, recorded_at from performance_records where document_id = ? order by record_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([document_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(PerformanceRecord {
                topic: row.get(0)?,
                score: row.get(1)?,
                metric_kind: row.get(2)?,
                recorded_at: row.get(3)?,
            });
        }
        Ok(records)
    }

    pub fn save_plan(&self, document_id: DocumentId, plan: &RevisionPlan) -> Fallible<PlanId> {
        let json = serde_json::to_string(plan)?;
        let conn = self.acquire();
        let sql = "insert into revision_plans (document_id, plan, created_at) values (?, ?, ?) returning plan_id;";
        let plan_id: PlanId =
            conn.query_row(sql, (document_id, json, Timestamp::now()), |row| row.get(0))?;
        log::debug!("Saved plan {plan_id} for {document_id}.");
        Ok(plan_id)
    }

    pub fn get_plan(&self, plan_id: PlanId) -> Fallible<Option<StoredPlan>> {
        let conn = self.acquire();
        let sql = "select document_id, plan, created_at from revision_plans where plan_id = ?;";
        let row = conn
            .query_row(sql, [plan_id], |row| {
                let document_id: DocumentId = row.get(0)?;
                let json: String = row.get(1)?;
                let created_at: Timestamp = row.get(2)?;
                Ok((document_id, json, created_at))
            })
            .optional()?;
        match row {
            Some((context_id, json, created_at)) => {
                let plan: RevisionPlan = serde_json::from_str(&json)?;
                Ok(Some(StoredPlan {
                    plan_id,
                    context_id,
                    created_at,
                    plan,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn performance_stats(&self, document_id: DocumentId) -> Fallible<PerformanceStats> {
        let records = self.performance_records(document_id)?;
        let topic_performance = aggregate_by_topic(&records)?;
        let conn = self.acquire();
        let sql = "select count(*), avg(score) from quiz_results where document_id = ?;";
        let (total_quizzes, average_quiz_score): (i64, Option<f64>) =
            conn.query_row(sql, [document_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let sql = "select count(*), coalesce(sum(mastery_level >= ?), 0) from flashcards where document_id = ?;";
        let (total_flashcards, mastered_flashcards): (i64, i64) = conn.query_row(
            sql,
            (MASTERED_THRESHOLD, document_id),
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(PerformanceStats {
            total_quizzes: usize::try_from(total_quizzes)?,
            average_quiz_score,
            total_flashcards: usize::try_from(total_flashcards)?,
            mastered_flashcards: usize::try_from(mastered_flashcards)?,
            topic_performance,
        })
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn select_flashcard(tx: &Transaction, flashcard_id: FlashcardId) -> Fallible<Option<Flashcard>> {
    let sql = "select flashcard_id, document_id, question, answer, topic, review_count, mastery_level, last_reviewed_at from flashcards where flashcard_id = ?;";
    let card = tx
        .query_row(sql, [flashcard_id], flashcard_from_row)
        .optional()?;
    Ok(card)
}

fn flashcard_from_row(row: &Row<'_>) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        flashcard_id: row.get(0)?,
        context_id: row.get(1)?,
        question: row.get(2)?,
        answer: row.get(3)?,
        topic: row.get(4)?,
        review_count: row.get(5)?,
        mastery_level: row.get(6)?,
        last_reviewed_at: row.get(7)?,
    })
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["documents"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::study::scheduler::RevisionScheduler;
    use crate::study::scheduler::SchedulerConfig;
    use crate::types::date::Date;
    use crate::types::performance::MetricKind;
    use crate::types::topic::Topic;

    fn open() -> Fallible<Database> {
        let dir = create_tmp_directory()?;
        let path = dir.join("studyaid.db");
        Database::new(&path.display().to_string())
    }

    fn pair(q: &str, a: &str, topic: &str) -> QaPair {
        QaPair {
            q: q.to_string(),
            a: a.to_string(),
            topic: Some(topic.to_string()),
        }
    }

    #[test]
    fn test_documents() -> Fallible<()> {
        let db = open()?;
        let id = db.add_document("cells.md", "Cells divide.")?;
        let again = db.add_document("copy.md", "Cells divide.")?;
        assert_eq!(id, again);
        assert_eq!(db.get_document_text(id)?, Some("Cells divide.".to_string()));
        let documents = db.list_documents()?;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].filename, "cells.md");
        assert_eq!(documents[0].text_length, 13);
        let missing = DocumentId::of_text("nothing");
        assert_eq!(db.get_document_text(missing)?, None);
        Ok(())
    }

    #[test]
    fn test_counts_are_read_as_integers() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("notes.txt", "Zellteilung ist schön.")?;
        db.add_document("other.txt", "Photosynthesis.")?;
        let documents = db.list_documents()?;
        assert_eq!(documents.len(), 2);
        let notes = documents.iter().find(|d| d.context_id == doc).unwrap();
        assert_eq!(notes.text_length, 22);

        db.add_quiz_result(&QuizResult {
            document_id: doc,
            topic: None,
            difficulty: DifficultyLevel::Easy,
            score: 0.25,
            total_questions: 8,
            taken_at: Timestamp::now(),
        })?;
        let pairs = [pair("Q1", "A1", "cells"), pair("Q2", "A2", "cells")];
        let cards = db.add_flashcards(doc, &pairs)?;
        db.record_flashcard_review(cards[0].flashcard_id, 0.8)?;
        db.record_flashcard_review(cards[1].flashcard_id, 0.5)?;

        let stats = db.performance_stats(doc)?;
        assert_eq!(stats.total_quizzes, 1);
        assert_eq!(stats.average_quiz_score, Some(0.25));
        assert_eq!(stats.total_flashcards, 2);
        assert_eq!(stats.mastered_flashcards, 1);
        Ok(())
    }

    #[test]
    fn test_schema_is_created_once() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("studyaid.db").display().to_string();
        let id = Database::new(&path)?.add_document("a.txt", "Alpha.")?;
        let db = Database::new(&path)?;
        assert_eq!(db.get_document_text(id)?, Some("Alpha.".to_string()));
        Ok(())
    }

    #[test]
    fn test_flashcard_reviews() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("bio.txt", "Biology.")?;
        let cards = db.add_flashcards(doc, &[pair("What divides?", "Cells.", "cells")])?;
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.review_count, 0);
        assert_eq!(card.mastery_level, 0.0);
        assert_eq!(card.last_reviewed_at, None);

        let reviewed = db.record_flashcard_review(card.flashcard_id, 1.0)?.unwrap();
        assert_eq!(reviewed.review_count, 1);
        assert_eq!(reviewed.mastery_level, 1.0);
        assert!(reviewed.last_reviewed_at.is_some());
        let reviewed = db.record_flashcard_review(card.flashcard_id, 0.0)?.unwrap();
        assert_eq!(reviewed.review_count, 2);
        assert_eq!(reviewed.mastery_level, 0.5);

        assert!(db.record_flashcard_review(card.flashcard_id, 1.5).is_err());
        let missing = FlashcardId::of_text("missing");
        assert_eq!(db.record_flashcard_review(missing, 1.0)?, None);
        Ok(())
    }

    #[test]
    fn test_duplicate_flashcards() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("bio.txt", "Biology.")?;
        let card = pair("Q", "A", "t");
        db.add_flashcards(doc, std::slice::from_ref(&card))?;
        let cards = db.add_flashcards(doc, &[card.clone(), card])?;
        assert_eq!(cards.len(), 2);
        assert_eq!(db.performance_stats(doc)?.total_flashcards, 1);
        Ok(())
    }

    #[test]
    fn test_performance_stats() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("math.txt", "Algebra and geometry.")?;
        let empty = db.performance_stats(doc)?;
        assert_eq!(empty.total_quizzes, 0);
        assert_eq!(empty.average_quiz_score, None);
        assert!(empty.topic_performance.is_empty());

        for score in [0.5, 1.0] {
            db.add_quiz_result(&QuizResult {
                document_id: doc,
                topic: Some("algebra".to_string()),
                difficulty: DifficultyLevel::Medium,
                score,
                total_questions: 4,
                taken_at: Timestamp::now(),
            })?;
        }
        db.add_performance_record(doc, &PerformanceRecord::new("algebra", 0.8, MetricKind::Quiz))?;
        db.add_performance_record(doc, &PerformanceRecord::new("algebra", 0.6, MetricKind::Quiz))?;
        db.add_performance_record(
            doc,
            &PerformanceRecord::new("geometry", 0.4, MetricKind::Flashcard),
        )?;
        let pairs = [pair("Q1", "A1", "algebra"), pair("Q2", "A2", "algebra")];
        let cards = db.add_flashcards(doc, &pairs)?;
        db.record_flashcard_review(cards[0].flashcard_id, 1.0)?;

        let stats = db.performance_stats(doc)?;
        assert_eq!(stats.total_quizzes, 2);
        assert_eq!(stats.average_quiz_score, Some(0.75));
        assert_eq!(stats.total_flashcards, 2);
        assert_eq!(stats.mastered_flashcards, 1);
        assert!((stats.topic_performance["algebra"] - 0.7).abs() < 1e-9);
        assert!((stats.topic_performance["geometry"] - 0.4).abs() < 1e-9);

        let records = db.performance_records(doc)?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].metric_kind, MetricKind::Flashcard);
        Ok(())
    }

    #[test]
    fn test_invalid_performance_record() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("x.txt", "X.")?;
        let record = PerformanceRecord::new("x", -0.1, MetricKind::Quiz);
        assert!(db.add_performance_record(doc, &record).is_err());
        assert!(db.performance_records(doc)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_plans() -> Fallible<()> {
        let db = open()?;
        let doc = db.add_document("phys.txt", "Optics.")?;
        let start = Date::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let schedule = RevisionScheduler::new(SchedulerConfig::default()).build_plan(
            &[Topic::new("optics", 6.0, "")],
            &TopicPerformance::new(),
            4,
            start,
        )?;
        let plan_id = db.save_plan(doc, &schedule.plan)?;
        let stored = db.get_plan(plan_id)?.unwrap();
        assert_eq!(stored.plan_id, plan_id);
        assert_eq!(stored.context_id, doc);
        assert_eq!(stored.plan, schedule.plan);
        assert_eq!(db.get_plan(plan_id + 1)?, None);
        Ok(())
    }
}
