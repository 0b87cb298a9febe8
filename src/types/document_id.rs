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

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;

/// A content-addressed identifier: the blake3 hash of some text.
///
/// Documents are identified by the hash of their extracted text, flashcards
/// by the hash of their document and content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ContentId {
    inner: blake3::Hash,
}

pub type DocumentId = ContentId;
pub type FlashcardId = ContentId;

impl ContentId {
    pub fn of_text(text: &str) -> Self {
        Self {
            inner: blake3::hash(text.as_bytes()),
        }
    }

    pub fn of_flashcard(document: DocumentId, question: &str, answer: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(document.inner.as_bytes());
        hasher.update(b"Flashcard");
        hasher.update(question.as_bytes());
        hasher.update(&[0]);
        hasher.update(answer.as_bytes());
        Self {
            inner: hasher.finalize(),
        }
    }

    pub fn to_hex(self) -> String {
        self.inner.to_hex().to_string()
    }

    pub fn from_hex(s: &str) -> Fallible<Self> {
        let inner =
            blake3::Hash::from_hex(s).map_err(|_| ErrorReport::new(format!("invalid id: {s}")))?;
        Ok(Self { inner })
    }
}

impl ToSql for ContentId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_hex()))
    }
}

impl FromSql for ContentId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        ContentId::from_hex(&string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl Display for ContentId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ContentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(deserializer)?;
        ContentId::from_hex(&string).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = ContentId::of_text("test");
        assert_eq!(
            id.to_string(),
            "4878ca0425c739fa427f7eda20fe845f6b2e46ba5fe2a14df5b1e32f50603215"
        );
    }

    #[test]
    fn test_hex_roundtrip() -> Fallible<()> {
        let id = ContentId::of_text("photosynthesis");
        assert_eq!(ContentId::from_hex(&id.to_hex())?, id);
        Ok(())
    }

    #[test]
    fn test_invalid_hex() {
        assert!(ContentId::from_hex("not-a-hash").is_err());
    }

    #[test]
    fn test_flashcard_ids_depend_on_document() {
        let a = ContentId::of_text("a");
        let b = ContentId::of_text("b");
        let q = "What is ATP?";
        let ans = "The energy currency of the cell.";
        assert_ne!(
            ContentId::of_flashcard(a, q, ans),
            ContentId::of_flashcard(b, q, ans)
        );
        assert_eq!(
            ContentId::of_flashcard(a, q, ans),
            ContentId::of_flashcard(a, q, ans)
        );
    }
}
