// Quiz service record types.
// Defines structs for (de)serializing quizzes, questions and courses on the wire.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{QuizError, Result};

/// Number of answer choices every question carries.
pub const ANSWER_COUNT: usize = 4;

/// Identifiers arrive as strings or numbers depending on the service; both become strings.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// Opaque quiz identifier assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuizId(String);

impl QuizId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for QuizId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        string_or_number(deserializer).map(QuizId)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuizId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for QuizId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Publication status of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Active,
    #[default]
    #[serde(other)]
    Draft,
}

impl QuizStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizStatus::Active => "active",
            QuizStatus::Draft => "draft",
        }
    }
}

impl std::str::FromStr for QuizStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(QuizStatus::Active),
            "draft" => Ok(QuizStatus::Draft),
            other => Err(format!("unknown quiz status {:?} (expected active or draft)", other)),
        }
    }
}

/// Deadlines as written by the browser form: `YYYY-MM-DDTHH:MM[:SS]`.
/// RFC 3339 timestamps and bare dates are read too. Missing or empty values
/// decode to `None`.
pub mod deadline {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::Deadline;

    const MINUTES: &str = "%Y-%m-%dT%H:%M";
    const SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
    const FRACTIONAL: &str = "%Y-%m-%dT%H:%M:%S%.f";
    const DATE: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, SECONDS)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, MINUTES))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, FRACTIONAL))
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
            .or_else(|| {
                NaiveDate::parse_from_str(raw, DATE)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    pub fn format(value: &NaiveDateTime) -> String {
        if value.second() == 0 && value.nanosecond() == 0 {
            value.format(MINUTES).to_string()
        } else {
            value.format(SECONDS).to_string()
        }
    }

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&format(dt)),
            None => serializer.serialize_str(""),
        }
    }

    /// Record deadlines never fail to decode; unreadable values are kept verbatim.
    pub fn deserialize_record<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Deadline>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(Deadline::from_raw(&s)),
            other => Some(Deadline::Raw(other.to_string())),
        })
    }

    pub fn serialize_record<S: Serializer>(
        value: &Option<Deadline>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(deadline) => serializer.serialize_str(&deadline.to_string()),
            None => serializer.serialize_str(""),
        }
    }
}

/// Deadline stored on a quiz record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deadline {
    At(NaiveDateTime),
    /// A value this client cannot read, written back unchanged.
    Raw(String),
}

impl Deadline {
    pub fn from_raw(raw: &str) -> Self {
        match deadline::parse(raw) {
            Some(dt) => Deadline::At(dt),
            None => Deadline::Raw(raw.to_string()),
        }
    }

    pub fn at(&self) -> Option<&NaiveDateTime> {
        match self {
            Deadline::At(dt) => Some(dt),
            Deadline::Raw(_) => None,
        }
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::At(dt) => f.write_str(&deadline::format(dt)),
            Deadline::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A quiz as stored by the service, including its embedded question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(
        rename = "Deadline",
        default,
        deserialize_with = "deadline::deserialize_record",
        serialize_with = "deadline::serialize_record"
    )]
    pub deadline: Option<Deadline>,
    #[serde(default)]
    pub status: QuizStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
    /// Optimistic-concurrency token; bumped on every whole-record write.
    #[serde(default)]
    pub version: u64,
    /// Fields this client does not model, carried through writes untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quiz {
    /// Embedded questions; a record without a `questions` field has none.
    pub fn question_list(&self) -> &[Question] {
        self.questions.as_deref().unwrap_or(&[])
    }

    /// Mutable access to the embedded questions, creating the list if absent.
    pub fn question_list_mut(&mut self) -> &mut Vec<Question> {
        self.questions.get_or_insert_with(Vec::new)
    }
}

/// Fields a teacher supplies when creating a quiz; the service assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub course_id: String,
    pub course_name: String,
    pub teacher_name: String,
    #[serde(rename = "Deadline", with = "deadline")]
    pub deadline: Option<NaiveDateTime>,
    pub status: QuizStatus,
}

/// A multiple-choice question owned by exactly one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
}

impl Question {
    /// Check the answer shape: exactly four choices, one of which is correct.
    pub fn validate(&self) -> Result<()> {
        validate_parts(&self.question, &self.answers, &self.correct_answer)
    }
}

/// Question content before an identifier is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDraft {
    pub fn validate(&self) -> Result<()> {
        validate_parts(&self.question, &self.answers, &self.correct_answer)
    }

    /// Attach an identifier, producing a storable question.
    pub fn with_id(self, id: String) -> Question {
        Question {
            id,
            question: self.question,
            answers: self.answers,
            correct_answer: self.correct_answer,
        }
    }
}

fn validate_parts(question: &str, answers: &[String], correct: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Err(QuizError::InvalidQuestion(
            "question text is empty".to_string(),
        ));
    }
    if answers.len() != ANSWER_COUNT {
        return Err(QuizError::InvalidQuestion(format!(
            "expected {} answers, got {}",
            ANSWER_COUNT,
            answers.len()
        )));
    }
    if !answers.iter().any(|a| a == correct) {
        return Err(QuizError::InvalidQuestion(format!(
            "correct answer {:?} is not one of the answers",
            correct
        )));
    }
    Ok(())
}

/// A course used to group quizzes. Read-only for this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    pub course_name: String,
}
