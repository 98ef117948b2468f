// Quiz service endpoint functions.
// Provides typed methods for the quiz REST API and wires them into `QuizService`.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{QuizError, Result};

use super::client::QuizClient;
use super::service::QuizService;
use super::types::{Course, Quiz, QuizDraft, QuizId};

fn quiz_path(id: &QuizId) -> String {
    format!("/quizzes/{}", id)
}

impl QuizClient {
    /// Get every quiz.
    pub async fn get_quizzes(&self) -> Result<Vec<Quiz>> {
        let response = self.get("/quizzes").await?;
        let quizzes: Vec<Quiz> = response.json().await?;
        Ok(quizzes)
    }

    /// Create a quiz from a draft.
    pub async fn post_quiz(&self, draft: &QuizDraft) -> Result<Quiz> {
        let response = self.post("/quizzes", draft).await?;
        let quiz: Quiz = response.json().await?;
        Ok(quiz)
    }

    /// Get a single quiz with its questions.
    pub async fn get_quiz_record(&self, id: &QuizId) -> Result<Quiz> {
        let response = self.get(&quiz_path(id)).await?;
        let quiz: Quiz = response.json().await?;
        Ok(quiz)
    }

    /// Replace a quiz, guarded by the version the caller read.
    pub async fn put_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        let mut next = quiz.clone();
        next.version = quiz.version + 1;

        let response = self
            .put(&quiz_path(&quiz.id), &next, Some(quiz.version))
            .await
            .map_err(|e| match e {
                QuizError::Service { status, .. }
                    if status == StatusCode::CONFLICT
                        || status == StatusCode::PRECONDITION_FAILED =>
                {
                    QuizError::Conflict {
                        quiz_id: quiz.id.to_string(),
                    }
                }
                other => other,
            })?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(next);
        }
        let stored: Quiz = serde_json::from_str(&text)?;
        Ok(stored)
    }

    /// Delete a quiz.
    pub async fn remove_quiz(&self, id: &QuizId) -> Result<()> {
        self.delete(&quiz_path(id)).await?;
        Ok(())
    }

    /// Get every course.
    pub async fn get_courses(&self) -> Result<Vec<Course>> {
        let response = self.get("/courses").await?;
        let courses: Vec<Course> = response.json().await?;
        Ok(courses)
    }
}

#[async_trait]
impl QuizService for QuizClient {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        self.get_quizzes().await
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> Result<Quiz> {
        self.post_quiz(draft).await
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz> {
        self.get_quiz_record(id).await
    }

    async fn replace_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        self.put_quiz(quiz).await
    }

    async fn delete_quiz(&self, id: &QuizId) -> Result<()> {
        self.remove_quiz(id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.get_courses().await
    }
}
