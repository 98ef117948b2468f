// Quiz service abstraction.
// The store talks to the data service only through this trait.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{Course, Quiz, QuizDraft, QuizId};

/// Remote data service holding quizzes, their embedded questions and courses.
///
/// Implementations report every failure as an `Err`; nothing here panics on a
/// bad response. Writes of a whole quiz are guarded by the record's `version`:
/// [`QuizService::replace_quiz`] must fail with
/// [`QuizError::Conflict`](crate::error::QuizError::Conflict) when the stored
/// version no longer matches the one the caller read.
#[async_trait]
pub trait QuizService: Send + Sync {
    /// `GET /quizzes`
    async fn list_quizzes(&self) -> Result<Vec<Quiz>>;

    /// `POST /quizzes`; returns the created record with its assigned id.
    async fn create_quiz(&self, draft: &QuizDraft) -> Result<Quiz>;

    /// `GET /quizzes/{id}`, including the embedded question array.
    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz>;

    /// `PUT /quizzes/{id}`; replaces the full record.
    ///
    /// `quiz.version` is the version the caller read. The stored record gets
    /// `version + 1` and is returned.
    async fn replace_quiz(&self, quiz: &Quiz) -> Result<Quiz>;

    /// `DELETE /quizzes/{id}`
    async fn delete_quiz(&self, id: &QuizId) -> Result<()>;

    /// `GET /courses`
    async fn list_courses(&self) -> Result<Vec<Course>>;
}

#[async_trait]
impl<T: QuizService + ?Sized> QuizService for std::sync::Arc<T> {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        (**self).list_quizzes().await
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> Result<Quiz> {
        (**self).create_quiz(draft).await
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz> {
        (**self).get_quiz(id).await
    }

    async fn replace_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        (**self).replace_quiz(quiz).await
    }

    async fn delete_quiz(&self, id: &QuizId) -> Result<()> {
        (**self).delete_quiz(id).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        (**self).list_courses().await
    }
}
