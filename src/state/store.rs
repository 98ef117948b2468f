// Quiz cache store.
// Runs operations against the quiz service and applies their results to the shared cache.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, error, info, warn};

use crate::api::{Course, Question, QuestionDraft, Quiz, QuizDraft, QuizId, QuizService};
use crate::config::Config;
use crate::error::{QuizError, Result};
use crate::ids;
use crate::import;

use super::cache::{QuestionFetch, QuizCache, RequestStatus};

/// Client-side store mirroring the quiz service.
///
/// Every operation awaits the service, then applies its result to the cache
/// in one step, so a failure at any point leaves the cache as it was. Cache
/// updates are applied whether or not anyone is still subscribed.
///
/// Question mutations read the whole quiz, edit its question array and write it
/// back. They are serialized per quiz within a store, and each write carries
/// the version that was read; a version conflict from another writer triggers
/// a fresh read and retry.
pub struct QuizStore<S> {
    service: S,
    cache: watch::Sender<QuizCache>,
    quiz_locks: Mutex<HashMap<QuizId, Arc<AsyncMutex<()>>>>,
    fetch: QuestionFetch,
    max_conflict_retries: u32,
}

impl<S: QuizService> QuizStore<S> {
    /// Create a store with an empty cache.
    pub fn new(service: S, config: &Config) -> Self {
        let (cache, _) = watch::channel(QuizCache::new());
        Self {
            service,
            cache,
            quiz_locks: Mutex::new(HashMap::new()),
            fetch: config.question_fetch(),
            max_conflict_retries: config.max_conflict_retries,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn question_fetch(&self) -> QuestionFetch {
        self.fetch
    }

    /// Receive a fresh snapshot after every cache change.
    pub fn subscribe(&self) -> watch::Receiver<QuizCache> {
        self.cache.subscribe()
    }

    /// Copy of the current cache.
    pub fn snapshot(&self) -> QuizCache {
        self.cache.borrow().clone()
    }

    pub fn quizzes(&self) -> Vec<Quiz> {
        self.cache.borrow().quizzes.clone()
    }

    /// Cached quizzes for one course.
    pub fn quizzes_for_course(&self, course_id: &str) -> Vec<Quiz> {
        self.cache
            .borrow()
            .quizzes_for_course(course_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Cached questions for a quiz; empty if never fetched.
    pub fn questions(&self, quiz_id: &QuizId) -> Vec<Question> {
        self.cache.borrow().questions_for(quiz_id).to_vec()
    }

    pub fn courses(&self) -> Vec<Course> {
        self.cache.borrow().courses.clone()
    }

    pub fn status(&self) -> RequestStatus {
        self.cache.borrow().status
    }

    pub fn last_error(&self) -> Option<String> {
        self.cache.borrow().last_error.clone()
    }

    fn update<R>(&self, apply: impl FnOnce(&mut QuizCache) -> R) -> R {
        let mut result = None;
        self.cache.send_modify(|cache| result = Some(apply(cache)));
        // send_modify always runs the closure exactly once
        result.unwrap_or_else(|| unreachable!())
    }

    /// Replace the cached quiz list with the service's list.
    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        self.update(QuizCache::begin_quiz_fetch);

        match self.service.list_quizzes().await {
            Ok(quizzes) => {
                debug!(count = quizzes.len(), "quizzes loaded");
                self.update(|cache| cache.quizzes_loaded(quizzes.clone()));
                Ok(quizzes)
            }
            Err(e) => {
                warn!(error = %e, "failed to load quizzes");
                let payload = e.payload();
                self.update(|cache| cache.quizzes_failed(payload));
                Err(e)
            }
        }
    }

    /// Create a quiz and append the service's record to the cache.
    pub async fn create_quiz(&self, draft: &QuizDraft) -> Result<Quiz> {
        let quiz = self.service.create_quiz(draft).await?;
        info!(quiz_id = %quiz.id, course_id = %quiz.course_id, "quiz created");
        self.update(|cache| cache.quiz_added(quiz.clone()));
        Ok(quiz)
    }

    /// Replace a quiz record.
    ///
    /// A quiz missing from the cached list is written to the service but the
    /// cache is left as it was.
    pub async fn update_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        let lock = self.quiz_lock(&quiz.id);
        let _guard = lock.lock().await;

        let stored = self.service.replace_quiz(quiz).await?;
        if self.update(|cache| cache.quiz_updated(stored.clone())) {
            info!(quiz_id = %stored.id, "quiz updated");
        } else {
            debug!(quiz_id = %stored.id, "updated quiz not in cache");
        }
        Ok(stored)
    }

    /// Delete a quiz and drop it, with its questions, from the cache.
    pub async fn delete_quiz(&self, quiz_id: &QuizId) -> Result<()> {
        let lock = self.quiz_lock(quiz_id);
        let _guard = lock.lock().await;

        self.service.delete_quiz(quiz_id).await?;
        info!(quiz_id = %quiz_id, "quiz deleted");
        self.update(|cache| cache.quiz_removed(quiz_id));
        self.quiz_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(quiz_id);
        Ok(())
    }

    /// Replace the cached course list.
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses = self.service.list_courses().await?;
        debug!(count = courses.len(), "courses loaded");
        self.update(|cache| cache.courses_loaded(courses.clone()));
        Ok(courses)
    }

    /// Fetch a quiz's questions and overwrite the cached list.
    ///
    /// Under [`QuestionFetch::Deduplicate`] only the first question for each
    /// distinct text is kept.
    pub async fn list_questions(&self, quiz_id: &QuizId) -> Result<Vec<Question>> {
        let quiz = self.service.get_quiz(quiz_id).await?;
        let questions = self.fetch.apply(quiz.question_list().to_vec());
        debug!(quiz_id = %quiz_id, count = questions.len(), "questions loaded");

        self.update(|cache| {
            cache.quiz_updated(quiz);
            cache.questions_loaded(quiz_id.clone(), questions.clone());
        });
        Ok(questions)
    }

    /// Add a question under a freshly generated id.
    pub async fn create_question(&self, quiz_id: &QuizId, draft: QuestionDraft) -> Result<Question> {
        draft.validate()?;
        let question = draft.with_id(ids::question_id());

        let (stored, ()) = self
            .edit_questions(quiz_id, |list| {
                list.push(question.clone());
                Ok(())
            })
            .await?;

        info!(quiz_id = %quiz_id, question_id = %question.id, "question created");
        self.update(|cache| {
            cache.quiz_updated(stored);
            cache.question_added(quiz_id.clone(), question.clone());
        });
        Ok(question)
    }

    /// Replace a question, matched by id, keeping its position.
    pub async fn update_question(&self, quiz_id: &QuizId, question: Question) -> Result<Question> {
        question.validate()?;

        let (stored, ()) = self
            .edit_questions(quiz_id, |list| {
                match list.iter_mut().find(|q| q.id == question.id) {
                    Some(slot) => {
                        *slot = question.clone();
                        Ok(())
                    }
                    None => {
                        warn!(quiz_id = %quiz_id, question_id = %question.id, "question not found");
                        Err(QuizError::NotFound(format!(
                            "question {} in quiz {}",
                            question.id, quiz_id
                        )))
                    }
                }
            })
            .await?;

        info!(quiz_id = %quiz_id, question_id = %question.id, "question updated");
        self.update(|cache| {
            cache.quiz_updated(stored);
            cache.question_updated(quiz_id, question.clone());
        });
        Ok(question)
    }

    /// Delete one question.
    pub async fn delete_question(&self, quiz_id: &QuizId, question_id: &str) -> Result<()> {
        self.delete_questions(quiz_id, &[question_id.to_string()])
            .await
            .map(|_| ())
    }

    /// Delete several questions with a single write.
    ///
    /// Returns how many questions the service held that matched. An empty id
    /// list sends nothing.
    pub async fn delete_questions(&self, quiz_id: &QuizId, question_ids: &[String]) -> Result<usize> {
        if question_ids.is_empty() {
            return Ok(0);
        }
        let targets: HashSet<&str> = question_ids.iter().map(String::as_str).collect();

        let (stored, removed) = self
            .edit_questions(quiz_id, |list| {
                let before = list.len();
                list.retain(|q| !targets.contains(q.id.as_str()));
                Ok(before - list.len())
            })
            .await?;

        info!(quiz_id = %quiz_id, removed, "questions deleted");
        let cached = self.update(|cache| {
            cache.quiz_updated(stored);
            cache.questions_removed(quiz_id, &targets)
        });
        if cached.is_none() {
            error!(quiz_id = %quiz_id, "no cached question list for quiz; cache left unchanged");
        }
        Ok(removed)
    }

    /// Append questions parsed from CSV text, then refresh the cached list.
    ///
    /// Every row must pass validation before anything is written. Once rows
    /// are written, a failed refresh is logged and the count still returned.
    pub async fn import_questions(&self, quiz_id: &QuizId, csv: &str) -> Result<usize> {
        let imported = import::parse_questions(csv)?;
        for question in &imported {
            question.validate().map_err(|e| match e {
                QuizError::InvalidQuestion(reason) => {
                    QuizError::InvalidQuestion(format!("row {}: {}", question.id, reason))
                }
                other => other,
            })?;
        }

        let count = imported.len();
        if count > 0 {
            self.edit_questions(quiz_id, |list| {
                list.extend(imported.iter().cloned());
                Ok(())
            })
            .await?;
            info!(quiz_id = %quiz_id, count, "questions imported");
        }

        match self.list_questions(quiz_id).await {
            Ok(_) => Ok(count),
            Err(e) if count > 0 => {
                warn!(quiz_id = %quiz_id, error = %e, "imported questions but refresh failed");
                Ok(count)
            }
            Err(e) => Err(e),
        }
    }

    fn quiz_lock(&self, quiz_id: &QuizId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.quiz_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(quiz_id.clone()).or_default().clone()
    }

    /// Read-modify-write of a quiz's question array.
    ///
    /// Returns the stored record and the edit's outcome. The cache is not
    /// touched here.
    async fn edit_questions<T, F>(&self, quiz_id: &QuizId, mut edit: F) -> Result<(Quiz, T)>
    where
        F: FnMut(&mut Vec<Question>) -> Result<T> + Send,
        T: Send,
    {
        let lock = self.quiz_lock(quiz_id);
        let _guard = lock.lock().await;

        let mut attempt = 0;
        loop {
            let mut quiz = self.service.get_quiz(quiz_id).await?;
            let outcome = edit(quiz.question_list_mut())?;

            match self.service.replace_quiz(&quiz).await {
                Ok(stored) => return Ok((stored, outcome)),
                Err(QuizError::Conflict { .. }) if attempt < self.max_conflict_retries => {
                    attempt += 1;
                    warn!(quiz_id = %quiz_id, attempt, "quiz changed during write, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}
