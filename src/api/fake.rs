// In-memory quiz service for tests.
// Mirrors the REST service's behavior, enforces version tokens and can inject failures.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::{QuizError, Result};

use super::service::QuizService;
use super::types::{Course, Deadline, Quiz, QuizDraft, QuizId, QuizStatus};

#[derive(Debug, Default)]
pub struct FakeService {
    quizzes: Mutex<Vec<Quiz>>,
    courses: Mutex<Vec<Course>>,
    next_id: AtomicUsize,
    /// Every call fails with a 503 while set.
    offline: AtomicBool,
    /// Number of upcoming `replace_quiz` calls that fail with a 500.
    failing_puts: AtomicUsize,
    /// Number of upcoming `replace_quiz` calls that lose a race to another writer.
    conflicting_puts: AtomicUsize,
    /// `get_quiz` calls after this many succeed fail with a 503.
    gets_allowed: Mutex<Option<usize>>,
    pub puts: AtomicUsize,
    pub gets: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quiz(self, quiz: Quiz) -> Self {
        self.quizzes.lock().unwrap().push(quiz);
        self
    }

    pub fn with_course(self, id: &str, name: &str) -> Self {
        self.courses.lock().unwrap().push(Course {
            course_id: id.to_string(),
            course_name: name.to_string(),
        });
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_next_puts(&self, count: usize) {
        self.failing_puts.store(count, Ordering::SeqCst);
    }

    pub fn conflict_next_puts(&self, count: usize) {
        self.conflicting_puts.store(count, Ordering::SeqCst);
    }

    pub fn fail_gets_after(&self, count: usize) {
        *self.gets_allowed.lock().unwrap() = Some(count);
    }

    /// Server-side copy of a quiz.
    pub fn stored(&self, id: &str) -> Option<Quiz> {
        self.quizzes
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id.as_str() == id)
            .cloned()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(QuizError::Service {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// Bare quiz record as the service would hold it.
pub fn quiz(id: &str, course_id: &str) -> Quiz {
    Quiz {
        id: QuizId::new(id),
        course_id: course_id.to_string(),
        course_name: format!("Course {}", course_id),
        teacher_name: "Ann".to_string(),
        deadline: None,
        status: QuizStatus::Active,
        questions: None,
        version: 0,
        extra: Default::default(),
    }
}

#[async_trait]
impl QuizService for FakeService {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        self.check_online()?;
        Ok(self.quizzes.lock().unwrap().clone())
    }

    async fn create_quiz(&self, draft: &QuizDraft) -> Result<Quiz> {
        self.check_online()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Quiz {
            id: QuizId::new(format!("Q{}", n)),
            course_id: draft.course_id.clone(),
            course_name: draft.course_name.clone(),
            teacher_name: draft.teacher_name.clone(),
            deadline: draft.deadline.map(Deadline::At),
            status: draft.status,
            questions: None,
            version: 0,
            extra: Default::default(),
        };
        self.quizzes.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get_quiz(&self, id: &QuizId) -> Result<Quiz> {
        self.check_online()?;
        let served = self.gets.fetch_add(1, Ordering::SeqCst);
        if self.gets_allowed.lock().unwrap().is_some_and(|allowed| served >= allowed) {
            return Err(QuizError::Service {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "read failed".to_string(),
            });
        }
        let found = self.stored(id.as_str());
        // Let concurrent callers interleave between read and write.
        tokio::task::yield_now().await;
        found.ok_or_else(|| QuizError::NotFound(format!("/quizzes/{}", id)))
    }

    async fn replace_quiz(&self, quiz: &Quiz) -> Result<Quiz> {
        self.check_online()?;
        tokio::task::yield_now().await;
        self.puts.fetch_add(1, Ordering::SeqCst);

        if Self::take(&self.failing_puts) {
            return Err(QuizError::Service {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "write failed".to_string(),
            });
        }

        let mut quizzes = self.quizzes.lock().unwrap();
        let stored = quizzes
            .iter_mut()
            .find(|q| q.id == quiz.id)
            .ok_or_else(|| QuizError::NotFound(format!("/quizzes/{}", quiz.id)))?;

        if Self::take(&self.conflicting_puts) {
            stored.version += 1;
        }
        if stored.version != quiz.version {
            return Err(QuizError::Conflict {
                quiz_id: quiz.id.to_string(),
            });
        }

        let mut next = quiz.clone();
        next.version = quiz.version + 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_quiz(&self, id: &QuizId) -> Result<()> {
        self.check_online()?;
        let mut quizzes = self.quizzes.lock().unwrap();
        let before = quizzes.len();
        quizzes.retain(|q| &q.id != id);
        if quizzes.len() == before {
            return Err(QuizError::NotFound(format!("/quizzes/{}", id)));
        }
        Ok(())
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        self.check_online()?;
        Ok(self.courses.lock().unwrap().clone())
    }
}
