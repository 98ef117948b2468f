// In-memory quiz cache.
// Holds the client-side mirror of quizzes, per-quiz questions and courses, plus the list request status.

use std::collections::{HashMap, HashSet};

use crate::api::{Course, Question, Quiz, QuizId};

/// Status of the quiz list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Loading => "loading",
            RequestStatus::Succeeded => "succeeded",
            RequestStatus::Failed => "failed",
        }
    }
}

/// How a fetched question list is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionFetch {
    /// Keep the first question for each distinct text, in server order.
    #[default]
    Deduplicate,
    /// Store the server's list as-is.
    Verbatim,
}

impl QuestionFetch {
    pub fn apply(self, questions: Vec<Question>) -> Vec<Question> {
        match self {
            QuestionFetch::Deduplicate => dedupe_by_text(questions),
            QuestionFetch::Verbatim => questions,
        }
    }
}

/// Drop questions whose text repeats an earlier one. Order is preserved.
pub fn dedupe_by_text(questions: Vec<Question>) -> Vec<Question> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|q| seen.insert(q.question.clone()))
        .collect()
}

/// Snapshot of everything the client knows about the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizCache {
    pub quizzes: Vec<Quiz>,
    /// Questions per quiz; a key exists once the quiz was fetched or had a question added.
    pub questions: HashMap<QuizId, Vec<Question>>,
    pub courses: Vec<Course>,
    pub status: RequestStatus,
    pub last_error: Option<String>,
}

impl QuizCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Questions cached for a quiz; unknown quizzes have none.
    pub fn questions_for(&self, quiz_id: &QuizId) -> &[Question] {
        self.questions
            .get(quiz_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Quizzes belonging to a course, in list order.
    pub fn quizzes_for_course(&self, course_id: &str) -> Vec<&Quiz> {
        self.quizzes
            .iter()
            .filter(|q| q.course_id == course_id)
            .collect()
    }

    pub fn quiz(&self, quiz_id: &QuizId) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| &q.id == quiz_id)
    }

    pub(crate) fn begin_quiz_fetch(&mut self) {
        self.status = RequestStatus::Loading;
    }

    pub(crate) fn quizzes_loaded(&mut self, quizzes: Vec<Quiz>) {
        self.status = RequestStatus::Succeeded;
        self.quizzes = quizzes;
        self.last_error = None;
    }

    pub(crate) fn quizzes_failed(&mut self, error: String) {
        self.status = RequestStatus::Failed;
        self.last_error = Some(error);
    }

    pub(crate) fn quiz_added(&mut self, quiz: Quiz) {
        self.quizzes.push(quiz);
    }

    /// Replace the cached quiz with the same id. Returns false if it isn't cached.
    pub(crate) fn quiz_updated(&mut self, quiz: Quiz) -> bool {
        match self.quizzes.iter().position(|q| q.id == quiz.id) {
            Some(index) => {
                self.quizzes[index] = quiz;
                true
            }
            None => false,
        }
    }

    pub(crate) fn quiz_removed(&mut self, quiz_id: &QuizId) -> bool {
        let before = self.quizzes.len();
        self.quizzes.retain(|q| &q.id != quiz_id);
        self.questions.remove(quiz_id);
        self.quizzes.len() != before
    }

    pub(crate) fn courses_loaded(&mut self, courses: Vec<Course>) {
        self.courses = courses;
    }

    /// Overwrite the quiz's question list.
    pub(crate) fn questions_loaded(&mut self, quiz_id: QuizId, questions: Vec<Question>) {
        self.questions.insert(quiz_id, questions);
    }

    pub(crate) fn question_added(&mut self, quiz_id: QuizId, question: Question) {
        self.questions.entry(quiz_id).or_default().push(question);
    }

    /// Replace a question in place. Returns false if the quiz or question isn't cached.
    pub(crate) fn question_updated(&mut self, quiz_id: &QuizId, question: Question) -> bool {
        let Some(list) = self.questions.get_mut(quiz_id) else {
            return false;
        };
        match list.iter_mut().find(|q| q.id == question.id) {
            Some(slot) => {
                *slot = question;
                true
            }
            None => false,
        }
    }

    /// Remove questions by id in one pass.
    ///
    /// Returns the number removed, or `None` if the quiz has no cached list.
    pub(crate) fn questions_removed(
        &mut self,
        quiz_id: &QuizId,
        ids: &HashSet<&str>,
    ) -> Option<usize> {
        let list = self.questions.get_mut(quiz_id)?;
        let before = list.len();
        list.retain(|q| !ids.contains(q.id.as_str()));
        Some(before - list.len())
    }
}
