// Command dispatch for the quizdesk CLI.
// Runs one command against the store and renders the resulting cache state as text.

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::Subcommand;

use crate::api::{
    Deadline, Question, QuestionDraft, Quiz, QuizDraft, QuizId, QuizService, QuizStatus, deadline,
};
use crate::error::{QuizError, Result};
use crate::state::QuizStore;

fn parse_deadline(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    deadline::parse(raw).ok_or_else(|| format!("expected YYYY-MM-DDTHH:MM, got {:?}", raw))
}

/// A single teacher action.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List quizzes, optionally only those of one course.
    Quizzes {
        #[arg(long)]
        course: Option<String>,
    },
    /// List courses.
    Courses,
    /// List the questions of a quiz.
    Questions { quiz_id: String },
    /// Create a quiz for a course.
    CreateQuiz {
        #[arg(long)]
        course: String,
        #[arg(long)]
        teacher: String,
        #[arg(long, value_parser = parse_deadline)]
        deadline: NaiveDateTime,
        #[arg(long, default_value = "draft")]
        status: QuizStatus,
    },
    /// Edit a quiz's teacher, deadline or status.
    UpdateQuiz {
        quiz_id: String,
        #[arg(long)]
        teacher: Option<String>,
        #[arg(long, value_parser = parse_deadline)]
        deadline: Option<NaiveDateTime>,
        #[arg(long)]
        status: Option<QuizStatus>,
    },
    /// Delete a quiz.
    DeleteQuiz { quiz_id: String },
    /// Add a question with four answers.
    AddQuestion {
        quiz_id: String,
        #[arg(long)]
        question: String,
        #[arg(long, num_args = 4, required = true)]
        answers: Vec<String>,
        #[arg(long)]
        correct: String,
    },
    /// Delete one or more questions in a single write.
    DeleteQuestions {
        quiz_id: String,
        #[arg(required = true)]
        question_ids: Vec<String>,
    },
    /// Append questions from a CSV file.
    Import { quiz_id: String, file: PathBuf },
}

/// Execute a command and write its output.
pub async fn run<S: QuizService>(
    store: &QuizStore<S>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Quizzes { course } => {
            store.list_quizzes().await?;
            let quizzes = match course.as_deref() {
                Some(course_id) => store.quizzes_for_course(course_id),
                None => store.quizzes(),
            };
            if quizzes.is_empty() {
                writeln!(out, "No quizzes")?;
            }
            for quiz in &quizzes {
                writeln!(out, "{}", quiz_line(quiz))?;
            }
        }
        Command::Courses => {
            for course in store.list_courses().await? {
                writeln!(out, "{}\t{}", course.course_id, course.course_name)?;
            }
        }
        Command::Questions { quiz_id } => {
            let questions = store.list_questions(&QuizId::new(quiz_id)).await?;
            if questions.is_empty() {
                writeln!(out, "No questions")?;
            }
            for question in &questions {
                write_question(out, question)?;
            }
        }
        Command::CreateQuiz {
            course,
            teacher,
            deadline,
            status,
        } => {
            let courses = store.list_courses().await?;
            let course_name = courses
                .iter()
                .find(|c| c.course_id == course)
                .map(|c| c.course_name.clone())
                .ok_or_else(|| QuizError::NotFound(format!("course {}", course)))?;

            let draft = QuizDraft {
                course_id: course,
                course_name,
                teacher_name: teacher,
                deadline: Some(deadline),
                status,
            };
            let quiz = store.create_quiz(&draft).await?;
            writeln!(out, "Created {}", quiz_line(&quiz))?;
        }
        Command::UpdateQuiz {
            quiz_id,
            teacher,
            deadline,
            status,
        } => {
            let id = QuizId::new(quiz_id);
            store.list_quizzes().await?;
            let mut quiz = store
                .snapshot()
                .quiz(&id)
                .cloned()
                .ok_or_else(|| QuizError::NotFound(format!("quiz {}", id)))?;

            if let Some(teacher) = teacher {
                quiz.teacher_name = teacher;
            }
            if let Some(deadline) = deadline {
                quiz.deadline = Some(Deadline::At(deadline));
            }
            if let Some(status) = status {
                quiz.status = status;
            }
            let quiz = store.update_quiz(&quiz).await?;
            writeln!(out, "Updated {}", quiz_line(&quiz))?;
        }
        Command::DeleteQuiz { quiz_id } => {
            store.delete_quiz(&QuizId::new(quiz_id.clone())).await?;
            writeln!(out, "Deleted quiz {}", quiz_id)?;
        }
        Command::AddQuestion {
            quiz_id,
            question,
            answers,
            correct,
        } => {
            let draft = QuestionDraft {
                question,
                answers,
                correct_answer: correct,
            };
            let question = store.create_question(&QuizId::new(quiz_id), draft).await?;
            writeln!(out, "Added question {}", question.id)?;
        }
        Command::DeleteQuestions {
            quiz_id,
            question_ids,
        } => {
            let id = QuizId::new(quiz_id);
            match question_ids.as_slice() {
                [single] => {
                    store.delete_question(&id, single).await?;
                    writeln!(out, "Deleted the question")?;
                }
                many => {
                    let removed = store.delete_questions(&id, many).await?;
                    writeln!(out, "Deleted {} questions", removed)?;
                }
            }
        }
        Command::Import { quiz_id, file } => {
            let csv = std::fs::read_to_string(&file)?;
            let count = store.import_questions(&QuizId::new(quiz_id), &csv).await?;
            writeln!(out, "Imported {} questions", count)?;
        }
    }
    Ok(())
}

fn quiz_line(quiz: &Quiz) -> String {
    let deadline = quiz
        .deadline
        .as_ref()
        .map(Deadline::to_string)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\t{}\t{}\t{}\t{} questions",
        quiz.id,
        quiz.course_name,
        quiz.teacher_name,
        deadline,
        quiz.status.as_str(),
        quiz.question_list().len()
    )
}

fn write_question(out: &mut impl Write, question: &Question) -> Result<()> {
    writeln!(out, "[{}] {}", question.id, question.question)?;
    for answer in &question.answers {
        let marker = if *answer == question.correct_answer { '*' } else { ' ' };
        writeln!(out, "  {} {}", marker, answer)?;
    }
    Ok(())
}
