// CSV question import.
// Parses `id,question,answers,correctAnswer` rows; answers are `;`-separated within their cell.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::api::Question;
use crate::error::{QuizError, Result};
use crate::ids;

const REQUIRED_COLUMNS: [&str; 4] = ["id", "question", "answers", "correctAnswer"];

/// Column positions resolved from the header row.
struct Columns {
    id: usize,
    question: usize,
    answers: usize,
    correct_answer: usize,
    width: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| QuizError::Csv {
                    line: 1,
                    reason: format!("missing required column {:?}", name),
                })
        };

        Ok(Self {
            id: find(REQUIRED_COLUMNS[0])?,
            question: find(REQUIRED_COLUMNS[1])?,
            answers: find(REQUIRED_COLUMNS[2])?,
            correct_answer: find(REQUIRED_COLUMNS[3])?,
            width: headers.len(),
        })
    }
}

fn csv_error(e: csv::Error) -> QuizError {
    let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
    QuizError::Csv {
        line,
        reason: e.to_string(),
    }
}

fn record_line(record: &StringRecord) -> usize {
    record.position().map(|p| p.line() as usize).unwrap_or(0)
}

/// Parse CSV text into questions.
///
/// Column order comes from the header row. Rows with fewer cells than the
/// header are skipped, as are blank lines. Rows with an empty `id` get a
/// generated identifier. Answer-shape validation is left to the caller.
pub fn parse_questions(csv: &str) -> Result<Vec<Question>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv.as_bytes());

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut questions = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        if record.len() < columns.width {
            debug!(line = record_line(&record), "skipping incomplete CSV row");
            continue;
        }

        let id = match &record[columns.id] {
            "" => ids::question_id(),
            id => id.to_string(),
        };

        questions.push(Question {
            id,
            question: record[columns.question].to_string(),
            answers: record[columns.answers]
                .split(';')
                .map(|a| a.trim().to_string())
                .collect(),
            correct_answer: record[columns.correct_answer].to_string(),
        });
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_in_header_order() {
        let csv = "question,id,correctAnswer,answers\n\
                   Capital of France?,q1,Paris,Paris;Rome;Berlin;Madrid\n";

        let questions = parse_questions(csv).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[0].question, "Capital of France?");
        assert_eq!(questions[0].answers, vec!["Paris", "Rome", "Berlin", "Madrid"]);
        assert_eq!(questions[0].correct_answer, "Paris");
        assert!(questions[0].validate().is_ok());
    }

    #[test]
    fn test_quoted_cell_with_comma() {
        let csv = "id,question,answers,correctAnswer\n\
                   q1,\"Which, of these?\",a;b;c;d,a\n\
                   q2,\"Say \"\"hi\"\"\",\"x, y;z;w;v\",z\n";

        let questions = parse_questions(csv).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question, "Which, of these?");
        assert_eq!(questions[0].answers, vec!["a", "b", "c", "d"]);
        assert_eq!(questions[0].correct_answer, "a");
        assert_eq!(questions[1].question, "Say \"hi\"");
        assert_eq!(questions[1].answers, vec!["x, y", "z", "w", "v"]);
    }

    #[test]
    fn test_skips_short_and_blank_rows() {
        let csv = "id,question,answers,correctAnswer\r\n\
                   q1,One?,a;b;c;d,a\r\n\
                   q2,Two?\r\n\
                   \r\n\
                   q3,Three?,a;b;c;d,d\r\n";

        let questions = parse_questions(csv).unwrap();
        let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q3"]);
        assert_eq!(questions[1].correct_answer, "d");
    }

    #[test]
    fn test_empty_id_is_generated() {
        let csv = "id,question,answers,correctAnswer\n,Why?,a;b;c;d,b\n";
        let questions = parse_questions(csv).unwrap();
        assert_eq!(questions.len(), 1);
        assert!(!questions[0].id.is_empty());
    }

    #[test]
    fn test_missing_column_is_error() {
        let csv = "id,question,answers\nq1,One?,a;b;c;d\n";
        let err = parse_questions(csv).unwrap_err();
        assert!(matches!(err, QuizError::Csv { line: 1, .. }));

        assert!(parse_questions("").is_err());
    }
}
