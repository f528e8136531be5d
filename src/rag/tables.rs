//! CSV tables as documents, one per row
//!
//! Tables with `question` and `answer` columns are read as Q&A pairs:
//! each row becomes `Q: ...\nA: ...` with its `source` and `focus_area`
//! kept as metadata. Any other table renders each row as
//! `column: value | column: value`.

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;

use crate::errors::HealthRagError;
use crate::errors::Result;
use crate::models::Metadata;

/// Source recorded for Q&A rows that do not name one
pub const DEFAULT_QA_SOURCE: &str = "medquad";

/// One table row ready to be added as a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub content: String,
    pub metadata: Metadata,
}

struct QaColumns {
    question: usize,
    answer: usize,
    source: Option<usize>,
    focus_area: Option<usize>,
}

impl QaColumns {
    fn find(headers: &[String]) -> Option<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Some(Self {
            question: position("question")?,
            answer: position("answer")?,
            source: position("source"),
            focus_area: position("focus_area"),
        })
    }

    fn row(&self, record: &StringRecord) -> Option<TableRow> {
        let field = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");
        let question = field(Some(self.question));
        let answer = field(Some(self.answer));
        if question.is_empty() && answer.is_empty() {
            return None;
        }

        let source = match field(self.source) {
            "" => DEFAULT_QA_SOURCE,
            source => source,
        };
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), source.to_string());
        let focus_area = field(self.focus_area);
        if !focus_area.is_empty() {
            metadata.insert("focus_area".to_string(), focus_area.to_string());
        }

        Some(TableRow {
            content: format!("Q: {question}\nA: {answer}").trim().to_string(),
            metadata,
        })
    }
}

fn plain_row(headers: &[String], record: &StringRecord) -> Option<TableRow> {
    let cells: Vec<String> = headers
        .iter()
        .zip(record.iter())
        .filter(|(_, value)| !value.is_empty())
        .map(|(header, value)| format!("{header}: {value}"))
        .collect();
    if cells.is_empty() {
        return None;
    }
    Some(TableRow {
        content: cells.join(" | "),
        metadata: Metadata::new(),
    })
}

/// Parse CSV text into one document per non-empty row
pub fn table_rows(source_name: &str, text: &str) -> Result<Vec<TableRow>> {
    let invalid = |e: csv::Error| {
        HealthRagError::InvalidInput(format!("Invalid CSV in {source_name}: {e}"))
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(invalid)?
        .iter()
        .map(str::to_lowercase)
        .collect();
    let qa = QaColumns::find(&headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(invalid)?;
        let row = match &qa {
            Some(qa) => qa.row(&record),
            None => plain_row(&headers, &record),
        };
        rows.extend(row);
    }
    Ok(rows)
}
