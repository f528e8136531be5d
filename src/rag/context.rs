//! Extractive answer assembly from retrieved documents

use crate::models::relevance_from_distance;
use crate::models::RetrievedMatch;
use crate::store::Neighbor;

pub const ANSWER_PREFIX: &str = "Based on the available healthcare information:\n\n";

pub const NO_MATCH_ANSWER: &str = "I couldn't find relevant information to answer your question. Please try rephrasing or ask about a different topic.";

/// Builds answers and source previews from ranked matches
pub struct AnswerComposer {
    answer_documents: usize,
    preview_chars: usize,
}

impl AnswerComposer {
    #[must_use]
    pub const fn new(answer_documents: usize, preview_chars: usize) -> Self {
        Self {
            answer_documents,
            preview_chars,
        }
    }

    /// Answer text quoting the top matches in full, followed by the
    /// distinct `condition` values of all matches
    #[must_use]
    pub fn compose(&self, matches: &[Neighbor]) -> String {
        if matches.is_empty() {
            return NO_MATCH_ANSWER.to_string();
        }

        let quoted: Vec<&str> = matches
            .iter()
            .take(self.answer_documents)
            .map(|m| m.content.as_str())
            .collect();
        let mut answer = format!("{ANSWER_PREFIX}{}", quoted.join("\n\n"));

        let mut conditions: Vec<&str> = Vec::new();
        for m in matches {
            if let Some(condition) = m.metadata.get("condition").map(String::as_str) {
                if !condition.is_empty() && !conditions.contains(&condition) {
                    conditions.push(condition);
                }
            }
        }
        if !conditions.is_empty() {
            answer.push_str("\n\nRelated conditions: ");
            answer.push_str(&conditions.join(", "));
        }

        answer
    }

    /// Source entry with scored, preview-length content
    #[must_use]
    pub fn to_source(&self, neighbor: &Neighbor) -> RetrievedMatch {
        RetrievedMatch {
            content: source_preview(&neighbor.content, self.preview_chars),
            metadata: neighbor.metadata.clone(),
            distance: neighbor.distance,
            relevance_score: relevance_from_distance(neighbor.distance),
        }
    }
}

impl Default for AnswerComposer {
    fn default() -> Self {
        Self::new(2, 200)
    }
}

/// First `max_chars` characters, with `...` appended when anything was cut
pub fn source_preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let head: String = content.chars().take(max_chars).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;

    fn neighbor(content: &str, condition: Option<&str>, distance: f32) -> Neighbor {
        let mut metadata = Metadata::new();
        if let Some(c) = condition {
            metadata.insert("condition".to_string(), c.to_string());
        }
        Neighbor {
            id: crate::models::document_id_for(content),
            content: content.to_string(),
            metadata,
            distance,
        }
    }

    #[test]
    fn test_compose_quotes_top_two() {
        let matches = vec![
            neighbor("First text.", Some("asthma"), 0.1),
            neighbor("Second text.", Some("gerd"), 0.2),
            neighbor("Third text.", Some("asthma"), 0.3),
        ];
        let answer = AnswerComposer::default().compose(&matches);
        assert_eq!(
            answer,
            "Based on the available healthcare information:\n\n\
             First text.\n\nSecond text.\n\n\
             Related conditions: asthma, gerd"
        );
    }

    #[test]
    fn test_compose_without_conditions() {
        let matches = vec![neighbor("Only text.", None, 0.1)];
        let answer = AnswerComposer::default().compose(&matches);
        assert_eq!(answer, format!("{ANSWER_PREFIX}Only text."));
    }

    #[test]
    fn test_compose_empty_is_no_match() {
        assert_eq!(AnswerComposer::default().compose(&[]), NO_MATCH_ANSWER);
    }

    #[test]
    fn test_source_preview() {
        assert_eq!(source_preview("short", 200), "short");
        let long = "a".repeat(250);
        let preview = source_preview(&long, 200);
        assert_eq!(preview.chars().count(), 203);
        assert!(preview.ends_with("..."));
        assert_eq!(source_preview(&"x".repeat(200), 200), "x".repeat(200));
    }

    #[test]
    fn test_to_source_scores_distance() {
        let source = AnswerComposer::default().to_source(&neighbor("text", None, 1.0));
        assert!((source.relevance_score - 0.5).abs() < f32::EPSILON);
        assert_eq!(source.content, "text");
    }
}
