//! Keyword routing of questions to a document type

use crate::store::MetadataFilter;

pub const TYPE_PATIENT_RECORD: &str = "patient_record";
pub const TYPE_DOCTOR_PROFILE: &str = "doctor_profile";
pub const TYPE_GLOSSARY: &str = "glossary";
pub const TYPE_DOCUMENT: &str = "document";

/// Rules in priority order; the first rule with a matching keyword wins
const ROUTES: &[(&str, &[&str])] = &[
    (
        TYPE_PATIENT_RECORD,
        &[
            "patient information",
            "patient",
            "diagnos",
            "medical record",
            "medical jargon",
        ],
    ),
    (
        TYPE_DOCTOR_PROFILE,
        &[
            "match doctor",
            "match a doctor",
            "find a doctor",
            "doctor profile",
            "which doctor",
            "referral",
            "assign doctor",
        ],
    ),
    (
        TYPE_GLOSSARY,
        &[
            "jargon",
            "what does",
            "meaning of",
            "glossary",
            "terms",
            "common question",
            "faq",
        ],
    ),
];

/// Document type a question should be restricted to, if any
pub fn route_question(question: &str) -> Option<&'static str> {
    let lower = question.to_lowercase();
    ROUTES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(doc_type, _)| *doc_type)
}

/// Metadata filter for a question, if it routes to a document type
pub fn filter_for_question(question: &str) -> Option<MetadataFilter> {
    route_question(question).map(|t| MetadataFilter::field_equals("type", t))
}

/// Document type for an ingested file, from its name
pub fn document_type_for_source(source_name: &str) -> &'static str {
    let lower = source_name.to_lowercase();
    if lower.contains("patient") {
        TYPE_PATIENT_RECORD
    } else if lower.contains("doctor") {
        TYPE_DOCTOR_PROFILE
    } else if lower.contains("glossary") {
        TYPE_GLOSSARY
    } else {
        TYPE_DOCUMENT
    }
}
