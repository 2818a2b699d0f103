use crate::import_data::SectionKey;
use serde::{Serialize, Serializer, ser::SerializeStruct};
use serde_json::Value;
use uuid::Uuid;

/// Whether a record made it into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Tag describing what happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    Imported,
    MissingRequiredField,
    InvalidRecord,
    ReferencedEntityNotFound,
    PersistenceValidationFailure,
    UnexpectedFailure,
}

/// The fields a person reading the report uses to find the record in their file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifyingFields {
    pub code: Option<String>,
    pub class_code: Option<String>,
    pub semester: Option<String>,
}

impl IdentifyingFields {
    /// Best-effort extraction from a raw record of either shape
    pub fn from_raw(value: &Value) -> Self {
        let text = |v: Option<&Value>| match v {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let class = value.get("class");
        Self {
            code: text(value.get("code")),
            class_code: text(value.get("classCode"))
                .or_else(|| text(class.and_then(|c| c.get("classCode")))),
            semester: text(value.get("semester"))
                .or_else(|| text(class.and_then(|c| c.get("semester")))),
        }
    }
}

impl From<&SectionKey> for IdentifyingFields {
    fn from(key: &SectionKey) -> Self {
        Self {
            code: Some(key.discipline_code.clone()),
            class_code: Some(key.class_code.clone()),
            semester: Some(key.semester.clone()),
        }
    }
}

/// Rows a successful record resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedEntities {
    pub discipline_id: Uuid,
    pub section_id: Uuid,
    pub instructor_id: Option<Uuid>,
    pub student_ids: Vec<Uuid>,
    /// Disciplines, sections and people this record created
    pub created: usize,
}

/// Result of reconciling one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    /// Position of the record in the upload
    pub index: usize,
    pub status: OutcomeStatus,
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
    pub identifying_fields: IdentifyingFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<ImportedEntities>,
}

impl RecordOutcome {
    pub fn success(
        index: usize,
        identifying_fields: IdentifyingFields,
        entities: ImportedEntities,
    ) -> Self {
        Self {
            index,
            status: OutcomeStatus::Success,
            kind: OutcomeKind::Imported,
            identifying_fields,
            message: None,
            entities: Some(entities),
        }
    }

    pub fn failure(
        index: usize,
        kind: OutcomeKind,
        identifying_fields: IdentifyingFields,
        message: impl Into<String>,
    ) -> Self {
        Self {
            index,
            status: OutcomeStatus::Error,
            kind,
            identifying_fields,
            message: Some(message.into()),
            entities: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

/// Per-record outcomes of one import call, in upload order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    outcomes: Vec<RecordOutcome>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: RecordOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.outcomes
    }

    /// Records reconciled without error
    pub fn imported_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// New discipline, section and person rows across the whole import
    pub fn created_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.entities.as_ref())
            .map(|e| e.created)
            .sum()
    }

    pub fn error_list(&self) -> Vec<&RecordOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }
}

impl Serialize for ImportReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImportReport", 4)?;
        state.serialize_field("created_count", &self.created_count())?;
        state.serialize_field("imported_count", &self.imported_count())?;
        state.serialize_field("error_list", &self.error_list())?;
        state.serialize_field("outcomes", &self.outcomes)?;
        state.end()
    }
}
