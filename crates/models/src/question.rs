use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use strum::{EnumIter, EnumProperty, IntoEnumIterator};
use thiserror::Error;

#[cfg(feature = "database")]
use sea_orm::Value;

/// The kind of input a question expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumProperty, EnumIter)]
#[serde(into = "String", from = "String")]
pub enum QuestionType {
    /// Pick exactly one of the options (e.g. "5" down to "1")
    #[strum(props(key = "scale"))]
    Scale,

    /// Free-form text
    #[strum(props(key = "text"))]
    Text,

    /// Pick any number of the options
    #[strum(props(key = "checkbox"))]
    Checkbox,

    /// A stored type this version does not know how to answer
    Other(String),
}

impl QuestionType {
    /// Whether answers select indices into the option list
    pub fn uses_options(&self) -> bool {
        matches!(self, Self::Scale | Self::Checkbox)
    }
}

impl FromStr for QuestionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();

        Self::iter()
            .find(|variant| variant.get_str("key") == Some(key.as_str()))
            .or_else(|| Some(Self::Other(s.to_string())))
            .ok_or(())
    }
}

impl From<String> for QuestionType {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(Self::Other(s))
    }
}

impl From<QuestionType> for String {
    fn from(question_type: QuestionType) -> Self {
        question_type.to_string()
    }
}

impl Display for QuestionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Other(raw) => write!(f, "{raw}"),
            _ => write!(f, "{}", self.get_str("key").unwrap_or_default()),
        }
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for QuestionType {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => Ok(Self::from(*s)),
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "QuestionType".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<QuestionType> for Value {
    fn from(question_type: QuestionType) -> Self {
        Value::String(Some(Box::new(question_type.to_string())))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for QuestionType {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;
        Ok(Self::from(val))
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for QuestionType {
    fn null() -> Value {
        Value::String(None)
    }
}

/// Ordered answer options of a question, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionOptions(pub Vec<String>);

impl QuestionOptions {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for QuestionOptions {
    fn from(options: Vec<String>) -> Self {
        Self(options)
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for QuestionOptions {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => {
                serde_json::from_str(&s).map_err(|_| sea_orm::sea_query::ValueTypeErr)
            }
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "QuestionOptions".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<QuestionOptions> for Value {
    fn from(options: QuestionOptions) -> Self {
        // A list of strings always serializes
        let json = serde_json::to_string(&options.0).unwrap_or_else(|_| "[]".to_string());
        Value::String(Some(Box::new(json)))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for QuestionOptions {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;

        serde_json::from_str(&val).map_err(|e| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Failed to deserialize QuestionOptions: {e}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for QuestionOptions {
    fn null() -> Value {
        Value::String(None)
    }
}

/// Borrowed view of the parts of a question that decide answer validity
#[derive(Debug, Clone, Copy)]
pub struct QuestionRef<'a> {
    pub question_type: &'a QuestionType,
    pub required: bool,
    pub options: &'a [String],
}

/// A question as submitted by an administrator building a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub prompt: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A template as submitted by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub title: String,
    pub questions: Vec<QuestionDraft>,
}

/// Why a template draft cannot be saved
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DraftError {
    #[error("template title is blank")]
    BlankTitle,
    #[error("template has no questions")]
    NoQuestions,
    #[error("question {0} has a blank prompt")]
    BlankPrompt(usize),
    #[error("question {0} needs at least one option")]
    MissingOptions(usize),
    #[error("question {0} has a blank option")]
    BlankOption(usize),
    #[error("question {index} has unsupported type `{question_type}`")]
    UnsupportedType {
        index: usize,
        question_type: String,
    },
}

impl QuestionDraft {
    /// Checks the shape rules for one question; `index` is its position in the template
    pub fn validate(&self, index: usize) -> Result<(), DraftError> {
        if self.prompt.trim().is_empty() {
            return Err(DraftError::BlankPrompt(index));
        }

        if let QuestionType::Other(raw) = &self.question_type {
            return Err(DraftError::UnsupportedType {
                index,
                question_type: raw.clone(),
            });
        }

        if self.question_type.uses_options() {
            if self.options.is_empty() {
                return Err(DraftError::MissingOptions(index));
            }
            if self.options.iter().any(|option| option.trim().is_empty()) {
                return Err(DraftError::BlankOption(index));
            }
        }

        Ok(())
    }

    /// Options as they should be stored; text questions keep none
    pub fn stored_options(&self) -> QuestionOptions {
        if self.question_type.uses_options() {
            QuestionOptions(self.options.iter().map(|o| o.trim().to_string()).collect())
        } else {
            QuestionOptions::default()
        }
    }
}

impl TemplateDraft {
    /// Checks the title and every question, reporting the first problem found
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::BlankTitle);
        }
        if self.questions.is_empty() {
            return Err(DraftError::NoQuestions);
        }

        self.questions
            .iter()
            .enumerate()
            .try_for_each(|(index, question)| question.validate(index))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn draft(question_type: QuestionType, options: &[&str]) -> QuestionDraft {
        QuestionDraft {
            prompt: "How was the course?".to_string(),
            question_type,
            required: true,
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_question_type_from_str() {
        assert_eq!(QuestionType::from_str("scale").unwrap(), QuestionType::Scale);
        assert_eq!(QuestionType::from_str(" Text ").unwrap(), QuestionType::Text);
        assert_eq!(
            QuestionType::from_str("CHECKBOX").unwrap(),
            QuestionType::Checkbox
        );

        if let QuestionType::Other(raw) = QuestionType::from_str("radio").unwrap() {
            assert_eq!(raw, "radio");
        } else {
            panic!("Expected QuestionType::Other variant");
        }
    }

    #[test]
    fn test_question_type_display() {
        assert_eq!(QuestionType::Scale.to_string(), "scale");
        assert_eq!(QuestionType::Checkbox.to_string(), "checkbox");
        assert_eq!(QuestionType::Other("radio".to_string()).to_string(), "radio");
    }

    #[test]
    fn test_question_type_serde() {
        let json = serde_json::to_string(&QuestionType::Text).unwrap();
        assert_eq!(json, "\"text\"");

        let parsed: QuestionType = serde_json::from_str("\"matrix\"").unwrap();
        assert_eq!(parsed, QuestionType::Other("matrix".to_string()));
    }

    #[test]
    fn test_draft_requires_options_for_choice_types() {
        assert_eq!(
            draft(QuestionType::Scale, &[]).validate(0),
            Err(DraftError::MissingOptions(0))
        );
        assert_eq!(
            draft(QuestionType::Checkbox, &["a", " "]).validate(2),
            Err(DraftError::BlankOption(2))
        );
        assert!(draft(QuestionType::Text, &[]).validate(0).is_ok());
        assert!(
            draft(QuestionType::Scale, &["5", "4", "3", "2", "1"])
                .validate(0)
                .is_ok()
        );
    }

    #[test]
    fn test_draft_rejects_unknown_type() {
        let result = draft(QuestionType::Other("matrix".to_string()), &["a"]).validate(1);
        assert!(matches!(
            result,
            Err(DraftError::UnsupportedType { index: 1, .. })
        ));
    }

    #[test]
    fn test_template_draft_validate() {
        let mut template = TemplateDraft {
            title: "  ".to_string(),
            questions: vec![],
        };
        assert_eq!(template.validate(), Err(DraftError::BlankTitle));

        template.title = "End of term".to_string();
        assert_eq!(template.validate(), Err(DraftError::NoQuestions));

        template.questions.push(draft(QuestionType::Text, &[]));
        template.questions.push(QuestionDraft {
            prompt: "".to_string(),
            ..draft(QuestionType::Text, &[])
        });
        assert_eq!(template.validate(), Err(DraftError::BlankPrompt(1)));

        template.questions.pop();
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_stored_options_drops_options_for_text() {
        let text = draft(QuestionType::Text, &["ignored"]);
        assert!(text.stored_options().is_empty());

        let scale = draft(QuestionType::Scale, &[" 5", "4 "]);
        assert_eq!(scale.stored_options().as_slice(), ["5", "4"]);
    }
}
