use crate::question::{QuestionRef, QuestionType};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use thiserror::Error;

#[cfg(feature = "database")]
use sea_orm::Value;

/// A submitted answer normalised to the shape its question type stores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredAnswer", from = "StoredAnswer")]
pub enum AnswerValue {
    /// Index of the single selected option
    Scale(usize),
    Text(String),
    /// Indices of the selected options, ascending
    Checkbox(Vec<usize>),
}

/// Persisted JSON shape; a scale answer is a one-element selection list
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StoredAnswer {
    Scale { selected: [usize; 1] },
    Text { text: String },
    Checkbox { selected: Vec<usize> },
}

impl From<AnswerValue> for StoredAnswer {
    fn from(answer: AnswerValue) -> Self {
        match answer {
            AnswerValue::Scale(index) => Self::Scale { selected: [index] },
            AnswerValue::Text(text) => Self::Text { text },
            AnswerValue::Checkbox(selected) => Self::Checkbox { selected },
        }
    }
}

impl From<StoredAnswer> for AnswerValue {
    fn from(stored: StoredAnswer) -> Self {
        match stored {
            StoredAnswer::Scale { selected: [index] } => Self::Scale(index),
            StoredAnswer::Text { text } => Self::Text(text),
            StoredAnswer::Checkbox { selected } => Self::Checkbox(selected),
        }
    }
}

impl AnswerValue {
    /// Selected option indices; empty for text answers
    pub fn selections(&self) -> &[usize] {
        match self {
            Self::Scale(index) => std::slice::from_ref(index),
            Self::Text(_) => &[],
            Self::Checkbox(selected) => selected,
        }
    }
}

/// Why a single submitted answer was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum AnswerError {
    #[error("an answer is required")]
    RequiredAnswerMissing,
    #[error("{0}")]
    AnswerStructureInvalid(String),
    #[error("option {index} is out of range for {len} options")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("question type `{0}` cannot be answered")]
    UnsupportedQuestionType(String),
}

impl AnswerError {
    /// Stable tag used in rejection reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequiredAnswerMissing => "RequiredAnswerMissing",
            Self::AnswerStructureInvalid(_) | Self::IndexOutOfRange { .. } => {
                "AnswerStructureInvalid"
            }
            Self::UnsupportedQuestionType(_) => "UnsupportedQuestionType",
        }
    }
}

/// One entry of the rejection list returned for a refused submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRejection {
    /// Question key exactly as submitted
    pub question_id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reason: String,
}

impl AnswerRejection {
    pub fn new(question_id: impl Into<String>, error: &AnswerError) -> Self {
        Self {
            question_id: question_id.into(),
            kind: error.kind(),
            reason: error.to_string(),
        }
    }

    pub fn unknown_question(question_id: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            kind: "UnknownQuestion",
            reason: "not a question of this evaluation".to_string(),
        }
    }
}

/// Validates a raw submitted value against its question.
///
/// `raw` is whatever the transport delivered for this question; `None` and
/// JSON `null` both mean the question was left unanswered.
///
/// # Returns
/// `Ok(Some(value))` for a valid answer, `Ok(None)` for an unanswered
/// optional question
pub fn validate_answer(
    question: QuestionRef<'_>,
    raw: Option<&Json>,
) -> Result<Option<AnswerValue>, AnswerError> {
    let raw = raw.filter(|value| !value.is_null());

    match question.question_type {
        QuestionType::Scale => validate_scale(question, raw),
        QuestionType::Text => validate_text(question, raw),
        QuestionType::Checkbox => validate_checkbox(question, raw),
        QuestionType::Other(raw_type) => Err(AnswerError::UnsupportedQuestionType(
            raw_type.clone(),
        )),
    }
}

fn unanswered(question: QuestionRef<'_>) -> Result<Option<AnswerValue>, AnswerError> {
    if question.required {
        Err(AnswerError::RequiredAnswerMissing)
    } else {
        Ok(None)
    }
}

fn validate_scale(
    question: QuestionRef<'_>,
    raw: Option<&Json>,
) -> Result<Option<AnswerValue>, AnswerError> {
    let Some(raw) = raw else {
        return unanswered(question);
    };

    let value = match raw {
        Json::Array(values) if values.len() == 1 => &values[0],
        Json::Array(values) => {
            return Err(AnswerError::AnswerStructureInvalid(format!(
                "expected exactly one selection, got {}",
                values.len()
            )));
        }
        value => value,
    };

    let index = option_index(value, question.options.len())?;
    Ok(Some(AnswerValue::Scale(index)))
}

fn validate_text(
    question: QuestionRef<'_>,
    raw: Option<&Json>,
) -> Result<Option<AnswerValue>, AnswerError> {
    let Some(raw) = raw else {
        return unanswered(question);
    };

    let Json::String(text) = raw else {
        return Err(AnswerError::AnswerStructureInvalid(
            "expected a text value".to_string(),
        ));
    };

    if text.trim().is_empty() && question.required {
        return Err(AnswerError::RequiredAnswerMissing);
    }

    Ok(Some(AnswerValue::Text(text.clone())))
}

fn validate_checkbox(
    question: QuestionRef<'_>,
    raw: Option<&Json>,
) -> Result<Option<AnswerValue>, AnswerError> {
    let Some(raw) = raw else {
        return unanswered(question);
    };

    let Json::Array(values) = raw else {
        return Err(AnswerError::AnswerStructureInvalid(
            "expected a list of selections".to_string(),
        ));
    };

    if values.is_empty() && question.required {
        return Err(AnswerError::RequiredAnswerMissing);
    }

    let mut selected = values
        .iter()
        .map(|value| option_index(value, question.options.len()))
        .collect::<Result<Vec<_>, _>>()?;

    selected.sort_unstable();
    if selected.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(AnswerError::AnswerStructureInvalid(
            "an option was selected more than once".to_string(),
        ));
    }

    Ok(Some(AnswerValue::Checkbox(selected)))
}

/// Coerces one JSON value to an option index in `[0, len)`
fn option_index(value: &Json, len: usize) -> Result<usize, AnswerError> {
    let index = coerce_integer(value).ok_or_else(|| {
        AnswerError::AnswerStructureInvalid(format!("`{value}` is not an option index"))
    })?;

    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(AnswerError::IndexOutOfRange { index, len })
}

/// Integers, integral floats and base-10 integer strings coerce; nothing else does
fn coerce_integer(value: &Json) -> Option<i64> {
    match value {
        Json::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Json::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for AnswerValue {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => {
                serde_json::from_str(&s).map_err(|_| sea_orm::sea_query::ValueTypeErr)
            }
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "AnswerValue".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<AnswerValue> for Value {
    fn from(answer: AnswerValue) -> Self {
        // Every variant maps onto plain JSON
        let json = serde_json::to_string(&answer).unwrap_or_default();
        Value::String(Some(Box::new(json)))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for AnswerValue {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;

        serde_json::from_str(&val).map_err(|e| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Failed to deserialize AnswerValue: {e}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for AnswerValue {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn options(n: usize) -> Vec<String> {
        (1..=n).rev().map(|i| i.to_string()).collect()
    }

    fn question<'a>(
        question_type: &'a QuestionType,
        required: bool,
        options: &'a [String],
    ) -> QuestionRef<'a> {
        QuestionRef {
            question_type,
            required,
            options,
        }
    }

    #[test]
    fn test_scale_bounds() {
        let opts = options(5);
        let scale_type = QuestionType::Scale;
        let scale = question(&scale_type, true, &opts);

        assert_eq!(
            validate_answer(scale, Some(&json!(4))),
            Ok(Some(AnswerValue::Scale(4)))
        );
        assert_eq!(
            validate_answer(scale, Some(&json!(5))),
            Err(AnswerError::IndexOutOfRange { index: 5, len: 5 })
        );
        assert_eq!(
            validate_answer(scale, Some(&json!(-1))),
            Err(AnswerError::IndexOutOfRange { index: -1, len: 5 })
        );
        assert!(matches!(
            validate_answer(scale, Some(&json!([0, 1]))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
    }

    #[test]
    fn test_scale_rejects_seven_of_five() {
        let opts = options(5);
        let scale_type = QuestionType::Scale;
        let scale = question(&scale_type, false, &opts);

        let err = validate_answer(scale, Some(&json!(7))).unwrap_err();
        assert_eq!(err.kind(), "AnswerStructureInvalid");
    }

    #[test]
    fn test_scale_coercion() {
        let opts = options(5);
        let scale_type = QuestionType::Scale;
        let scale = question(&scale_type, true, &opts);

        assert_eq!(
            validate_answer(scale, Some(&json!("2"))),
            Ok(Some(AnswerValue::Scale(2)))
        );
        assert_eq!(
            validate_answer(scale, Some(&json!([3]))),
            Ok(Some(AnswerValue::Scale(3)))
        );
        assert_eq!(
            validate_answer(scale, Some(&json!(1.0))),
            Ok(Some(AnswerValue::Scale(1)))
        );
        assert!(matches!(
            validate_answer(scale, Some(&json!(1.5))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
        assert!(matches!(
            validate_answer(scale, Some(&json!("three"))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
        assert!(matches!(
            validate_answer(scale, Some(&json!([]))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
    }

    #[test]
    fn test_scale_absence() {
        let opts = options(5);

        assert_eq!(
            validate_answer(question(&QuestionType::Scale, true, &opts), None),
            Err(AnswerError::RequiredAnswerMissing)
        );
        assert_eq!(
            validate_answer(
                question(&QuestionType::Scale, false, &opts),
                Some(&Json::Null)
            ),
            Ok(None)
        );
    }

    #[test]
    fn test_text_rules() {
        let text_type = QuestionType::Text;
        let no_options: Vec<String> = vec![];
        let required = question(&text_type, true, &no_options);
        let optional = question(&text_type, false, &no_options);

        assert_eq!(
            validate_answer(required, Some(&json!("   "))),
            Err(AnswerError::RequiredAnswerMissing)
        );
        assert_eq!(
            validate_answer(optional, Some(&json!("   "))),
            Ok(Some(AnswerValue::Text("   ".to_string())))
        );
        assert_eq!(
            validate_answer(required, Some(&json!("Great course"))),
            Ok(Some(AnswerValue::Text("Great course".to_string())))
        );
        assert!(matches!(
            validate_answer(required, Some(&json!(3))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
    }

    #[test]
    fn test_checkbox_multiplicity() {
        let opts = options(3);
        let checkbox_type = QuestionType::Checkbox;
        let required = question(&checkbox_type, true, &opts);
        let optional = question(&checkbox_type, false, &opts);

        assert_eq!(
            validate_answer(required, Some(&json!([]))),
            Err(AnswerError::RequiredAnswerMissing)
        );
        assert_eq!(
            validate_answer(optional, Some(&json!([]))),
            Ok(Some(AnswerValue::Checkbox(vec![])))
        );
        assert_eq!(
            validate_answer(required, Some(&json!([2, "0"]))),
            Ok(Some(AnswerValue::Checkbox(vec![0, 2])))
        );
        assert_eq!(
            validate_answer(required, Some(&json!([0, 5]))),
            Err(AnswerError::IndexOutOfRange { index: 5, len: 3 })
        );
    }

    #[test]
    fn test_checkbox_structure() {
        let opts = options(3);
        let checkbox_type = QuestionType::Checkbox;
        let checkbox = question(&checkbox_type, false, &opts);

        assert!(matches!(
            validate_answer(checkbox, Some(&json!(1))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
        assert!(matches!(
            validate_answer(checkbox, Some(&json!([1, 1]))),
            Err(AnswerError::AnswerStructureInvalid(_))
        ));
    }

    #[test]
    fn test_unsupported_type() {
        let matrix = QuestionType::Other("matrix".to_string());
        let result = validate_answer(question(&matrix, false, &[]), Some(&json!(1)));

        assert_eq!(
            result,
            Err(AnswerError::UnsupportedQuestionType("matrix".to_string()))
        );
    }

    #[test]
    fn test_stored_shape() {
        let json = serde_json::to_value(AnswerValue::Scale(4)).unwrap();
        assert_eq!(json, json!({ "type": "scale", "selected": [4] }));

        let parsed: AnswerValue =
            serde_json::from_value(json!({ "type": "checkbox", "selected": [0, 2] })).unwrap();
        assert_eq!(parsed.selections(), [0, 2]);

        let bad = serde_json::from_value::<AnswerValue>(json!({ "type": "scale", "selected": [1, 2] }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_rejection_tags() {
        let rejection = AnswerRejection::new("q1", &AnswerError::IndexOutOfRange { index: 5, len: 5 });
        assert_eq!(rejection.kind, "AnswerStructureInvalid");
        assert_eq!(rejection.reason, "option 5 is out of range for 5 options");

        let json = serde_json::to_value(AnswerRejection::unknown_question("nope")).unwrap();
        assert_eq!(json["type"], "UnknownQuestion");
        assert_eq!(json["question_id"], "nope");
    }
}
