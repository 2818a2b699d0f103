use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// The upload as a whole could not be read as a list of records
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON array of records")]
    NotAnArray,
}

/// Why a single record could not be turned into an [`ImportRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("invalid record: {0}")]
    Invalid(String),
}

/// Splits a raw upload into its records without interpreting them
///
/// # Arguments
/// * `payload` - The uploaded bytes
///
/// # Returns
/// The records in upload order, or a [`PayloadError`] that aborts the whole import
pub fn parse_payload(payload: &[u8]) -> Result<Vec<Value>, PayloadError> {
    match serde_json::from_slice::<Value>(payload)? {
        Value::Array(records) => Ok(records),
        _ => Err(PayloadError::NotAnArray),
    }
}

/// How an import treats disciplines and sections it cannot find
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Create any discipline, section or person the payload mentions
    #[default]
    CreateMissing,
    /// Only attach people; the discipline and section must already exist
    AttachToExisting,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "create_missing" | "create" => Ok(Self::CreateMissing),
            "attach_to_existing" | "attach" => Ok(Self::AttachToExisting),
            other => Err(format!("unknown import mode `{other}`")),
        }
    }
}

/// Natural key of a section: discipline code, section code and term
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey {
    /// Discipline code (e.g. "CIC0097")
    pub discipline_code: String,
    /// Section code within the discipline (e.g. "TA")
    pub class_code: String,
    /// Term the section is offered in (e.g. "2021.2")
    pub semester: String,
}

/// A sections-only record: a discipline and one of its sections
#[derive(Debug, Clone, PartialEq)]
pub struct SectionRecord {
    pub key: SectionKey,
    pub discipline_name: String,
    pub schedule: Option<String>,
}

/// A person as described in a roster record
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub registration_id: String,
    pub name: String,
    pub email: Option<String>,
}

/// A people-inclusive record: a section plus its instructor and students
#[derive(Debug, Clone, PartialEq)]
pub struct RosterRecord {
    pub key: SectionKey,
    /// Only present when the record carries a `name`
    pub discipline_name: Option<String>,
    pub instructor: Option<PersonRecord>,
    pub students: Vec<PersonRecord>,
}

/// One validated import record
#[derive(Debug, Clone, PartialEq)]
pub enum ImportRecord {
    Section(SectionRecord),
    Roster(RosterRecord),
}

impl ImportRecord {
    pub fn key(&self) -> &SectionKey {
        match self {
            Self::Section(record) => &record.key,
            Self::Roster(record) => &record.key,
        }
    }

    /// Validates one raw record and decides which shape it has.
    ///
    /// A record carrying a `class` object is sections-only; anything else is
    /// read as people-inclusive.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let Some(object) = value.as_object() else {
            return Err(RecordError::Invalid("record is not a JSON object".to_string()));
        };

        let raw = RawRecord::deserialize(value).map_err(|e| RecordError::Invalid(e.to_string()))?;
        let code = required(raw.code, "code")?;

        if object.contains_key("class") {
            let class = raw
                .class
                .ok_or_else(|| RecordError::MissingField("class".to_string()))?;

            Ok(Self::Section(SectionRecord {
                key: SectionKey {
                    discipline_code: code,
                    class_code: required(class.class_code, "class.classCode")?,
                    semester: required(class.semester, "class.semester")?,
                },
                discipline_name: required(raw.name, "name")?,
                schedule: class.time,
            }))
        } else {
            let key = SectionKey {
                discipline_code: code,
                class_code: required(raw.class_code, "classCode")?,
                semester: required(raw.semester, "semester")?,
            };

            let instructor = raw
                .docente
                .map(|person| person.into_instructor())
                .transpose()?;

            let students = raw
                .dicente
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(idx, person)| person.into_student(idx))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Self::Roster(RosterRecord {
                key,
                discipline_name: raw.name,
                instructor,
                students,
            }))
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, RecordError> {
    value.ok_or_else(|| RecordError::MissingField(field.to_string()))
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default)]
    class: Option<RawClass>,
    #[serde(default, rename = "classCode", deserialize_with = "lenient_string")]
    class_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    semester: Option<String>,
    #[serde(default)]
    docente: Option<RawPerson>,
    #[serde(default)]
    dicente: Option<Vec<RawPerson>>,
}

#[derive(Debug, Deserialize)]
struct RawClass {
    #[serde(default, rename = "classCode", deserialize_with = "lenient_string")]
    class_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    semester: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    #[serde(default, deserialize_with = "lenient_string")]
    usuario: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    matricula: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    nome: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    email: Option<String>,
}

impl RawPerson {
    // Instructors are keyed by `usuario`, students by `matricula`; either
    // falls back to the other when only one is present
    fn into_instructor(self) -> Result<PersonRecord, RecordError> {
        Ok(PersonRecord {
            registration_id: required(self.usuario.or(self.matricula), "docente.usuario")?,
            name: required(self.nome, "docente.nome")?,
            email: self.email,
        })
    }

    fn into_student(self, idx: usize) -> Result<PersonRecord, RecordError> {
        Ok(PersonRecord {
            registration_id: required(
                self.matricula.or(self.usuario),
                &format!("dicente[{idx}].matricula"),
            )?,
            name: required(self.nome, &format!("dicente[{idx}].nome"))?,
            email: self.email,
        })
    }
}

/// Reads a string or number as trimmed text; blank and `null` become `None`
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a string, found `{other}`"
            )));
        }
    };

    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}
