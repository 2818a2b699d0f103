#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use database::{
    clock::Clock,
    entities::{evaluations, people, section_members, sections},
    provisioning::{CredentialProvisioner, OutboxProvisioner},
    services::{
        evaluation::EvaluationService,
        import::ImportService,
        template::{TemplateService, TemplateWithQuestions},
    },
};
use models::{
    import_data::ImportMode,
    question::{QuestionDraft, QuestionType, TemplateDraft},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter,
};
use serde_json::{Map, Value};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

/// Fresh in-memory database with the full schema applied.
///
/// A single pooled connection keeps every query on the same in-memory file.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Writes real outbox rows and remembers who it was called for
#[derive(Default)]
pub struct RecordingProvisioner {
    outbox: OutboxProvisioner,
    provisioned: Mutex<Vec<String>>,
    calls: AtomicUsize,
    /// Registration id whose provisioning should fail
    pub fail_for: Option<String>,
}

impl RecordingProvisioner {
    pub fn failing_for(registration_id: &str) -> Self {
        Self {
            fail_for: Some(registration_id.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn provisioned(&self) -> Vec<String> {
        self.provisioned.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialProvisioner for RecordingProvisioner {
    async fn provision_and_notify(
        &self,
        txn: &DatabaseTransaction,
        person: &people::Model,
    ) -> Result<(), DbErr> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_for.as_deref() == Some(person.registration_id.as_str()) {
            return Err(DbErr::Custom("mail queue unavailable".to_string()));
        }

        self.outbox.provision_and_notify(txn, person).await?;
        self.provisioned
            .lock()
            .unwrap()
            .push(person.registration_id.clone());
        Ok(())
    }
}

/// Registers a second account under the registration id it is asked to
/// provision, which the `people` unique index refuses
pub struct ClashingProvisioner {
    pub registration_id: String,
    outbox: OutboxProvisioner,
}

impl ClashingProvisioner {
    pub fn new(registration_id: &str) -> Self {
        Self {
            registration_id: registration_id.to_string(),
            outbox: OutboxProvisioner::default(),
        }
    }
}

#[async_trait]
impl CredentialProvisioner for ClashingProvisioner {
    async fn provision_and_notify(
        &self,
        txn: &DatabaseTransaction,
        person: &people::Model,
    ) -> Result<(), DbErr> {
        if person.registration_id == self.registration_id {
            people::ActiveModel {
                id: Set(Uuid::new_v4()),
                registration_id: Set(person.registration_id.clone()),
                name: Set(person.name.clone()),
                email: Set(None),
                role: Set(person.role),
                admin: Set(false),
                password_hash: Set(None),
                created_at: Set(Utc::now()),
            }
            .insert(txn)
            .await?;
        }

        self.outbox.provision_and_notify(txn, person).await
    }
}

pub async fn count<E>(db: &DatabaseConnection) -> u64
where
    E: EntityTrait,
    E::Model: Sync,
{
    E::find().count(db).await.unwrap()
}

pub async fn person(db: &DatabaseConnection, registration_id: &str) -> people::Model {
    people::Entity::find()
        .filter(people::Column::RegistrationId.eq(registration_id))
        .one(db)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("no person `{registration_id}`"))
}

pub async fn memberships_of(db: &DatabaseConnection, person_id: Uuid) -> Vec<Uuid> {
    section_members::Entity::find()
        .filter(section_members::Column::PersonId.eq(person_id))
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.section_id)
        .collect()
}

pub fn feedback_draft(title: &str) -> TemplateDraft {
    let question = |prompt: &str, question_type, required, options: &[&str]| QuestionDraft {
        prompt: prompt.to_string(),
        question_type,
        required,
        options: options.iter().map(|o| o.to_string()).collect(),
    };

    TemplateDraft {
        title: title.to_string(),
        questions: vec![
            question("Rate the course", QuestionType::Scale, true, &["5", "4", "3", "2", "1"]),
            question(
                "What helped you learn?",
                QuestionType::Checkbox,
                false,
                &["Lectures", "Labs", "Office hours"],
            ),
            question("Comments", QuestionType::Text, false, &[]),
        ],
    }
}

/// Two sections, one evaluation sent to the first of them
pub struct Fixture {
    pub template: TemplateWithQuestions,
    pub evaluation: evaluations::Model,
    pub section: sections::Model,
    pub other_section: sections::Model,
    /// Enrolled in `section`
    pub students: Vec<people::Model>,
    /// Enrolled only in `other_section`
    pub outsider: people::Model,
}

impl Fixture {
    pub fn scale(&self) -> String {
        self.template.questions[0].id.to_string()
    }

    pub fn checkbox(&self) -> String {
        self.template.questions[1].id.to_string()
    }

    pub fn text(&self) -> String {
        self.template.questions[2].id.to_string()
    }
}

pub const FIXTURE_ROSTER: &str = r#"[
    { "code": "CIC0097", "classCode": "TA", "semester": "2021.2",
      "docente": { "nome": "Helena Prado", "usuario": "1001" },
      "dicente": [
        { "nome": "Ana Lima", "matricula": "2001" },
        { "nome": "Bruno Reis", "matricula": "2002" }
      ] },
    { "code": "CIC0105", "classCode": "TA", "semester": "2021.2",
      "dicente": [ { "nome": "Carla Souza", "matricula": "3001" } ] }
]"#;

pub async fn seed(db: &DatabaseConnection, deadline: Option<DateTime<Utc>>) -> Fixture {
    let report = ImportService::import_sections(
        db,
        FIXTURE_ROSTER.as_bytes(),
        ImportMode::CreateMissing,
        &RecordingProvisioner::default(),
    )
    .await
    .unwrap();
    assert_eq!(report.imported_count(), 2);

    let section_of = |index: usize| report.outcomes()[index].entities.as_ref().unwrap().section_id;
    let section = sections::Entity::find_by_id(section_of(0))
        .one(db)
        .await
        .unwrap()
        .unwrap();
    let other_section = sections::Entity::find_by_id(section_of(1))
        .one(db)
        .await
        .unwrap()
        .unwrap();

    let template = TemplateService::create_template(db, feedback_draft("Course feedback"))
        .await
        .unwrap();
    let evaluation =
        EvaluationService::create_evaluation(db, template.template.id, &[section.id], deadline)
            .await
            .unwrap();

    Fixture {
        template,
        evaluation,
        section,
        other_section,
        students: vec![person(db, "2001").await, person(db, "2002").await],
        outsider: person(db, "3001").await,
    }
}

pub fn answers(pairs: &[(String, Value)]) -> Map<String, Value> {
    pairs.iter().cloned().collect()
}
