use crate::{
    entities::{disciplines, people, section_members, sections},
    provisioning::CredentialProvisioner,
    services::natural_key::{insert_if_absent, vanished},
};
use chrono::Utc;
use log::{debug, info, warn};
use models::{
    import_data::{
        ImportMode, ImportRecord, PayloadError, PersonRecord, RecordError, SectionKey,
        parse_payload,
    },
    import_report::{IdentifyingFields, ImportReport, ImportedEntities, OutcomeKind, RecordOutcome},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, IntoActiveModel, QueryFilter, SqlErr, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

/// Failure that aborts the whole import before any record is touched
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] PayloadError),
}

/// Why one record was skipped
#[derive(Debug, Error)]
enum RecordFailure {
    #[error(transparent)]
    Invalid(#[from] RecordError),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] DbErr),
}

impl RecordFailure {
    fn kind(&self) -> OutcomeKind {
        match self {
            Self::Invalid(RecordError::MissingField(_)) => OutcomeKind::MissingRequiredField,
            Self::Invalid(RecordError::Invalid(_)) => OutcomeKind::InvalidRecord,
            Self::NotFound(_) => OutcomeKind::ReferencedEntityNotFound,
            Self::Store(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_))
                | Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    OutcomeKind::PersistenceValidationFailure
                }
                _ => OutcomeKind::UnexpectedFailure,
            },
        }
    }
}

pub struct ImportService;

impl ImportService {
    /// Reconciles an uploaded section list against the store.
    ///
    /// Records are handled in upload order, each in its own transaction; a
    /// failing record is reported and skipped without touching its siblings.
    ///
    /// # Arguments
    /// * `db` - The database connection
    /// * `payload` - Raw upload, expected to be a JSON array
    /// * `mode` - Whether missing disciplines and sections may be created
    /// * `provisioner` - Called once for every person this import creates
    ///
    /// # Returns
    /// One outcome per record, or [`ImportError::MalformedPayload`] when the
    /// upload is not a JSON array
    pub async fn import_sections(
        db: &DatabaseConnection,
        payload: &[u8],
        mode: ImportMode,
        provisioner: &dyn CredentialProvisioner,
    ) -> Result<ImportReport, ImportError> {
        let records = parse_payload(payload)?;
        info!("Importing {} records ({mode:?})", records.len());

        let mut report = ImportReport::new();
        for (index, raw) in records.iter().enumerate() {
            let outcome = Self::import_record(db, index, raw, mode, provisioner).await;

            if let Some(message) = outcome.message.as_deref() {
                warn!("Record {index} skipped ({:?}): {message}", outcome.kind);
            }
            report.push(outcome);
        }

        info!(
            "Import finished: {} imported, {} failed, {} rows created",
            report.imported_count(),
            report.error_list().len(),
            report.created_count()
        );
        Ok(report)
    }

    async fn import_record(
        db: &DatabaseConnection,
        index: usize,
        raw: &serde_json::Value,
        mode: ImportMode,
        provisioner: &dyn CredentialProvisioner,
    ) -> RecordOutcome {
        let record = match ImportRecord::from_value(raw) {
            Ok(record) => record,
            Err(err) => {
                let failure = RecordFailure::from(err);
                return RecordOutcome::failure(
                    index,
                    failure.kind(),
                    IdentifyingFields::from_raw(raw),
                    failure.to_string(),
                );
            }
        };

        let fields = IdentifyingFields::from(record.key());
        match Self::reconcile_in_transaction(db, &record, mode, provisioner).await {
            Ok(entities) => {
                debug!(
                    "Record {index} reconciled to section {} ({} new rows)",
                    entities.section_id, entities.created
                );
                RecordOutcome::success(index, fields, entities)
            }
            Err(failure) => {
                RecordOutcome::failure(index, failure.kind(), fields, failure.to_string())
            }
        }
    }

    async fn reconcile_in_transaction(
        db: &DatabaseConnection,
        record: &ImportRecord,
        mode: ImportMode,
        provisioner: &dyn CredentialProvisioner,
    ) -> Result<ImportedEntities, RecordFailure> {
        let txn = db.begin().await?;

        match Self::reconcile(&txn, record, mode, provisioner).await {
            Ok(entities) => {
                txn.commit().await?;
                Ok(entities)
            }
            Err(failure) => {
                if let Err(err) = txn.rollback().await {
                    warn!("Rollback failed: {err}");
                }
                Err(failure)
            }
        }
    }

    async fn reconcile(
        txn: &DatabaseTransaction,
        record: &ImportRecord,
        mode: ImportMode,
        provisioner: &dyn CredentialProvisioner,
    ) -> Result<ImportedEntities, RecordFailure> {
        let key = record.key();
        let mut created = 0;

        let (discipline_name, schedule) = match record {
            ImportRecord::Section(section) => {
                (section.discipline_name.as_str(), section.schedule.as_deref())
            }
            // The people shape may omit the discipline name
            ImportRecord::Roster(roster) => (
                roster
                    .discipline_name
                    .as_deref()
                    .unwrap_or(&key.discipline_code),
                None,
            ),
        };

        let discipline = match mode {
            ImportMode::CreateMissing => {
                let (discipline, is_new) =
                    Self::find_or_create_discipline(txn, &key.discipline_code, discipline_name)
                        .await?;
                created += usize::from(is_new);
                discipline
            }
            ImportMode::AttachToExisting => {
                Self::find_discipline(txn, &key.discipline_code)
                    .await?
                    .ok_or_else(|| {
                        RecordFailure::NotFound(format!(
                            "discipline `{}` does not exist",
                            key.discipline_code
                        ))
                    })?
            }
        };

        let mut section = match mode {
            ImportMode::CreateMissing => {
                let (section, is_new) =
                    Self::find_or_create_section(txn, discipline.id, key, schedule).await?;
                created += usize::from(is_new);
                section
            }
            ImportMode::AttachToExisting => Self::find_section(txn, discipline.id, key)
                .await?
                .ok_or_else(|| {
                    RecordFailure::NotFound(format!(
                        "section {} of `{}` in {} does not exist",
                        key.class_code, key.discipline_code, key.semester
                    ))
                })?,
        };

        let ImportRecord::Roster(roster) = record else {
            return Ok(ImportedEntities {
                discipline_id: discipline.id,
                section_id: section.id,
                instructor_id: section.instructor_id,
                student_ids: vec![],
                created,
            });
        };

        // Instructor first, so a registration id that also shows up as a
        // student resolves to the instructor's row
        let mut instructor_id = section.instructor_id;
        if let Some(instructor) = &roster.instructor {
            let (person, is_new) =
                Self::find_or_create_person(txn, instructor, people::PersonRole::Instructor, provisioner)
                    .await?;
            created += usize::from(is_new);

            if section.instructor_id != Some(person.id) {
                let mut active = section.into_active_model();
                active.instructor_id = Set(Some(person.id));
                section = active.update(txn).await?;
            }
            Self::ensure_membership(txn, section.id, person.id).await?;
            instructor_id = Some(person.id);
        }

        let mut student_ids: Vec<Uuid> = Vec::with_capacity(roster.students.len());
        for student in &roster.students {
            let (person, is_new) =
                Self::find_or_create_person(txn, student, people::PersonRole::Student, provisioner)
                    .await?;
            created += usize::from(is_new);

            if !student_ids.contains(&person.id) {
                Self::ensure_membership(txn, section.id, person.id).await?;
                student_ids.push(person.id);
            }
        }

        Ok(ImportedEntities {
            discipline_id: discipline.id,
            section_id: section.id,
            instructor_id,
            student_ids,
            created,
        })
    }

    async fn find_discipline(
        txn: &DatabaseTransaction,
        code: &str,
    ) -> Result<Option<disciplines::Model>, DbErr> {
        disciplines::Entity::find()
            .filter(disciplines::Column::Code.eq(code))
            .one(txn)
            .await
    }

    async fn find_or_create_discipline(
        txn: &DatabaseTransaction,
        code: &str,
        name: &str,
    ) -> Result<(disciplines::Model, bool), DbErr> {
        let is_new = insert_if_absent(
            txn,
            disciplines::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                description: Set(None),
                created_at: Set(Utc::now()),
            },
            [disciplines::Column::Code],
        )
        .await?;

        let discipline = Self::find_discipline(txn, code)
            .await?
            .ok_or_else(|| vanished("discipline", code))?;
        Ok((discipline, is_new))
    }

    async fn find_section(
        txn: &DatabaseTransaction,
        discipline_id: Uuid,
        key: &SectionKey,
    ) -> Result<Option<sections::Model>, DbErr> {
        sections::Entity::find()
            .filter(sections::Column::DisciplineId.eq(discipline_id))
            .filter(sections::Column::Code.eq(key.class_code.as_str()))
            .filter(sections::Column::Term.eq(key.semester.as_str()))
            .one(txn)
            .await
    }

    async fn find_or_create_section(
        txn: &DatabaseTransaction,
        discipline_id: Uuid,
        key: &SectionKey,
        schedule: Option<&str>,
    ) -> Result<(sections::Model, bool), DbErr> {
        let is_new = insert_if_absent(
            txn,
            sections::ActiveModel {
                id: Set(Uuid::new_v4()),
                discipline_id: Set(discipline_id),
                code: Set(key.class_code.clone()),
                term: Set(key.semester.clone()),
                schedule: Set(schedule.map(str::to_string)),
                instructor_id: Set(None),
                created_at: Set(Utc::now()),
            },
            [
                sections::Column::DisciplineId,
                sections::Column::Code,
                sections::Column::Term,
            ],
        )
        .await?;

        let section = Self::find_section(txn, discipline_id, key)
            .await?
            .ok_or_else(|| {
                vanished(
                    "section",
                    &format!("{}/{}/{}", key.discipline_code, key.class_code, key.semester),
                )
            })?;
        Ok((section, is_new))
    }

    /// Finds a person by registration id, creating and provisioning them if new.
    /// Existing rows are never overwritten.
    async fn find_or_create_person(
        txn: &DatabaseTransaction,
        record: &PersonRecord,
        role: people::PersonRole,
        provisioner: &dyn CredentialProvisioner,
    ) -> Result<(people::Model, bool), DbErr> {
        let is_new = insert_if_absent(
            txn,
            people::ActiveModel {
                id: Set(Uuid::new_v4()),
                registration_id: Set(record.registration_id.clone()),
                name: Set(record.name.clone()),
                email: Set(record.email.clone()),
                role: Set(role),
                admin: Set(false),
                password_hash: Set(None),
                created_at: Set(Utc::now()),
            },
            [people::Column::RegistrationId],
        )
        .await?;

        let person = people::Entity::find()
            .filter(people::Column::RegistrationId.eq(record.registration_id.as_str()))
            .one(txn)
            .await?
            .ok_or_else(|| vanished("person", &record.registration_id))?;

        if is_new {
            provisioner.provision_and_notify(txn, &person).await?;
        }

        Ok((person, is_new))
    }

    async fn ensure_membership(
        txn: &DatabaseTransaction,
        section_id: Uuid,
        person_id: Uuid,
    ) -> Result<(), DbErr> {
        insert_if_absent(
            txn,
            section_members::ActiveModel {
                id: Set(Uuid::new_v4()),
                section_id: Set(section_id),
                person_id: Set(person_id),
                created_at: Set(Utc::now()),
            },
            [
                section_members::Column::SectionId,
                section_members::Column::PersonId,
            ],
        )
        .await?;

        Ok(())
    }
}
