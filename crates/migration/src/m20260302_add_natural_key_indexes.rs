use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Natural keys used by the importer's find-or-create
        manager
            .create_index(
                Index::create()
                    .name("uq_disciplines_code")
                    .table(Disciplines::Table)
                    .col(Disciplines::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_sections_discipline_code_term")
                    .table(Sections::Table)
                    .col(Sections::DisciplineId)
                    .col(Sections::Code)
                    .col(Sections::Term)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_people_registration_id")
                    .table(People::Table)
                    .col(People::RegistrationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_section_members_section_person")
                    .table(SectionMembers::Table)
                    .col(SectionMembers::SectionId)
                    .col(SectionMembers::PersonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on section_members.person_id for "which sections is this person in"
        manager
            .create_index(
                Index::create()
                    .name("idx_section_members_person_id")
                    .table(SectionMembers::Table)
                    .col(SectionMembers::PersonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_templates_title")
                    .table(Templates::Table)
                    .col(Templates::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_questions_template_position")
                    .table(Questions::Table)
                    .col(Questions::TemplateId)
                    .col(Questions::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_evaluation_sections_evaluation_section")
                    .table(EvaluationSections::Table)
                    .col(EvaluationSections::EvaluationId)
                    .col(EvaluationSections::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // A section receives each template at most once
        manager
            .create_index(
                Index::create()
                    .name("uq_evaluation_sections_template_section")
                    .table(EvaluationSections::Table)
                    .col(EvaluationSections::TemplateId)
                    .col(EvaluationSections::SectionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One submission per respondent per evaluation
        manager
            .create_index(
                Index::create()
                    .name("uq_answer_sets_evaluation_respondent")
                    .table(AnswerSets::Table)
                    .col(AnswerSets::EvaluationId)
                    .col(AnswerSets::RespondentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One answer per question per submission
        manager
            .create_index(
                Index::create()
                    .name("uq_answers_answer_set_question")
                    .table(Answers::Table)
                    .col(Answers::AnswerSetId)
                    .col(Answers::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes in reverse order
        for name in [
            "uq_answers_answer_set_question",
            "uq_answer_sets_evaluation_respondent",
            "uq_evaluation_sections_template_section",
            "uq_evaluation_sections_evaluation_section",
            "idx_questions_template_position",
            "uq_templates_title",
            "idx_section_members_person_id",
            "uq_section_members_section_person",
            "uq_people_registration_id",
            "uq_sections_discipline_code_term",
            "uq_disciplines_code",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Disciplines {
    Table,
    Code,
}

#[derive(Iden)]
enum Sections {
    Table,
    DisciplineId,
    Code,
    Term,
}

#[derive(Iden)]
enum People {
    Table,
    RegistrationId,
}

#[derive(Iden)]
enum SectionMembers {
    Table,
    SectionId,
    PersonId,
}

#[derive(Iden)]
enum Templates {
    Table,
    Title,
}

#[derive(Iden)]
enum Questions {
    Table,
    TemplateId,
    Position,
}

#[derive(Iden)]
enum EvaluationSections {
    Table,
    EvaluationId,
    TemplateId,
    SectionId,
}

#[derive(Iden)]
enum AnswerSets {
    Table,
    EvaluationId,
    RespondentId,
}

#[derive(Iden)]
enum Answers {
    Table,
    AnswerSetId,
    QuestionId,
}
