use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create templates table
        manager
            .create_table(
                Table::create()
                    .table(Templates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Templates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Templates::Title).string().not_null())
                    .col(
                        ColumnDef::new(Templates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create questions table
        manager
            .create_table(
                Table::create()
                    .table(Questions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Questions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Questions::TemplateId).uuid().not_null())
                    .col(ColumnDef::new(Questions::Position).integer().not_null())
                    .col(ColumnDef::new(Questions::Prompt).text().not_null())
                    .col(ColumnDef::new(Questions::QuestionType).string().not_null())
                    .col(
                        ColumnDef::new(Questions::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Questions::Options).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-questions-template_id")
                            .from(Questions::Table, Questions::TemplateId)
                            .to(Templates::Table, Templates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create evaluations table
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Evaluations::TemplateId).uuid().not_null())
                    .col(ColumnDef::new(Evaluations::Deadline).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Evaluations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluations-template_id")
                            .from(Evaluations::Table, Evaluations::TemplateId)
                            .to(Templates::Table, Templates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create evaluation_sections junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(EvaluationSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationSections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationSections::EvaluationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationSections::TemplateId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationSections::SectionId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluation_sections-evaluation_id")
                            .from(EvaluationSections::Table, EvaluationSections::EvaluationId)
                            .to(Evaluations::Table, Evaluations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluation_sections-template_id")
                            .from(EvaluationSections::Table, EvaluationSections::TemplateId)
                            .to(Templates::Table, Templates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-evaluation_sections-section_id")
                            .from(EvaluationSections::Table, EvaluationSections::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create answer_sets table
        manager
            .create_table(
                Table::create()
                    .table(AnswerSets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnswerSets::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnswerSets::EvaluationId).uuid().not_null())
                    .col(ColumnDef::new(AnswerSets::RespondentId).uuid().not_null())
                    .col(
                        ColumnDef::new(AnswerSets::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answer_sets-evaluation_id")
                            .from(AnswerSets::Table, AnswerSets::EvaluationId)
                            .to(Evaluations::Table, Evaluations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answer_sets-respondent_id")
                            .from(AnswerSets::Table, AnswerSets::RespondentId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create answers table
        manager
            .create_table(
                Table::create()
                    .table(Answers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Answers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Answers::AnswerSetId).uuid().not_null())
                    .col(ColumnDef::new(Answers::QuestionId).uuid().not_null())
                    .col(ColumnDef::new(Answers::Value).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answers-answer_set_id")
                            .from(Answers::Table, Answers::AnswerSetId)
                            .to(AnswerSets::Table, AnswerSets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answers-question_id")
                            .from(Answers::Table, Answers::QuestionId)
                            .to(Questions::Table, Questions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(Answers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AnswerSets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EvaluationSections::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Questions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Templates::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Templates {
    Table,
    Id,
    Title,
    CreatedAt,
}

#[derive(Iden)]
enum Questions {
    Table,
    Id,
    TemplateId,
    Position,
    Prompt,
    QuestionType,
    Required,
    Options,
}

#[derive(Iden)]
enum Evaluations {
    Table,
    Id,
    TemplateId,
    Deadline,
    CreatedAt,
}

#[derive(Iden)]
enum EvaluationSections {
    Table,
    Id,
    EvaluationId,
    TemplateId,
    SectionId,
}

#[derive(Iden)]
enum AnswerSets {
    Table,
    Id,
    EvaluationId,
    RespondentId,
    SubmittedAt,
}

#[derive(Iden)]
enum Answers {
    Table,
    Id,
    AnswerSetId,
    QuestionId,
    Value,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
}

#[derive(Iden)]
enum People {
    Table,
    Id,
}
