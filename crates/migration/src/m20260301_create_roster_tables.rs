use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create disciplines table
        manager
            .create_table(
                Table::create()
                    .table(Disciplines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Disciplines::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Disciplines::Code).string().not_null())
                    .col(ColumnDef::new(Disciplines::Name).string().not_null())
                    .col(ColumnDef::new(Disciplines::Description).text())
                    .col(
                        ColumnDef::new(Disciplines::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create people table
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(People::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(People::RegistrationId).string().not_null())
                    .col(ColumnDef::new(People::Name).string().not_null())
                    .col(ColumnDef::new(People::Email).string())
                    .col(ColumnDef::new(People::Role).string().not_null())
                    .col(
                        ColumnDef::new(People::Admin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(People::PasswordHash).string())
                    .col(
                        ColumnDef::new(People::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sections table
        manager
            .create_table(
                Table::create()
                    .table(Sections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sections::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sections::DisciplineId).uuid().not_null())
                    .col(ColumnDef::new(Sections::Code).string().not_null())
                    .col(ColumnDef::new(Sections::Term).string().not_null())
                    .col(ColumnDef::new(Sections::Schedule).string())
                    .col(ColumnDef::new(Sections::InstructorId).uuid())
                    .col(
                        ColumnDef::new(Sections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sections-discipline_id")
                            .from(Sections::Table, Sections::DisciplineId)
                            .to(Disciplines::Table, Disciplines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sections-instructor_id")
                            .from(Sections::Table, Sections::InstructorId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create section_members junction table (many-to-many)
        manager
            .create_table(
                Table::create()
                    .table(SectionMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SectionMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SectionMembers::SectionId).uuid().not_null())
                    .col(ColumnDef::new(SectionMembers::PersonId).uuid().not_null())
                    .col(
                        ColumnDef::new(SectionMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-section_members-section_id")
                            .from(SectionMembers::Table, SectionMembers::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-section_members-person_id")
                            .from(SectionMembers::Table, SectionMembers::PersonId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create credential_notices outbox table
        manager
            .create_table(
                Table::create()
                    .table(CredentialNotices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CredentialNotices::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CredentialNotices::PersonId).uuid().not_null())
                    .col(ColumnDef::new(CredentialNotices::Email).string())
                    .col(ColumnDef::new(CredentialNotices::Token).string().not_null())
                    .col(
                        ColumnDef::new(CredentialNotices::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CredentialNotices::SentAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CredentialNotices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-credential_notices-person_id")
                            .from(CredentialNotices::Table, CredentialNotices::PersonId)
                            .to(People::Table, People::Id)
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
            .drop_table(Table::drop().table(CredentialNotices::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SectionMembers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Sections::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Disciplines::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Disciplines {
    Table,
    Id,
    Code,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum People {
    Table,
    Id,
    RegistrationId,
    Name,
    Email,
    Role,
    Admin,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum Sections {
    Table,
    Id,
    DisciplineId,
    Code,
    Term,
    Schedule,
    InstructorId,
    CreatedAt,
}

#[derive(Iden)]
enum SectionMembers {
    Table,
    Id,
    SectionId,
    PersonId,
    CreatedAt,
}

#[derive(Iden)]
enum CredentialNotices {
    Table,
    Id,
    PersonId,
    Email,
    Token,
    ExpiresAt,
    SentAt,
    CreatedAt,
}
