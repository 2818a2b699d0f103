use crate::entities::{people, sections};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter};

pub struct PersonService;

impl PersonService {
    pub async fn find_by_registration_id(
        db: &DatabaseConnection,
        registration_id: &str,
    ) -> Result<Option<people::Model>, DbErr> {
        people::Entity::find()
            .filter(people::Column::RegistrationId.eq(registration_id.trim()))
            .one(db)
            .await
    }

    /// Sections the person teaches or attends
    pub async fn sections_of(
        db: &DatabaseConnection,
        person: &people::Model,
    ) -> Result<Vec<sections::Model>, DbErr> {
        person.find_related(sections::Entity).all(db).await
    }
}
