use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Insert, IntoActiveModel,
    sea_query::OnConflict,
};

/// Inserts `model` unless a row with the same natural key already exists.
///
/// Relies on the unique index over `key`, so two concurrent callers can never
/// both take the creation branch.
///
/// # Returns
/// `true` when this call inserted the row
pub(crate) async fn insert_if_absent<A, C, I>(conn: &C, model: A, key: I) -> Result<bool, DbErr>
where
    A: ActiveModelTrait + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
    I: IntoIterator<Item = <A::Entity as EntityTrait>::Column>,
{
    let rows = Insert::one(model)
        .on_conflict(OnConflict::columns(key).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    Ok(rows > 0)
}

/// A row that must exist after [`insert_if_absent`] could not be read back
pub(crate) fn vanished(entity: &str, key: &str) -> DbErr {
    DbErr::RecordNotFound(format!("{entity} `{key}` missing after upsert"))
}
