use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Reads `DATABASE_URL`, loading `.env` first when one exists
pub fn database_url() -> Result<String, DbErr> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| DbErr::Custom("DATABASE_URL is not set".to_string()))
}

/// Creates a database connection from the environment
pub async fn create_connection() -> Result<DatabaseConnection, DbErr> {
    connect(&database_url()?).await
}

/// Creates a database connection to an explicit URL
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url);
    options.sqlx_logging_level(log::LevelFilter::Debug);
    Database::connect(options).await
}
