use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let pool = if database_url.contains(":memory:") {
        // In-memory databases exist per connection; pin the pool to a
        // single connection so migrations and queries see the same one.
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true).foreign_keys(true))
            .await?
    } else {
        // Resolve the file path and ensure the parent directory exists.
        // Handles both "sqlite:./foo.db" and "sqlite:../foo.db" forms.
        let file_path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
        let abs_path = std::env::current_dir()?.join(file_path);
        if let Some(parent) = abs_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        SqlitePool::connect_with(
            SqliteConnectOptions::new()
                .filename(&abs_path)
                .create_if_missing(true)
                .foreign_keys(true),
        )
        .await?
    };

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
