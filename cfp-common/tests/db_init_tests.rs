//! Tests for on-disk database initialization

use cfp_common::db::init_database;
use cfp_common::db::users::{self, NewUser};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("cfp.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_reopens_existing_data() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cfp.db");

    {
        let pool = init_database(&db_path).await.unwrap();
        users::create_user(&pool, &NewUser::speaker("kept@example.com", "secret", "Kept", "User"))
            .await
            .unwrap();
        pool.close().await;
    }

    // Schema creation is idempotent and leaves rows alone
    let pool = init_database(&db_path).await.unwrap();
    let identity = users::authenticate(&pool, "kept@example.com", "secret").await.unwrap();
    assert!(identity.is_some());
}
