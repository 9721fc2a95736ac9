use dal::{Condition, Fields, MutationEntity, Provider, QueryEntity, Value};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn account(code: &str, balance: i32) -> Fields {
    Fields::from_iter([("Code", Value::from(code)), ("Balance", Value::from(balance))])
}

pub async fn transaction<P: Provider>(provider: &P) {
    let _lock = MUTEX.lock().await;

    // Setup
    provider
        .exec_with_sql("DROP TABLE IF EXISTS account", vec![])
        .await
        .expect("Failed to drop the account table");
    provider
        .exec_with_sql(
            "CREATE TABLE account (Code VARCHAR(16) PRIMARY KEY, Balance INT NOT NULL)",
            vec![],
        )
        .await
        .expect("Failed to create the account table");

    // The second entity fails, nothing of the first one survives
    let failing = [
        MutationEntity::insert("account", account("A001", 10)).expect("Invalid insert"),
        MutationEntity::insert("no_such_table", account("A002", 20)).expect("Invalid insert"),
        MutationEntity::insert("account", account("A003", 30)).expect("Invalid insert"),
    ];
    assert!(provider.exec_transaction(&failing).await.is_err());
    let rows = provider
        .list(&QueryEntity::all("account"))
        .await
        .expect("Failed to list the accounts");
    assert!(rows.is_empty());

    // Rows affected are summed over every entity
    let succeeding = [
        MutationEntity::insert("account", account("A001", 10)).expect("Invalid insert"),
        MutationEntity::insert("account", account("A002", 20)).expect("Invalid insert"),
        MutationEntity::update(
            "account",
            Fields::from_iter([("Balance", 5)]),
            Condition::raw("WHERE Code IN (?, ?)")
                .bind("A001")
                .bind("A002"),
        )
        .expect("Invalid update"),
    ];
    let affected = provider
        .exec_transaction(&succeeding)
        .await
        .expect("Failed to run the transaction");
    assert_eq!(affected, 4);
    let rows = provider
        .list(&QueryEntity::all("account"))
        .await
        .expect("Failed to list the accounts");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|v| v["Balance"] == "5"));

    // Empty batches are rejected before reaching the store
    assert!(provider.exec_transaction(&[]).await.is_err());
}
