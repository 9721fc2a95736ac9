use dal::{
    Condition, Fields, MutationEntity, PagerParam, Provider, QueryEntity, QueryOutput, Value,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn pager<P: Provider>(provider: &P) {
    let _lock = MUTEX.lock().await;

    // Setup
    provider
        .exec_with_sql("DROP TABLE IF EXISTS pager_item", vec![])
        .await
        .expect("Failed to drop the pager_item table");
    provider
        .exec_with_sql(
            "CREATE TABLE pager_item (Id INT PRIMARY KEY, Grp CHAR(1) NOT NULL)",
            vec![],
        )
        .await
        .expect("Failed to create the pager_item table");
    let items = (1..=32)
        .map(|i| {
            MutationEntity::insert(
                "pager_item",
                Fields::from_iter([
                    ("Id", Value::from(i)),
                    ("Grp", Value::from(if i <= 25 { "a" } else { "b" })),
                ]),
            )
            .expect("Invalid insert")
        })
        .collect::<Vec<_>>();
    let inserted = provider
        .exec_transaction(&items)
        .await
        .expect("Failed to insert the items");
    assert_eq!(inserted, 32);

    let group_a = || {
        Condition::equality(Fields::from_iter([("Grp", "a")]))
            .expect("Could not build the condition")
    };
    let page = provider
        .paged(&QueryEntity::paged(
            "pager_item",
            group_a(),
            PagerParam::new(3, 10),
        ))
        .await
        .expect("Failed to read page 3");
    assert_eq!(page.total, 25);
    assert_eq!(page.rows.len(), 5);
    assert!(page.rows.iter().all(|v| v["Grp"] == "a"));

    let page = provider
        .paged(&QueryEntity::paged(
            "pager_item",
            group_a(),
            PagerParam::new(4, 10),
        ))
        .await
        .expect("Failed to read page 4");
    assert_eq!(page.total, 25);
    assert!(page.rows.is_empty());

    // Invalid page parameters fall back to the first page of 15
    let output = provider
        .query(
            &QueryEntity::new("pager_item", Condition::raw("WHERE Id > ?").bind(0))
                .fields(["Id"])
                .pager(PagerParam::new(0, -1)),
        )
        .await
        .expect("Failed to read the default page");
    let QueryOutput::Paged(page) = output else {
        panic!("Expected a paged result");
    };
    assert_eq!(page.total, 32);
    assert_eq!(page.rows.len(), 15);
    assert!(page.rows.iter().all(|v| v.len() == 1));

    // A failing statement fails the whole page
    assert!(
        provider
            .paged(&QueryEntity::paged(
                "pager_item",
                Condition::raw("WHERE Missing = ?").bind(1),
                PagerParam::default(),
            ))
            .await
            .is_err()
    );
}
