use dal::{
    Aggregate, Condition, Fields, MutationEntity, Provider, QueryEntity, ResultKind, Value,
};
use std::sync::LazyLock;
use time::{PrimitiveDateTime, macros::datetime};
use tokio::sync::Mutex;

#[derive(Aggregate, Default, Debug, Clone, PartialEq)]
pub struct Student {
    #[dal(name = "Id")]
    pub id: u64,
    #[dal(name = "StuCode")]
    pub code: String,
    #[dal(name = "StuName")]
    pub name: String,
    #[dal(name = "Age")]
    pub age: i32,
    #[dal(name = "Enrolled")]
    pub enrolled: Option<PrimitiveDateTime>,
    #[dal(skip)]
    pub selected: bool,
}

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn by_code(code: &str) -> Condition {
    Condition::equality(Fields::from_iter([("StuCode", code)]))
        .expect("Could not build the condition")
}

pub async fn student<P: Provider>(provider: &P) {
    let _lock = MUTEX.lock().await;

    // Setup
    provider
        .exec_with_sql("DROP TABLE IF EXISTS student", vec![])
        .await
        .expect("Failed to drop the student table");
    provider
        .exec_with_sql(
            "CREATE TABLE student (
                Id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                StuCode VARCHAR(16) NOT NULL UNIQUE,
                StuName VARCHAR(64) NOT NULL DEFAULT '',
                Age INT NOT NULL DEFAULT 0,
                Enrolled DATETIME NULL
            )",
            vec![],
        )
        .await
        .expect("Failed to create the student table");

    // Insert
    let ann = Student {
        code: "S001".into(),
        name: "Ann".into(),
        age: 20,
        enrolled: Some(datetime!(2021-09-01 08:00:00)),
        ..Default::default()
    };
    let id = provider
        .exec(&MutationEntity::insert("student", &ann).expect("Invalid insert"))
        .await
        .expect("Failed to insert S001");
    assert!(id > 0);
    let lyric = Fields::from_iter([
        ("StuCode", Value::from("S002")),
        ("StuName", Value::from("Lyric")),
    ]);
    let id_lyric = provider
        .exec(&MutationEntity::insert("student", lyric).expect("Invalid insert"))
        .await
        .expect("Failed to insert S002");
    assert!(id_lyric > id);

    // Single
    let row = provider
        .single(&QueryEntity::new("student", by_code("S002")))
        .await
        .expect("Failed to query S002");
    assert_eq!(row["StuName"], "Lyric");
    assert_eq!(row["Age"], "0");
    assert_eq!(row["Enrolled"], "");
    let row = provider
        .single(&QueryEntity::new("student", by_code("S404")))
        .await
        .expect("A missing row is not an error");
    assert!(row.is_empty());

    // Assign single
    let mut student = Student {
        selected: true,
        ..Default::default()
    };
    provider
        .assign_single(&QueryEntity::new("student", by_code("S001")), &mut student)
        .await
        .expect("Failed to decode S001");
    assert_eq!(
        student,
        Student {
            id,
            selected: true,
            ..ann.clone()
        }
    );

    // Partial update, only the age is written
    let updated = provider
        .exec(
            &MutationEntity::update(
                "student",
                Student {
                    age: 21,
                    ..Default::default()
                },
                by_code("S002"),
            )
            .expect("Invalid update"),
        )
        .await
        .expect("Failed to update S002");
    assert_eq!(updated, 1);
    let row = provider
        .single(&QueryEntity::new("student", by_code("S002")).fields(["StuName", "Age"]))
        .await
        .expect("Failed to query S002");
    assert_eq!(row.len(), 2);
    assert_eq!(row["StuName"], "Lyric");
    assert_eq!(row["Age"], "21");

    // List
    let students: Vec<Student> = provider
        .assign_list(&QueryEntity::all("student").kind(ResultKind::List))
        .await
        .expect("Failed to list the students");
    assert_eq!(students.len(), 2);
    let names = students.iter().map(|v| v.name.as_str()).collect::<Vec<_>>();
    assert!(names.contains(&"Ann"));
    assert!(names.contains(&"Lyric"));
    let rows = provider
        .list(&QueryEntity::new(
            "student",
            Condition::raw("WHERE Age > ?").bind(20),
        ))
        .await
        .expect("Failed to list by age");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["StuCode"], "S002");
    let rows = provider
        .list_with_sql(
            "SELECT StuCode FROM student WHERE Enrolled IS NOT NULL",
            vec![],
        )
        .await
        .expect("Failed to run the raw query");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["StuCode"], "S001");
    let mut enrolled = Student::default();
    provider
        .assign_single_with_sql(
            "SELECT * FROM student WHERE StuCode = ?",
            vec!["S001".into()],
            &mut enrolled,
        )
        .await
        .expect("Failed to decode the raw query");
    assert_eq!(enrolled.enrolled, Some(datetime!(2021-09-01 08:00:00)));

    // An empty condition never matches everything
    let empty = Condition::equality(Fields::new()).expect("Could not build the condition");
    assert!(
        provider
            .list(&QueryEntity::new("student", empty))
            .await
            .is_err()
    );

    // Delete
    let deleted = provider
        .exec(&MutationEntity::delete("student", by_code("S001")))
        .await
        .expect("Failed to delete S001");
    assert_eq!(deleted, 1);
    let rows = provider
        .list(&QueryEntity::all("student"))
        .await
        .expect("Failed to list the students");
    assert_eq!(rows.len(), 1);
}
