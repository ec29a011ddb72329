use indoc::indoc;
use sqlcrud::{Config, Crud, CrudError, DbResult, Dialect, Executor, NO_PARAMS, Record};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Test {
    #[crud(column = "ID", primary_key)]
    pub id: i64,
    #[crud(column = "NAME")]
    pub name: String,
}

fn test(id: i64, name: &str) -> Test {
    Test {
        id,
        name: name.into(),
    }
}

pub async fn simple<E: Executor>(executor: &mut E) {
    let crud = Crud::new(Config::default());
    assert_eq!(crud.dialect(executor).await, Dialect::Sqlite);

    // Setup
    crud.exec(executor, "DROP TABLE IF EXISTS test", NO_PARAMS)
        .await
        .expect("Failed to drop the test table");
    crud.exec(
        executor,
        indoc! {"
            CREATE TABLE test(
                ID integer primary key,
                NAME text
            )
        "},
        NO_PARAMS,
    )
    .await
    .expect("Failed to create the test table");

    // Insert
    for (id, name) in [(1, "Alpha"), (2, "Beta"), (3, "Gamma")] {
        let result = crud
            .insert(executor, &test(id, name), "test")
            .await
            .expect("Failed to insert");
        assert_eq!(
            result,
            DbResult {
                rows_affected: 1,
                last_insert_id: Some(id),
            }
        );
    }

    // Fetch
    let mut record = test(2, "");
    crud.fetch_by_key(executor, &mut record, "test")
        .await
        .expect("Failed to fetch the record 2");
    assert_eq!(record, test(2, "Beta"));
    let mut missing = test(99, "");
    let error = crud
        .fetch_by_key(executor, &mut missing, "test")
        .await
        .expect_err("The record 99 should not exist");
    assert_eq!(
        error.downcast_ref::<CrudError>(),
        Some(&CrudError::NotFound {
            table: "test".into(),
            keys: "ID=99".into(),
        })
    );
    assert_eq!(error.to_string(), "no record found for test, ID=99");
    assert_eq!(missing, test(99, ""));

    // Update
    let result = crud
        .update_by_key(executor, &test(2, "Zeta"), "test")
        .await
        .expect("Failed to update the record 2");
    assert_eq!(result.rows_affected, 1);
    let mut record = test(2, "");
    crud.fetch_by_key(executor, &mut record, "test")
        .await
        .expect("Failed to fetch the record 2 after the update");
    assert_eq!(record, test(2, "Zeta"));

    // Delete
    let result = crud
        .delete_by_key(executor, &test(2, ""), "test")
        .await
        .expect("Failed to delete the record 2");
    assert_eq!(result.rows_affected, 1);
    let error = crud
        .fetch_by_key(executor, &mut test(2, ""), "test")
        .await
        .expect_err("The record 2 should be deleted");
    assert!(matches!(
        error.downcast_ref::<CrudError>(),
        Some(CrudError::NotFound { .. })
    ));
    let result = crud
        .delete_by_key(executor, &test(2, ""), "test")
        .await
        .expect("Deleting a missing record is not an error");
    assert_eq!(result.rows_affected, 0);

    // Remaining rows
    let rows = crud
        .query_to_records::<Test, _>(executor, "SELECT * FROM test ORDER BY ID", NO_PARAMS)
        .await
        .expect("Failed to read the remaining rows");
    assert_eq!(rows, [test(1, "Alpha"), test(3, "Gamma")]);
    assert_eq!(Test::columns().len(), 2);
}
