use sqlcrud::{Config, Connection, Crud, CrudError, NO_PARAMS, Record, Transaction};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Ledger {
    #[crud(column = "ID", primary_key)]
    pub id: i64,
    #[crud(column = "AMOUNT")]
    pub amount: i32,
}

pub async fn transaction1<C: Connection>(connection: &mut C) {
    let crud = Crud::new(Config::default());
    let dialect = crud.dialect(connection).await;

    // Setup
    crud.exec(connection, "DROP TABLE IF EXISTS ledger", NO_PARAMS)
        .await
        .expect("Failed to drop the ledger table");
    crud.exec(
        connection,
        "CREATE TABLE ledger(ID INTEGER PRIMARY KEY, AMOUNT INTEGER)",
        NO_PARAMS,
    )
    .await
    .expect("Failed to create the ledger table");

    // Rollback
    let mut transaction = connection
        .begin()
        .await
        .expect("Failed to begin the transaction");
    assert_eq!(crud.dialect(&mut transaction).await, dialect);
    crud.insert(&mut transaction, &Ledger { id: 1, amount: 10 }, "ledger")
        .await
        .expect("Failed to insert inside the transaction");
    let mut entry = Ledger {
        id: 1,
        ..Default::default()
    };
    crud.fetch_by_key(&mut transaction, &mut entry, "ledger")
        .await
        .expect("The transaction should see its own insert");
    assert_eq!(entry.amount, 10);
    transaction
        .rollback()
        .await
        .expect("Failed to rollback the transaction");
    let error = crud
        .fetch_by_key(connection, &mut entry, "ledger")
        .await
        .expect_err("The insert was rolled back");
    assert!(matches!(
        error.downcast_ref::<CrudError>(),
        Some(CrudError::NotFound { .. })
    ));

    // Commit
    let mut transaction = connection
        .begin()
        .await
        .expect("Failed to begin the transaction");
    crud.insert(&mut transaction, &Ledger { id: 2, amount: 20 }, "ledger")
        .await
        .expect("Failed to insert inside the transaction");
    crud.update_by_key(&mut transaction, &Ledger { id: 2, amount: 25 }, "ledger")
        .await
        .expect("Failed to update inside the transaction");
    transaction
        .commit()
        .await
        .expect("Failed to commit the transaction");
    let mut entry = Ledger {
        id: 2,
        ..Default::default()
    };
    crud.fetch_by_key(connection, &mut entry, "ledger")
        .await
        .expect("The committed row should be visible");
    assert_eq!(entry, Ledger { id: 2, amount: 25 });
    assert_eq!(Ledger::columns().len(), 2);
    assert_eq!(crud.dialects().len(), 1);
}
