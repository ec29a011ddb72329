use crate::silent_logs;
use sqlcrud::{Config, Crud, CrudError, DbResult, Executor, NO_PARAMS, Record, Value};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Note {
    #[crud(column = "BODY")]
    pub body: Option<String>,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Measure {
    #[crud(column = "VALUE")]
    pub value: f64,
    #[crud(column = "UNIT")]
    pub unit: String,
}

pub async fn errors<E: Executor>(executor: &mut E) {
    let crud = Crud::new(Config::default().trace_sql(true));

    // Driver errors surface unchanged
    silent_logs! {
        let error = crud
            .exec(executor, "INSERT INTO missing_table VALUES (1)", NO_PARAMS)
            .await
            .expect_err("The table does not exist");
        assert!(format!("{:#}", error).contains("missing_table"));
        assert!(error.downcast_ref::<CrudError>().is_none());
        assert!(
            crud.query_to_maps(executor, "SELECT * FROM missing_table", NO_PARAMS)
                .await
                .is_err()
        );
    }

    // Key based operations need a key
    let note = Note {
        body: Some("hello".into()),
    };
    let error = crud
        .update_by_key(executor, &note, "note")
        .await
        .expect_err("Updating without a key must fail");
    assert_eq!(
        error.downcast_ref::<CrudError>(),
        Some(&CrudError::MissingPrimaryKey {
            operation: "update",
            table: "note".into(),
        })
    );
    let error = crud
        .delete_by_key(executor, &note, "note")
        .await
        .expect_err("Deleting without a key must fail");
    assert!(matches!(
        error.downcast_ref::<CrudError>(),
        Some(CrudError::MissingPrimaryKey {
            operation: "delete",
            ..
        })
    ));

    // Nothing to insert is a no-op
    let result = crud
        .insert(executor, &Note { body: None }, "note")
        .await
        .expect("Inserting an empty record is a no-op");
    assert_eq!(result, DbResult::default());

    // Lenient coercion keeps the field default, strict coercion fails
    let sql = "SELECT 'abc' AS VALUE, 'kg' AS UNIT";
    let measures;
    silent_logs! {
        measures = crud
            .query_to_records::<Measure, _>(executor, sql, NO_PARAMS)
            .await
            .expect("Lenient coercion should not fail");
    }
    assert_eq!(
        measures,
        [Measure {
            value: 0.0,
            unit: "kg".into(),
        }]
    );
    let strict = Crud::new(Config::default().strict());
    assert!(
        strict
            .query_to_records::<Measure, _>(executor, sql, NO_PARAMS)
            .await
            .is_err()
    );
    let measures = strict
        .query_to_records::<Measure, _>(executor, "SELECT 2.5 AS value, 'm' AS unit", NO_PARAMS)
        .await
        .expect("Valid values do not fail in strict mode");
    assert_eq!(
        measures,
        [Measure {
            value: 2.5,
            unit: "m".into(),
        }]
    );
    assert_eq!(Measure::columns().len(), 2);
    assert_eq!(Value::from(Note::columns()[0].name), Value::Varchar("BODY".into()));

    // Binary columns keep their bytes in strict mode, whatever the declared type
    strict
        .exec(executor, "DROP TABLE IF EXISTS binary_data", NO_PARAMS)
        .await
        .expect("Could not drop binary_data");
    strict
        .exec(
            executor,
            "CREATE TABLE binary_data (A bytea, B VARBINARY(16), C binary)",
            NO_PARAMS,
        )
        .await
        .expect("Could not create binary_data");
    let raw = Value::Blob(Box::new([0xff, 0x00]));
    strict
        .exec(
            executor,
            "INSERT INTO binary_data (A, B, C) VALUES (?, ?, ?)",
            &[raw.clone(), raw.clone(), raw.clone()],
        )
        .await
        .expect("Could not insert the binary row");
    let rows = strict
        .query_to_maps(executor, "SELECT A, B, C FROM binary_data", NO_PARAMS)
        .await
        .expect("Binary columns should not fail in strict mode");
    assert_eq!(rows.len(), 1);
    for column in ["a", "b", "c"] {
        assert_eq!(rows[0][column], raw);
    }
}
