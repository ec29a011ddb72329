use indoc::indoc;
use serde_json::json;
use sqlcrud::{Config, Crud, Dialect, Executor, NO_PARAMS, Record, Value};

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Item {
    #[crud(column = "ID", primary_key)]
    pub id: u32,
    #[crud(column = "LABEL")]
    pub label: String,
    #[crud(column = "PRICE")]
    pub price: Option<f64>,
}

fn item(id: u32, label: &str, price: Option<f64>) -> Item {
    Item {
        id,
        label: label.into(),
        price,
    }
}

pub async fn bulk<E: Executor>(executor: &mut E) {
    let crud = Crud::new(Config::default());

    // Dialect is probed once
    assert_eq!(crud.dialect(executor).await, Dialect::Sqlite);
    assert_eq!(crud.dialect(executor).await, Dialect::Sqlite);
    assert_eq!(crud.dialects().len(), 1);
    assert_eq!(crud.dialects().get(executor.id()), Some(Dialect::Sqlite));

    // Setup
    crud.exec(executor, "DROP TABLE IF EXISTS item", NO_PARAMS)
        .await
        .expect("Failed to drop the item table");
    crud.exec(
        executor,
        indoc! {"
            CREATE TABLE item(
                ID INTEGER PRIMARY KEY,
                LABEL VARCHAR(32),
                PRICE DOUBLE
            )
        "},
        NO_PARAMS,
    )
    .await
    .expect("Failed to create the item table");
    let items = [
        item(1, "pen", Some(1.5)),
        item(2, "notebook", Some(4.25)),
        item(3, "gift", None),
    ];
    for item in &items {
        crud.insert(executor, item, "item")
            .await
            .expect("Failed to insert an item");
    }

    // Arrays
    let arrays = crud
        .query_to_arrays(executor, "SELECT ID, Label, PRICE FROM item ORDER BY ID", NO_PARAMS)
        .await
        .expect("Failed to read the items as arrays");
    assert_eq!(arrays.columns, ["id", "label", "price"]);
    assert_eq!(
        arrays.rows,
        [
            vec![Value::Int64(1), Value::Varchar("pen".into()), Value::Float64(1.5)],
            vec![
                Value::Int64(2),
                Value::Varchar("notebook".into()),
                Value::Float64(4.25)
            ],
            vec![Value::Int64(3), Value::Varchar("gift".into()), Value::Null],
        ]
    );
    let empty = crud
        .query_to_arrays(executor, "SELECT ID, LABEL FROM item WHERE ID < 0", NO_PARAMS)
        .await
        .expect("Failed to run an empty query");
    assert_eq!(empty.columns, ["id", "label"]);
    assert!(empty.rows.is_empty());

    // Maps
    let maps = crud
        .query_to_maps(
            executor,
            "SELECT * FROM item WHERE PRICE > ? ORDER BY ID DESC",
            &[Value::Float64(1.0)],
        )
        .await
        .expect("Failed to read the items as maps");
    assert_eq!(maps.len(), 2);
    assert_eq!(maps[0]["id"], Value::Int64(2));
    assert_eq!(maps[0]["label"], Value::Varchar("notebook".into()));
    assert_eq!(maps[1]["price"], Value::Float64(1.5));
    assert_eq!(maps[1].keys().collect::<Vec<_>>(), ["id", "label", "price"]);

    // Records
    let records = crud
        .query_to_records::<Item, _>(executor, "SELECT * FROM item ORDER BY ID", NO_PARAMS)
        .await
        .expect("Failed to read the items as records");
    assert_eq!(records, items);
    let partial = crud
        .query_to_records::<Item, _>(
            executor,
            "SELECT LABEL AS label, 'ignored' AS other FROM item WHERE ID = ?",
            &[Value::Int64(2)],
        )
        .await
        .expect("Failed to read a partial record");
    assert_eq!(partial, [item(0, "notebook", None)]);

    // Expressions carrying JSON text are decoded
    let maps = crud
        .query_to_maps(
            executor,
            "SELECT json_object('a', 1, 'b', json_array(1, 2)) AS doc, '[not json' AS text",
            NO_PARAMS,
        )
        .await
        .expect("Failed to read the JSON expression");
    assert_eq!(maps[0]["doc"], Value::Json(json!({"a": 1, "b": [1, 2]})));
    assert_eq!(maps[0]["text"], Value::Varchar("[not json".into()));
    let maps = crud
        .query_to_maps(
            executor,
            "SELECT LABEL AS doc FROM item WHERE ID = 1",
            NO_PARAMS,
        )
        .await
        .expect("Failed to read a plain column");
    assert_eq!(maps[0]["doc"], Value::Varchar("pen".into()));
    assert!(Item::columns()[0].primary_key);
}
