use indoc::indoc;
use serde::{Deserialize, Serialize};
use sqlcrud::{Config, Crud, Executor, NO_PARAMS, Record, RecordValues, Value};
use time::{
    Date, PrimitiveDateTime,
    macros::{date, datetime},
};
use uuid::Uuid;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: String,
    pub tags: Vec<String>,
    pub limits: Option<(u32, u32)>,
}

#[derive(Record, Default, Debug, Clone, PartialEq)]
pub struct Account {
    #[crud(column = "ACCOUNT_ID", primary_key)]
    pub account_id: i32,
    #[crud(column = "EMAIL")]
    pub email: String,
    #[crud(column = "BALANCE")]
    pub balance: f64,
    #[crud(column = "ACTIVE")]
    pub active: bool,
    #[crud(column = "NICKNAME")]
    pub nickname: Option<String>,
    #[crud(column = "PREFERENCES")]
    pub preferences: Preferences,
    #[crud(column = "CREATED")]
    pub created: Option<PrimitiveDateTime>,
    #[crud(column = "BIRTHDAY")]
    pub birthday: Option<Date>,
    #[crud(column = "EXTERNAL_ID")]
    pub external_id: Uuid,
    #[crud(column = "LABELS", json)]
    pub labels: Option<Vec<String>>,
    /// Not persisted.
    pub session: u32,
}

fn neo() -> Account {
    Account {
        account_id: 42,
        email: "neo@example.com".into(),
        balance: 1234.5,
        active: true,
        nickname: Some("neo".into()),
        preferences: Preferences {
            theme: "dark".into(),
            tags: vec!["red pill".into(), "it's \"quoted\"".into()],
            limits: Some((10, 20)),
        },
        created: Some(datetime!(1999-03-31 9:30:00)),
        birthday: Some(date!(1971 - 09 - 13)),
        external_id: Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").unwrap(),
        labels: Some(vec!["one".into(), "two".into()]),
        session: 0,
    }
}

pub async fn accounts<E: Executor>(executor: &mut E) {
    let crud = Crud::new(Config::default());

    // Setup
    crud.exec(executor, "DROP TABLE IF EXISTS account", NO_PARAMS)
        .await
        .expect("Failed to drop the account table");
    crud.exec(
        executor,
        indoc! {"
            CREATE TABLE account(
                ACCOUNT_ID INTEGER PRIMARY KEY,
                EMAIL TEXT NOT NULL,
                BALANCE REAL,
                ACTIVE BOOLEAN,
                NICKNAME TEXT,
                PREFERENCES TEXT,
                CREATED TIMESTAMP,
                BIRTHDAY DATE,
                EXTERNAL_ID TEXT,
                LABELS TEXT
            )
        "},
        NO_PARAMS,
    )
    .await
    .expect("Failed to create the account table");

    // Metadata
    let values = RecordValues::new(&neo()).expect("Could not extract the values");
    assert_eq!(
        values.keys().collect::<Vec<_>>(),
        [("ACCOUNT_ID", Value::Int64(42))]
    );
    assert_eq!(values.values().count(), 9);
    assert!(!Account::columns().iter().any(|c| c.field == "session"));

    // Round trip
    let mut account = neo();
    account.session = 77;
    let result = crud
        .insert(executor, &account, "account")
        .await
        .expect("Failed to insert the account");
    assert_eq!(result.rows_affected, 1);
    let mut fetched = Account {
        account_id: 42,
        ..Default::default()
    };
    crud.fetch_by_key(executor, &mut fetched, "account")
        .await
        .expect("Failed to fetch the account");
    assert_eq!(fetched, neo());

    // Unset optional fields are not written
    let update = Account {
        email: "thomas.anderson@example.com".into(),
        nickname: None,
        birthday: None,
        labels: None,
        ..neo()
    };
    crud.update_by_key(executor, &update, "account")
        .await
        .expect("Failed to update the account");
    let mut fetched = Account {
        account_id: 42,
        ..Default::default()
    };
    crud.fetch_by_key(executor, &mut fetched, "account")
        .await
        .expect("Failed to fetch the updated account");
    assert_eq!(fetched.email, "thomas.anderson@example.com");
    assert_eq!(fetched.nickname, Some("neo".into()));
    assert_eq!(fetched.birthday, Some(date!(1971 - 09 - 13)));
    assert_eq!(fetched.labels, Some(vec!["one".into(), "two".into()]));

    // Null columns read back as None
    crud.exec(
        executor,
        "UPDATE account SET NICKNAME = NULL, LABELS = NULL WHERE ACCOUNT_ID = ?",
        &[Value::Int64(42)],
    )
    .await
    .expect("Failed to clear the nickname");
    let mut fetched = Account {
        account_id: 42,
        ..Default::default()
    };
    crud.fetch_by_key(executor, &mut fetched, "account")
        .await
        .expect("Failed to fetch the account without nickname");
    assert_eq!(fetched.nickname, None);
    assert_eq!(fetched.labels, None);
    assert_eq!(fetched.preferences, neo().preferences);
    assert_eq!(fetched.created, neo().created);
    assert_eq!(fetched.external_id, neo().external_id);
}
