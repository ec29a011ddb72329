#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde::{Deserialize, Serialize};
    use sqlcrud::{
        AsValue, ColumnDef, FieldKind, Record, RecordValues, Value, column_names, find_column,
    };
    use time::{
        Date, PrimitiveDateTime,
        macros::{date, datetime},
    };
    use uuid::Uuid;

    #[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
    pub struct Address {
        pub street: String,
        pub zip: Option<u32>,
    }

    #[derive(Record, Default, Debug, Clone, PartialEq)]
    pub struct Employee {
        #[crud(column = "EMPLOYEE_ID", primary_key)]
        pub id: Uuid,
        #[crud(column = "BRANCH", primary_key)]
        pub branch: Option<i32>,
        #[crud(column = "NAME")]
        pub name: String,
        #[crud(column = "SALARY")]
        pub salary: f64,
        #[crud(column = "HIRED")]
        pub hired: Option<Date>,
        #[crud(column = "UPDATED")]
        pub updated: Option<PrimitiveDateTime>,
        #[crud(column = "ADDRESS")]
        pub address: Address,
        #[crud(column = "SKILLS", json)]
        pub skills: Option<Vec<String>>,
        #[crud(column = "PHOTO")]
        pub photo: Vec<u8>,
        pub nickname: String,
        #[crud(column = "SECRET")]
        secret: String,
    }

    fn employee() -> Employee {
        Employee {
            id: Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap(),
            branch: None,
            name: "Dana".into(),
            salary: 52_000.5,
            hired: None,
            updated: Some(datetime!(2025-01-02 03:04:05)),
            address: Address {
                street: "Main St 1".into(),
                zip: Some(12345),
            },
            skills: Some(vec!["rust".into(), "sql".into()]),
            photo: vec![1, 2, 3],
            nickname: "D".into(),
            secret: "hidden".into(),
        }
    }

    #[test]
    fn metadata() {
        assert_eq!(
            column_names::<Employee>().collect::<Vec<_>>(),
            [
                "EMPLOYEE_ID",
                "BRANCH",
                "NAME",
                "SALARY",
                "HIRED",
                "UPDATED",
                "ADDRESS",
                "SKILLS",
                "PHOTO"
            ]
        );
        let columns = Employee::columns();
        assert_eq!(
            columns[0],
            ColumnDef {
                name: "EMPLOYEE_ID",
                field: "id",
                primary_key: true,
                nullable: false,
                kind: FieldKind::Primitive,
            }
        );
        assert_eq!(
            columns[1],
            ColumnDef {
                name: "BRANCH",
                field: "branch",
                primary_key: true,
                nullable: true,
                kind: FieldKind::Primitive,
            }
        );
        let kinds = columns.iter().map(|c| (c.field, c.kind)).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                ("id", FieldKind::Primitive),
                ("branch", FieldKind::Primitive),
                ("name", FieldKind::Primitive),
                ("salary", FieldKind::Primitive),
                ("hired", FieldKind::Temporal),
                ("updated", FieldKind::Temporal),
                ("address", FieldKind::Structured),
                ("skills", FieldKind::Structured),
                ("photo", FieldKind::Primitive),
            ]
        );
        assert_eq!(find_column::<Employee>("employee_id"), Some(0));
        assert_eq!(find_column::<Employee>("Skills"), Some(7));
        assert_eq!(find_column::<Employee>("nickname"), None);
        assert_eq!(find_column::<Employee>("SECRET"), None);
    }

    #[test]
    fn values() {
        let employee = employee();
        let values = RecordValues::new(&employee).unwrap();
        assert_eq!(
            values.keys().collect::<Vec<_>>(),
            [
                ("EMPLOYEE_ID", employee.id.as_value()),
                ("BRANCH", Value::Null),
            ]
        );
        let values = values.values().collect::<Vec<_>>();
        assert_eq!(
            values.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
            ["NAME", "SALARY", "UPDATED", "ADDRESS", "SKILLS", "PHOTO"]
        );
        assert_eq!(values[0].1, Value::from("Dana"));
        assert_eq!(values[1].1, Value::Float64(52_000.5));
        assert_eq!(values[2].1, Value::Timestamp(datetime!(2025-01-02 03:04:05)));
        assert_eq!(
            values[3].1,
            Value::Varchar(r#"{"street":"Main St 1","zip":12345}"#.into())
        );
        assert_eq!(values[4].1, Value::Varchar(r#"["rust","sql"]"#.into()));
        assert_eq!(values[5].1, Value::Blob(Box::new([1, 2, 3])));
    }

    #[test]
    fn describe_keys() {
        let employee = Employee {
            branch: Some(4),
            ..employee()
        };
        let values = RecordValues::new(&employee).unwrap();
        assert_eq!(
            values.describe_keys(),
            "EMPLOYEE_ID=67e55044-10b1-426f-9247-bb680e5fe0c8, BRANCH=4"
        );
        assert!(values.has_keys());
        assert!(!values.is_empty());
    }

    #[test]
    fn assignment() {
        let mut employee = Employee::default();
        assert!(employee.set_column("name", Value::from("Eli")).unwrap());
        assert!(employee.set_column("Salary", Value::from("1200.25")).unwrap());
        assert!(employee.set_column("BRANCH", Value::Int64(9)).unwrap());
        assert!(employee.set_column("hired", Value::Date(date!(2020 - 02 - 29))).unwrap());
        assert!(
            employee
                .set_column("updated", Value::from("2024-06-30 23:59:58"))
                .unwrap()
        );
        let address = indoc! {r#"
            {
                "street": "Second Ave 22",
                "zip": null
            }
        "#};
        assert!(employee.set_column("address", Value::from(address)).unwrap());
        assert!(
            employee
                .set_column("skills", Value::RawJson(r#"["go"]"#.into()))
                .unwrap()
        );
        assert!(employee.set_column("photo", Value::Blob(Box::new([9]))).unwrap());
        assert!(!employee.set_column("nickname", Value::from("E")).unwrap());
        assert!(!employee.set_column("secret", Value::from("x")).unwrap());
        assert_eq!(
            employee,
            Employee {
                name: "Eli".into(),
                salary: 1200.25,
                branch: Some(9),
                hired: Some(date!(2020 - 02 - 29)),
                updated: Some(datetime!(2024-06-30 23:59:58)),
                address: Address {
                    street: "Second Ave 22".into(),
                    zip: None,
                },
                skills: Some(vec!["go".into()]),
                photo: vec![9],
                ..Default::default()
            }
        );

        assert!(employee.set_column("skills", Value::Null).unwrap());
        assert_eq!(employee.skills, None);
        assert!(employee.set_column("hired", Value::Null).unwrap());
        assert_eq!(employee.hired, None);
    }

    #[test]
    fn failed_assignment_keeps_field() {
        let mut employee = employee();
        let error = employee
            .set_column("salary", Value::from("a lot"))
            .unwrap_err();
        assert!(
            format!("{:#}", error).contains("Cannot assign column `SALARY` to field `salary`")
        );
        assert_eq!(employee.salary, 52_000.5);
        assert!(employee.set_column("address", Value::from("[1, 2")).is_err());
        assert_eq!(employee.address.street, "Main St 1");
        assert!(employee.set_column("employee_id", Value::Int64(1)).is_err());
        assert_eq!(employee, self::employee());
    }

    #[derive(Record, Default)]
    pub struct Nothing {
        pub ignored: i32,
    }

    #[test]
    fn no_columns() {
        assert!(Nothing::columns().is_empty());
        let values = RecordValues::new(&Nothing::default()).unwrap();
        assert!(values.is_empty());
        assert!(!values.has_keys());
        assert_eq!(values.describe_keys(), "");
    }
}
