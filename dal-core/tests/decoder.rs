#[cfg(test)]
mod tests {
    use dal_core::{
        Aggregate, AsValue, DalError, Decoder, FieldDef, Fields, Result, Value,
        aggregate_as_value, aggregate_assign, decode,
    };
    use std::collections::{BTreeMap, HashMap};
    use time::{PrimitiveDateTime, macros::datetime};

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Student {
        code: String,
        name: String,
        age: u32,
        enrolled: Option<PrimitiveDateTime>,
    }

    impl Aggregate for Student {
        fn name() -> &'static str {
            "tests::Student"
        }
        fn fields() -> &'static [FieldDef<Self>] {
            static FIELDS: &[FieldDef<Student>] = &[
                FieldDef {
                    name: "StuCode",
                    get: |s| s.code.clone().as_value(),
                    set: |s, v| s.code.assign_from_value(v),
                },
                FieldDef {
                    name: "StuName",
                    get: |s| s.name.clone().as_value(),
                    set: |s, v| s.name.assign_from_value(v),
                },
                FieldDef {
                    name: "Age",
                    get: |s| s.age.as_value(),
                    set: |s, v| s.age.assign_from_value(v),
                },
                FieldDef {
                    name: "Enrolled",
                    get: |s| s.enrolled.as_value(),
                    set: |s, v| s.enrolled.assign_from_value(v),
                },
            ];
            FIELDS
        }
    }

    impl AsValue for Student {
        fn as_value(self) -> Value {
            aggregate_as_value(&self)
        }
        fn try_from_value(value: Value) -> Result<Self> {
            dal_core::aggregate_from_value(value)
        }
        fn assign_from_value(&mut self, value: Value) -> Result<()> {
            aggregate_assign(self, value)
        }
    }

    impl From<Student> for Value {
        fn from(value: Student) -> Self {
            value.as_value()
        }
    }

    fn decode_error(error: &dal_core::Error) -> bool {
        error
            .chain()
            .any(|e| e.downcast_ref::<DalError>().is_some_and(DalError::is_decode))
    }

    #[test]
    fn booleans() {
        assert!(decode::<bool>(3).unwrap());
        assert!(!decode::<bool>(0u8).unwrap());
        assert!(decode::<bool>(0.5).unwrap());
        assert!(decode::<bool>("TRUE").unwrap());
        assert!(decode::<bool>("t").unwrap());
        assert!(!decode::<bool>("F").unwrap());
        assert!(!decode::<bool>("").unwrap());
        assert!(decode_error(&decode::<bool>("maybe").unwrap_err()));
    }

    #[test]
    fn numbers() {
        assert_eq!(decode::<i32>(Value::UInt(42)).unwrap(), 42);
        assert_eq!(decode::<u8>(300i64).unwrap(), 44);
        assert_eq!(decode::<i64>(2.9f64).unwrap(), 2);
        assert_eq!(decode::<f64>(7u16).unwrap(), 7.0);
        assert_eq!(decode::<u16>(true).unwrap(), 1);
        assert_eq!(decode::<i16>("-12").unwrap(), -12);
        assert_eq!(decode::<f32>("1.5").unwrap(), 1.5);
        assert_eq!(decode::<u64>("").unwrap(), 0);
        assert_eq!(decode::<i32>(Value::Null).unwrap(), 0);
        let error = decode::<i32>("twelve").unwrap_err();
        assert!(decode_error(&error));
        assert!(format!("{error:#}").contains("twelve"));
        assert!(decode_error(&decode::<u32>(Value::List(vec![])).unwrap_err()));
    }

    #[test]
    fn text() {
        assert_eq!(decode::<String>(true).unwrap(), "1");
        assert_eq!(decode::<String>(false).unwrap(), "0");
        assert_eq!(decode::<String>(-5i8).unwrap(), "-5");
        assert_eq!(decode::<String>(18446744073709551615u64).unwrap(), "18446744073709551615");
        assert_eq!(decode::<String>(2.25f64).unwrap(), "2.25");
        assert_eq!(
            decode::<String>(datetime!(2006-01-02 15:04:05)).unwrap(),
            "2006-01-02 15:04:05"
        );
        assert!(decode_error(
            &decode::<String>(Value::Map(Fields::new())).unwrap_err()
        ));
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            decode::<PrimitiveDateTime>("2006-1-2").unwrap(),
            datetime!(2006-01-02 00:00:00)
        );
        let error = decode::<PrimitiveDateTime>("2020/13/40").unwrap_err();
        assert!(decode_error(&error));
        assert!(format!("{error:#}").contains("timestamp format"));
        assert_eq!(decode::<Option<PrimitiveDateTime>>("").unwrap(), None);
        assert_eq!(decode::<Option<PrimitiveDateTime>>(Value::Null).unwrap(), None);
        assert!(decode_error(
            &decode::<PrimitiveDateTime>(Value::Null).unwrap_err()
        ));
        assert!(decode_error(&decode::<PrimitiveDateTime>(12).unwrap_err()));
    }

    #[test]
    fn sequences() {
        let value = Value::List(vec!["1".into(), 2.into(), true.into()]);
        assert_eq!(decode::<Vec<i32>>(value).unwrap(), [1, 2, 1]);
        let error = decode::<Vec<i32>>(Value::List(vec!["1".into(), "x".into()])).unwrap_err();
        assert!(format!("{error:#}").contains("element 1"));
        assert!(decode_error(&decode::<Vec<i32>>("1,2").unwrap_err()));
    }

    #[test]
    fn aggregate_into_mapping_skips_zero_fields() {
        let student = Student {
            code: "S002".into(),
            age: 20,
            ..Default::default()
        };
        let fields: Fields = decode(student.clone()).unwrap();
        assert_eq!(fields.names().collect::<Vec<_>>(), ["StuCode", "Age"]);
        let text: BTreeMap<String, String> = decode(student).unwrap();
        assert_eq!(
            text,
            BTreeMap::from([
                ("Age".to_string(), "20".to_string()),
                ("StuCode".to_string(), "S002".to_string()),
            ])
        );
    }

    #[test]
    fn timestamp_field_renders_canonical_text() {
        let student = Student {
            code: "S001".into(),
            enrolled: Some(datetime!(2021-09-01 08:00:00)),
            ..Default::default()
        };
        let text: HashMap<String, String> = decode(student).unwrap();
        assert_eq!(text["Enrolled"], "2021-09-01 08:00:00");
    }

    #[test]
    fn mapping_into_aggregate() {
        let row = BTreeMap::from([
            ("stucode", "S003"),
            ("StuName", "Lyric"),
            ("AGE", "19"),
            ("Enrolled", ""),
            ("Unknown", "ignored"),
        ]);
        let student: Student = decode(row).unwrap();
        assert_eq!(
            student,
            Student {
                code: "S003".into(),
                name: "Lyric".into(),
                age: 19,
                enrolled: None,
            }
        );
    }

    #[test]
    fn exact_key_wins_over_case_insensitive() {
        let row = Fields::from_iter([("stuname", "lower"), ("StuName", "exact")]);
        let student: Student = decode(row).unwrap();
        assert_eq!(student.name, "exact");
    }

    #[test]
    fn decode_into_existing_keeps_unmatched_fields() {
        let mut student = Student {
            code: "S004".into(),
            name: "Before".into(),
            age: 30,
            ..Default::default()
        };
        Decoder::new(Fields::from_iter([("StuName", "After")]))
            .decode(&mut student)
            .unwrap();
        assert_eq!(student.code, "S004");
        assert_eq!(student.name, "After");
        assert_eq!(student.age, 30);
    }

    #[test]
    fn aggregate_identity_copies_every_field() {
        let mut student = Student {
            age: 30,
            ..Default::default()
        };
        let source = Student {
            code: "S005".into(),
            ..Default::default()
        };
        student.assign_from_value(source.clone().as_value()).unwrap();
        assert_eq!(student, source);
    }

    #[test]
    fn partial_update_round_trip() {
        let original = Student {
            code: "S006".into(),
            name: "Ada".into(),
            ..Default::default()
        };
        let mapping: Fields = decode(original.clone()).unwrap();
        let mut target = Student {
            age: 41,
            ..Default::default()
        };
        target.assign_from_value(mapping.as_value()).unwrap();
        assert_eq!(target.code, original.code);
        assert_eq!(target.name, original.name);
        assert_eq!(target.age, 41);
    }

    #[test]
    fn field_errors_name_the_field() {
        let error = decode::<Student>(Fields::from_iter([("Age", "old")])).unwrap_err();
        assert!(decode_error(&error));
        assert!(format!("{error:#}").contains("While decoding field `Age`"));
        assert!(decode_error(&decode::<Student>(5).unwrap_err()));
    }
}
