#[cfg(test)]
mod tests {
    use dal::{Aggregate, AsValue, Decoder, Fields, Value, decode};
    use std::collections::BTreeMap;
    use time::{PrimitiveDateTime, macros::datetime};

    #[derive(Aggregate, Default, Debug, Clone, PartialEq)]
    struct Course {
        #[dal(name = "CourseId")]
        id: i64,
        title: String,
        credits: f32,
        mandatory: bool,
        starts: Option<PrimitiveDateTime>,
        tags: Vec<String>,
        #[dal(skip)]
        cached: Option<String>,
    }

    #[derive(Aggregate, Default, Debug, Clone, PartialEq)]
    struct CourseSummary {
        title: String,
        credits: f64,
    }

    #[test]
    fn descriptors_follow_attributes() {
        let names = Course::fields().iter().map(|f| f.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            ["CourseId", "title", "credits", "mandatory", "starts", "tags"]
        );
        assert!(Course::name().ends_with("::Course"));
    }

    #[test]
    fn projection_skips_zero_fields() {
        let course = Course {
            id: 7,
            title: "Algebra".into(),
            cached: Some("ignored".into()),
            ..Default::default()
        };
        let fields: Fields = decode(&course).unwrap();
        assert_eq!(
            fields,
            Fields::from_iter([("CourseId", Value::Int(7)), ("title", "Algebra".into())])
        );
        let Value::Struct(_, all) = course.as_value() else {
            panic!("Expected an aggregate value");
        };
        assert_eq!(all.len(), 6);
    }

    #[test]
    fn text_row_into_aggregate() {
        let row = BTreeMap::from([
            ("courseid".to_string(), "12".to_string()),
            ("Title".to_string(), "Physics".to_string()),
            ("credits".to_string(), "4.5".to_string()),
            ("MANDATORY".to_string(), "1".to_string()),
            ("starts".to_string(), "2024-02-01 09:30:00".to_string()),
        ]);
        let course: Course = decode(row).unwrap();
        assert_eq!(
            course,
            Course {
                id: 12,
                title: "Physics".into(),
                credits: 4.5,
                mandatory: true,
                starts: Some(datetime!(2024-02-01 09:30:00)),
                ..Default::default()
            }
        );
    }

    #[test]
    fn between_aggregates_through_mapping() {
        let course = Course {
            title: "Chemistry".into(),
            credits: 3.0,
            tags: vec!["lab".into()],
            ..Default::default()
        };
        assert!(decode::<CourseSummary>(&course).is_err());
        let fields: Fields = decode(course).unwrap();
        let summary: CourseSummary = decode(fields).unwrap();
        assert_eq!(
            summary,
            CourseSummary {
                title: "Chemistry".into(),
                credits: 3.0,
            }
        );
    }

    #[test]
    fn round_trip_keeps_set_fields() {
        let original = Course {
            id: 3,
            mandatory: true,
            starts: Some(datetime!(2023-10-13 00:00:00)),
            tags: vec!["core".into(), "math".into()],
            ..Default::default()
        };
        let mapping: Fields = decode(&original).unwrap();
        let mut target = Course {
            title: "Kept".into(),
            credits: 2.0,
            cached: Some("kept".into()),
            ..Default::default()
        };
        Decoder::new(mapping).decode(&mut target).unwrap();
        assert_eq!(target.id, original.id);
        assert_eq!(target.mandatory, original.mandatory);
        assert_eq!(target.starts, original.starts);
        assert_eq!(target.tags, original.tags);
        assert_eq!(target.title, "Kept");
        assert_eq!(target.credits, 2.0);
        assert_eq!(target.cached.as_deref(), Some("kept"));
    }

    #[test]
    fn bad_field_reports_its_name() {
        let error = decode::<Course>(Fields::from_iter([("credits", "lots")])).unwrap_err();
        let message = format!("{error:#}");
        assert!(message.contains("While decoding field `credits`"), "{message}");
        assert!(message.contains("lots"), "{message}");
    }
}
