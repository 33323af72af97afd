#[cfg(test)]
mod tests {
    use dumpcat::catalog::{
        CatalogOptions, ExtractError, FilterOption, Probe, TableMetadataExtractor, TableReference,
    };
    use dumpcat::query::test_utils::{distinct_result, schema_result, ScriptedQueryClient};
    use dumpcat::query::{QueryError, ResultColumn, ResultSet};
    use serde_json::{json, Value};

    fn options() -> CatalogOptions {
        CatalogOptions::new("athena")
    }

    #[tokio::test]
    async fn test_empty_reference_issues_no_queries() {
        let client = ScriptedQueryClient::new();
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::empty()).await.unwrap();

        assert!(profile.is_empty());
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_schema_and_distinct_probes() {
        let client = ScriptedQueryClient::new()
            .on_schema(
                "t1",
                schema_result(&[
                    ("GrabIndex", "bigint"),
                    ("Country", "object"),
                    ("speed_kmh", "double"),
                    ("lane_2", "object"),
                ]),
            )
            .on_distinct("t1", distinct_result(&[("country", &[" US", "CA "])]));
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::new("t1")).await.unwrap();

        assert_eq!(
            profile.column_types.iter().collect::<Vec<_>>(),
            vec![
                ("country", &"object".to_string()),
                ("speed_kmh", &"double".to_string())
            ]
        );
        assert_eq!(
            profile.filter_options,
            vec![
                FilterOption::new("Country", "country"),
                FilterOption::new("Speed Kmh", "speed_kmh"),
            ]
        );
        assert_eq!(
            profile.distinct_values.get("country").unwrap(),
            &vec![
                FilterOption::new("US", "'US'"),
                FilterOption::new("CA", "'CA'"),
            ]
        );
        assert!(profile.distinct_values.get("speed_kmh").is_none());

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.data_source == "athena"));
        assert_eq!(calls[0].sql, "SELECT * FROM (t1) LIMIT 1");
        assert_eq!(
            calls[1].sql,
            r#"SELECT array_agg(DISTINCT "Country") AS "country" FROM (t1) AS t"#
        );
    }

    #[tokio::test]
    async fn test_no_string_columns_skips_distinct_probe() {
        let client = ScriptedQueryClient::new().on_schema(
            "t1",
            schema_result(&[("speed_kmh", "double"), ("frame", "bigint")]),
        );
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::new("t1")).await.unwrap();

        assert_eq!(profile.column_types.len(), 2);
        assert!(profile.distinct_values.is_empty());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_values_are_capped() {
        let raw: Vec<String> = (0..40).map(|i| format!("value_{i:02}")).collect();
        let raw_refs: Vec<&str> = raw.iter().map(String::as_str).collect();
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("scenario", "varchar")]))
            .on_distinct("t1", distinct_result(&[("scenario", raw_refs.as_slice())]));
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::new("t1")).await.unwrap();
        let values = profile.distinct_values.get("scenario").unwrap();

        assert_eq!(values.len(), 30);
        assert_eq!(values[0], FilterOption::new("value_00", "'value_00'"));
        assert_eq!(values[29].label, "value_29");
    }

    #[tokio::test]
    async fn test_custom_cap() {
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("weather", "object")]))
            .on_distinct("t1", distinct_result(&[("weather", &["rain", "snow", "sun"])]));
        let options = options().with_max_distinct_values(2);
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::new("t1")).await.unwrap();
        assert_eq!(profile.distinct_values.get("weather").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_null_aggregate_is_empty_list() {
        let distinct = ResultSet::new(
            vec![ResultColumn::new("weather", "array(varchar)")],
            vec![vec![Value::Null]],
        );
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("weather", "object")]))
            .on_distinct("t1", distinct);
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor.extract(&TableReference::new("t1")).await.unwrap();
        assert_eq!(profile.distinct_values.get("weather"), Some(&vec![]));
    }

    #[tokio::test]
    async fn test_schema_failure_names_probe() {
        let client = ScriptedQueryClient::new().fail_schema("t1", "table not found");
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();

        assert!(matches!(
            err,
            ExtractError::RemoteQuery {
                probe: Probe::Schema,
                source: QueryError::Backend(ref m),
            } if m == "table not found"
        ));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_failure_names_probe() {
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("country", "object")]))
            .fail_distinct("t1", "query exhausted resources");
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        assert_eq!(err.probe(), Some(Probe::Distinct));
        assert!(matches!(err, ExtractError::RemoteQuery { .. }));
    }

    #[tokio::test]
    async fn test_empty_schema_is_malformed() {
        let client =
            ScriptedQueryClient::new().on_schema("t1", ResultSet::new(vec![], vec![]));
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedResult {
                probe: Probe::Schema,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_distinct_missing_column_is_malformed() {
        let client = ScriptedQueryClient::new()
            .on_schema(
                "t1",
                schema_result(&[("country", "object"), ("weather", "object")]),
            )
            .on_distinct("t1", distinct_result(&[("country", &["US"])]));
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        match err {
            ExtractError::MalformedResult { probe, reason } => {
                assert_eq!(probe, Probe::Distinct);
                assert!(reason.contains("weather"));
            }
            other => panic!("expected malformed result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_distinct_scalar_cell_is_malformed() {
        let distinct = ResultSet::new(
            vec![ResultColumn::new("country", "varchar")],
            vec![vec![json!("US")]],
        );
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("country", "object")]))
            .on_distinct("t1", distinct);
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        assert!(matches!(err, ExtractError::MalformedResult { .. }));
    }

    #[tokio::test]
    async fn test_distinct_without_rows_is_malformed() {
        let distinct = ResultSet::new(vec![ResultColumn::new("country", "array(varchar)")], vec![]);
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("country", "object")]))
            .on_distinct("t1", distinct);
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedResult {
                probe: Probe::Distinct,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_distinct_short_row_is_malformed() {
        let distinct = ResultSet::new(
            vec![
                ResultColumn::new("country", "array(varchar)"),
                ResultColumn::new("weather", "array(varchar)"),
            ],
            vec![vec![json!(["US"])]],
        );
        let client = ScriptedQueryClient::new()
            .on_schema(
                "t1",
                schema_result(&[("country", "object"), ("weather", "object")]),
            )
            .on_distinct("t1", distinct);
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let err = extractor.extract(&TableReference::new("t1")).await.unwrap_err();
        assert!(matches!(
            err,
            ExtractError::MalformedResult {
                probe: Probe::Distinct,
                ..
            }
        ));
        assert!(err.to_string().contains("weather"));
    }

    #[tokio::test]
    async fn test_subquery_reference_is_wrapped_in_both_queries() {
        let subquery = "SELECT * FROM lm WHERE dump_name = 'd1'";
        let client = ScriptedQueryClient::new()
            .on_schema(subquery, schema_result(&[("lane_type", "varchar")]))
            .on_distinct(
                subquery,
                distinct_result(&[("lane_type", &["solid", "dashed"])]),
            );
        let options = options();
        let extractor = TableMetadataExtractor::new(&client, &options);

        let profile = extractor
            .extract(&TableReference::new(format!("  {subquery} ")))
            .await
            .unwrap();
        assert_eq!(profile.distinct_values.get("lane_type").unwrap().len(), 2);

        let calls = client.calls();
        assert_eq!(
            calls[0].sql,
            "SELECT * FROM (SELECT * FROM lm WHERE dump_name = 'd1') LIMIT 1"
        );
        assert_eq!(
            calls[1].sql,
            r#"SELECT array_agg(DISTINCT "lane_type") AS "lane_type" FROM (SELECT * FROM lm WHERE dump_name = 'd1') AS t"#
        );
    }
}
