#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use dumpcat::catalog::{
        CatalogOptions, ExtractError, FilterOption, GroupCatalogLoader, GroupInput, GroupKind,
        Probe, TableReference,
    };
    use dumpcat::query::test_utils::{distinct_result, schema_result, ScriptedQueryClient};
    use dumpcat::query::{BlockingQueryClient, QueryResult, ResultSet};

    fn loader(client: ScriptedQueryClient) -> GroupCatalogLoader<ScriptedQueryClient> {
        GroupCatalogLoader::new(client, CatalogOptions::new("athena"))
    }

    #[tokio::test]
    async fn test_empty_groups_yield_empty_metadata() {
        let loader = loader(ScriptedQueryClient::new());
        let input = GroupInput::new(["d1", "d2"]);

        let catalog = loader.load(&input).await.unwrap();

        let groups: Vec<_> = catalog.iter().map(|m| m.group).collect();
        assert_eq!(groups, GroupKind::ALL.to_vec());
        for meta in catalog.iter() {
            assert!(meta.column_types.is_empty());
            assert!(meta.distinct_values.is_empty());
            assert!(meta.filter_options.is_empty());
            assert!(!meta.has_tables());
            assert_eq!(meta.tables_by_dataset.len(), 2);
        }
        assert_eq!(loader.client().call_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_single_group() {
        let client = ScriptedQueryClient::new()
            .on_schema(
                "t1",
                schema_result(&[("grabindex", "bigint"), ("country", "object")]),
            )
            .on_distinct("t1", distinct_result(&[("country", &["US", "CA"])]));
        let loader = loader(client);
        let input = GroupInput::new(["d1", "d2"]).with_group(GroupKind::MetaData, ["t1", "t2"]);

        let catalog = loader.load(&input).await.unwrap();
        let meta = &catalog[GroupKind::MetaData];

        assert_eq!(
            meta.column_types.iter().collect::<Vec<_>>(),
            vec![("country", &"object".to_string())]
        );
        assert_eq!(
            meta.filter_options,
            vec![FilterOption::new("Country", "country")]
        );
        assert_eq!(
            meta.distinct_values.get("country").unwrap(),
            &vec![
                FilterOption::new("US", "'US'"),
                FilterOption::new("CA", "'CA'"),
            ]
        );
        assert_eq!(meta.table_for("d1"), Some(&TableReference::new("t1")));
        assert_eq!(meta.table_for("d2"), Some(&TableReference::new("t2")));

        // only the exemplar table is probed
        assert_eq!(loader.client().call_count(), 2);
        assert_eq!(loader.client().calls_containing("t2"), 0);

        for group in [GroupKind::LmMetaData, GroupKind::ReMetaData, GroupKind::PwMetaData] {
            assert!(catalog[group].filter_options.is_empty());
        }
    }

    #[tokio::test]
    async fn test_join_waits_for_slowest_group() {
        let client = ScriptedQueryClient::new()
            .on_schema_delayed(
                "meta",
                schema_result(&[("a_speed", "double")]),
                Duration::from_millis(50),
            )
            .on_schema_delayed(
                "lm",
                schema_result(&[("b_speed", "double")]),
                Duration::from_millis(200),
            )
            .on_schema_delayed(
                "re",
                schema_result(&[("c_speed", "double")]),
                Duration::from_millis(100),
            )
            .on_schema_delayed(
                "pw",
                schema_result(&[("d_speed", "double")]),
                Duration::from_millis(150),
            );
        let loader = loader(client);
        let input = GroupInput::new(["d1"])
            .with_group(GroupKind::MetaData, ["meta"])
            .with_group(GroupKind::LmMetaData, ["lm"])
            .with_group(GroupKind::ReMetaData, ["re"])
            .with_group(GroupKind::PwMetaData, ["pw"]);

        let start = Instant::now();
        let catalog = loader.load(&input).await.unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(200),
            "returned before slowest group: {elapsed:?}"
        );
        assert!(elapsed < Duration::from_millis(450), "groups ran serially: {elapsed:?}");

        assert!(catalog[GroupKind::MetaData].column_types.contains_key("a_speed"));
        assert!(catalog[GroupKind::LmMetaData].column_types.contains_key("b_speed"));
        assert!(catalog[GroupKind::ReMetaData].column_types.contains_key("c_speed"));
        assert!(catalog[GroupKind::PwMetaData].column_types.contains_key("d_speed"));
    }

    fn four_group_client() -> ScriptedQueryClient {
        ScriptedQueryClient::new()
            .on_schema("meta", schema_result(&[("country", "object")]))
            .on_distinct("meta", distinct_result(&[("country", &["US"])]))
            .on_schema("lm", schema_result(&[("lane_type", "object")]))
            .on_distinct("lm", distinct_result(&[("lane_type", &["solid"])]))
            .on_schema("re", schema_result(&[("edge_type", "object")]))
            .fail_distinct("re", "access denied")
            .on_schema("pw", schema_result(&[("width", "double")]))
    }

    fn four_group_input() -> GroupInput {
        GroupInput::new(["d1"])
            .with_group(GroupKind::MetaData, ["meta"])
            .with_group(GroupKind::LmMetaData, ["lm"])
            .with_group(GroupKind::ReMetaData, ["re"])
            .with_group(GroupKind::PwMetaData, ["pw"])
    }

    #[tokio::test]
    async fn test_failure_is_reported_per_group() {
        let loader = loader(four_group_client());

        let err = loader.load(&four_group_input()).await.unwrap_err();

        assert_eq!(err.failed_groups(), vec![GroupKind::ReMetaData]);
        let failure = &err.failures()[0];
        assert_eq!(failure.error.probe(), Some(Probe::Distinct));
        assert!(err.to_string().contains("re_meta_data"));
    }

    #[tokio::test]
    async fn test_settled_outcomes_keep_successful_groups() {
        let loader = loader(four_group_client());

        let outcomes = loader.load_settled(&four_group_input()).await;

        assert!(!outcomes.all_succeeded());
        assert_eq!(outcomes.failed_groups(), vec![GroupKind::ReMetaData]);
        assert!(outcomes.get(GroupKind::MetaData).is_ok());
        assert!(outcomes.get(GroupKind::LmMetaData).is_ok());
        assert!(outcomes.get(GroupKind::PwMetaData).is_ok());

        let (catalog, failures) = outcomes.into_catalog_lenient();
        assert_eq!(failures.len(), 1);
        assert!(catalog[GroupKind::ReMetaData].column_types.is_empty());
        assert_eq!(
            catalog[GroupKind::ReMetaData].table_for("d1"),
            Some(&TableReference::new("re"))
        );
        assert_eq!(
            catalog[GroupKind::LmMetaData].distinct_values.get("lane_type").unwrap()[0],
            FilterOption::new("solid", "'solid'")
        );
    }

    #[tokio::test]
    async fn test_hung_group_times_out_without_blocking_others() {
        let client = ScriptedQueryClient::new()
            .on_schema("meta", schema_result(&[("speed", "double")]))
            .on_schema_delayed(
                "lm",
                schema_result(&[("speed", "double")]),
                Duration::from_secs(30),
            );
        let options = CatalogOptions::new("athena").with_group_timeout(Duration::from_millis(100));
        let loader = GroupCatalogLoader::new(client, options);
        let input = GroupInput::new(["d1"])
            .with_group(GroupKind::MetaData, ["meta"])
            .with_group(GroupKind::LmMetaData, ["lm"]);

        let start = Instant::now();
        let outcomes = loader.load_settled(&input).await;
        assert!(start.elapsed() < Duration::from_secs(5));

        assert!(outcomes.get(GroupKind::MetaData).is_ok());
        assert!(matches!(
            outcomes.get(GroupKind::LmMetaData).result,
            Err(ExtractError::Timeout(_))
        ));
        assert_eq!(outcomes.failed_groups(), vec![GroupKind::LmMetaData]);
    }

    #[tokio::test]
    async fn test_catalog_serializes_in_group_order() {
        let client = ScriptedQueryClient::new()
            .on_schema("t1", schema_result(&[("country", "object")]))
            .on_distinct("t1", distinct_result(&[("country", &["US"])]));
        let loader = loader(client);
        let input = GroupInput::new(["d1"]).with_group(GroupKind::MetaData, ["t1"]);

        let catalog = loader.load(&input).await.unwrap();
        let json = serde_json::to_value(&catalog).unwrap();

        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(json["meta_data"]["group"], "meta_data");
        assert_eq!(json["meta_data"]["tables_by_dataset"]["d1"], "t1");
        assert_eq!(json["meta_data"]["column_types"]["country"], "object");
        assert_eq!(json["meta_data"]["distinct_values"]["country"][0]["value"], "'US'");
        assert_eq!(json["meta_data"]["filter_options"][0]["label"], "Country");
        assert_eq!(json["pw_meta_data"]["filter_options"], serde_json::json!([]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_backend_runs_groups_in_parallel() {
        let client = BlockingQueryClient::new(|_: &str, _: &str| -> QueryResult<ResultSet> {
            std::thread::sleep(Duration::from_millis(200));
            Ok(schema_result(&[("speed_kmh", "double")]))
        });
        let loader = GroupCatalogLoader::new(client, CatalogOptions::new("athena"));
        let input = GroupInput::new(["d1"])
            .with_group(GroupKind::MetaData, ["meta"])
            .with_group(GroupKind::LmMetaData, ["lm"])
            .with_group(GroupKind::ReMetaData, ["re"])
            .with_group(GroupKind::PwMetaData, ["pw"]);

        let start = Instant::now();
        let catalog = loader.load(&input).await.unwrap();
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(600),
            "blocking calls ran serially: {elapsed:?}"
        );
        assert!(catalog
            .iter()
            .all(|meta| meta.column_types.contains_key("speed_kmh")));
    }
}
