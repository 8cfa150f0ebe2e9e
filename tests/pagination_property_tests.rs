use proptest::prelude::*;
use std::collections::HashSet;
use tabula_core::{Filter, TableRequest, Value};
use tabula_query::{Engine, MemoryBackend};

fn engine_with_sizes(sizes: &[i64]) -> Engine<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend.create_table("rows", &[("tag", "TEXT"), ("size", "INT8")]);
    for (i, size) in sizes.iter().enumerate() {
        backend
            .insert(
                "rows",
                vec![Value::String(format!("row-{}", i)), Value::Int(*size)],
            )
            .unwrap();
    }
    Engine::new(backend)
}

fn page_request(page: i64, per_page: i64) -> TableRequest {
    TableRequest {
        page,
        per_page,
        sort_by: "size".into(),
        sort_asc: true,
        filters: vec![Filter {
            field: "size".into(),
            operation: "$gte".into(),
            value: serde_json::json!(100),
        }],
        ..Default::default()
    }
}

fn tag_of(row: &std::collections::BTreeMap<String, Value>) -> String {
    match &row["tag"] {
        Value::String(s) => s.clone(),
        other => panic!("expected string tag, got {:?}", other),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_total_matches_ground_truth(
        sizes in prop::collection::vec(0i64..500, 0..60),
        page in 1i64..5,
        per_page in 10i64..=100,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let engine = engine_with_sizes(&sizes);
            let expected = sizes.iter().filter(|&&s| s >= 100).count() as i64;
            let got = engine
                .fetch("rows", &page_request(page, per_page))
                .await
                .unwrap();
            prop_assert_eq!(got.total, expected);
            Ok(())
        })?;
    }

    #[test]
    fn test_pages_partition_the_filtered_set(
        sizes in prop::collection::vec(0i64..500, 1..60),
        per_page in 10i64..=30,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let engine = engine_with_sizes(&sizes);
            let expected: HashSet<String> = sizes
                .iter()
                .enumerate()
                .filter(|(_, &s)| s >= 100)
                .map(|(i, _)| format!("row-{}", i))
                .collect();

            let mut seen: Vec<String> = Vec::new();
            let total = expected.len() as i64;
            let pages = (total + per_page - 1) / per_page;
            for page_no in 1..=pages.max(1) {
                let page = engine
                    .fetch("rows", &page_request(page_no, per_page))
                    .await
                    .unwrap();
                prop_assert_eq!(page.total, total);
                seen.extend(page.rows.iter().map(tag_of));
            }

            // No duplicates and no omissions.
            let unique: HashSet<String> = seen.iter().cloned().collect();
            prop_assert_eq!(unique.len(), seen.len());
            prop_assert_eq!(unique, expected);
            Ok(())
        })?;
    }
}
