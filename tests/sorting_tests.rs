use tabula_core::{TableRequest, Value};
use tabula_query::{Engine, MemoryBackend};
use uuid::Uuid;

fn engine_with(rows: Vec<Vec<Value>>) -> Engine<MemoryBackend> {
    let backend = MemoryBackend::new();
    backend.create_table(
        "items",
        &[("id", "UUID"), ("name", "TEXT"), ("rank", "INT8")],
    );
    for row in rows {
        backend.insert("items", row).unwrap();
    }
    Engine::new(backend)
}

fn row(name: &str, rank: Option<i64>) -> Vec<Value> {
    vec![
        Value::Uuid(Uuid::new_v4()),
        Value::String(name.into()),
        rank.map_or(Value::Null, Value::Int),
    ]
}

fn sorted_request(sort_by: &str, ascending: bool) -> TableRequest {
    TableRequest {
        page: 1,
        per_page: 10,
        sort_by: sort_by.into(),
        sort_asc: ascending,
        ..Default::default()
    }
}

fn assert_adjacent_ordered(rows: &[std::collections::BTreeMap<String, Value>], key: &str, ascending: bool) {
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0][key], &pair[1][key]);
        if a.is_null() || b.is_null() {
            // Nulls may only appear in a trailing run.
            assert!(b.is_null(), "null before non-null: {:?} then {:?}", a, b);
            continue;
        }
        let ord = a.compare(b);
        if ascending {
            assert_ne!(ord, std::cmp::Ordering::Greater, "{:?} > {:?}", a, b);
        } else {
            assert_ne!(ord, std::cmp::Ordering::Less, "{:?} < {:?}", a, b);
        }
    }
}

#[tokio::test]
async fn test_sort_by_int_ascending_and_descending() {
    let engine = engine_with(vec![
        row("c", Some(3)),
        row("a", Some(1)),
        row("b", Some(2)),
    ]);

    let page = engine
        .fetch("items", &sorted_request("rank", true))
        .await
        .unwrap();
    assert_adjacent_ordered(&page.rows, "rank", true);
    assert_eq!(page.rows[0]["rank"], Value::Int(1));

    let page = engine
        .fetch("items", &sorted_request("rank", false))
        .await
        .unwrap();
    assert_adjacent_ordered(&page.rows, "rank", false);
    assert_eq!(page.rows[0]["rank"], Value::Int(3));
}

#[tokio::test]
async fn test_sort_by_string() {
    let engine = engine_with(vec![
        row("pear", Some(1)),
        row("apple", Some(2)),
        row("orange", Some(3)),
    ]);
    let page = engine
        .fetch("items", &sorted_request("name", true))
        .await
        .unwrap();
    let names: Vec<_> = page
        .rows
        .iter()
        .map(|r| match &r["name"] {
            Value::String(s) => s.clone(),
            other => panic!("expected string, got {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["apple", "orange", "pear"]);
}

#[tokio::test]
async fn test_sort_by_uuid_canonical_text() {
    let engine = engine_with(vec![
        row("x", Some(1)),
        row("y", Some(2)),
        row("z", Some(3)),
    ]);
    let page = engine
        .fetch("items", &sorted_request("id", true))
        .await
        .unwrap();
    let ids: Vec<String> = page
        .rows
        .iter()
        .map(|r| match &r["id"] {
            Value::Uuid(u) => u.to_string(),
            other => panic!("expected uuid, got {:?}", other),
        })
        .collect();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_null_sort_keys_placed_last_in_both_directions() {
    let rows = || {
        vec![
            row("nameless", None),
            row("second", Some(2)),
            row("first", Some(1)),
        ]
    };

    let engine = engine_with(rows());
    let page = engine
        .fetch("items", &sorted_request("rank", true))
        .await
        .unwrap();
    assert_eq!(page.rows[0]["rank"], Value::Int(1));
    assert_eq!(page.rows[2]["rank"], Value::Null);

    let engine = engine_with(rows());
    let page = engine
        .fetch("items", &sorted_request("rank", false))
        .await
        .unwrap();
    assert_eq!(page.rows[0]["rank"], Value::Int(2));
    assert_eq!(page.rows[2]["rank"], Value::Null);
}

#[tokio::test]
async fn test_equal_keys_keep_insertion_order() {
    let engine = engine_with(vec![
        row("first-in", Some(7)),
        row("second-in", Some(7)),
        row("third-in", Some(7)),
    ]);
    let page = engine
        .fetch("items", &sorted_request("rank", true))
        .await
        .unwrap();
    let names: Vec<_> = page
        .rows
        .iter()
        .map(|r| match &r["name"] {
            Value::String(s) => s.clone(),
            other => panic!("expected string, got {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["first-in", "second-in", "third-in"]);
}
