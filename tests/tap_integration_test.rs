use anyhow::Result;
use bloomerang_tap::{
    BloomerangClient, BloomerangTap, Catalog, Mode, RetryPolicy, RunOutcome, SingerWriter,
    TapConfig, TapEngine, TapError, TokioBackoff,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

type Engine = TapEngine<BloomerangClient, SingerWriter<Vec<u8>>, TokioBackoff>;

fn engine(server: &MockServer, streams: &[&str], retry: RetryPolicy) -> Result<Engine> {
    let client = BloomerangClient::new(&server.url("/v2/"), "test-key")?;
    let tap = BloomerangTap::new(
        client,
        SingerWriter::new(Vec::new()),
        TokioBackoff,
        Catalog::bloomerang(),
        retry,
    );
    Ok(TapEngine::new(
        tap,
        Some(streams.iter().map(|s| s.to_string()).collect()),
    ))
}

fn messages(engine: Engine) -> Vec<Value> {
    let output = engine.into_tap().into_sink().into_inner();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn constituent(i: usize) -> Value {
    json!({"Id": i, "FirstName": format!("Donor {}", i), "Balance": 10.5, "Tags": ["major"]})
}

fn page(range: std::ops::Range<usize>) -> Value {
    let results: Vec<Value> = range.map(constituent).collect();
    json!({"Start": 0, "ResultCount": results.len(), "Results": results})
}

/// 完整同步：分頁 collection + 非分頁 collection
#[tokio::test]
async fn test_full_sync_emits_replace_stream() -> Result<()> {
    let server = MockServer::start();

    let sample = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/constituents")
            .query_param("skip", "0")
            .query_param("take", "1")
            .header("X-API-KEY", "test-key");
        then.status(200).json_body(page(0..1));
    });
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/constituents")
            .query_param("skip", "0")
            .query_param("take", "50");
        then.status(200).json_body(page(0..50));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/constituents")
            .query_param("skip", "50")
            .query_param("take", "50");
        then.status(200).json_body(page(50..63));
    });
    let custom = server.mock(|when, then| {
        when.method(GET).path("/v2/customfields/Note");
        then.status(200)
            .json_body(json!([{"Id": 900, "Name": "Mood", "Type": null}, {"Id": 901, "Name": "Topic"}]));
    });

    let mut engine = engine(
        &server,
        &["customfields_note", "constituents"],
        RetryPolicy::default(),
    )?;
    let outcome = engine.run(Mode::Tap).await?;

    sample.assert();
    first.assert();
    second.assert();
    custom.assert_hits(2);
    assert_eq!(outcome.total_records(), 65);

    let messages = messages(engine);
    let kinds: Vec<&str> = messages.iter().map(|m| m["type"].as_str().unwrap()).collect();

    // constituents 在 catalog 中排在前面
    assert_eq!(messages[0], json!({"type": "META", "metadata": {"unique_keys": ["Id"]}}));
    assert_eq!(messages[1]["stream"], "constituents");
    assert_eq!(
        messages[1]["schema"]["properties"],
        json!({
            "Id": {"type": "integer"},
            "FirstName": {"type": "string"},
            "Balance": {"type": "float"},
            "Tags": {"type": "json"}
        })
    );

    // page 1: 50 deletes then 50 records; page 2: 13 deletes then 13 records
    assert!(kinds[2..52].iter().all(|k| *k == "DELETE"));
    assert!(kinds[52..102].iter().all(|k| *k == "RECORD"));
    assert!(kinds[102..115].iter().all(|k| *k == "DELETE"));
    assert!(kinds[115..128].iter().all(|k| *k == "RECORD"));
    assert_eq!(messages[102]["record"], json!({"Id": 50}));
    assert_eq!(
        messages[128],
        json!({
            "type": "METRIC",
            "metric_type": "counter",
            "metric": "record_count",
            "value": 63,
            "tags": {"table": "constituents"}
        })
    );

    let custom_records: Vec<&Value> = messages
        .iter()
        .filter(|m| m["type"] == "RECORD" && m["stream"] == "customfields_note")
        .collect();
    assert_eq!(custom_records.len(), 2);
    assert_eq!(custom_records[1]["record"], json!({"Id": 901, "Name": "Topic", "Type": null}));
    assert_eq!(messages.last().unwrap()["tags"]["table"], "customfields_note");

    Ok(())
}

#[tokio::test]
async fn test_connection_check_with_bad_key() -> Result<()> {
    let server = MockServer::start();
    let probe = server.mock(|when, then| {
        when.method(GET).path("/v2/addresses");
        then.status(401);
    });

    let mut engine = engine(&server, &["addresses"], RetryPolicy::default())?;
    let outcome = engine.run(Mode::Test).await?;

    probe.assert_hits(1);
    assert_eq!(outcome, RunOutcome::ConnectionTested(false));
    assert_eq!(
        messages(engine),
        vec![json!({"type": "META", "metadata": {"test_result": false}})]
    );
    Ok(())
}

#[tokio::test]
async fn test_page_failure_exhausts_retries_and_aborts() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/refunds")
            .query_param("take", "1");
        then.status(200).json_body(page(0..1));
    });
    let failing = server.mock(|when, then| {
        when.method(GET)
            .path("/v2/refunds")
            .query_param("take", "50");
        then.status(503);
    });
    let later = server.mock(|when, then| {
        when.method(GET).path("/v2/relationshiproles");
        then.status(200).json_body(page(0..1));
    });

    let mut engine = engine(
        &server,
        &["refunds", "relationshiproles"],
        RetryPolicy::new(5, Duration::ZERO),
    )?;
    let err = engine.run(Mode::Tap).await.unwrap_err();

    failing.assert_hits(6);
    later.assert_hits(0);
    match err {
        TapError::RetriesExhausted { uri, attempts, .. } => {
            assert_eq!(uri, "refunds?skip=0&take=50");
            assert_eq!(attempts, 6);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let messages = messages(engine);
    assert_eq!(messages.len(), 2);
    assert!(!messages.iter().any(|m| m["type"] == "METRIC"));
    Ok(())
}

#[tokio::test]
async fn test_discover_from_config_file() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v2/campaigns");
        then.status(200)
            .json_body(json!({"ResultCount": 1, "Results": [{"Id": 3, "Goal": 1000, "IsActive": false}]}));
    });
    let empty = server.mock(|when, then| {
        when.method(GET).path("/v2/tributes");
        then.status(200).json_body(json!({"ResultCount": 0, "Results": []}));
    });

    let mut config_file = NamedTempFile::new()?;
    write!(
        config_file,
        "private_key = \"test-key\"\nbase_url = \"{}\"\nstreams = [\"tributes\", \"campaigns\"]\n",
        server.url("/v2/")
    )?;
    let config = TapConfig::from_file(config_file.path())?;
    config.validate_config()?;

    let client = BloomerangClient::with_timeout(config.base_url(), config.private_key(), config.timeout())?;
    let tap = BloomerangTap::new(
        client,
        SingerWriter::new(Vec::new()),
        TokioBackoff,
        Catalog::bloomerang(),
        config.retry_policy(),
    );
    let mut engine = TapEngine::new(tap, config.streams());

    let outcome = engine.run(Mode::Discover).await?;
    assert_eq!(outcome, RunOutcome::Discovered(2));
    empty.assert_hits(1);

    let messages = messages(engine);
    let schemas: Vec<&Value> = messages.iter().filter(|m| m["type"] == "SCHEMA").collect();
    assert_eq!(schemas[0]["stream"], "campaigns");
    assert_eq!(schemas[0]["key_properties"], json!(["Id"]));
    assert_eq!(schemas[1]["stream"], "tributes");
    assert_eq!(schemas[1]["schema"]["properties"], json!({}));
    assert_eq!(schemas[1]["key_properties"], json!([]));
    assert!(!messages.iter().any(|m| m["type"] == "RECORD"));
    Ok(())
}
