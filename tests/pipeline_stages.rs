//! End-to-end pipeline tests against a mock documentation site.

use std::panic;

use httpmock::prelude::*;
use reqwest::Client;

use docsmith::{
    deduplicate, Extractor, Pipeline, PipelineConfig, SynonymEntry, SynonymTable, Tag,
    UrlProcessing,
};

const INTRO_PAGE: &str = r#"
<html><body>
  <h1>Catalog Service</h1>
  <p>The catalog stores every dataset.</p>
  <h2>Quick Start</h2>
  <p>See <a href="/install">the install guide</a> first.</p>
  <ul><li>step one</li><li>step two</li></ul>
</body></html>
"#;

const USAGE_PAGE: &str = r#"
<html><body>
  <h1>Usage</h1>
  <pre><code># run the pipeline
docsmith run config.yaml</code></pre>
</body></html>
"#;

fn test_client() -> Option<Client> {
    match panic::catch_unwind(|| Client::builder().use_rustls_tls().build()) {
        Ok(Ok(client)) => Some(client),
        _ => None,
    }
}

fn pipeline_for(server: &MockServer, paths: &[&str], dir: &std::path::Path) -> Option<Pipeline> {
    let client = test_client()?;
    let config = PipelineConfig {
        urls: paths.iter().map(|path| server.url(*path)).collect(),
        output_raw_file: dir.join("scraped_docs.json"),
        output_rag_grouping_file: dir.join("rag_ready_groups.json"),
        ..PipelineConfig::default()
    };
    let extractor = Extractor::with_client(client, config.url_processing.clone());
    let synonyms = SynonymTable::new(vec![SynonymEntry {
        canonical: "catalog".to_string(),
        synonyms: vec!["registry".to_string()],
    }])
    .ok()?;
    Some(Pipeline::from_parts(config, synonyms, extractor))
}

#[tokio::test]
async fn scrape_group_augment_and_split() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/intro");
            then.status(200).body(INTRO_PAGE);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/usage");
            then.status(200).body(USAGE_PAGE);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let Some(pipeline) = pipeline_for(&server, &["/intro", "/usage"], dir.path()) else {
        return;
    };

    let outcome = pipeline.run().await.unwrap();

    // Raw records arrive in scrape order with resolved links.
    assert!(outcome
        .raw_elements
        .iter()
        .any(|r| r.tag == Tag::P && r.text.contains("[the install guide](")));
    assert!(outcome
        .raw_elements
        .iter()
        .any(|r| r.tag == Tag::Ul && r.text == "- step one\n- step two"));
    assert!(outcome
        .raw_elements
        .iter()
        .any(|r| r.tag == Tag::Code && r.text.starts_with("```\n")));

    // One grouped entry per h1, with the synonym block appended where the
    // canonical term appears.
    assert_eq!(outcome.grouped_entries.len(), 2);
    assert_eq!(outcome.grouped_entries[0].title, "Catalog Service");
    assert!(outcome.grouped_entries[0].content.contains("(Synonyms: "));
    assert!(!outcome.grouped_entries[1].content.contains("(Synonyms: "));

    // Chunks split at headings and carry the section banner.
    let paths: Vec<&str> = outcome
        .chunks
        .iter()
        .map(|c| c.metadata.section_path.as_str())
        .collect();
    assert!(paths.contains(&"Catalog Service"));
    assert!(paths.contains(&"Catalog Service > Quick Start"));
    assert!(paths.contains(&"Usage"));
    for chunk in &outcome.chunks {
        assert!(chunk.page_content.starts_with("[Section: "));
    }

    // The `#` comment inside the fenced code sample is body text, not a
    // heading: the usage entry stays a single chunk with its fence intact.
    let usage_chunks: Vec<_> = outcome
        .chunks
        .iter()
        .filter(|c| c.metadata.title == "Usage")
        .collect();
    assert_eq!(usage_chunks.len(), 1);
    assert!(usage_chunks[0]
        .page_content
        .contains("```\n# run the pipeline\ndocsmith run config.yaml\n```"));
    assert!(!paths.iter().any(|p| p.contains("run the pipeline")));

    // Both artifacts landed on disk as JSON lists.
    let raw = tokio::fs::read_to_string(dir.path().join("scraped_docs.json"))
        .await
        .unwrap();
    let raw: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(raw.as_array().is_some_and(|records| !records.is_empty()));

    let grouped = tokio::fs::read_to_string(dir.path().join("rag_ready_groups.json"))
        .await
        .unwrap();
    let grouped: serde_json::Value = serde_json::from_str(&grouped).unwrap();
    assert_eq!(grouped.as_array().map(Vec::len), Some(2));
    // The persisted grouping predates enrichment.
    assert!(!grouped[0]["content"]
        .as_str()
        .unwrap()
        .contains("(Synonyms: "));

    // Retrieval-side dedup leaves distinct chunks untouched.
    assert_eq!(deduplicate(&outcome.chunks).len(), outcome.chunks.len());
}

#[tokio::test]
async fn failing_url_is_skipped_not_fatal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/usage");
            then.status(200).body(USAGE_PAGE);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let Some(pipeline) = pipeline_for(&server, &["/missing", "/usage"], dir.path()) else {
        return;
    };

    let outcome = pipeline.run().await.unwrap();
    assert_eq!(outcome.grouped_entries.len(), 1);
    assert_eq!(outcome.grouped_entries[0].title, "Usage");
}

#[tokio::test]
async fn scrape_preserves_url_order_across_pages() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/intro");
            then.status(200).body(INTRO_PAGE);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/usage");
            then.status(200).body(USAGE_PAGE);
        })
        .await;

    let Some(client) = test_client() else {
        return;
    };
    let extractor = Extractor::with_client(client, UrlProcessing::default());
    let urls = vec![server.url("/usage"), server.url("/intro")];
    let records = extractor.scrape_urls(&urls, &Tag::DEFAULT_SET).await;

    let first_intro = records
        .iter()
        .position(|r| r.source.ends_with("/intro"))
        .unwrap();
    let last_usage = records
        .iter()
        .rposition(|r| r.source.ends_with("/usage"))
        .unwrap();
    assert!(last_usage < first_intro);
}
