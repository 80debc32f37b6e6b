use assert_cmd::Command;
use axum::{http::header, routing::get, Router};
use predicates::prelude::*;
use std::net::SocketAddr;

const PAGE: &str = r#"<html><body>
<p>The Project Gutenberg eBook of Ulysses</p>
<h2><a id="chap01"></a>— I —</h2>
<p>Stately, plump Buck Mulligan came from the stairhead, bearing a bowl of lather.</p>
<p>He held the bowl aloft and intoned. The bowl was white.</p>
<h2><a id="chap02"></a>— II —</h2>
<p>You, Cochrane, what city sent for him? bowl bowl bowl bowl</p>
</body></html>"#;

/// Serve `PAGE` on localhost; the runtime must outlive the test's commands.
fn fixture_server() -> (tokio::runtime::Runtime, String) {
    let rt = tokio::runtime::Runtime::new().expect("rt");
    let addr: SocketAddr = rt.block_on(async {
        let app = Router::new()
            .route(
                "/ulysses.htm",
                get(|| async { ([(header::CONTENT_TYPE, "text/html")], PAGE) }),
            )
            .route(
                "/missing.htm",
                get(|| async { (axum::http::StatusCode::NOT_FOUND, "no") }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("axum serve");
        });
        addr
    });
    (rt, format!("http://{addr}"))
}

fn wordlens() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wordlens"));
    cmd.env_remove("WORDLENS_ENV_FILE");
    cmd
}

#[test]
fn scrape_ranks_section_words_and_writes_contexts() {
    let (_rt, base) = fixture_server();
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("bowl.txt");

    let stdout = wordlens()
        .args(["scrape", "--url"])
        .arg(format!("{base}/ulysses.htm"))
        .args(["--top", "3", "--word", "Bowl", "--left", "1", "--right", "1"])
        .arg("--cut-length")
        .arg("--no-cache")
        .arg("--out")
        .arg(&out)
        .args(["--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&stdout).unwrap();
    // Chapter II text must not leak in: "bowl" appears 3 times in chapter I only.
    assert_eq!(v["occurrences"], 3);
    assert_eq!(v["top"][0]["word"], "the");
    assert_eq!(v["top"][1]["word"], "bowl");
    assert_eq!(v["contexts"]["count"], 3);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "a bowl of\nthe bowl aloft\nthe bowl was\n"
    );
}

#[test]
fn scrape_text_output_lists_top_words() {
    let (_rt, base) = fixture_server();
    let tmp = tempfile::tempdir().unwrap();
    wordlens()
        .env("WORDLENS_CACHE_DIR", tmp.path().join("cache"))
        .args(["scrape", "--url"])
        .arg(format!("{base}/ulysses.htm"))
        .args(["--top", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 2 words:\nthe: 3\nbowl: 3\n"));
    // The page body lands in the cache directory named by the env var.
    assert!(tmp.path().join("cache").exists());
}

#[test]
fn scrape_fails_when_anchor_is_missing() {
    let (_rt, base) = fixture_server();
    wordlens()
        .args(["scrape", "--no-cache", "--url"])
        .arg(format!("{base}/ulysses.htm"))
        .args(["--start-anchor", "chap07", "--end-anchor", "chap08"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("chap07"));
}

#[test]
fn scrape_fails_on_http_error_status() {
    let (_rt, base) = fixture_server();
    wordlens()
        .args(["scrape", "--no-cache", "--url"])
        .arg(format!("{base}/missing.htm"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));
}

#[test]
fn count_over_url_without_anchors_uses_whole_page() {
    let (_rt, base) = fixture_server();
    wordlens()
        .args(["count", "--word", "cochrane", "--no-cache"])
        .arg("--url")
        .arg(format!("{base}/ulysses.htm"))
        .assert()
        .success()
        .stdout(predicate::str::contains("'cochrane' occurs 1 time(s)"));
}
