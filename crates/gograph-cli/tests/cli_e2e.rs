use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn gograph_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gograph"))
}

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/go_mini.json")
}

fn run(args: &[&str]) -> Output {
    Command::new(gograph_bin())
        .args(args)
        .env_remove("GOGRAPH_DB")
        .env_remove("RUST_LOG")
        .output()
        .expect("run gograph")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "gograph failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn build_store(dir: &TempDir) -> PathBuf {
    let store = dir.path().join("go.gost");
    let fixture = fixture();
    stdout(&run(&[
        "parse-go",
        "--input",
        path_str(&fixture),
        "--output",
        path_str(&store),
    ]));
    store
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn parse_go_then_stats() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);

    let out = stdout(&run(&["stats", "-d", path_str(&store), "--json"]));
    let stats: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(stats["terms"], 10);
    assert_eq!(stats["synonyms"], 12);
    assert_eq!(stats["is_a_relationships"], 9);
    assert_eq!(stats["part_of_relationships"], 5);
}

#[test]
fn parse_go_refuses_to_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);
    let fixture = fixture();

    let again = run(&[
        "parse-go",
        "--input",
        path_str(&fixture),
        "--output",
        path_str(&store),
    ]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    stdout(&run(&[
        "parse-go",
        "--input",
        path_str(&fixture),
        "--output",
        path_str(&store),
        "--force",
    ]));
}

#[test]
fn get_term_and_search() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);

    let out = stdout(&run(&["get-term", "-d", path_str(&store), "GO:0005886", "--json"]));
    let term: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(term["name"], "plasma membrane");

    let missing = run(&["get-term", "-d", path_str(&store), "GO:9999999"]);
    assert!(!missing.status.success());

    let out = stdout(&run(&["search", "-d", path_str(&store), "cytoplasm", "--json"]));
    let hits: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(hits[0]["term"]["accession"], "GO:0005737");
    assert_eq!(hits[0]["match_type"], "exact");
}

#[test]
fn relationships_lists_all_groups() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);

    let out = stdout(&run(&[
        "relationships",
        "-d",
        path_str(&store),
        "GO:0005737",
        "--max-distance",
        "1",
        "--json",
    ]));
    let groups: serde_json::Value = serde_json::from_str(&out).unwrap();
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 4);

    let part_of_children = groups
        .iter()
        .find(|g| g["kind"] == "part_of" && g["direction"] == "child")
        .unwrap();
    assert_eq!(part_of_children["related"].as_array().unwrap().len(), 3);
}

#[test]
fn database_from_environment() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);

    let output = Command::new(gograph_bin())
        .args(["stats"])
        .env("GOGRAPH_DB", &store)
        .output()
        .expect("run gograph");
    assert!(stdout(&output).contains("terms:"));
}

#[test]
fn analyze_hashtags_reports_resolution() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);

    let out = stdout(&run(&[
        "analyze-hashtags",
        "-d",
        path_str(&store),
        "#ER and #nonexistentterm123",
        "--json",
    ]));
    let analysis: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(analysis[0]["term"]["accession"], "GO:0005783");
    assert!(analysis[1]["term"].is_null());
}

#[test]
fn augment_text_is_reproducible_with_seed() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);
    let args = [
        "augment-text",
        "-d",
        path_str(&store),
        "The enzyme works in the #cytoplasm.",
        "-n",
        "4",
        "--seed",
        "17",
        "--json",
    ];

    let first = stdout(&run(&args));
    let second = stdout(&run(&args));
    assert_eq!(first, second);

    let variations: Vec<String> = serde_json::from_str(&first).unwrap();
    assert_eq!(variations.len(), 4);
    assert!(variations
        .iter()
        .all(|v| v.starts_with("The enzyme works in the ") && v.ends_with('.')));
}

#[test]
fn augment_text_flags_override_options_file() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);
    let options = dir.path().join("options.json");
    std::fs::write(
        &options,
        r#"{"num_variations": 2, "synonym_probability": 0.0, "go_id_probability": 0.0,
            "relationship_prob": 0.0, "definition_probability": 0.0}"#,
    )
    .unwrap();

    let out = stdout(&run(&[
        "augment-text",
        "-d",
        path_str(&store),
        "In the #cytoplasm.",
        "--options",
        path_str(&options),
        "--definition-prob",
        "1.0",
        "--definition-max-length",
        "12",
        "--json",
    ]));
    let variations: Vec<String> = serde_json::from_str(&out).unwrap();
    assert_eq!(
        variations,
        vec!["In the cytoplasm (The conte...).", "In the cytoplasm (The conte...)."]
    );
}

#[test]
fn augment_text_rejects_bad_probability() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&dir);
    let output = run(&[
        "augment-text",
        "-d",
        path_str(&store),
        "#cytoplasm",
        "--synonym-prob",
        "1.5",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("synonym_probability"));
}
