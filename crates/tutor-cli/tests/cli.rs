use assert_cmd::Command;
use std::io::Write;
use tempfile::TempDir;

/// A `tutor` command isolated from any real `~/.tutor/config.toml`.
fn tutor(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tutor").unwrap();
    cmd.arg("--config").arg(dir.path().join("missing.toml"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_skills_lists_every_subject() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).arg("skills"));
    assert!(out.contains("Mathematics: algebra"));
    assert!(out.contains("CS: variables"));
    assert_eq!(out.lines().count(), 8);
}

#[test]
fn test_skills_for_one_subject() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).args(["skills", "History"]));
    assert_eq!(
        out.lines().collect::<Vec<_>>(),
        vec!["ancient_india", "medieval_india", "modern_india", "world_history"]
    );
}

#[test]
fn test_skills_unknown_subject_fails() {
    let dir = TempDir::new().unwrap();
    tutor(&dir).args(["skills", "Astrology"]).assert().failure();
}

#[test]
fn test_chat_set_topic_then_practice() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).args([
        "--seed",
        "5",
        "chat",
        "-m",
        "Start topic: Physics|motion",
        "-m",
        "practice problem",
    ]));
    assert!(out.contains("Topic set to 'motion' (Subject: Physics)"));
    assert!(out.contains("for motion (Subject: Physics)"));
}

#[test]
fn test_chat_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(
        tutor(&dir)
            .args(["chat", "--subject", "Biology", "--topic", "genetics"])
            .write_stdin("explain\nquit\npractice problem\n"),
    );
    assert!(out.contains("Topic set to genetics"));
    assert!(out.contains("Genetics studies"));
    assert!(!out.contains("Practice Question"));
}

#[test]
fn test_practice_does_not_repeat() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).args(["--seed", "3", "practice", "genetics", "-n", "2"]));
    let questions: Vec<&str> = out.lines().filter(|l| l.starts_with("• ")).collect();
    assert_eq!(questions.len(), 2);
    assert_ne!(questions[0], questions[1]);
}

#[test]
fn test_practice_zero_count_fails() {
    let dir = TempDir::new().unwrap();
    tutor(&dir).args(["practice", "algebra", "-n", "0"]).assert().failure();
}

#[test]
fn test_recommend_json_respects_top_k_and_subject() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).args([
        "--seed", "1", "recommend", "--subject", "English", "--top-k", "2", "--json",
    ]));
    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["skill"], "grammar");
    assert_eq!(cards[1]["skill"], "writing");
    assert_eq!(cards[0]["difficulty"], "Hard");
}

#[test]
fn test_recommend_with_scores_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scores.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"[{{"student_id":"s1","skill":"optics","score":0.1}},
            {{"student_id":"s1","skill":"optics","score":30}}]"#
    )
    .unwrap();

    let out = stdout_of(tutor(&dir).args([
        "recommend",
        "--scores",
        path.to_str().unwrap(),
        "--difficulty",
        "Easy",
    ]));
    assert!(out.contains("### Practice Question for optics: [Easy]"));
    assert!(out.contains("Skill: optics (mastery 0.20)"));
}

#[test]
fn test_recommend_empty_result() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(tutor(&dir).args(["recommend", "--difficulty", "Easy"]));
    assert_eq!(out.trim(), "No recommendations found.");
}

#[test]
fn test_estimate_json_and_fail_closed() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"[{"skill":"algebra","score":90}]"#).unwrap();
    let out = stdout_of(tutor(&dir).args(["estimate", good.to_str().unwrap(), "--json"]));
    let estimates: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(estimates["algebra"], 0.9);
    assert_eq!(estimates["geometry"], 0.65);

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "not json").unwrap();
    let out = stdout_of(tutor(&dir).args(["estimate", bad.to_str().unwrap(), "--json"]));
    let estimates: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(estimates["algebra"], 0.65);
}

#[test]
fn test_estimate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    tutor(&dir)
        .args(["estimate", dir.path().join("nope.json").to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[recommend]\ntop_k = 0\n").unwrap();
    Command::cargo_bin("tutor")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("skills")
        .assert()
        .failure();
}

#[test]
fn test_config_prints_effective_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[recommend]\ntop_k = 3\n").unwrap();
    let out = stdout_of(
        Command::cargo_bin("tutor")
            .unwrap()
            .arg("--config")
            .arg(&path)
            .args(["--seed", "11", "config"]),
    );
    let cfg: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(cfg["version"], "1.0.0");
    assert_eq!(cfg["recommend"]["top_k"], 3);
    assert_eq!(cfg["tutor"]["seed"], 11);
}

#[test]
fn test_json_config_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutor.json");
    std::fs::write(&path, r#"{"recommend": {"top_k": 1}}"#).unwrap();
    let out = stdout_of(
        Command::cargo_bin("tutor")
            .unwrap()
            .arg("--config")
            .arg(&path)
            .args(["recommend", "--json"]),
    );
    let cards: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(cards.as_array().unwrap().len(), 1);
}
