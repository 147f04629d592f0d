use negeval::{
    evaluate, evaluate_files, EvalConfigBuilder, EvalMode, EvaluationError, Overall, Report,
    ScopeScoring,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn read(name: &str) -> String {
    fs::read_to_string(data(name)).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_instance_based_normalized() {
    let config = EvalConfigBuilder::new()
        .mode(EvalMode::InstanceBased)
        .build();
    let Report::InstanceBased(result) = evaluate(&read("gold.txt"), &read("system.txt"), &config)
        .unwrap()
    else {
        panic!("wrong report kind")
    };
    assert!(close(result.cue_precision, 1.0));
    assert!(close(result.cue_recall, 1.0));
    assert!(close(result.scope_precision, 1.0));
    assert!(close(result.scope_recall, (1.0 + 2.0 / 3.0) / 2.0));
}

#[test]
fn test_instance_based_tokens() {
    let config = EvalConfigBuilder::new()
        .mode(EvalMode::InstanceBased)
        .scope_scoring(ScopeScoring::Tokens)
        .build();
    let Report::InstanceBased(result) = evaluate(&read("gold.txt"), &read("system.txt"), &config)
        .unwrap()
    else {
        panic!("wrong report kind")
    };
    assert!(close(result.scope_precision, 1.0));
    assert!(close(result.scope_recall, 5.0 / 6.0));
}

#[test]
fn test_extended_sentence_counts() {
    let config = EvalConfigBuilder::new().mode(EvalMode::Extended).build();
    let Report::Extended(report) = evaluate(&read("gold.txt"), &read("system.txt"), &config)
        .unwrap()
    else {
        panic!("wrong report kind")
    };
    let value = |name: &str| {
        report
            .overall
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.value)
    };
    assert_eq!(value("# sentences"), Some(Overall::Count(3)));
    assert_eq!(value("# negation sentences"), Some(Overall::Count(2)));
    assert_eq!(value("# negation sentences with errors"), Some(Overall::Count(1)));
    assert_eq!(report.sections.len(), 3);
    let text = report.to_string();
    assert!(text.contains("Token-level scores"));
    assert!(text.contains(" # sentences: 3"));
}

#[test]
fn test_extended_perfect_system() {
    let gold = read("gold.txt");
    let Report::Extended(report) = evaluate(&gold, &gold, &EvalConfigBuilder::new().build())
        .unwrap()
    else {
        panic!("wrong report kind")
    };
    for row in report.sections.iter().flat_map(|s| s.rows.iter()) {
        assert_eq!(row.fp, 0, "{}", row.label);
        assert_eq!(row.fn_, 0, "{}", row.label);
    }
}

#[test]
fn test_starsem_counts() {
    let config = EvalConfigBuilder::new().mode(EvalMode::Starsem).build();
    let Report::Starsem(report) = evaluate(&read("gold.txt"), &read("system.txt"), &config)
        .unwrap()
    else {
        panic!("wrong report kind")
    };
    assert_eq!(report.scores.cues.tp, 2);
    assert_eq!(report.scores.full.tp, 1);
    assert_eq!(report.scores.negation_sentences, 2);
    assert_eq!(report.scores.negation_sentences_with_errors, 1);
    assert!(report.to_string().contains("Full negation"));
}

#[test]
fn test_several_files_are_averaged() {
    let config = EvalConfigBuilder::new()
        .mode(EvalMode::InstanceBased)
        .build();
    let systems = [data("gold.txt"), data("system.txt")];
    let evaluation = evaluate_files(&data("gold.txt"), &systems, &config).unwrap();
    assert_eq!(evaluation.reports.len(), 2);
    let average = evaluation.average.unwrap();
    assert!(close(average.cue_f1, 1.0));
    assert!(close(average.scope_recall, (1.0 + 5.0 / 6.0) / 2.0));
    assert!(evaluation.to_string().contains("AVERAGE"));
}

#[test]
fn test_no_average_outside_instance_mode() {
    let systems = [data("system.txt"), data("system.txt")];
    let evaluation =
        evaluate_files(&data("gold.txt"), &systems, &EvalConfigBuilder::new().build()).unwrap();
    assert!(evaluation.average.is_none());
}

#[test]
fn test_alignment_errors_name_the_system_file() {
    let dir = TempDir::new().unwrap();
    let truncated = dir.path().join("truncated.txt");
    let text = read("system.txt");
    let first_sentence = text.split("\n\n").next().unwrap();
    fs::write(&truncated, first_sentence).unwrap();
    let config = EvalConfigBuilder::new().build();
    let error = evaluate_files(&data("gold.txt"), &[&truncated], &config).unwrap_err();
    match error {
        EvaluationError::File { path, .. } => assert_eq!(path, truncated),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_json_output() {
    let config = EvalConfigBuilder::new().mode(EvalMode::Starsem).build();
    let report = evaluate(&read("gold.txt"), &read("system.txt"), &config).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "starsem");
    assert_eq!(json["scores"]["cues"]["tp"], 2);
}
