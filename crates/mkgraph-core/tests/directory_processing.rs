//! End-to-end processing tests over a temporary input tree, with a stub
//! extractor standing in for the LLM boundary.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use mkgraph_core::{
    process_directory, process_file, EntityExtractor, EntityType, ExtractionRequest, GraphConfig,
    NoteDocument, ProcessOptions, Result, RunState,
};

/// Stub extraction collaborator: pops canned responses in order and logs
/// every request it sees.
struct StubExtractor {
    responses: Mutex<Vec<String>>,
    requests: Mutex<Vec<ExtractionRequest>>,
}

impl StubExtractor {
    fn new(responses: &[&str]) -> Self {
        let mut queue: Vec<String> = responses.iter().map(|r| r.to_string()).collect();
        queue.reverse();
        Self {
            responses: Mutex::new(queue),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl EntityExtractor for StubExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| "[]".to_string()))
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn note_path(output: &Path, type_dir: &str, name: &str) -> PathBuf {
    output.join(type_dir).join(format!("{name}.md"))
}

#[tokio::test]
async fn single_file_creates_one_note_per_entity() {
    let workspace = TempDir::new().unwrap();
    let input = write_input(
        workspace.path(),
        "meeting.md",
        "Met with John Smith from Acme Corp.",
    );
    let output = workspace.path().join("knowledge");

    let extractor = StubExtractor::new(&[r#"[
        {"name": "John Smith", "type": "person", "description": "Engineer at Acme."},
        {"name": "Acme Corp", "type": "organization", "description": "A company."}
    ]"#]);

    let entities = process_file(&input, &output, &extractor, &GraphConfig::default())
        .await
        .unwrap();
    assert_eq!(entities.len(), 2);

    let person = note_path(&output, "People", "John Smith");
    let org = note_path(&output, "Organizations", "Acme Corp");
    assert!(person.exists());
    assert!(org.exists());

    for path in [person, org] {
        let doc = NoteDocument::parse(&fs::read_to_string(&path).unwrap());
        assert_eq!(doc.section_sources(), vec![input.to_string_lossy().to_string()]);
    }
}

#[tokio::test]
async fn reprocessing_without_tracking_does_not_duplicate_sources() {
    let workspace = TempDir::new().unwrap();
    let input = write_input(workspace.path(), "meeting.md", "About Acme.");
    let output = workspace.path().join("knowledge");

    let response = r#"[{"name": "Acme", "type": "organization", "description": "A company."}]"#;
    let config = GraphConfig::default();

    let extractor = StubExtractor::new(&[response, response]);
    process_file(&input, &output, &extractor, &config).await.unwrap();
    let first = fs::read_to_string(note_path(&output, "Organizations", "Acme")).unwrap();

    process_file(&input, &output, &extractor, &config).await.unwrap();
    let second = fs::read_to_string(note_path(&output, "Organizations", "Acme")).unwrap();

    assert_eq!(first, second);
    let doc = NoteDocument::parse(&second);
    assert_eq!(doc.section_sources().len(), 1);
}

#[tokio::test]
async fn batch_merges_same_entity_across_files() {
    let workspace = TempDir::new().unwrap();
    let input_dir = workspace.path().join("inbox");
    fs::create_dir(&input_dir).unwrap();
    let a = write_input(&input_dir, "a.md", "Acme Corp ships anvils.");
    let b = write_input(&input_dir, "b.md", "ACME_CORP hires.");
    let output = workspace.path().join("knowledge");

    let extractor = StubExtractor::new(&[r#"[
        {"name": "Acme Corp", "type": "organization", "description": "Ships anvils.", "source": "a.md"},
        {"name": "ACME_CORP", "type": "organization", "description": "Ships anvils and hires engineers.", "source": "b.md"}
    ]"#]);

    let mut state = RunState::default();
    let summary = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut state,
        &ProcessOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(summary.files_selected, 2);
    assert_eq!(summary.batches, 1);
    assert_eq!(summary.entities, 1);
    assert_eq!(extractor.call_count(), 1);

    // One merged note listing both files as sources
    let note = note_path(&output, "Organizations", "Acme Corp");
    assert!(note.exists());
    let doc = NoteDocument::parse(&fs::read_to_string(&note).unwrap());
    let sources = doc.section_sources();
    assert!(sources.contains(&a.to_string_lossy().to_string()));
    assert!(sources.contains(&b.to_string_lossy().to_string()));
    assert_eq!(sources.len(), 2);
}

#[tokio::test]
async fn second_run_skips_unchanged_files() {
    let workspace = TempDir::new().unwrap();
    let input_dir = workspace.path().join("inbox");
    fs::create_dir(&input_dir).unwrap();
    write_input(&input_dir, "a.md", "Something about Ada.");
    let output = workspace.path().join("knowledge");
    let state_path = workspace.path().join("state.json");

    let response = r#"[{"name": "Ada", "type": "person", "description": "Mathematician."}]"#;
    let options = ProcessOptions {
        state_path: Some(state_path.clone()),
        ..Default::default()
    };

    let extractor = StubExtractor::new(&[response]);
    let mut state = RunState::default();
    let first = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut state,
        &options,
    )
    .await
    .unwrap();
    assert_eq!(first.files_selected, 1);
    assert!(state_path.exists());
    assert!(state.last_run.is_some());

    // Reload from disk like a fresh process would
    let mut reloaded = RunState::load(&state_path).unwrap();
    let second = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut reloaded,
        &options,
    )
    .await
    .unwrap();
    assert_eq!(second.files_selected, 0);
    assert_eq!(second.batches, 0);
    assert_eq!(extractor.call_count(), 1);
}

#[tokio::test]
async fn force_reprocesses_everything() {
    let workspace = TempDir::new().unwrap();
    let input_dir = workspace.path().join("inbox");
    fs::create_dir(&input_dir).unwrap();
    write_input(&input_dir, "a.md", "Something about Ada.");
    let output = workspace.path().join("knowledge");

    let response = r#"[{"name": "Ada", "type": "person", "description": "Mathematician."}]"#;
    let extractor = StubExtractor::new(&[response, response]);
    let mut state = RunState::default();

    let options = ProcessOptions::default();
    process_directory(&input_dir, &output, &extractor, &GraphConfig::default(), &mut state, &options)
        .await
        .unwrap();

    let forced = ProcessOptions {
        force: true,
        ..Default::default()
    };
    let summary = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut state,
        &forced,
    )
    .await
    .unwrap();
    assert_eq!(summary.files_selected, 1);
    assert_eq!(extractor.call_count(), 2);

    // Idempotent notes: the forced rerun wrote nothing new
    assert_eq!(summary.notes_written, 0);
}

#[tokio::test]
async fn reset_makes_all_files_fresh() {
    let workspace = TempDir::new().unwrap();
    let input_dir = workspace.path().join("inbox");
    fs::create_dir(&input_dir).unwrap();
    write_input(&input_dir, "a.md", "Something about Ada.");
    let output = workspace.path().join("knowledge");

    let response = r#"[{"name": "Ada", "type": "person", "description": "Mathematician."}]"#;
    let extractor = StubExtractor::new(&[response, response]);
    let mut state = RunState::default();
    let options = ProcessOptions::default();

    process_directory(&input_dir, &output, &extractor, &GraphConfig::default(), &mut state, &options)
        .await
        .unwrap();
    state.reset();

    let summary = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut state,
        &options,
    )
    .await
    .unwrap();
    assert_eq!(summary.files_selected, 1);
    assert_eq!(extractor.call_count(), 2);
}

#[tokio::test]
async fn disabled_types_are_filtered() {
    let workspace = TempDir::new().unwrap();
    let input = write_input(workspace.path(), "meeting.md", "Topics and people.");
    let output = workspace.path().join("knowledge");

    let mut config = GraphConfig::default();
    config.entity_types = vec!["person".to_string()];

    let extractor = StubExtractor::new(&[r#"[
        {"name": "Ada", "type": "person", "description": ""},
        {"name": "Anvils", "type": "topic", "description": ""}
    ]"#]);

    let entities = process_file(&input, &output, &extractor, &config).await.unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].entity_type, EntityType::Person);
    assert!(!output.join("Topics").exists());
}

#[tokio::test]
async fn malformed_model_output_yields_empty_run() {
    let workspace = TempDir::new().unwrap();
    let input_dir = workspace.path().join("inbox");
    fs::create_dir(&input_dir).unwrap();
    write_input(&input_dir, "a.md", "content");
    let output = workspace.path().join("knowledge");

    let extractor = StubExtractor::new(&["the model rambled with no JSON at all"]);
    let mut state = RunState::default();
    let summary = process_directory(
        &input_dir,
        &output,
        &extractor,
        &GraphConfig::default(),
        &mut state,
        &ProcessOptions::default(),
    )
    .await
    .unwrap();

    // Run continues with zero entities; the batch still commits
    assert_eq!(summary.entities, 0);
    assert_eq!(summary.batches, 1);
    assert_eq!(state.processed_count(), 1);
}
