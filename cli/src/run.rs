use crate::errors::CliError;
use crate::output;
use scrape_extract::client::{ModelClient, ModelTransport, SchemaDescriptor};
use scrape_extract::extraction::{
    validate_correlation_id, ExtractionConfig, ExtractionOrchestrator, ExtractionRequest,
    FlatRecord, FsArtifactStore,
};
use scrape_extract::sanitize::clean;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Options of one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Scraped HTML file.
    pub input: PathBuf,
    /// File holding the system prompt.
    pub system_prompt: PathBuf,
    /// JSON Schema file describing the record.
    pub schema: PathBuf,
    /// Correlation id; derived from the input file name when absent.
    pub id: Option<String>,
    /// Directory receiving `<id>_cleaned_input.txt`.
    pub intermediate_dir: PathBuf,
    /// CSV destination; no CSV is written when absent.
    pub output: Option<PathBuf>,
    /// Extraction settings.
    pub extraction: ExtractionConfig,
}

/// Reads a UTF-8 file, naming it in the error.
pub fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a JSON Schema file.
///
/// The schema name comes from its `title`, falling back to the file stem.
pub fn load_schema(path: &Path) -> Result<SchemaDescriptor, CliError> {
    let text = read_file(path)?;
    let schema: Value = serde_json::from_str(&text).map_err(|e| CliError::Schema {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !schema.is_object() {
        return Err(CliError::Schema {
            path: path.to_path_buf(),
            reason: "top level must be an object".to_string(),
        });
    }

    let name = schema
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

    Ok(SchemaDescriptor::new(&name, schema))
}

/// Picks the correlation id: the explicit one, else the input file stem, else
/// a random UUID when the stem is not a usable id.
#[must_use]
pub fn resolve_id(explicit: Option<&str>, input: &Path) -> String {
    if let Some(id) = explicit {
        return id.to_string();
    }
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|stem| validate_correlation_id(stem).is_ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_string)
}

/// Runs one extraction and writes the CSV, returning the record.
pub async fn run_extraction<T: ModelTransport>(
    config: &RunConfig,
    transport: T,
) -> Result<FlatRecord, CliError> {
    let raw_input = read_file(&config.input)?;
    let system_prompt = read_file(&config.system_prompt)?;
    let schema = load_schema(&config.schema)?;
    let id = resolve_id(config.id.as_deref(), &config.input);

    tracing::info!(correlation_id = %id, schema = schema.name(), "starting extraction");

    let orchestrator = ExtractionOrchestrator::new(
        ModelClient::new(transport),
        FsArtifactStore::new(&config.intermediate_dir),
    )
    .with_config(config.extraction);

    let request = ExtractionRequest::new(Some(raw_input), system_prompt, schema, id);
    let record = orchestrator.run(&request).await?;

    if let Some(path) = &config.output {
        output::write_csv(path, &record)?;
        tracing::info!(path = %path.display(), "wrote CSV");
    }

    Ok(record)
}

/// Sanitizes a file and returns the cleaned text.
pub fn run_clean(input: &Path) -> Result<String, CliError> {
    let html = read_file(input)?;
    Ok(clean(Some(&html)))
}
