//! Prompt templates for entity extraction.

use std::path::Path;

use mkgraph_core::{ExtractionRequest, SourceDocument};

const RULES_HEADER: &str = "You are an expert at extracting structured information from documents.\n";

const ENTITY_TYPES: &str = "\n## Entity Types\n\n\
1. **person** - Individual people mentioned (by name)\n\
2. **organization** - Companies, teams, groups, institutions\n\
3. **topic** - Projects, products, concepts, events, functions, classes\n";

/// Prompt for extracting entities from a single document.
pub fn extraction_prompt(content: &str) -> String {
    format!(
        "{RULES_HEADER}\nGiven the following content, extract all relevant entities and return a JSON array.\n\
{ENTITY_TYPES}\n\
## Rules\n\n\
- Only extract entities that are explicitly mentioned by name\n\
- For each entity, provide a brief description (1-2 sentences)\n\
- Use the exact name as it appears in the text\n\
- Return ONLY valid JSON array, no markdown formatting\n\
- If no entities found, return empty array []\n\n\
## Output Format\n\n\
```json\n\
[\n\
  {{\"name\": \"Entity Name\", \"type\": \"person|organization|topic\", \"description\": \"Brief description\"}},\n\
  ...\n\
]\n\
```\n\n\
## Content to Process\n\n\
---\n\
{content}\n\
---\n\n\
Return the JSON array now:"
    )
}

/// Prompt for extracting entities from multiple files in one call. Each
/// item must carry a `source` field naming the file it came from.
pub fn batch_extraction_prompt(documents: &[SourceDocument]) -> String {
    let mut prompt = format!(
        "{RULES_HEADER}\nGiven multiple files, extract all relevant entities and return a JSON array.\n\
{ENTITY_TYPES}\n\
## Rules\n\n\
- Only extract entities that are explicitly mentioned by name\n\
- For each entity, provide a brief description (1-2 sentences)\n\
- Use the exact name as it appears in the text\n\
- Track which file each entity came from using the \"source\" field\n\
- Return ONLY valid JSON array, no markdown formatting\n\
- If no entities found, return empty array []\n\n\
## Output Format\n\n\
```json\n\
[\n\
  {{\"name\": \"Entity Name\", \"type\": \"person|organization|topic\", \"description\": \"Brief description\", \"source\": \"filename.md\"}},\n\
  ...\n\
]\n\
```\n"
    );

    for (i, doc) in documents.iter().enumerate() {
        let filename = Path::new(&doc.source)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| doc.source.clone());
        prompt.push_str(&format!(
            "\n## File {}: {}\n\n{}\n",
            i + 1,
            filename,
            doc.content
        ));
    }

    prompt.push_str("\n\nReturn the JSON array now:");
    prompt
}

/// Render the prompt for any extraction request.
pub fn prompt_for(request: &ExtractionRequest) -> String {
    match request {
        ExtractionRequest::Single(doc) => extraction_prompt(&doc.content),
        ExtractionRequest::Batch(docs) => batch_extraction_prompt(docs),
    }
}
