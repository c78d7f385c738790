//! Citation insertion

use crate::config::CitationConfig;
use crate::handlers::collapse_to_end;
use crate::{EditorCommand, InsertCitation, Result, Transaction};
use doc_model::nodes::create_citation;

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// The text a citation displays: the given display text, or `(author, year)`
/// with configured fallbacks for whichever part is missing
pub fn citation_text(payload: &InsertCitation, config: &CitationConfig) -> String {
    if let Some(text) = non_blank(&payload.display_text) {
        return text.to_string();
    }
    let author = non_blank(&payload.author).unwrap_or(&config.fallback_author);
    let year = non_blank(&payload.year).unwrap_or(&config.fallback_year);
    format!("({author}, {year})")
}

pub fn insert_citation(command: &EditorCommand, tx: &mut Transaction<'_>) -> Result<bool> {
    let EditorCommand::InsertCitation(payload) = command else {
        return Ok(false);
    };
    let text = citation_text(payload, &tx.config().citation);
    collapse_to_end(tx);
    let id = tx.insert_inline(create_citation(text.as_str()))?;
    tracing::debug!(%id, text = %text, "inserted citation");
    Ok(true)
}
