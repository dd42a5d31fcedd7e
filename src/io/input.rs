use std::path::Path;

use anyhow::{Context, Result};

use crate::error::AnalysisError;
use crate::models::{Token, TokenRow};

/// Parse a token-row JSON file into an ordered token stream
pub fn parse_tokens_file(path: &Path) -> Result<Vec<Token>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_tokens_json(&content).with_context(|| format!("Invalid token file: {:?}", path))
}

/// Parse a JSON array of token rows, as delivered by the token source
/// collaborator, into ordered tokens
pub fn parse_tokens_json(json: &str) -> Result<Vec<Token>> {
    let rows: Vec<TokenRow> =
        serde_json::from_str(json).context("Failed to parse token rows JSON")?;

    for row in &rows {
        if row.end_ms < row.start_ms {
            return Err(AnalysisError::MalformedInput(format!(
                "token \"{}\" ends at {}ms before it starts at {}ms",
                row.text, row.end_ms, row.start_ms
            ))
            .into());
        }
    }

    let mut tokens: Vec<Token> = rows.iter().map(Token::from_row).collect();
    tokens.sort_by_key(|t| t.start_ms);

    Ok(tokens)
}

/// The conversation id shared by the tokens, if any
pub fn conversation_id(tokens: &[Token]) -> Option<&str> {
    tokens.first().map(|t| t.conversation_id.as_str())
}
