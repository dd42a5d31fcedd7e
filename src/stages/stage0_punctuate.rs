use crate::models::Token;

/// Configuration for Stage 0 punctuation
#[derive(Debug, Clone)]
pub struct PunctuateConfig {
    /// Gap at/above which a sentence terminator is appended
    pub terminal_gap_ms: u64,
    /// Gap at/above which a comma is appended (below terminal_gap_ms)
    pub comma_gap_ms: u64,
}

impl Default for PunctuateConfig {
    fn default() -> Self {
        Self {
            terminal_gap_ms: 800,
            comma_gap_ms: 300,
        }
    }
}

/// Words whose presence at a sentence end turns the terminator into `?`
const INTERROGATIVES: &[&str] = &["what", "where", "when", "why", "how", "who", "which"];

/// Perform Stage 0: timing-gap punctuation.
///
/// Pure, order-preserving transform over the token list using only
/// inter-token gaps. No token is added, removed, or reordered; tokens
/// that already end in terminal punctuation are left untouched.
pub fn punctuate(tokens: &[Token], config: &PunctuateConfig) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());

    for (i, token) in tokens.iter().enumerate() {
        let mut token = token.clone();
        let is_last = i + 1 == tokens.len();

        if !token.has_terminal_punctuation() {
            if is_last {
                token.text.push('.');
            } else {
                let gap = tokens[i + 1].start_ms.saturating_sub(token.end_ms);
                if gap >= config.terminal_gap_ms {
                    token.text.push(terminal_for(&token));
                } else if gap >= config.comma_gap_ms {
                    token.text.push(',');
                }
            }
        }

        out.push(token);
    }

    out
}

fn terminal_for(token: &Token) -> char {
    let normalized = token.normalized();
    let last_word = normalized.split_whitespace().last().unwrap_or("");
    if INTERROGATIVES.contains(&last_word) {
        '?'
    } else {
        '.'
    }
}
