//! Token counting for the budget rule.
//!
//! One fixed encoding profile is loaded at startup; any load or encode
//! failure is reported once as a non-fatal notice and replaced by a
//! character-based estimate, so analysis always completes.

use crate::config::TokenizerConfig;
use tokenizers::Tokenizer;

pub struct TokenCounter {
    tokenizer: Option<Tokenizer>,
}

impl TokenCounter {
    pub fn from_config(config: &TokenizerConfig) -> Self {
        let tokenizer = config.path.as_ref().and_then(|path| {
            match Tokenizer::from_file(path) {
                Ok(tokenizer) => {
                    log::debug!("Loaded tokenizer profile from {}", path.display());
                    Some(tokenizer)
                }
                Err(e) => {
                    log::warn!(
                        "Failed to load tokenizer profile from {}: {}. \
                         Token counts will be estimated from character length.",
                        path.display(),
                        e
                    );
                    None
                }
            }
        });
        Self { tokenizer }
    }

    /// A counter that always uses the character-based estimate.
    pub fn disabled() -> Self {
        Self { tokenizer: None }
    }

    /// Token count of `text` under the configured encoding, or the
    /// `chars / 4` estimate when no encoder is available or encoding fails.
    pub fn count(&self, text: &str) -> usize {
        if let Some(tokenizer) = &self.tokenizer {
            match tokenizer.encode(text, false) {
                Ok(encoding) => return encoding.get_ids().len(),
                Err(e) => {
                    log::warn!("Tokenizer failed on prompt text: {}. Using estimate.", e);
                }
            }
        }
        text.chars().count() / 4
    }
}
