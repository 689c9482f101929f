use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(".promptmap.toml");

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let default_config = r#"# Promptmap Configuration

[rules]
# Token budget for a single prompt string.
max_tokens = 4000
# Uncomment to tune the precision vocabulary used by the temperature rule.
# precision_keywords = ["accurate", "exact", "calculate"]

[clients]
# Type names whose `new` calls count as client construction.
classes = ["Client"]
# Identifier substrings suggesting an API client variable.
name_hints = ["client", "openai", "llm", "gpt"]

[tokenizer]
# Path to a tokenizer.json encoding profile; token counts fall back to a
# character-based estimate when unset.
# path = "models/tokenizer.json"

[ignore]
patterns = [
    "vendor/**",
    "node_modules/**",
]
"#;

    io::write_file(&config_path, default_config)?;
    println!("Created .promptmap.toml configuration file");

    Ok(())
}
