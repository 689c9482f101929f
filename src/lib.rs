// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod prompt;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    syntax::{NodeId, NodeKind, Span, SyntaxTree},
    AnalysisResults, FileReport, Finding, Priority, RuleKind,
};

pub use crate::analyzers::{analyze_file, ruby::RubyAnalyzer, Analyzer, SourceUnit};

pub use crate::config::{load_config, PromptmapConfig};

pub use crate::prompt::{
    calls::{match_client_call, CallSignature, Receiver},
    extract::{extract_text, ExtractedText, Fragment},
    scope::is_prompt_scope,
    tokens::TokenCounter,
};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
