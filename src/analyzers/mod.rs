pub mod ruby;

use crate::core::syntax::SyntaxTree;
use crate::core::FileReport;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// A parsed source file, lowered and ready for rule evaluation.
#[derive(Debug)]
pub struct SourceUnit {
    pub tree: SyntaxTree,
    pub path: PathBuf,
}

/// Seam between a language frontend and the rule engine.
pub trait Analyzer {
    fn parse(&self, content: &str, path: PathBuf) -> Result<SourceUnit>;
    fn analyze(&self, unit: &SourceUnit) -> FileReport;
}

/// Read, parse, and analyze one file.
pub fn analyze_file(analyzer: &dyn Analyzer, path: &Path) -> Result<FileReport> {
    let content = crate::io::read_file(path)?;
    let unit = analyzer.parse(&content, path.to_path_buf())?;
    Ok(analyzer.analyze(&unit))
}
