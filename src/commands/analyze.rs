use crate::analyzers::{self, ruby::RubyAnalyzer};
use crate::config::{self, PromptmapConfig};
use crate::core::{AnalysisResults, FileReport};
use crate::io::output::{create_writer, JsonWriter, MarkdownWriter, OutputFormat, OutputWriter};
use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;

pub struct AnalyzeOptions {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub max_tokens: Option<usize>,
    pub tokenizer: Option<PathBuf>,
}

/// Run one analysis pass and render the results. Returns the findings so the
/// caller can pick an exit code.
pub fn analyze_project(options: AnalyzeOptions) -> Result<AnalysisResults> {
    let mut config = config::load_config();
    apply_overrides(&mut config, &options);

    let files = crate::io::walker::FileWalker::new(options.path.clone())
        .with_ignore_patterns(config.ignore.patterns.clone())
        .walk()?;

    let analyzer = RubyAnalyzer::new(config);
    let reports = analyze_files(&analyzer, &files);
    let results = AnalysisResults::from_reports(options.path.clone(), reports);

    write_results(&results, options.format, options.output.as_deref())?;
    Ok(results)
}

fn apply_overrides(config: &mut PromptmapConfig, options: &AnalyzeOptions) {
    if let Some(max_tokens) = options.max_tokens {
        config.rules.max_tokens = max_tokens;
    }
    if let Some(tokenizer) = &options.tokenizer {
        config.tokenizer.path = Some(tokenizer.clone());
    }
}

/// Files are independent analysis units, so they fan out one-per-worker.
fn analyze_files(analyzer: &RubyAnalyzer, files: &[PathBuf]) -> Vec<FileReport> {
    files
        .par_iter()
        .filter_map(|path| match analyzers::analyze_file(analyzer, path) {
            Ok(report) => Some(report),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

fn write_results(
    results: &AnalysisResults,
    format: OutputFormat,
    output: Option<&std::path::Path>,
) -> Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let mut writer: Box<dyn OutputWriter> = match format {
                OutputFormat::Json => Box::new(JsonWriter::new(file)),
                OutputFormat::Markdown => Box::new(MarkdownWriter::new(file)),
                OutputFormat::Terminal => {
                    anyhow::bail!("Terminal format cannot be written to a file")
                }
            };
            writer.write_results(results)
        }
        None => {
            let mut writer = create_writer(format);
            writer.write_results(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn analyzes_a_directory_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("prompt_helper.rb"),
            "class PromptHelper\n  PAYLOAD = { system: \"You are an AI assistant.\" }\nend\n",
        )
        .unwrap();
        fs::write(dir.path().join("clean.rb"), "x = 1\n").unwrap();

        let out = dir.path().join("report.json");
        let results = analyze_project(AnalyzeOptions {
            path: dir.path().to_path_buf(),
            format: OutputFormat::Json,
            output: Some(out.clone()),
            max_tokens: None,
            tokenizer: None,
        })
        .unwrap();

        assert_eq!(results.files_analyzed, 2);
        assert_eq!(results.findings.len(), 1);
        assert!(out.exists());
    }
}
