use crate::core::{AnalysisResults, Priority, RuleKind};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        writeln!(self.writer, "# Promptmap Analysis Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Files analyzed | {} |", results.files_analyzed)?;
        writeln!(self.writer, "| Findings | {} |", results.findings.len())?;
        for &rule in RuleKind::ALL {
            let count = results.count_by_rule(rule);
            if count > 0 {
                writeln!(self.writer, "| {} | {} |", rule, count)?;
            }
        }
        writeln!(self.writer)?;

        if !results.findings.is_empty() {
            writeln!(self.writer, "## Findings")?;
            writeln!(self.writer)?;
            writeln!(self.writer, "| Location | Rule | Priority | Message |")?;
            writeln!(self.writer, "|----------|------|----------|---------|")?;
            for finding in &results.findings {
                writeln!(
                    self.writer,
                    "| {}:{} | {} | {} | {} |",
                    finding.file.display(),
                    finding.line,
                    finding.rule,
                    finding.priority,
                    finding.message.replace('|', "\\|")
                )?;
            }
            writeln!(self.writer)?;
        }

        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        print_header();
        print_findings(results);
        print_summary(results);
        Ok(())
    }
}

fn print_header() {
    println!("{}", "Promptmap Analysis".bold().blue());
    println!("{}", "==================".blue());
    println!();
}

fn print_findings(results: &AnalysisResults) {
    let mut current_file = None;
    for finding in &results.findings {
        if current_file != Some(&finding.file) {
            println!("{}", finding.file.display().to_string().bold());
            current_file = Some(&finding.file);
        }
        let priority = match finding.priority {
            Priority::High => finding.priority.to_string().red().bold(),
            Priority::Medium => finding.priority.to_string().yellow(),
            Priority::Low => finding.priority.to_string().normal(),
        };
        println!(
            "  {}:{} [{}] {} - {}",
            finding.line,
            finding.column,
            priority,
            finding.rule.to_string().cyan(),
            finding.message
        );
    }
    if !results.findings.is_empty() {
        println!();
    }
}

fn print_summary(results: &AnalysisResults) {
    println!("Files analyzed: {}", results.files_analyzed);
    if results.findings.is_empty() {
        println!("{}", "No prompt issues found.".green());
    } else {
        println!(
            "Findings: {} ({} high, {} medium, {} low)",
            results.findings.len(),
            results.count_by_priority(Priority::High),
            results.count_by_priority(Priority::Medium),
            results.count_by_priority(Priority::Low)
        );
    }
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileReport, Finding};
    use std::path::PathBuf;

    fn sample_results() -> AnalysisResults {
        AnalysisResults::from_reports(
            PathBuf::from("."),
            vec![FileReport {
                path: PathBuf::from("app/prompt.rb"),
                findings: vec![Finding::new(
                    RuleKind::MissingTermination,
                    PathBuf::from("app/prompt.rb"),
                    4,
                    1,
                    "`chat` call sets neither `stop` nor `max_tokens`".to_string(),
                )],
            }],
        )
    }

    #[test]
    fn json_writer_emits_findings() {
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer)
            .write_results(&sample_results())
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["files_analyzed"], 1);
        assert_eq!(json["findings"][0]["rule"], "missing-termination");
        assert_eq!(json["findings"][0]["line"], 4);
    }

    #[test]
    fn markdown_writer_tabulates_findings() {
        let mut buffer = Vec::new();
        MarkdownWriter::new(&mut buffer)
            .write_results(&sample_results())
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("# Promptmap Analysis Report"));
        assert!(output.contains("| app/prompt.rb:4 | missing-termination |"));
    }
}
