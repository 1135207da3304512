use crate::errors::Result;
use crate::report::{MatchRecord, RunResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Defines the possible output formats for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// A simple, human-readable text format.
    Text,
    /// JSON format, suitable for machine processing.
    Json,
    /// Comma-Separated Values, one row per match.
    Csv,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

/// Handles the formatting of run results into the supported output formats.
pub struct OutputFormatter {
    format: OutputFormat,
    preview: bool,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    /// Creates a new `OutputFormatter`.
    ///
    /// `preview` only changes wording in the text summary.
    pub fn new(format: OutputFormat, preview: bool) -> Self {
        Self {
            format,
            preview,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Writes the formatted result to `writer`.
    pub fn write_output<W: Write>(&self, writer: &mut W, result: &RunResult) -> Result<()> {
        let output = match self.format {
            OutputFormat::Text => self.format_text(result),
            OutputFormat::Json => self.format_json(result)?,
            OutputFormat::Csv => self.format_csv(&result.matches)?,
        };
        writer.write_all(output.as_bytes())?;
        Ok(())
    }

    fn format_text(&self, result: &RunResult) -> String {
        let mut output = String::new();

        for m in &result.matches {
            output.push_str(&format!(
                "[{}] {} ({})\n",
                m.kind,
                m.location.display(),
                m.occurrences
            ));
        }

        output.push_str(&format!("\n{}\n", "-".repeat(50)));
        output.push_str(&format!("Files scanned   : {}\n", result.files_processed));
        if self.preview {
            output.push_str(&format!("Files matching  : {}\n", result.content_matches));
            output.push_str(&format!("Occurrences     : {}\n", result.total_replacements));
        } else {
            output.push_str(&format!("Files changed   : {}\n", result.files_modified));
            output.push_str(&format!("Total edits     : {}\n", result.total_replacements));
        }
        output.push_str(&format!("Path matches    : {}\n", result.path_matches));
        if result.paths_renamed > 0 {
            output.push_str(&format!("Paths renamed   : {}\n", result.paths_renamed));
        }
        output.push_str(&format!("Errors          : {}\n", result.errors.len()));

        const SHOWN_ERRORS: usize = 10;
        for error in result.errors.iter().take(SHOWN_ERRORS) {
            output.push_str(&format!("  {error}\n"));
        }
        if result.errors.len() > SHOWN_ERRORS {
            output.push_str(&format!(
                "  ... and {} more errors\n",
                result.errors.len() - SHOWN_ERRORS
            ));
        }

        output
    }

    fn format_json(&self, result: &RunResult) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            run_time: DateTime<Utc>,
            preview: bool,
            summary: Summary,
            matches: &'a [MatchRecord],
            errors: &'a [String],
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        #[derive(Serialize)]
        struct Summary {
            files_processed: usize,
            files_modified: usize,
            total_replacements: usize,
            path_matches: usize,
            content_matches: usize,
            paths_renamed: usize,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            run_time: Utc::now(),
            preview: self.preview,
            summary: Summary {
                files_processed: result.files_processed,
                files_modified: result.files_modified,
                total_replacements: result.total_replacements,
                path_matches: result.path_matches,
                content_matches: result.content_matches,
                paths_renamed: result.paths_renamed,
            },
            matches: &result.matches,
            errors: &result.errors,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }

    fn format_csv(&self, matches: &[MatchRecord]) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(["Kind", "Location", "Occurrences"])?;

        for m in matches {
            wtr.write_record([
                m.kind.to_string(),
                m.location.display().to_string(),
                m.occurrences.to_string(),
            ])?;
        }

        let data = wtr
            .into_inner()
            .map_err(|e| format!("CSV writer error: {e}"))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MatchKind;

    fn sample() -> RunResult {
        RunResult {
            files_processed: 3,
            files_modified: 1,
            total_replacements: 4,
            path_matches: 1,
            content_matches: 1,
            paths_renamed: 0,
            errors: vec!["Error processing /x/locked.txt: IO error: denied".into()],
            matches: vec![
                MatchRecord::new("/x/old_dir", MatchKind::DirectoryPath, 1),
                MatchRecord::new("/x/old_dir/a, b.txt", MatchKind::Content, 4),
            ],
        }
    }

    fn render(format: OutputFormat, preview: bool) -> String {
        let mut buf = Vec::new();
        OutputFormatter::new(format, preview)
            .write_output(&mut buf, &sample())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_lists_matches_and_summary() {
        let out = render(OutputFormat::Text, false);
        assert!(out.contains("[DIRECTORY_PATH] /x/old_dir (1)"));
        assert!(out.contains("[CONTENT] /x/old_dir/a, b.txt (4)"));
        assert!(out.contains("Files changed   : 1"));
        assert!(out.contains("Errors          : 1"));
        assert!(out.contains("locked.txt"));
    }

    #[test]
    fn test_text_preview_wording() {
        let out = render(OutputFormat::Text, true);
        assert!(out.contains("Occurrences     : 4"));
        assert!(!out.contains("Files changed"));
    }

    #[test]
    fn test_json_contains_summary_and_matches() {
        let out = render(OutputFormat::Json, false);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["tool"]["name"], "pathrewrite");
        assert_eq!(value["summary"]["total_replacements"], 4);
        assert_eq!(value["matches"][0]["kind"], "DIRECTORY_PATH");
        assert_eq!(value["matches"][1]["occurrences"], 4);
        assert_eq!(value["errors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_csv_quotes_locations() {
        let out = render(OutputFormat::Csv, false);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Kind,Location,Occurrences"));
        assert_eq!(lines.next(), Some("DIRECTORY_PATH,/x/old_dir,1"));
        assert_eq!(lines.next(), Some("CONTENT,\"/x/old_dir/a, b.txt\",4"));
    }

    #[test]
    fn test_format_from_str_defaults_to_text() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Csv);
        assert_eq!(OutputFormat::from("sarif"), OutputFormat::Text);
    }
}
