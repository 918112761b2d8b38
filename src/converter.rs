use crate::cli::OcrArgs;
use crate::client::{OcrClient, OcrOptions};
use crate::config::ConfigResolver;
use crate::result::DocumentResult;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How the OCR result is written out, decided once from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Page(usize),
    NoSeparator,
    Markdown,
}

impl OutputFormat {
    pub fn from_args(args: &OcrArgs) -> Self {
        if args.json {
            OutputFormat::Json
        } else if let Some(page) = args.page {
            OutputFormat::Page(page)
        } else if args.no_separator {
            OutputFormat::NoSeparator
        } else {
            OutputFormat::Markdown
        }
    }
}

pub fn convert(args: &OcrArgs, input: &Path) -> Result<()> {
    if !input.exists() {
        bail!("File not found: {}", input.display());
    }

    let config = ConfigResolver::from_env()
        .load(args.config.as_deref())
        .context("Error loading config")?;

    let client = OcrClient::new(config);
    if !client.is_configured() {
        bail!("PaddleOCR is not configured.\nRun 'paddleocr-cli configure' to set up credentials.");
    }

    if !args.quiet {
        eprintln!("Processing: {}", input.display());
    }

    let options = OcrOptions {
        orientation_classify: args.orientation,
        unwarping: args.unwarp,
        chart_recognition: args.chart,
        timeout: Duration::from_secs(args.timeout),
    };
    let result = client.ocr_file(input, &options);

    if !result.success {
        bail!(
            "{}",
            result
                .error_message
                .as_deref()
                .unwrap_or("OCR failed without an error message")
        );
    }

    if !args.quiet {
        eprintln!("OCR completed: {} page(s)", result.pages.len());
    }

    let output = render(&result, OutputFormat::from_args(args))?;

    match &args.output {
        Some(path) => {
            write_output(path, &output)?;
            if !args.quiet {
                eprintln!("Output saved to: {}", path.display());
            }
        }
        None => println!("{}", output),
    }

    Ok(())
}

pub fn render(result: &DocumentResult, format: OutputFormat) -> Result<String> {
    let output = match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).context("Failed to serialize JSON output")?
        }
        OutputFormat::Page(index) => result.page(index)?.markdown.clone(),
        OutputFormat::NoSeparator => result.joined_markdown(),
        OutputFormat::Markdown => result.full_markdown(),
    };
    Ok(output)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::result::{ImageMap, PageResult};

    fn two_pages() -> DocumentResult {
        let pages = ["A", "B"]
            .iter()
            .enumerate()
            .map(|(i, text)| PageResult {
                page_index: i,
                markdown: text.to_string(),
                images: ImageMap::new(),
            })
            .collect();
        DocumentResult::success(pages, Some("log-1".to_string()))
    }

    #[test]
    fn json_takes_precedence_over_page() {
        let args = OcrArgs {
            json: true,
            page: Some(1),
            no_separator: true,
            ..Default::default()
        };
        assert_eq!(OutputFormat::from_args(&args), OutputFormat::Json);

        let args = OcrArgs {
            page: Some(1),
            no_separator: true,
            ..Default::default()
        };
        assert_eq!(OutputFormat::from_args(&args), OutputFormat::Page(1));
        assert_eq!(
            OutputFormat::from_args(&OcrArgs::default()),
            OutputFormat::Markdown
        );
    }

    #[test]
    fn renders_markdown_variants() {
        let result = two_pages();
        assert_eq!(
            render(&result, OutputFormat::Markdown).unwrap(),
            "A\n\n---\n\nB"
        );
        assert_eq!(render(&result, OutputFormat::NoSeparator).unwrap(), "A\n\nB");
        assert_eq!(render(&result, OutputFormat::Page(1)).unwrap(), "B");
    }

    #[test]
    fn page_out_of_range_is_reported_as_such() {
        let err = render(&two_pages(), OutputFormat::Page(5)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::PageOutOfRange { page: 5, total: 2 })
        ));
        assert_eq!(
            err.to_string(),
            "Page 5 not found (document has 2 pages)"
        );
    }

    #[test]
    fn renders_json() {
        let output = render(&two_pages(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["log_id"], "log-1");
        assert_eq!(value["pages"][1]["page_index"], 1);
        assert_eq!(value["pages"][1]["markdown"], "B");
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn json_omits_absent_log_id() {
        let result = DocumentResult::success(Vec::new(), None);
        let output = render(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "pages": []}));
    }

    #[test]
    fn output_directory_failure_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let err = write_output(&blocker.join("doc.md"), "A").unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Failed to create output directory:"));
    }

    #[test]
    fn writes_output_creating_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/doc.md");
        write_output(&path, "A").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "A");
    }

    #[test]
    fn missing_input_fails_before_loading_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = convert(&OcrArgs::default(), &missing).unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }
}
