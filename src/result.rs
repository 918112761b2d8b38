use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Separator placed between pages in the combined Markdown document.
pub const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Inline image name -> base64 payload or URL, as returned by the server.
pub type ImageMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub page_index: usize,
    pub markdown: String,
    pub images: ImageMap,
}

/// Outcome of one OCR request.
///
/// A failed result never carries pages and always carries a message; a
/// successful one never carries a message. Pages keep the server's order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    pub success: bool,
    pub pages: Vec<PageResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
}

impl DocumentResult {
    pub fn success(pages: Vec<PageResult>, log_id: Option<String>) -> Self {
        Self {
            success: true,
            pages,
            error_message: None,
            log_id,
        }
    }

    pub fn failure(message: impl Into<String>, log_id: Option<String>) -> Self {
        Self {
            success: false,
            pages: Vec::new(),
            error_message: Some(message.into()),
            log_id,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self::failure(err.to_string(), err.log_id().map(str::to_string))
    }

    pub fn full_markdown(&self) -> String {
        self.join_pages(PAGE_SEPARATOR)
    }

    /// Pages joined by a blank line only, for `--no-separator`.
    pub fn joined_markdown(&self) -> String {
        self.join_pages("\n\n")
    }

    pub fn page(&self, index: usize) -> Result<&PageResult> {
        self.pages.get(index).ok_or(Error::PageOutOfRange {
            page: index,
            total: self.pages.len(),
        })
    }

    fn join_pages(&self, separator: &str) -> String {
        self.pages
            .iter()
            .map(|p| p.markdown.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: usize, text: &str) -> PageResult {
        PageResult {
            page_index: index,
            markdown: text.to_string(),
            images: ImageMap::new(),
        }
    }

    #[test]
    fn full_markdown_joins_with_separator() {
        let result = DocumentResult::success(vec![page(0, "A"), page(1, "B")], None);
        assert_eq!(result.full_markdown(), "A\n\n---\n\nB");
        // pure projection
        assert_eq!(result.full_markdown(), result.full_markdown());
    }

    #[test]
    fn full_markdown_of_no_pages_is_empty() {
        let result = DocumentResult::success(Vec::new(), None);
        assert_eq!(result.full_markdown(), "");
        assert_eq!(result.joined_markdown(), "");
    }

    #[test]
    fn single_page_has_no_separator() {
        let result = DocumentResult::success(vec![page(0, "only")], None);
        assert_eq!(result.full_markdown(), "only");
    }

    #[test]
    fn joined_markdown_uses_blank_line() {
        let result = DocumentResult::success(vec![page(0, "A"), page(1, "B")], None);
        assert_eq!(result.joined_markdown(), "A\n\nB");
    }

    #[test]
    fn page_out_of_range_is_distinct_error() {
        let result = DocumentResult::success(vec![page(0, "A"), page(1, "B")], None);
        assert_eq!(result.page(1).unwrap().markdown, "B");
        match result.page(5) {
            Err(Error::PageOutOfRange { page, total }) => {
                assert_eq!(page, 5);
                assert_eq!(total, 2);
            }
            other => panic!("expected PageOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn failure_has_message_and_no_pages() {
        let result = DocumentResult::from_error(&Error::Api {
            code: 500,
            message: "internal".to_string(),
            log_id: Some("log-1".to_string()),
        });
        assert!(!result.success);
        assert!(result.pages.is_empty());
        assert_eq!(
            result.error_message.as_deref(),
            Some("API error (500): internal")
        );
        assert_eq!(result.log_id.as_deref(), Some("log-1"));
    }

    #[test]
    fn serializes_for_json_output() {
        let mut images = ImageMap::new();
        images.insert("img_0.jpg".to_string(), "aGk=".to_string());
        let result = DocumentResult::success(
            vec![PageResult {
                page_index: 0,
                markdown: "hi".to_string(),
                images,
            }],
            Some("abc".to_string()),
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": true,
                "pages": [{"page_index": 0, "markdown": "hi", "images": {"img_0.jpg": "aGk="}}],
                "log_id": "abc"
            })
        );
    }
}
