use crate::dom::{decode_input, parse_to_dom, serialize_document};
use crate::error::{CleanError, Result};
use crate::head::normalize_head;
use crate::merge::merge_adjacent_spans;
use crate::prune::prune_empty;
use crate::styles::{extract_inline_styles, StyleTable};
use crate::units::convert_pt_to_px;

pub const SINGLE_HTML_NAME: &str = "index-clean.html";
pub const SINGLE_CSS_NAME: &str = "styles.css";
pub const MERGED_CSS_NAME: &str = "merged-styles.css";

/// Output name for the document at 1-based `position` of a batch.
pub fn batch_html_name(position: usize) -> String {
    format!("index-clean-{position}.html")
}

#[derive(Clone, Debug)]
pub struct CleanOptions {
    /// File name the cleaned pages link to.
    pub stylesheet_name: String,
    /// Rewrite `pt` lengths in the stylesheet as `px`.
    pub convert_units: bool,
}

impl CleanOptions {
    pub fn single() -> Self {
        Self {
            stylesheet_name: SINGLE_CSS_NAME.to_string(),
            convert_units: true,
        }
    }

    pub fn merged() -> Self {
        Self {
            stylesheet_name: MERGED_CSS_NAME.to_string(),
            convert_units: true,
        }
    }
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self::single()
    }
}

/// Context for one processing run: the options plus the style table every
/// page of the run shares.
#[derive(Debug)]
pub struct CleanRun {
    options: CleanOptions,
    table: StyleTable,
}

impl CleanRun {
    pub fn new(options: CleanOptions) -> Self {
        Self {
            options,
            table: StyleTable::new(),
        }
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    pub fn table(&self) -> &StyleTable {
        &self.table
    }

    /// Parse, prune, merge, extract and normalize one page; returns its HTML.
    pub fn clean_page(&mut self, input: &[u8]) -> Result<String> {
        let text = decode_input(input)?;
        let dom = parse_to_dom(&text);
        prune_empty(&dom);
        merge_adjacent_spans(&dom);
        extract_inline_styles(&dom, &mut self.table);
        normalize_head(&dom, &self.options.stylesheet_name);
        serialize_document(&dom)
    }

    /// Stylesheet accumulated by the run.
    pub fn finish(self) -> String {
        let css = self.table.stylesheet();
        if self.options.convert_units {
            convert_pt_to_px(&css)
        } else {
            css
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanedDocument {
    pub html: String,
    pub css: String,
}

/// Clean a single page against a fresh style table.
pub fn clean_document(input: &[u8], options: &CleanOptions) -> Result<CleanedDocument> {
    if input.is_empty() {
        return Err(CleanError::NoInput);
    }
    let mut run = CleanRun::new(options.clone());
    let html = run.clean_page(input)?;
    Ok(CleanedDocument {
        html,
        css: run.finish(),
    })
}

#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CleanedPage {
    /// 1-based position of the source in the batch.
    pub position: usize,
    pub source: String,
    pub output_name: String,
    pub html: String,
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub position: usize,
    pub source: String,
    pub error: CleanError,
}

#[derive(Debug)]
pub struct BatchOutput {
    pub pages: Vec<CleanedPage>,
    pub css: String,
    pub css_name: String,
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutput {
    /// Names of the blobs to persist: pages in order, then the stylesheet.
    pub fn artifacts(&self) -> Vec<String> {
        let mut out: Vec<String> = self.pages.iter().map(|p| p.output_name.clone()).collect();
        out.push(self.css_name.clone());
        out
    }
}

/// Clean several pages against one shared style table.
///
/// Pages are processed in order so class numbers are deterministic. A page
/// that fails is recorded in `failures` and the rest of the batch carries on.
pub fn clean_batch(inputs: &[SourceDocument], options: &CleanOptions) -> Result<BatchOutput> {
    if inputs.is_empty() {
        return Err(CleanError::NoInput);
    }

    let mut run = CleanRun::new(options.clone());
    let mut pages = Vec::with_capacity(inputs.len());
    let mut failures = Vec::new();

    for (idx, doc) in inputs.iter().enumerate() {
        let position = idx + 1;
        match run.clean_page(&doc.content) {
            Ok(html) => pages.push(CleanedPage {
                position,
                source: doc.name.clone(),
                output_name: batch_html_name(position),
                html,
            }),
            Err(error) => {
                log::warn!("skipping {} (#{position}): {error}", doc.name);
                failures.push(DocumentFailure {
                    position,
                    source: doc.name.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "cleaned {} of {} documents, {} shared style rules",
        pages.len(),
        inputs.len(),
        run.table().len()
    );

    let css_name = run.options().stylesheet_name.clone();
    Ok(BatchOutput {
        pages,
        css: run.finish(),
        css_name,
        failures,
    })
}
