//! Cleans HTML exported from word processors.
//!
//! Each page goes through the same passes: empty elements are pruned,
//! adjacent `<span>`s with identical inline styles are merged, inline styles
//! are hoisted into deduplicated `class-N` rules, and the `<head>` is pointed
//! at the generated stylesheet. `pt` lengths in that stylesheet are finally
//! rewritten as `px`.
//!
//! ```
//! use html_style_cleaner::{clean_document, CleanOptions};
//!
//! let out = clean_document(
//!     br#"<p><span style="font-size:12pt">a</span><span style="font-size:12pt">b</span></p>"#,
//!     &CleanOptions::single(),
//! )
//! .unwrap();
//! assert!(out.html.contains(r#"<span class="class-1">a b</span>"#));
//! assert_eq!(out.css, ".class-1 { font-size:16px }\n");
//! ```

pub mod dom;
pub mod error;
pub mod head;
pub mod merge;
pub mod pipeline;
pub mod prune;
pub mod styles;
pub mod units;

pub use error::{CleanError, Result};
pub use pipeline::{
    batch_html_name, clean_batch, clean_document, BatchOutput, CleanOptions, CleanRun,
    CleanedDocument, CleanedPage, DocumentFailure, SourceDocument, MERGED_CSS_NAME,
    SINGLE_CSS_NAME, SINGLE_HTML_NAME,
};
pub use styles::StyleTable;
