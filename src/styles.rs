use crate::dom::{attr, collect_elements, remove_attr, set_attr};
use markup5ever_rcdom::{Handle, RcDom};
use std::collections::HashMap;

/// Run-scoped map from inline style strings to generated class names.
///
/// Keys are the trimmed `style` value, compared byte for byte. Class numbers
/// start at 1 and are never reused, so sharing one table across several
/// documents gives them a common stylesheet.
#[derive(Debug, Default)]
pub struct StyleTable {
    classes: HashMap<String, String>,
    rules: Vec<String>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class for `style`, allocating the next `class-N` on first sight.
    pub fn class_for(&mut self, style: &str) -> String {
        if let Some(class) = self.classes.get(style) {
            return class.clone();
        }
        let class = format!("class-{}", self.rules.len() + 1);
        self.rules.push(format!(".{class} {{ {style} }}"));
        self.classes.insert(style.to_string(), class.clone());
        class
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in first-seen order.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        for rule in &self.rules {
            out.push_str(rule);
            out.push('\n');
        }
        out
    }
}

fn add_class(h: &Handle, class: &str) {
    match attr(h, "class") {
        Some(existing) if existing.split_whitespace().any(|c| c == class) => {}
        Some(existing) if !existing.trim().is_empty() => {
            set_attr(h, "class", &format!("{} {class}", existing.trim()));
        }
        _ => set_attr(h, "class", class),
    }
}

/// Hoist every non-blank inline `style` into a class from `table`; blank
/// `style` attributes are removed.
///
/// Returns the number of elements rewritten.
pub fn extract_inline_styles(dom: &RcDom, table: &mut StyleTable) -> usize {
    let mut rewritten = 0;
    for el in collect_elements(&dom.document) {
        let Some(style) = attr(&el, "style") else {
            continue;
        };
        let style = style.trim();
        if style.is_empty() {
            remove_attr(&el, "style");
            continue;
        }
        let class = table.class_for(style);
        remove_attr(&el, "style");
        add_class(&el, &class);
        rewritten += 1;
    }
    log::debug!(
        "moved {rewritten} inline styles into classes ({} distinct so far)",
        table.len()
    );
    rewritten
}
