use crate::dom::{
    append_child, attr, collect_elements, detach, find_elem, insert_child, is_element,
    new_element,
};
use markup5ever_rcdom::{Handle, RcDom};

fn ensure_head(dom: &RcDom) -> Handle {
    if let Some(head) = find_elem(&dom.document, "head") {
        return head;
    }
    let root = find_elem(&dom.document, "html").unwrap_or_else(|| dom.document.clone());
    let head = new_element("head", &[]);
    insert_child(&root, 0, head.clone());
    head
}

/// Give the document one `<head>` with no `<style>` blocks and exactly one
/// `<link rel="stylesheet">` pointing at `stylesheet`.
///
/// Links are matched on an exact `href`, so normalizing twice is a no-op.
pub fn normalize_head(dom: &RcDom, stylesheet: &str) {
    let head = ensure_head(dom);

    let styles: Vec<Handle> = collect_elements(&head)
        .into_iter()
        .filter(|el| is_element(el, "style"))
        .collect();
    for style in &styles {
        detach(style);
    }

    let links: Vec<Handle> = collect_elements(&dom.document)
        .into_iter()
        .filter(|el| is_element(el, "link") && attr(el, "href").as_deref() == Some(stylesheet))
        .collect();
    match links.split_first() {
        Some((_, extra)) => {
            for link in extra {
                detach(link);
            }
        }
        None => append_child(
            &head,
            new_element("link", &[("rel", "stylesheet"), ("href", stylesheet)]),
        ),
    }

    log::debug!(
        "normalized head: dropped {} style blocks, {} duplicate links",
        styles.len(),
        links.len().saturating_sub(1)
    );
}
