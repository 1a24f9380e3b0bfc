use crate::dom::{elem_tag_lower, inner_html, is_blank_html, node_children, replace_with_text};
use markup5ever_rcdom::{Handle, RcDom};

fn is_exempt(tag: &str) -> bool {
    matches!(
        tag,
        "html"
            | "head"
            | "body"
            | "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn prune_children(node: &Handle, replaced: &mut usize) {
    for child in node_children(node) {
        prune_children(&child, replaced);

        let Some(tag) = elem_tag_lower(&child) else {
            continue;
        };
        if is_exempt(&tag) {
            continue;
        }
        if is_blank_html(&inner_html(&child)) {
            // A space, not nothing: the element may have separated two words.
            replace_with_text(&child, " ");
            *replaced += 1;
        }
    }
}

/// Replace elements whose content is empty or a lone `&nbsp;` with a space.
///
/// Children are visited before their parent, so `<div><b></b></div>` collapses
/// completely in one pass and a second pass finds nothing left to do.
pub fn prune_empty(dom: &RcDom) -> usize {
    let mut replaced = 0;
    prune_children(&dom.document, &mut replaced);
    log::debug!("pruned {replaced} empty elements");
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_elem, parse_to_dom, serialize_document};

    fn body_html(dom: &RcDom) -> String {
        inner_html(&find_elem(&dom.document, "body").unwrap())
    }

    #[test]
    fn replaces_empty_element_with_space() {
        let dom = parse_to_dom("<p>one<b></b>two</p>");
        assert_eq!(prune_empty(&dom), 1);
        assert_eq!(body_html(&dom), "<p>one two</p>");
    }

    #[test]
    fn replaces_nbsp_only_element_with_space() {
        let dom = parse_to_dom("<p>one<b>&nbsp;</b>two</p>");
        prune_empty(&dom);
        assert_eq!(body_html(&dom), "<p>one two</p>");
    }

    #[test]
    fn collapses_nested_empty_elements() {
        let dom = parse_to_dom("<div>a</div><div><span> </span><i></i></div>");
        prune_empty(&dom);
        assert_eq!(body_html(&dom), "<div>a</div> ");
    }

    #[test]
    fn second_pass_changes_nothing() {
        let dom = parse_to_dom(
            "<p><span>&nbsp;</span></p><p>text <b> </b><i>x</i></p><table><tr><td></td></tr></table>",
        );
        prune_empty(&dom);
        let first = serialize_document(&dom).unwrap();
        assert_eq!(prune_empty(&dom), 0);
        assert_eq!(serialize_document(&dom).unwrap(), first);
    }

    #[test]
    fn keeps_void_elements_and_scaffolding() {
        let dom = parse_to_dom("<p>line<br>next<img src=\"a.png\"></p>");
        assert_eq!(prune_empty(&dom), 0);
        assert!(find_elem(&dom.document, "head").is_some());
        assert_eq!(body_html(&dom), "<p>line<br>next<img src=\"a.png\"></p>");

        let dom = parse_to_dom("<p>a<br>b</p>");
        assert_eq!(prune_empty(&dom), 0);
        assert_eq!(body_html(&dom), "<p>a<br>b</p>");
    }

    #[test]
    fn keeps_elements_with_content() {
        let dom = parse_to_dom("<p><b>bold</b> &nbsp;x</p>");
        assert_eq!(prune_empty(&dom), 0);
    }
}
