use crate::dom::{
    adopt_children, append_text, attr, collect_elements, detach, following_siblings, inner_html,
    is_blank_html, is_blank_text, is_element, parent_of, NBSP_ENTITY,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Next `<span>` sibling of `span`, looking past comments and the blank text
/// word processors put between runs. Anything else ends the chain.
fn next_span(span: &Handle) -> Option<Handle> {
    for sib in following_siblings(span) {
        match &sib.data {
            NodeData::Comment { .. } => continue,
            NodeData::Text { .. } if is_blank_text(&sib) => continue,
            NodeData::Element { .. } if is_element(&sib, "span") => return Some(sib),
            _ => return None,
        }
    }
    None
}

fn needs_separator(cur: &str, next: &str) -> bool {
    !cur.ends_with(' ')
        && !cur.ends_with(NBSP_ENTITY)
        && !next.chars().next().is_some_and(char::is_whitespace)
}

fn merge_pair(cur: &Handle, next: &Handle) {
    let cur_html = inner_html(cur);
    let next_html = inner_html(next);

    if is_blank_html(&next_html) {
        if !cur_html.trim().is_empty() {
            append_text(cur, "\u{a0}");
        }
    } else {
        if needs_separator(&cur_html, &next_html) {
            append_text(cur, " ");
        }
        adopt_children(cur, next);
    }

    detach(next);
}

/// Merge runs of adjacent `<span>`s carrying the same `style` string.
///
/// Styles compare as raw strings, so `color:red` and `color: red` stay
/// separate. Returns the number of spans folded into a predecessor.
pub fn merge_adjacent_spans(dom: &RcDom) -> usize {
    let mut merged = 0;
    for span in collect_elements(&dom.document) {
        if !is_element(&span, "span") {
            continue;
        }
        // Already folded into an earlier span.
        if parent_of(&span).is_none() {
            continue;
        }
        let style = attr(&span, "style");
        while let Some(next) = next_span(&span) {
            if attr(&next, "style") != style {
                break;
            }
            merge_pair(&span, &next);
            merged += 1;
        }
    }
    log::debug!("merged {merged} adjacent spans");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{find_elem, node_children, parse_to_dom};

    fn text_children(h: &Handle) -> usize {
        node_children(h)
            .iter()
            .filter(|c| matches!(c.data, NodeData::Text { .. }))
            .count()
    }

    fn body_html(dom: &RcDom) -> String {
        inner_html(&find_elem(&dom.document, "body").unwrap())
    }

    #[test]
    fn chains_three_spans_with_same_style() {
        let dom = parse_to_dom(
            r#"<p><span style="color:red">A</span><span style="color:red">B</span><span style="color:red">C</span></p>"#,
        );
        assert_eq!(merge_adjacent_spans(&dom), 2);
        assert_eq!(body_html(&dom), r#"<p><span style="color:red">A B C</span></p>"#);
        let span = find_elem(&dom.document, "span").unwrap();
        assert_eq!(text_children(&span), 1);
    }

    #[test]
    fn style_strings_compare_literally() {
        let dom = parse_to_dom(
            r#"<p><span style="color:red">A</span><span style="color: red">B</span></p>"#,
        );
        assert_eq!(merge_adjacent_spans(&dom), 0);
    }

    #[test]
    fn spans_without_style_merge() {
        let dom = parse_to_dom("<p><span>A</span><span>B</span></p>");
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), "<p><span>A B</span></p>");
    }

    #[test]
    fn no_separator_after_space_or_before_whitespace() {
        let dom = parse_to_dom(
            r#"<p><span style="x">A </span><span style="x">B</span><span style="x"> C</span></p>"#,
        );
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), r#"<p><span style="x">A B C</span></p>"#);
    }

    #[test]
    fn no_separator_after_nbsp() {
        let dom = parse_to_dom(r#"<p><span style="x">A&nbsp;</span><span style="x">B</span></p>"#);
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), r#"<p><span style="x">A&nbsp;B</span></p>"#);
    }

    #[test]
    fn empty_follower_becomes_nbsp() {
        let dom = parse_to_dom(
            r#"<p><span style="x">A</span><span style="x">&nbsp;</span><span style="x"></span></p>"#,
        );
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), r#"<p><span style="x">A&nbsp;&nbsp;</span></p>"#);
    }

    #[test]
    fn empty_leader_stays_empty() {
        let dom = parse_to_dom(r#"<p><span style="x"></span><span style="x"> </span></p>"#);
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), r#"<p><span style="x"></span></p>"#);
    }

    #[test]
    fn looks_past_blank_text_between_runs() {
        let dom = parse_to_dom("<p><span style=\"x\">A</span>\n<span style=\"x\">B</span></p>");
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), "<p><span style=\"x\">A B</span>\n</p>");
    }

    #[test]
    fn nbsp_between_spans_stops_merge() {
        let dom = parse_to_dom(r#"<p><span style="x">A</span>&nbsp;<span style="x">B</span></p>"#);
        assert_eq!(merge_adjacent_spans(&dom), 0);
        assert_eq!(
            body_html(&dom),
            r#"<p><span style="x">A</span>&nbsp;<span style="x">B</span></p>"#
        );
    }

    #[test]
    fn text_between_spans_stops_merge() {
        let dom = parse_to_dom(r#"<p><span style="x">A</span>and<span style="x">B</span></p>"#);
        assert_eq!(merge_adjacent_spans(&dom), 0);
    }

    #[test]
    fn keeps_markup_of_merged_content() {
        let dom = parse_to_dom(r#"<p><span style="x"><b>A</b></span><span style="x"><i>B</i></span></p>"#);
        merge_adjacent_spans(&dom);
        assert_eq!(body_html(&dom), r#"<p><span style="x"><b>A</b> <i>B</i></span></p>"#);
    }

    #[test]
    fn different_style_breaks_chain() {
        let dom = parse_to_dom(
            r#"<p><span style="a">1</span><span style="a">2</span><span style="b">3</span><span style="b">4</span></p>"#,
        );
        assert_eq!(merge_adjacent_spans(&dom), 2);
        assert_eq!(
            body_html(&dom),
            r#"<p><span style="a">1 2</span><span style="b">3 4</span></p>"#
        );
    }
}
