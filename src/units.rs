use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Pixels per point used by the rewrite (approximately 96 / 72).
pub const PT_TO_PX: f64 = 1.333;

lazy_static! {
    static ref PT_VALUE: Regex =
        Regex::new(r"([0-9]*\.?[0-9]+)\s*pt").expect("PT_VALUE: hardcoded regex is valid");
}

/// Rewrite every `<number>pt` in `css` as the nearest whole `px` value.
///
/// Plain text substitution: everything outside the matched tokens is kept
/// verbatim and the sign of a negative length is left in front of the result.
pub fn convert_pt_to_px(css: &str) -> String {
    PT_VALUE
        .replace_all(css, |caps: &Captures| {
            match caps[1].parse::<f64>() {
                Ok(pt) => format!("{}px", (pt * PT_TO_PX).round() as i64),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_point_lengths() {
        assert_eq!(convert_pt_to_px("margin: 12pt 0;"), "margin: 16px 0;");
        assert_eq!(convert_pt_to_px("font-size:10.5pt"), "font-size:14px");
        assert_eq!(convert_pt_to_px("text-indent: .5pt"), "text-indent: 1px");
        assert_eq!(convert_pt_to_px("margin-left:-18.0pt"), "margin-left:-24px");
    }

    #[test]
    fn allows_whitespace_before_unit() {
        assert_eq!(convert_pt_to_px("line-height: 12 pt;"), "line-height: 16px;");
    }

    #[test]
    fn leaves_other_units_and_bare_pt_alone() {
        let css = ".class-1 { margin: 1em 2px 3%; font-family: \"Script pt\"; }\n";
        assert_eq!(convert_pt_to_px(css), css);
    }

    #[test]
    fn only_ascii_digits_count_as_numbers() {
        let css = ".class-1 { font-family:\"Font \u{663}pt\" }";
        assert_eq!(convert_pt_to_px(css), css);
        assert_eq!(
            convert_pt_to_px("margin:\u{663}12pt"),
            "margin:\u{663}16px"
        );
    }

    #[test]
    fn rewrites_every_rule_in_a_stylesheet() {
        let css = ".class-1 { font-size:11pt }\n.class-2 { margin:0 0 8pt 0 }\n";
        assert_eq!(
            convert_pt_to_px(css),
            ".class-1 { font-size:15px }\n.class-2 { margin:0 0 11px 0 }\n"
        );
    }
}
