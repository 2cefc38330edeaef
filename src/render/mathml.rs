// src/render/mathml.rs
//! LaTeX fragment translation for feed summaries.
//!
//! Physics feeds carry `$...$` (inline) and `$$...$$` (display) fragments in
//! their abstracts. Display fragments are substituted first and may span
//! lines; inline fragments stay on one line. A fragment that fails to
//! convert degrades to escaped `<code>` so the rest of the summary still
//! renders.

use latex2mathml::{latex_to_mathml, DisplayStyle};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DISPLAY_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());
static INLINE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(.*?)\$").unwrap());

const BLOCK_WRAP_OPEN: &str = r#"<div style="text-align: center; margin: 1em 0;">"#;

/// Replace every formula fragment in `text` with MathML, leaving the
/// surrounding prose untouched.
pub fn translate_formulas(text: &str) -> String {
    let after_display = DISPLAY_MATH.replace_all(text, |caps: &Captures| {
        let latex = caps[1].trim();
        match latex_to_mathml(latex, DisplayStyle::Block) {
            Ok(mathml) => format!("{BLOCK_WRAP_OPEN}{mathml}</div>"),
            Err(e) => {
                tracing::warn!(fragment = %snippet(latex), error = %e, "display formula translation failed");
                format!(
                    "{BLOCK_WRAP_OPEN}<code>{}</code></div>",
                    html_escape::encode_text(latex)
                )
            }
        }
    });
    INLINE_MATH
        .replace_all(&after_display, |caps: &Captures| {
            let latex = caps[1].trim();
            match latex_to_mathml(latex, DisplayStyle::Inline) {
                Ok(mathml) => mathml,
                Err(e) => {
                    tracing::warn!(fragment = %snippet(latex), error = %e, "inline formula translation failed");
                    format!("<code>{}</code>", html_escape::encode_text(latex))
                }
            }
        })
        .into_owned()
}

fn snippet(latex: &str) -> String {
    latex.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_fragment_becomes_mathml() {
        let out = translate_formulas("energy $E=mc^2$ density");
        assert!(out.starts_with("energy "), "prose prefix lost: {out}");
        assert!(out.ends_with(" density"), "prose suffix lost: {out}");
        assert!(out.contains("<math"), "no MathML in: {out}");
        assert!(!out.contains('$'), "delimiter survived: {out}");
    }

    #[test]
    fn display_fragment_is_centered_and_may_span_lines() {
        let out = translate_formulas("see\n$$x =\ny$$\ndone");
        assert!(out.contains("text-align: center"), "no block wrapper: {out}");
        assert!(out.contains("<math"), "no MathML in: {out}");
    }

    #[test]
    fn broken_fragment_falls_back_to_code() {
        let out = translate_formulas(r"before $\frac{$ after");
        assert!(out.starts_with("before "), "prefix lost: {out}");
        assert!(out.ends_with(" after"), "suffix lost: {out}");
        assert!(out.contains("<code>"), "no fallback in: {out}");
    }

    #[test]
    fn one_bad_fragment_does_not_poison_the_rest() {
        let out = translate_formulas(r"good $x$ bad $\frac{$ end");
        assert!(out.contains("<math"), "good fragment lost: {out}");
        assert!(out.contains("<code>"), "bad fragment not degraded: {out}");
    }

    #[test]
    fn fallback_escapes_markup_in_the_source() {
        let out = translate_formulas(r"$\frac{a<b}{$");
        assert!(!out.contains("a<b"), "unescaped markup in: {out}");
        assert!(out.contains("&lt;"), "expected entity in: {out}");
    }

    #[test]
    fn text_without_formulas_passes_through() {
        let text = "plain prose, no markup";
        assert_eq!(translate_formulas(text), text);
    }
}
