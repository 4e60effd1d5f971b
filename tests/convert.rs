//! End-to-end Markdown to Typst conversions.

use papermark::{convert, Papermark, Preamble};
use pretty_assertions::assert_eq;

/// The converted document without the preamble and the newline after it.
fn body(markdown: &str) -> String {
    let typst = convert(markdown).unwrap();
    let preamble = std::str::from_utf8(Preamble::embedded().as_bytes()).unwrap();
    typst
        .strip_prefix(preamble)
        .and_then(|rest| rest.strip_prefix('\n'))
        .unwrap()
        .to_string()
}

#[test]
fn test_hard_line_break() {
    assert_eq!(body("foo  \nbaz\n"), "foo \\\nbaz\n");
}

#[test]
fn test_soft_line_break() {
    assert_eq!(body("foo\nbar\n"), "foo\nbar\n");
}

#[test]
fn test_blocks_are_separated_by_one_blank_line() {
    assert_eq!(body("# Title\n\nOne\n\nTwo\n"), "= Title\n\nOne\n\nTwo\n");
}

#[test]
fn test_emphasis_followed_by_reserved_text() {
    assert_eq!(body("*foo*.body\n"), "#emph[foo]\\.body\n");
    assert_eq!(body("**bold**\n"), "#strong[bold]\n");
}

#[test]
fn test_reserved_characters_are_escaped() {
    assert_eq!(body("a #b $c$ @d\n"), "a \\#b \\$c\\$ \\@d\n");
}

#[test]
fn test_code_span_across_lines() {
    assert_eq!(body("`code  \nspan`\n"), "#raw(\"code   span\")\n");
}

#[test]
fn test_fenced_code_block() {
    assert_eq!(
        body("```rust\nfn main() {}\n```\n"),
        "#figure(\nraw(block: true, lang: \"rust\", \"fn main() {}\\n\"),\ncaption: [Caption],\n) #label(\"label\")\n"
    );
}

#[test]
fn test_indented_code_keeps_tab_remainder() {
    assert_eq!(
        body(">\t\tcode\n"),
        "#quote(block: true)[\n#figure(\nraw(block: true, \"  code\\n\"),\ncaption: [Caption],\n) #label(\"label\")\n]\n"
    );
    assert!(body("-\t\tcode\n").contains("raw(block: true, \"  code\\n\"),"));
}

#[test]
fn test_deeply_nested_lists() {
    const DEPTH: usize = 3000;
    let mut markdown = String::new();
    for level in 0..DEPTH {
        markdown.push_str(&"  ".repeat(level));
        markdown.push_str("- a\n");
    }
    let out = body(&markdown);
    assert_eq!(out.matches("#list(tight: true,\n").count(), DEPTH);
}

#[test]
fn test_tight_bullet_list() {
    assert_eq!(body("- a\n- b\n"), "#list(tight: true,\n[a\n],\n[b\n],\n)\n");
}

#[test]
fn test_loose_bullet_list() {
    assert_eq!(
        body("- a\n\n- b\n"),
        "#list(tight: false,\n[\na\n],\n[\nb\n],\n)\n"
    );
}

#[test]
fn test_ordered_list_start() {
    assert_eq!(
        body("3. a\n4. b\n"),
        "#enum(tight: true, start: 3,\n[a\n],\n[b\n],\n)\n"
    );
    assert!(body("1. a\n").starts_with("#enum(tight: true,\n"));
}

#[test]
fn test_lone_image_becomes_figure() {
    assert_eq!(
        body("![cat](cat.png)\n"),
        "#figure(\nimage(\"cat.png\"),\ncaption: [Caption],\n) #label(\"label\")\n"
    );
}

#[test]
fn test_inline_image_stays_inline() {
    assert_eq!(body("see ![cat](cat.png)\n"), "see #image(\"cat.png\")\n");
}

#[test]
fn test_table() {
    assert_eq!(
        body("| a | b |\n|:--|--:|\n| c | d |\n"),
        "#figure(\ntable(\ncolumns: 2,\nalign: (left, right,),\n\
         table.header([a], [b]),\n\
         [c], [d],\n\
         ),\ncaption: [Caption],\n) #label(\"label\")\n"
    );
}

#[test]
fn test_strikethrough() {
    assert_eq!(body("~~gone~~ here\n"), "#strike[gone] here\n");
}

#[test]
fn test_task_list() {
    let out = body("- [x] done\n- [ ] todo\n");
    assert!(out.starts_with("#list(tight: true,\n[☑ "));
    assert!(out.contains("],\n[☐ "));
    assert!(out.contains("done"));
    assert!(out.contains("todo"));
}

#[test]
fn test_blockquote_and_rule() {
    assert_eq!(
        body("> quote\n\n---\n"),
        "#quote(block: true)[\nquote\n]\n\n#line(length: 100%)\n"
    );
}

#[test]
fn test_links() {
    assert_eq!(
        body("[Typst](https://typst.app) <https://x.org>\n"),
        "#link(\"https://typst.app\")[Typst] #link(\"https://x.org\")\n"
    );
}

#[test]
fn test_html_is_dropped_and_reported() {
    let converter = Papermark::new().unwrap();
    let mut out = Vec::new();
    let diagnostics = converter
        .convert("<div>x</div>\n\npara\n", &mut out)
        .unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].segment.start, 0);
    assert!(String::from_utf8(out).unwrap().ends_with("\n\n\npara\n"));
}

#[test]
fn test_conversion_is_deterministic() {
    let markdown = "# A\n\n- [x] b\n\n| c |\n|---|\n| d |\n\n![e](e.png)\n";
    assert_eq!(convert(markdown).unwrap(), convert(markdown).unwrap());
}

#[test]
fn test_converter_is_shared_between_threads() {
    let converter = Papermark::new().unwrap();
    let expected = converter.convert_to_string("*a*\n").unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| converter.convert_to_string("*a*\n").unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
