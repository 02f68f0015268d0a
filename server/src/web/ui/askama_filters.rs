/// Heading level offset for event descriptions: they are shown below the page's `<h1>`, so a
/// Markdown `#` heading becomes `<h2>`.
const DESCRIPTION_HEADING_OFFSET: u8 = 1;

/// Render an event description, written in Markdown, as HTML
///
/// Raw HTML in the input is escaped, GFM strikethrough, tables and autolinks are supported.
/// Headings are moved down by [DESCRIPTION_HEADING_OFFSET] levels.
#[askama::filter_fn]
pub fn markdown(
    input: &str,
    _: &dyn askama::Values,
) -> askama::Result<askama::filters::Safe<String>> {
    Ok(askama::filters::Safe(render_description(input)?))
}

fn render_description(input: &str) -> Result<String, std::fmt::Error> {
    let arena = comrak::Arena::new();
    let options = comrak::options::Options {
        extension: comrak::options::Extension::builder()
            .strikethrough(true)
            .tagfilter(true)
            .table(true)
            .autolink(true)
            .build(),
        parse: Default::default(),
        render: comrak::options::Render::builder().escape(true).build(),
    };
    let root = comrak::parse_document(&arena, input, &options);
    for node in root.descendants() {
        if let comrak::nodes::NodeValue::Heading(ref mut heading) = node.data.borrow_mut().value {
            heading.level = (heading.level + DESCRIPTION_HEADING_OFFSET).min(6);
        }
    }

    let mut html = String::new();
    comrak::format_html(root, &options, &mut html)?;
    Ok(html)
}

/// Cut a text after `length` characters, marking the cut with "…".
///
/// The ellipsis is appended to the kept characters, so the result may be one character longer
/// than `length`.
#[askama::filter_fn]
pub fn ellipsis(value: &str, _: &dyn askama::Values, length: usize) -> askama::Result<String> {
    Ok(shorten(value, length))
}

fn shorten(value: &str, length: usize) -> String {
    match value.char_indices().nth(length) {
        Some((cut, _)) => format!("{}…", value[..cut].trim_end()),
        None => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_headings() {
        let html = render_description("# Program\n\nText\n\n###### Small").unwrap();
        assert!(html.contains("<h2>Program</h2>"));
        assert!(html.contains("<h6>Small</h6>"));
    }

    #[test]
    fn test_description_escapes_html() {
        let html = render_description("<script>alert(1)</script> **bold**").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Jazz night", 20), "Jazz night");
        assert_eq!(shorten("Jazz night", 10), "Jazz night");
        assert_eq!(shorten("Jazz night", 5), "Jazz…");
        assert_eq!(shorten("Jazz night", 0), "…");
        assert_eq!(shorten("Ärger über Öl", 3), "Ärg…");
    }
}
