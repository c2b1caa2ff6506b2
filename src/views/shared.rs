use comrak::{ComrakOptions, markdown_to_html as render_markdown};
use once_cell::sync::Lazy;

// Raw HTML stays escaped: both user input and model output pass through here.
static MARKDOWN_OPTIONS: Lazy<ComrakOptions> = Lazy::new(|| {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
    options
});

pub fn markdown_to_html(md: &str) -> String {
    render_markdown(md, &MARKDOWN_OPTIONS)
}
