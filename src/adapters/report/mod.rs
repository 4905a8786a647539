//! Report adapter. Fills the HTML page template.

pub mod html_template;

pub use html_template::HtmlTemplateRenderer;
