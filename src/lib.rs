mod config;
mod error;
mod escape;
mod layout;
mod parser;
mod quote;
mod render;
mod tree;

pub use config::{
    Bullets, DEFAULT_CONFIG, HeadingStyle, HeadingStyles, Options, QuoteOptions, StyleTag,
};
pub use error::{ConfigError, ConvertError};
pub use escape::{escape, escape_into};
pub use quote::quote;
pub use render::render;
pub use tree::{Document, Node, NodeId, NodeKind};

/// Parse markdown text into a document tree.
pub fn parse(markdown: &str) -> Document {
    parser::parse(markdown)
}

/// Convert markdown to MarkdownV2 using default options, without quoting.
pub fn markdown_to_tgmd(markdown: &str) -> String {
    markdown_to_tgmd_with_options(markdown, &Options::default())
}

/// Convert markdown to MarkdownV2 with custom options, without quoting.
pub fn markdown_to_tgmd_with_options(markdown: &str, options: &Options) -> String {
    let doc = parse(markdown);
    // Escaping only inserts ASCII bytes before ASCII bytes, so the output stays valid UTF-8
    String::from_utf8_lossy(&render(&doc, options)).into_owned()
}

/// Convert markdown bytes to MarkdownV2, applying the quote transform when enabled.
pub fn convert(source: &[u8], options: &Options) -> Result<Vec<u8>, ConvertError> {
    let markdown = std::str::from_utf8(source)?;
    let rendered = render(&parse(markdown), options);

    if !options.quote.enable {
        return Ok(rendered);
    }
    Ok(quote::quote(&rendered, source, &options.quote))
}

/// [`convert`] for string input and output.
pub fn convert_str(source: &str, options: &Options) -> Result<String, ConvertError> {
    let bytes = convert(source.as_bytes(), options)?;
    Ok(String::from_utf8(bytes)?)
}
