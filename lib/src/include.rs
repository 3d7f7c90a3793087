use std::fs;
use std::path::PathBuf;

use pulldown_cmark::{html, Options, Parser};

use crate::context::SiteContext;
use crate::error::{Chainable, Result};
use crate::util::join_within;

/// Resolves `path` against the site's includes directory.
pub fn include_path(context: &SiteContext, path: &str) -> Result<PathBuf> {
    match join_within(&context.includes, path) {
        Some(resolved) => Ok(resolved),
        None => err! {
            "include paths must be relative and stay within the includes directory",
            "path" => path,
            "includes directory" => context.includes.display(),
        },
    }
}

/// Returns the contents of the include file at `path`, unmodified.
pub fn read_include(context: &SiteContext, path: &str) -> Result<String> {
    let resolved = include_path(context, path)?;
    fs::read_to_string(&resolved).chain_with(|| error! {
        "failed to read include file",
        "path" => path,
        "full path" => resolved.display(),
    })
}

/// Renders markdown to HTML with every extension except smart punctuation.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::all().difference(Options::ENABLE_SMART_PUNCTUATION);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(markdown, options));
    output
}
