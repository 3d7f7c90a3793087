pub mod minijinja;

use std::fmt::Debug;

use serde::Serialize;

use crate::error::Result;

/// The page being rendered, exposed to templates as `page`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    /// The page's URL relative to the site root, e.g. `/docs/index.html`.
    pub url: String,
    /// The page's source path relative to the pages directory.
    pub path: String,
}

impl Page {
    pub fn new<U: Into<String>, P: Into<String>>(url: U, path: P) -> Self {
        Page { url: url.into(), path: path.into() }
    }
}

pub trait Engine: Send + Sync + Debug {
    /// Renders the loaded template `name`.
    fn render(&self, name: &str, page: &Page) -> Result<String>;

    /// Renders `template_str`. `name` is used in errors and to pick
    /// auto-escaping.
    fn render_str(&self, name: Option<&str>, template_str: &str, page: &Page) -> Result<String>;
}
