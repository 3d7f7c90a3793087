use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sitetags::rayon::prelude::*;
use sitetags::{err, error};
use sitetags::error::{Chainable, Error, Result};
use sitetags::include::markdown_to_html;
use sitetags::media::StaticFiles;
use sitetags::templating::{Engine, Page};
use sitetags::util::is_template;

#[derive(Debug)]
pub struct Build {
    pub pages: PathBuf,
    pub output: PathBuf,
    pub engine: Arc<dyn Engine>,
    pub files: Arc<StaticFiles>,
}

#[derive(Debug, Default)]
pub struct Report {
    pub rendered: usize,
    pub copied: usize,
    pub failures: Vec<(PathBuf, Error)>,
}

impl Build {
    pub fn new<R, O>(root: R, output: O, engine: Arc<dyn Engine>, files: Arc<StaticFiles>) -> Self
        where R: AsRef<Path>, O: AsRef<Path>
    {
        Build {
            pages: root.as_ref().join(crate::PAGES_DIR),
            output: output.as_ref().to_path_buf(),
            engine,
            files,
        }
    }

    /// Paths of every file under the pages directory, relative to it.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.pages.is_dir() {
            return err! {
                "pages directory does not exist",
                "path" => self.pages.display(),
            };
        }

        let pages: Vec<_> = jwalk::WalkDir::new(&self.pages)
            .follow_links(true)
            .sort(true)
            .skip_hidden(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.path().strip_prefix(&self.pages).ok().map(|p| p.to_path_buf()))
            .collect();

        if pages.is_empty() {
            return err!("page discovery yielded zero files", "search root" => self.pages.display());
        }

        Ok(pages)
    }

    /// Renders every page in parallel, then copies the static files pages
    /// registered. A page that fails is recorded in the report; the rest are
    /// still rendered.
    pub fn render(&self, pages: &[PathBuf]) -> Result<Report> {
        let results: Vec<_> = pages.par_iter()
            .map(|page| (page, self.render_page(page)))
            .collect();

        let mut report = Report::default();
        for (page, result) in results {
            match result {
                Ok(()) => report.rendered += 1,
                Err(e) => report.failures.push((page.clone(), e)),
            }
        }

        report.copied = self.files.copy_to(&self.output)?;
        Ok(report)
    }

    fn render_page(&self, relative: &Path) -> Result<()> {
        let source = self.pages.join(relative);
        let markdown = match relative.extension().and_then(|e| e.to_str()) {
            Some("md") => true,
            Some("html") | Some("htm") => false,
            _ => return copy(&source, &self.output.join(relative)),
        };

        let content = fs::read_to_string(&source).chain_with(|| error! {
            "failed to read page",
            "path" => source.display(),
        })?;

        let destination = match markdown {
            true => relative.with_extension("html"),
            false => relative.to_path_buf(),
        };

        let mut html = match is_template(&content) {
            true => {
                let name = relative.to_string_lossy();
                let page = Page::new(page_url(&destination), name.as_ref());
                self.engine.render_str(Some(&name), &content, &page).chain_with(|| error! {
                    "failed to render page",
                    "path" => name,
                })?
            }
            false => content,
        };

        if markdown {
            html = markdown_to_html(&html);
        }

        write(&self.output.join(destination), html)
    }
}

/// The site URL of the output file at `relative`.
fn page_url(relative: &Path) -> String {
    relative.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .fold(String::new(), |url, part| url + "/" + &*part)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "path" => parent.display(),
        })?;
    }

    Ok(())
}

fn copy(source: &Path, destination: &Path) -> Result<()> {
    create_parent(destination)?;
    fs::copy(source, destination).chain_with(|| error! {
        "failed to copy file",
        "source path" => source.display(),
        "destination path" => destination.display(),
    })?;

    Ok(())
}

fn write(destination: &Path, contents: String) -> Result<()> {
    create_parent(destination)?;
    fs::write(destination, contents).chain_with(|| error! {
        "failed to write page",
        "path" => destination.display(),
    })
}
