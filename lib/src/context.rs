use std::path::{Path, PathBuf};

use crate::benchmarks::{BenchmarkSet, Theme};

/// Everything an extension needs to know about the site it renders for.
///
/// Extensions receive this explicitly instead of reaching into the page
/// being rendered; the only page value any extension reads is `page.url`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteContext {
    /// The site's source directory.
    pub root: PathBuf,
    /// Directory that `markdown()` and `image()` paths are relative to.
    pub includes: PathBuf,
    /// Directory that generated thumbnails are written to.
    pub thumbnails: PathBuf,
    /// Where benchmark results live and which implementations they compare.
    pub benchmarks: BenchmarkSet,
    /// Tree URL that `../` documentation links are rewritten against.
    pub repository: String,
    pub theme: Theme,
}

pub const DEFAULT_INCLUDES: &str = "_includes";
pub const DEFAULT_BENCHMARKS: &str = "_includes/benchmarks";
pub const DEFAULT_THUMBNAILS: &str = "/tmp/_thumbnails";
pub const DEFAULT_REPOSITORY: &str = "https://github.com/vsergeev/luaradio/tree/master";

impl SiteContext {
    /// A context for the site at `root` using the default layout.
    pub fn new<P: AsRef<Path>>(root: P, theme: Theme) -> Self {
        let root = root.as_ref().to_path_buf();
        SiteContext {
            includes: root.join(DEFAULT_INCLUDES),
            thumbnails: root.join(DEFAULT_THUMBNAILS),
            benchmarks: BenchmarkSet::in_dir(root.join(DEFAULT_BENCHMARKS)),
            repository: DEFAULT_REPOSITORY.into(),
            theme,
            root,
        }
    }
}
