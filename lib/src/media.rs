//! Images referenced by pages.
//!
//! Extensions don't copy files themselves; they register them with
//! [`StaticFiles`], which the build copies into the output directory once
//! every page has been rendered.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use derive_more::Debug;
use rustc_hash::FxHashSet;

use crate::context::SiteContext;
use crate::error::{Chainable, Result};
use crate::include::include_path;
use crate::util::join_within;

/// A file to copy into the output directory at `destination`, which is
/// relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaticFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Files registered for copying during rendering. Registration is lock-free
/// and may happen from any number of threads at once.
#[derive(Debug, Default)]
pub struct StaticFiles {
    #[debug(ignore)]
    files: boxcar::Vec<StaticFile>,
}

impl StaticFiles {
    pub fn new() -> Self {
        StaticFiles::default()
    }

    pub fn register<S, D>(&self, source: S, destination: D)
        where S: Into<PathBuf>, D: Into<PathBuf>
    {
        self.files.push(StaticFile { source: source.into(), destination: destination.into() });
    }

    /// Registered files in registration order, without repeats.
    pub fn files(&self) -> Vec<StaticFile> {
        let mut seen = FxHashSet::default();
        self.files.iter()
            .map(|(_, file)| file)
            .filter(|file| seen.insert(*file))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.count() == 0
    }

    /// Copies every registered file into `output`. Returns the number of
    /// files copied.
    pub fn copy_to(&self, output: &Path) -> Result<usize> {
        let files = self.files();
        for file in &files {
            let destination = join_within(output, &file.destination).ok_or_else(|| error! {
                "static file destination must be relative to the output directory",
                "destination" => file.destination.display(),
            })?;

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).chain_with(|| error! {
                    "failed to create output directory",
                    "path" => parent.display(),
                })?;
            }

            fs::copy(&file.source, &destination).chain_with(|| error! {
                "failed to copy static file",
                "source path" => file.source.display(),
                "destination path" => destination.display(),
            })?;
        }

        Ok(files.len())
    }
}

/// Scales images to a target width, preserving aspect ratio.
pub trait Resize: Send + Sync + std::fmt::Debug {
    fn resize(&self, input: &Path, output: &Path, width: u32) -> Result<()>;
}

/// Resizes images by running ImageMagick's `convert`.
#[derive(Debug, Clone)]
pub struct ImageMagick {
    pub program: PathBuf,
}

impl Default for ImageMagick {
    fn default() -> Self {
        ImageMagick { program: "convert".into() }
    }
}

impl Resize for ImageMagick {
    fn resize(&self, input: &Path, output: &Path, width: u32) -> Result<()> {
        let result = Command::new(&self.program)
            .arg(input)
            .arg("-resize")
            .arg(format!("{width}x"))
            .arg(output)
            .output()
            .chain_with(|| error! {
                "failed to run image resizer",
                "program" => self.program.display(),
            })?;

        if !result.status.success() {
            return err! {
                "image resizer failed",
                "program" => self.program.display(),
                "input" => input.display(),
                "status" => result.status,
                "stderr" => String::from_utf8_lossy(&result.stderr).trim(),
            };
        }

        Ok(())
    }
}

/// The path of the thumbnail for the image at `path`: `-thumb` is inserted
/// before the first `.` of the file name.
///
/// ```rust
/// use sitetags::media::thumbnail_path;
///
/// assert_eq!(thumbnail_path("images/fm.png"), "images/fm-thumb.png");
/// assert_eq!(thumbnail_path("images/rds.tar.gz"), "images/rds-thumb.tar.gz");
/// assert_eq!(thumbnail_path("v1.2/plot"), "v1.2/plot-thumb");
/// ```
pub fn thumbnail_path(path: &str) -> String {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].find('.') {
        Some(dot) => {
            let (stem, extension) = path.split_at(name_start + dot);
            format!("{stem}-thumb{extension}")
        }
        None => format!("{path}-thumb"),
    }
}

/// Registers the include file at `path` for copying to `path` in the output.
pub fn image(context: &SiteContext, files: &StaticFiles, path: &str) -> Result<String> {
    let source = include_path(context, path)?;
    if !source.is_file() {
        return err! {
            "image not found",
            "path" => path,
            "full path" => source.display(),
        };
    }

    files.register(source, path);
    Ok(path.to_string())
}

/// Writes a `width` pixel wide thumbnail of the image at `path` to the
/// thumbnail directory and registers it for copying. The image is looked up
/// in the site root first and the includes directory second.
pub fn thumbnail(
    context: &SiteContext,
    files: &StaticFiles,
    resizer: &dyn Resize,
    path: &str,
    width: u32,
) -> Result<String> {
    if width == 0 {
        return err!("thumbnail width must be positive", "path" => path);
    }

    let input = join_within(&context.root, path)
        .filter(|p| p.is_file())
        .map_or_else(|| include_path(context, path), Ok)?;

    if !input.is_file() {
        return err! {
            "image not found",
            "path" => path,
            "searched" => context.root.display(),
            "searched" => context.includes.display(),
        };
    }

    let thumb = thumbnail_path(path);
    let output = join_within(&context.thumbnails, &thumb)
        .ok_or_else(|| error!("invalid thumbnail path", "path" => &thumb))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create thumbnail directory",
            "path" => parent.display(),
        })?;
    }

    resizer.resize(&input, &output, width).chain_with(|| error! {
        "failed to create thumbnail",
        "image" => input.display(),
        "width" => width,
    })?;

    files.register(output, &thumb);
    Ok(thumb)
}
