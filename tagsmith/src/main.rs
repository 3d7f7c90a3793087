use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use sitetags::error::Result;
use sitetags::media::{ImageMagick, StaticFiles};
use sitetags::templating::minijinja::MiniJinjaEngine;

use crate::config::Settings;
use crate::render::Build;

mod config;
mod render;

pub const PAGES_DIR: &str = "pages";
pub const TOML_CONFIG: &str = "config.toml";
pub const JSON_CONFIG: &str = "config.json";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Renders documentation sites that embed benchmark comparisons.
        cmd tagsmith {
            /// Renders every page under `<root>/pages` into `output`.
            cmd render {
                required root: PathBuf
                required output: PathBuf
            }

            /// Prints the platform summary block for `platform`.
            cmd info {
                required platform: String
                optional -r, --root root: PathBuf
            }

            /// Prints the chart script for `platform`.
            cmd chart {
                required element_id: String
                required platform: String
                optional -t, --title title: String
                optional -r, --root root: PathBuf
            }
        }
    }
}

fn render(cmd: flags::Render) -> Result<bool> {
    let start = Instant::now();
    let settings = Settings::discover(&cmd.root)?;
    let context = Arc::new(settings.site_context(&cmd.root)?);
    let files = Arc::new(StaticFiles::new());
    let engine = MiniJinjaEngine::new(
        context.clone(),
        files.clone(),
        Arc::new(ImageMagick::default()),
        &settings.globals,
    );

    let build = Build::new(&cmd.root, &cmd.output, Arc::new(engine), files);
    let pages = build.discover()?;
    println!("discovered {} pages in {}ms", pages.len(), start.elapsed().as_millis());

    let render = Instant::now();
    let report = build.render(&pages)?;
    println!("render time: {}ms", render.elapsed().as_millis());
    println!("total time: {}ms", start.elapsed().as_millis());

    for (page, e) in &report.failures {
        eprintln!("error: failed to render {}\n{e}", page.display());
    }

    println!("rendered {} pages, copied {} static files", report.rendered, report.copied);
    Ok(report.failures.is_empty())
}

fn info(cmd: flags::Info) -> Result<bool> {
    let root = cmd.root.unwrap_or_else(|| PathBuf::from("."));
    let settings = Settings::discover(&root)?;
    let summary = settings.benchmark_set(&root).load_platform_summary(&cmd.platform)?;
    println!("{}", summary.to_html());
    Ok(true)
}

fn chart(cmd: flags::Chart) -> Result<bool> {
    let root = cmd.root.unwrap_or_else(|| PathBuf::from("."));
    let context = Settings::discover(&root)?.site_context(&root)?;
    let (chart, comparison) = context.benchmarks.chart(&cmd.platform, &context.theme)?;
    for name in &comparison.skipped {
        eprintln!("warning: skipped {name:?}: reference throughput is not positive");
    }

    println!("{}", chart.to_script(&cmd.element_id, cmd.title.as_deref())?);
    Ok(true)
}

pub fn main() {
    use flags::TagsmithCmd;

    let result = match flags::Tagsmith::from_env_or_exit().subcommand {
        TagsmithCmd::Render(cmd) => render(cmd),
        TagsmithCmd::Info(cmd) => info(cmd),
        TagsmithCmd::Chart(cmd) => chart(cmd),
    };

    match result {
        Ok(true) => {},
        Ok(false) => exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            exit(1);
        }
    }
}
