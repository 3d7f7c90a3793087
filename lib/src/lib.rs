#![doc = svgbobdoc::transform!(
//! Template extensions for documentation web sites.
//!
//! # Overview
//!
//! `sitetags` is a small set of functions and filters for a template engine
//! that turn files sitting next to a site's sources into HTML fragments:
//! benchmark comparison charts, platform summaries, markdown includes,
//! rewritten documentation links, relative base paths, and image thumbnails.
//!
//! The only part with real logic is the benchmark comparison, which runs as a
//! three stage pipeline every time a page asks for it:
//!
//! ```svgbob
//!  +--------------------------------+     +--------------------------------+
//!  | benchmarks.<platform>.<a>.json |     | benchmarks.<platform>.<b>.json |
//!  +---------------+----------------+     +----------------+---------------+
//!                  |                                       |
//!                  +------------------+--------------------+
//!                                     |
//!                                     v
//!                          +----------+----------+
//!                          |        load         |  BenchmarkDocument x2
//!                          +----------+----------+
//!                                     |
//!                       +-------------+-------------+
//!                       |                           |
//!                       v                           v
//!            +----------+----------+     +----------+----------+
//!            |       compare       |     |      summarize      |
//!            +----------+----------+     +----------+----------+
//!                       |                           |
//!                       v                           v
//!            +----------+----------+     +----------+----------+
//!            |       format        |     |   PlatformSummary   |
//!            +----------+----------+     +---------------------+
//!                       |
//!                       v
//!                   ChartSpec
//! ```
//!
//! Nothing is cached between calls: every page that embeds a chart reads and
//! parses its two documents again, so pages may be rendered in parallel.
//!
//! ## Extensions
//!
//! [`templating::minijinja::MiniJinjaEngine`] registers every extension with a
//! `minijinja` environment:
//!
//!   * `benchmarks_info(platform)`: platform summary block.
//!   * `benchmarks(element_id, platform, title?)`: chart script.
//!   * `markdown(path)`: verbatim contents of an include file.
//!   * `base(url?)`: relative path from a page to the site root.
//!   * `image(path)`, `thumbnail(path, width)`: register images for copying.
//!   * `markdownify`, `rewrite_md_links`: filters over markdown text.
)]

#[macro_use]
pub mod error;
pub mod util;
pub mod format;
pub mod context;
pub mod benchmarks;
pub mod include;
pub mod links;
pub mod media;
pub mod templating;

pub use context::SiteContext;

pub use rayon;
