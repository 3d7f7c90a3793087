use std::sync::Arc;

use minijinja::{Environment, path_loader};
use minijinja::value::Value;
use serde::Serialize;

use crate::context::SiteContext;
use crate::error::Result;
use crate::media::{Resize, StaticFiles};
use crate::templating::{Engine, Page};

#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

#[derive(Serialize)]
struct PageContext<'a> {
    page: &'a Page,
}

impl MiniJinjaEngine {
    /// An environment with every site extension registered. Templates are
    /// loaded from `<root>/templates` when that directory exists; `globals`
    /// are exposed as `G`.
    pub fn new<G: Serialize>(
        context: Arc<SiteContext>,
        files: Arc<StaticFiles>,
        resizer: Arc<dyn Resize>,
        globals: G,
    ) -> Self {
        let mut env = Environment::new();
        let templates = context.root.join("templates");
        if templates.is_dir() {
            env.set_loader(path_loader(templates));
        }

        env.add_global("G", Value::from_serializable(&globals));
        env.add_function("base", ext::base);
        env.add_filter("markdownify", ext::markdownify);

        let site = context.clone();
        env.add_function("benchmarks_info", move |platform: String| {
            ext::benchmarks_info(&site, &platform)
        });

        let site = context.clone();
        env.add_function("benchmarks", move |element_id: String, platform: String, title: Option<String>| {
            ext::benchmarks(&site, &element_id, &platform, title.as_deref())
        });

        let site = context.clone();
        env.add_function("markdown", move |path: String| {
            crate::include::read_include(&site, &path).map_err(ext::invalid)
        });

        let (site, registry) = (context.clone(), files.clone());
        env.add_function("image", move |path: String| {
            crate::media::image(&site, &registry, &path).map_err(ext::invalid)
        });

        let site = context.clone();
        env.add_function("thumbnail", move |path: String, width: u32| {
            crate::media::thumbnail(&site, &files, &*resizer, &path, width).map_err(ext::invalid)
        });

        env.add_filter("rewrite_md_links", move |content: String| {
            crate::links::rewrite_md_links(&content, &context.repository).into_owned()
        });

        MiniJinjaEngine { env }
    }
}

impl Engine for MiniJinjaEngine {
    fn render(&self, name: &str, page: &Page) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(Value::from_serializable(&PageContext { page }))?)
    }

    fn render_str(&self, name: Option<&str>, template_str: &str, page: &Page) -> Result<String> {
        let context = Value::from_serializable(&PageContext { page });
        let string = match name {
            Some(name) => self.env.render_named_str(name, template_str, context)?,
            None => self.env.render_str(template_str, context)?,
        };

        Ok(string)
    }
}

mod ext {
    use std::fmt::Display;

    use minijinja::{value::Value, Error, ErrorKind, State};

    use crate::context::SiteContext;
    use crate::include::markdown_to_html;

    trait Ext {
        fn find(self, key: &str) -> Result<Value, Error>;
    }

    impl Ext for Value {
        fn find(self, key: &str) -> Result<Value, Error> {
            if key.is_empty() {
                return Ok(self);
            }

            let mut value = self;
            for attr in key.split('.') {
                let attr = value.get_attr(attr)?;
                if attr.is_undefined() {
                    return Err(Error::new(
                        ErrorKind::UndefinedError,
                        format!("missing key {key} in {value:#?}")
                    ));
                }

                value = attr;
            }

            Ok(value)
        }
    }

    impl Ext for &State<'_, '_> {
        fn find(self, key: &str) -> Result<Value, Error> {
            let (base, key) = key.split_once('.').unwrap_or((key, ""));
            let base_val = self.lookup(base)
                .filter(|v| !v.is_undefined())
                .ok_or_else(|| Error::new(
                    ErrorKind::MissingArgument,
                    format!("expected {base} in context but it wasn't found")
                ))?;

            base_val.find(key)
        }
    }

    pub fn invalid<E: Display>(error: E) -> Error {
        Error::new(ErrorKind::InvalidOperation, error.to_string().trim_end().to_string())
    }

    pub fn benchmarks_info(site: &SiteContext, platform: &str) -> Result<Value, Error> {
        let summary = site.benchmarks.load_platform_summary(platform).map_err(invalid)?;
        Ok(Value::from_safe_string(summary.to_html()))
    }

    pub fn benchmarks(
        site: &SiteContext,
        element_id: &str,
        platform: &str,
        title: Option<&str>,
    ) -> Result<Value, Error> {
        let (chart, _) = site.benchmarks.chart(platform, &site.theme).map_err(invalid)?;
        let script = chart.to_script(element_id, title).map_err(invalid)?;
        Ok(Value::from_safe_string(script))
    }

    /// `base(url)`, or `base()` for the page being rendered.
    pub fn base<'a>(state: &'a State<'a, 'a>, url: Option<String>) -> Result<Value, Error> {
        let url = match url {
            Some(url) => url,
            None => {
                let value = state.find("page.url")?;
                value.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "page.url must be a string"))?
            }
        };

        Ok(Value::from_safe_string(crate::links::base(&url)))
    }

    pub fn markdownify(content: &str) -> Value {
        Value::from_safe_string(markdown_to_html(content))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::benchmarks::{Rgb, Theme};

    static_assertions::assert_impl_all!(MiniJinjaEngine: Send, Sync);

    #[derive(Debug)]
    struct Touch;

    impl Resize for Touch {
        fn resize(&self, _: &Path, output: &Path, _: u32) -> Result<()> {
            fs::write(output, "thumb")?;
            Ok(())
        }
    }

    const CANDIDATE: &str = r#"{
        "version": "0.10.0",
        "platform": { "cpu_count": 2, "cpu_model": "ARM", "arch": "armv7", "os": "Linux", "features": { "volk": true } },
        "benchmarks": [ { "name": "A", "results": { "samples_per_second": 1000, "samples_per_second_stdev": 1 } } ]
    }"#;

    const REFERENCE: &str = r#"{
        "version": "3.7",
        "platform": { "cpu_count": 2, "cpu_model": "ARM", "arch": "armv7", "os": "Linux", "features": {} },
        "benchmarks": [ { "name": "A", "results": { "samples_per_second": 2000, "samples_per_second_stdev": 1 } } ]
    }"#;

    struct Site {
        dir: tempfile::TempDir,
        files: Arc<StaticFiles>,
        engine: MiniJinjaEngine,
    }

    fn site() -> Site {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("_includes/benchmarks")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("_includes/benchmarks/benchmarks.rpi.luaradio.json"), CANDIDATE).unwrap();
        fs::write(root.join("_includes/benchmarks/benchmarks.rpi.gnuradio.json"), REFERENCE).unwrap();
        fs::write(root.join("_includes/guide.md"), "# Guide\n\nRead [blocks](3.blocks.md).\n").unwrap();
        fs::write(root.join("_includes/fm.png"), "png").unwrap();
        fs::write(root.join("templates/layout.html"), "<title>{{ G.title }}</title>{{ base() }}").unwrap();

        let theme = Theme { highlight_color: Rgb(0xe6, 0x55, 0x0d), contrast_color: Rgb(0x31, 0x82, 0xbd) };
        let mut context = SiteContext::new(root, theme);
        context.thumbnails = root.join("thumbs");

        let files = Arc::new(StaticFiles::new());
        let globals = serde_json::json!({ "title": "LuaRadio" });
        let engine = MiniJinjaEngine::new(Arc::new(context), files.clone(), Arc::new(Touch), globals);
        Site { dir, files, engine }
    }

    fn render(site: &Site, template: &str) -> Result<String> {
        site.engine.render_str(None, template, &Page::new("/docs/guide.html", "docs/guide.md"))
    }

    #[test]
    fn loads_templates_with_globals() {
        let site = site();
        let html = site.engine.render("layout.html", &Page::new("/a/b/c.html", "a/b/c.html")).unwrap();
        assert_eq!(html, "<title>LuaRadio</title>../..");
    }

    #[test]
    fn benchmark_extensions() {
        let site = site();
        let info = render(&site, r#"{{ benchmarks_info("rpi") }}"#).unwrap();
        assert!(info.starts_with("<pre class=\"benchmark-platform\">\n"));
        assert!(info.contains("<b>LuaRadio features</b>"));

        let script = render(&site, r#"{{ benchmarks("chart", "rpi", "Throughput") }}"#).unwrap();
        assert!(script.starts_with("var chart_data = {"));
        assert!(script.contains("document.getElementById(\"chart\")"));
        assert!(script.contains("\"Throughput\""));

        let error = render(&site, r#"{{ benchmarks("chart", "x86") }}"#).unwrap_err();
        assert!(error.to_string().contains("benchmarks.x86.luaradio.json"));
        assert!(render(&site, r#"{{ benchmarks("not an id", "rpi") }}"#).is_err());
    }

    #[test]
    fn markdown_extensions() {
        let site = site();
        let html = render(&site, r#"{{ markdown("guide.md") | rewrite_md_links | markdownify }}"#).unwrap();
        assert_eq!(html, "<h1>Guide</h1>\n<p>Read <a href=\"blocks.html\">blocks</a>.</p>\n");

        let raw = render(&site, r#"{{ markdown("guide.md") }}"#).unwrap();
        assert_eq!(raw, "# Guide\n\nRead [blocks](3.blocks.md).\n");

        assert!(render(&site, r#"{{ markdown("../secret") }}"#).is_err());
    }

    #[test]
    fn base_paths() {
        let site = site();
        assert_eq!(render(&site, "{{ base() }}").unwrap(), "..");
        assert_eq!(render(&site, r#"{{ base("/index.html") }}"#).unwrap(), ".");
    }

    #[test]
    fn media_extensions() {
        let site = site();
        let html = render(&site, r#"<img src="{{ image("fm.png") }}"><img src="{{ thumbnail("fm.png", 200) }}">"#).unwrap();
        assert_eq!(html, r#"<img src="fm.png"><img src="fm-thumb.png">"#);
        assert_eq!(fs::read_to_string(site.dir.path().join("thumbs/fm-thumb.png")).unwrap(), "thumb");
        assert_eq!(site.files.files().len(), 2);

        assert!(render(&site, r#"{{ thumbnail("fm.png", 0) }}"#).is_err());
    }
}
