//! Link fixups for documentation written to be browsed in a repository.
//!
//! Repository docs link to each other as `3.blocks.md#some_block` and to
//! sources as `../radio/blocks`. On the site, pages are `blocks.html`, anchor
//! ids have no underscores, and sources live in the repository browser.

use std::borrow::Cow;

use memchr::memmem;

/// Rewrites the destination of every inline markdown link, `[text](dest)`, in
/// `content` with [`rewrite_link()`]. Everything else is left untouched.
///
/// ```rust
/// use sitetags::links::rewrite_md_links;
///
/// let repo = "https://github.com/vsergeev/luaradio/tree/master";
/// let markdown = "See [the FM example](2.getting-started.md#fm_broadcast) or [code](../examples/fm.lua).";
/// assert_eq!(
///     rewrite_md_links(markdown, repo),
///     "See [the FM example](getting-started.html#fmbroadcast) or \
///      [code](https://github.com/vsergeev/luaradio/tree/master/examples/fm.lua)."
/// );
/// ```
pub fn rewrite_md_links<'a>(content: &'a str, repository: &str) -> Cow<'a, str> {
    let mut output = String::new();
    let mut copied = 0;
    for open in memmem::find_iter(content.as_bytes(), b"](") {
        let start = open + 2;
        if start < copied {
            continue;
        }

        let rest = &content[start..];
        let Some(len) = rest.find(|c| c == ')' || c == '\n') else { break };
        if rest.as_bytes()[len] != b')' {
            continue;
        }

        let destination = &rest[..len];
        if let Cow::Owned(rewritten) = rewrite_link(destination, repository) {
            output.push_str(&content[copied..start]);
            output.push_str(&rewritten);
            copied = start + len;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(content);
    }

    output.push_str(&content[copied..]);
    Cow::Owned(output)
}

/// Rewrites one link destination. In order:
///
///   1. underscores are dropped from the fragment of a link to a `.md` file;
///   2. each `<digit>.<name>.md`, where `<name>` is lowercase ASCII letters
///      and hyphens, becomes `<name>.html`;
///   3. a destination starting with `../` is resolved against `repository`.
///
/// ```rust
/// use sitetags::links::rewrite_link;
///
/// let repo = "https://example.com/tree/master";
/// assert_eq!(rewrite_link("3.blocks.md#block_name", repo), "blocks.html#blockname");
/// assert_eq!(rewrite_link("../radio/core", repo), "https://example.com/tree/master/radio/core");
/// assert_eq!(rewrite_link("https://example.com/a_b", repo), "https://example.com/a_b");
/// ```
pub fn rewrite_link<'a>(destination: &'a str, repository: &str) -> Cow<'a, str> {
    let mut link = Cow::Borrowed(destination);

    if let Some(i) = link.find(".md#") {
        let (page, fragment) = link.split_at(i + 4);
        if fragment.contains('_') {
            link = Cow::Owned(format!("{page}{}", fragment.replace('_', "")));
        }
    }

    let renamed = match rename_numbered_pages(&link) {
        Cow::Owned(renamed) => Some(renamed),
        Cow::Borrowed(_) => None,
    };

    if let Some(renamed) = renamed {
        link = Cow::Owned(renamed);
    }

    if let Some(path) = link.strip_prefix("../") {
        link = Cow::Owned(format!("{}/{path}", repository.trim_end_matches('/')));
    }

    link
}

/// Replaces every `<digit>.<name>.md` in `link` with `<name>.html`.
fn rename_numbered_pages(link: &str) -> Cow<'_, str> {
    let is_name_byte = |b: &u8| b.is_ascii_lowercase() || *b == b'-';
    let bytes = link.as_bytes();

    let mut output = String::new();
    let mut copied = 0;
    for extension in memmem::find_iter(bytes, b".md") {
        let name_start = bytes[..extension].iter()
            .rposition(|b| !is_name_byte(b))
            .map_or(0, |i| i + 1);

        let numbered = name_start >= copied + 2
            && bytes[name_start - 1] == b'.'
            && bytes[name_start - 2].is_ascii_digit();

        if numbered {
            output.push_str(&link[copied..name_start - 2]);
            output.push_str(&link[name_start..extension]);
            output.push_str(".html");
            copied = extension + 3;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(link);
    }

    output.push_str(&link[copied..]);
    Cow::Owned(output)
}

/// The relative path from the page at `url` to the site root.
///
/// ```rust
/// use sitetags::links::base;
///
/// assert_eq!(base("/index.html"), ".");
/// assert_eq!(base("/docs/index.html"), "..");
/// assert_eq!(base("/docs/reference/blocks.html"), "../..");
/// ```
pub fn base(url: &str) -> String {
    let depth = url.matches('/').count();
    if depth <= 1 {
        return ".".into();
    }

    let mut path = "../".repeat(depth - 1);
    path.pop();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: &str = "https://github.com/vsergeev/luaradio/tree/master/";

    #[test]
    fn strips_fragment_underscores() {
        assert_eq!(rewrite_link("reference.md#radio_blocks_source", REPO), "reference.md#radioblockssource");
        assert_eq!(rewrite_link("#local_anchor", REPO), "#local_anchor");
        assert!(matches!(rewrite_link("page.md#plain", REPO), Cow::Borrowed(_)));
    }

    #[test]
    fn renames_numbered_pages() {
        assert_eq!(rewrite_link("0.reference-manual.md", REPO), "reference-manual.html");
        assert_eq!(rewrite_link("docs/4.creating-blocks.md#basics", REPO), "docs/creating-blocks.html#basics");
        assert_eq!(rewrite_link("1..md", REPO), ".html");
        assert_eq!(rewrite_link("1.a.md 2.b.md", REPO), "a.html b.html");
        assert_eq!(rewrite_link("1.Upper.md", REPO), "1.Upper.md");
        assert_eq!(rewrite_link("x.blocks.md", REPO), "x.blocks.md");
        assert_eq!(rewrite_link(".md", REPO), ".md");
    }

    #[test]
    fn resolves_parent_links_against_repository() {
        assert_eq!(
            rewrite_link("../embed/luaradio.h", REPO),
            "https://github.com/vsergeev/luaradio/tree/master/embed/luaradio.h"
        );

        assert_eq!(
            rewrite_link("../docs/3.blocks.md", "https://example.com/tree"),
            "https://example.com/tree/docs/blocks.html"
        );

        assert_eq!(rewrite_link("./sibling.md", REPO), "./sibling.md");
    }

    #[test]
    fn rewrites_only_link_destinations() {
        let markdown = "\
            Text mentioning 1.notalink.md stays.\n\
            [a](1.first.md) and [b](../x_y) and ![img](figure_1.png)\n\
            [broken](2.unterminated.md\n\
            [last](2.second.md#a_b)";

        let expected = "\
            Text mentioning 1.notalink.md stays.\n\
            [a](first.html) and [b](https://github.com/vsergeev/luaradio/tree/master/x_y) and ![img](figure_1.png)\n\
            [broken](2.unterminated.md\n\
            [last](second.html#ab)";

        assert_eq!(rewrite_md_links(markdown, REPO), expected);
    }

    #[test]
    fn untouched_content_is_borrowed() {
        let markdown = "No [links](https://luaradio.io) to fix here.";
        assert!(matches!(rewrite_md_links(markdown, REPO), Cow::Borrowed(_)));
        assert!(matches!(rewrite_md_links("", REPO), Cow::Borrowed("")));
    }

    #[test]
    fn base_depths() {
        assert_eq!(base(""), ".");
        assert_eq!(base("/"), ".");
        assert_eq!(base("/a/"), "..");
        assert_eq!(base("/a/b/c/d.html"), "../../..");
    }
}
