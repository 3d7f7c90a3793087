use std::path::{Component, Path, PathBuf};

/// Returns `true` if `input` is likely to contain a template.
pub fn is_template(input: &str) -> bool {
    let mut slice = input.as_bytes();
    while let Some(i) = memchr::memchr(b'{', slice) {
        match slice.get(i + 1) {
            Some(b'{') | Some(b'%') => return true,
            Some(_) => slice = &slice[(i + 1)..],
            None => return false,
        }
    }

    false
}

/// Returns `true` if `name` can be used verbatim as a JavaScript variable
/// name prefix: an ASCII letter, `_`, or `$` followed by ASCII alphanumerics,
/// `_`, or `$`.
pub fn is_js_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    let head_ok = bytes.next()
        .map_or(false, |b| b.is_ascii_alphabetic() || b == b'_' || b == b'$');

    head_ok && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}

/// Joins the relative `path` onto `base`, refusing paths that could name a
/// file outside of `base`: absolute paths and paths with `..` components.
pub fn join_within<P: AsRef<Path>>(base: &Path, path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    let mut joined = base.to_path_buf();
    for component in path.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (joined != base).then_some(joined)
}
