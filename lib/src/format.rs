use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// A text data format that deserializes into typed values.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` into a `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads the file at `path` and parses it as a `T`. Errors name the path.
    fn read<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
        let path = path.as_ref();
        let string = fs::read_to_string(path).chain_with(|| error! {
            "failed to read file",
            "path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            "failed to parse file",
            "format" => std::any::type_name::<Self>().rsplit("::").next().unwrap_or("?"),
            "path" => path.display(),
        })
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::Error);
