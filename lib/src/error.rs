use std::{fmt, io};
use std::panic::Location;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A rendering error: one detail, the error that caused it (if any), and the
/// location it was raised at.
///
/// Errors are built with [`error!`](crate::error!) and [`err!`](crate::err!)
/// and extended with context via [`Chainable`]:
///
/// ```rust
/// use sitetags::error::{Chainable, Result};
///
/// fn load() -> Result<()> {
///     sitetags::err!("file is empty", "path" => "a.json")
/// }
///
/// let error = load().chain(sitetags::error!("failed to load site")).unwrap_err();
/// let text = error.to_string();
/// assert!(text.starts_with("failed to load site\n"));
/// assert!(text.contains("    file is empty\n    path: a.json\n"));
/// ```
#[derive(Debug)]
pub struct Error {
    detail: Box<dyn ErrorDetail>,
    cause: Option<Box<Error>>,
    location: &'static Location<'static>,
}

pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    /// Key/value parameters displayed beneath the detail's message.
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }
}

impl Error {
    #[track_caller]
    pub fn from_std<E>(error: E) -> Self
        where E: StdError + Send + Sync + 'static
    {
        Error::from(Box::new(error) as Box<dyn StdError + Send + Sync>)
    }

    /// Makes `self` the innermost cause of `outer` and returns `outer`.
    pub fn chain(self, mut outer: Error) -> Self {
        fn attach(error: Error, outer: &mut Error) {
            match outer.cause {
                Some(ref mut next) => attach(error, next),
                None => outer.cause = Some(Box::new(error)),
            }
        }

        attach(self, &mut outer);
        outer
    }

    pub fn detail(&self) -> &dyn ErrorDetail {
        &*self.detail
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    /// Iterates over `self` followed by each of its causes, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |e| e.cause())
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        std::iter::successors(self.source(), |&e| e.source())
            .map(|e| (None, e.to_string()))
            .collect()
    }
}

impl ErrorDetail for Box<dyn StdError + Send + Sync> {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let error: &(dyn StdError + Send + Sync) = &**self;
        error.context()
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($T:ty) => {
        impl $crate::error::ErrorDetail for $T {
            fn context(&self) -> Vec<(Option<String>, String)> {
                let error: &(dyn std::error::Error + Send + Sync) = self;
                error.context()
            }
        }
    }
}

impl_error_detail_with_std_error!(io::Error);
impl_error_detail_with_std_error!(toml::de::Error);
impl_error_detail_with_std_error!(serde_json::Error);
impl_error_detail_with_std_error!(minijinja::Error);

impl ErrorDetail for String { }
impl ErrorDetail for &'static str { }

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            detail: Box::new(detail),
            cause: None,
            location: Location::caller(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show_location = std::env::var_os("RUST_BACKTRACE").is_some();
        for (depth, error) in self.causes().enumerate() {
            let indent = "    ".repeat(depth);
            let newline = format!("\n{indent}");

            writeln!(f, "{indent}{}", error.detail.to_string().replace('\n', &newline))?;
            for (key, value) in error.detail.context() {
                let value = value.replace('\n', &newline);
                match key {
                    Some(key) => writeln!(f, "{indent}{key}: {value}")?,
                    None => writeln!(f, "{indent}{value}")?,
                }
            }

            if show_location {
                writeln!(f, "{indent}[{}]", error.location)?;
            }
        }

        Ok(())
    }
}

/// A free-form error message with context parameters. Constructed by the
/// [`error!`](crate::error!) macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

impl Message {
    pub fn new<M: fmt::Display>(message: M) -> Self {
        Message { message: message.to_string(), parameters: vec![] }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for Message {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    (@param $m:ident $key:expr => $value:expr $(, $($rest:tt)*)?) => {
        $m.parameters.push((Some($key.to_string()), $value.to_string()));
        $($crate::error!(@param $m $($rest)*);)?
    };

    (@param $m:ident $value:expr $(, $($rest:tt)*)?) => {
        $m.parameters.push((None, $value.to_string()));
        $($crate::error!(@param $m $($rest)*);)?
    };

    (@param $m:ident) => { };

    ($msg:expr $(,)?) => (
        $crate::error::Error::from($crate::error::Message::new($msg))
    );

    ($msg:expr, $($rest:tt)+) => ({
        #[allow(unused_mut)]
        let mut message = $crate::error::Message::new($msg);
        $crate::error!(@param message $($rest)+);
        $crate::error::Error::from(message)
    });
}

pub trait Chainable<T> {
    fn chain(self, other: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, other: impl Into<Error>) -> Result<T> {
        self.map_err(|e| e.into().chain(other.into()))
    }

    #[track_caller]
    fn chain_with<F, Err>(self, f: F) -> Result<T>
        where F: FnOnce() -> Err, Err: Into<Error>,
    {
        self.map_err(|e| e.into().chain(f().into()))
    }
}
