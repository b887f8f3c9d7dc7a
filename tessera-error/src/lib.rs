#![warn(missing_docs)]

//! Error handling for Tessera.
//!
//! All fallible operations return a [`TesseraResult`]. Errors are constructed with the
//! [`tessera_err!`] macro and returned early with [`tessera_bail!`].

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::{Debug, Display, Formatter};
use std::num::TryFromIntError;
use std::ops::Deref;
use std::{env, fmt, io};

/// An owned or static string used as the message of a [`TesseraError`].
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    #[allow(clippy::panic)]
    fn from(msg: T) -> Self {
        if env::var("TESSERA_PANIC_ON_ERR").as_deref().unwrap_or("") == "1" {
            panic!("{}\nBacktrace:\n{}", msg.into(), Backtrace::capture());
        } else {
            Self(msg.into())
        }
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Infallible> for TesseraError {
    fn from(value: Infallible) -> Self {
        match value {}
    }
}

/// The top-level error type for Tessera.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum TesseraError {
    /// An index is out of bounds.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Box<Backtrace>),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Box<Backtrace>),
    /// A dimension or domain could not be constructed from the given bounds and extents.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidDomain(ErrString, Box<Backtrace>),
    /// Persisted bytes could not be decoded.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidSerde(ErrString, Box<Backtrace>),
    /// Two numeric kinds that must agree did not.
    #[error("expected type: {0} but instead got {1}\nBacktrace:\n{2}")]
    MismatchedTypes(ErrString, ErrString, Box<Backtrace>),
    /// A wrapper for IO errors.
    #[error("{0}\nBacktrace:\n{1}")]
    IOError(#[source] io::Error, Box<Backtrace>),
    /// A wrapper for errors from integer conversions.
    #[error("{0}\nBacktrace:\n{1}")]
    TryFromInt(#[source] TryFromIntError, Box<Backtrace>),
}

impl From<io::Error> for TesseraError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value, Box::new(Backtrace::capture()))
    }
}

impl From<TryFromIntError> for TesseraError {
    fn from(value: TryFromIntError) -> Self {
        Self::TryFromInt(value, Box::new(Backtrace::capture()))
    }
}

impl Debug for TesseraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`TesseraError`]s as their error type.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// A convenient macro for creating a [`TesseraError`].
#[macro_export]
macro_rules! tessera_err {
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::TesseraError::OutOfBounds($idx, $start, $stop, Box::new(Backtrace::capture()))
        )
    }};
    (MismatchedTypes: $expected:expr, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::TesseraError::MismatchedTypes(
                $expected.to_string().into(),
                $actual.to_string().into(),
                Box::new(Backtrace::capture()),
            )
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::TesseraError::$variant(
                format!($fmt, $($arg),*).into(),
                Box::new(Backtrace::capture()),
            )
        )
    }};
    ($variant:ident: $err:expr $(,)?) => {
        $crate::__private::must_use(
            $crate::TesseraError::$variant($err)
        )
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::tessera_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a [`TesseraError`] from the current function.
#[macro_export]
macro_rules! tessera_bail {
    ($($tt:tt)+) => {
        return Err($crate::tessera_err!($($tt)+))
    };
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn must_use(error: crate::TesseraError) -> crate::TesseraError {
        error
    }
}
