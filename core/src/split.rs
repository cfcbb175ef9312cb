//! Splitting invocation arguments into path values and request payload.
//!
//! # Design
//! [`Route::dispatch`](crate::Route::dispatch) takes one ordered list of
//! heterogeneous [`Arg`]s. Classification is positional: the first N
//! arguments fill the template's N conversion specifiers, whatever their
//! kind, and everything after that must be a body or a header collection.
//! [`Route::call`](crate::Route::call) skips this step entirely by taking
//! the two halves as separate parameters.

use crate::error::FormatError;
use crate::format::{self, FormatArg};
use crate::http::{Body, Headers};

/// One invocation argument.
#[derive(Debug)]
pub enum Arg {
    Value(FormatArg),
    Body(Body),
    Headers(Headers),
}

impl Arg {
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Value(v) => v.kind(),
            Arg::Body(_) => "body",
            Arg::Headers(_) => "header collection",
        }
    }

    /// Convert a substitution-position argument for formatting.
    pub fn into_format_arg(self, index: usize) -> Result<FormatArg, FormatError> {
        match self {
            Arg::Value(v) => Ok(v),
            other => Err(FormatError::NotFormattable {
                index,
                kind: other.kind(),
            }),
        }
    }
}

macro_rules! arg_from_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Arg::Value(FormatArg::from(v))
            }
        })*
    };
}

arg_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char);
arg_from_value!(String, &str, &String, uuid::Uuid);

impl From<FormatArg> for Arg {
    fn from(v: FormatArg) -> Self {
        Arg::Value(v)
    }
}

impl From<Body> for Arg {
    fn from(b: Body) -> Self {
        Arg::Body(b)
    }
}

impl From<Headers> for Arg {
    fn from(h: Headers) -> Self {
        Arg::Headers(h)
    }
}

/// Build a `Vec<Arg>` from mixed values.
///
/// ```
/// use rest_route::{args, Body, Headers};
///
/// let args = args![42, "draft", Body::from("{}"), Headers::new()];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$($crate::Arg::from($arg)),*]
    };
}

/// An argument that ends up in the request rather than the URL.
#[derive(Debug)]
pub enum PayloadValue {
    Body(Body),
    Headers(Headers),
}

/// Split `args` against the conversion specifiers of `template`.
///
/// Returns the substitutions and the payload values, each in their original
/// order.
///
/// # Panics
///
/// Panics if an argument after the last specifier is neither a body nor a
/// header collection. That is a call site that does not match its route.
pub fn split(template: &str, args: Vec<Arg>) -> (Vec<Arg>, Vec<PayloadValue>) {
    let mut remaining = format::specifiers(template).count();
    let mut substitutions = Vec::with_capacity(remaining.min(args.len()));
    let mut payload = Vec::new();

    for (index, arg) in args.into_iter().enumerate() {
        if remaining > 0 {
            substitutions.push(arg);
            remaining -= 1;
            continue;
        }
        match arg {
            Arg::Body(b) => payload.push(PayloadValue::Body(b)),
            Arg::Headers(h) => payload.push(PayloadValue::Headers(h)),
            Arg::Value(v) => panic!(
                "unexpected {} value at argument {index} after format string {template:?}: {v:?}",
                v.kind()
            ),
        }
    }
    (substitutions, payload)
}

/// The body and headers attached to a request.
#[derive(Debug, Default)]
pub struct Payload {
    pub body: Option<Body>,
    pub headers: Option<Headers>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Later values replace earlier ones of the same kind.
    pub fn push(&mut self, value: PayloadValue) {
        match value {
            PayloadValue::Body(b) => self.body = Some(b),
            PayloadValue::Headers(h) => self.headers = Some(h),
        }
    }
}

impl FromIterator<PayloadValue> for Payload {
    fn from_iter<I: IntoIterator<Item = PayloadValue>>(iter: I) -> Self {
        let mut payload = Payload::new();
        for value in iter {
            payload.push(value);
        }
        payload
    }
}
