//! printf-style path templates.
//!
//! # Design
//! Route paths are written as format strings, e.g. `"/users/%d/posts/%s"`.
//! The template is tokenized once by [`parse`]; both the argument splitter
//! and [`sprintf`] walk the same token stream, so they always agree on which
//! `%` sequences consume a value. `%%` is an escaped percent sign and never
//! consumes one.
//!
//! Output follows the usual printf conventions for the supported verbs.
//! Exponents carry a sign and at least two digits, and `%v`/`%g` pick the
//! shortest representation of a float.
//! Count and type mismatches are reported as [`FormatError`]s instead of
//! being spliced into the output.
//!
//! Percent-encoded sequences in a template must be escaped: `%20b` is a
//! `%b` conversion with width 20.

use uuid::Uuid;

use crate::error::FormatError;

const SUPPORTED_VERBS: &str = "vsqdboxXceEfFgGt";

/// Width and precision above this are clamped.
const MAX_WIDTH: usize = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub minus: bool,
    pub plus: bool,
    pub sharp: bool,
    pub space: bool,
    pub zero: bool,
}

/// A single conversion specifier such as `%s`, `%05d` or `%-.2f`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier<'a> {
    /// Byte offset of the leading `%`.
    pub offset: usize,
    /// The specifier exactly as written.
    pub text: &'a str,
    pub flags: Flags,
    pub width: Option<usize>,
    pub precision: Option<usize>,
    pub verb: char,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    /// An escaped `%%`.
    Percent,
    Spec(Specifier<'a>),
    /// A `%` with no verb after it.
    Dangling { offset: usize },
}

/// Tokenize `template` left to right.
pub fn parse(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if literal_start < i {
            pieces.push(Piece::Literal(&template[literal_start..i]));
        }
        let start = i;
        i += 1;

        if bytes.get(i) == Some(&b'%') {
            i += 1;
            pieces.push(Piece::Percent);
            literal_start = i;
            continue;
        }

        let mut flags = Flags::default();
        while let Some(&b) = bytes.get(i) {
            match b {
                b'-' => flags.minus = true,
                b'+' => flags.plus = true,
                b'#' => flags.sharp = true,
                b' ' => flags.space = true,
                b'0' => flags.zero = true,
                _ => break,
            }
            i += 1;
        }
        let width = digits(bytes, &mut i);
        let precision = if bytes.get(i) == Some(&b'.') {
            i += 1;
            Some(digits(bytes, &mut i).unwrap_or(0))
        } else {
            None
        };

        match bytes.get(i) {
            Some(&b) if b.is_ascii_alphabetic() => {
                i += 1;
                pieces.push(Piece::Spec(Specifier {
                    offset: start,
                    text: &template[start..i],
                    flags,
                    width,
                    precision,
                    verb: b as char,
                }));
            }
            _ => pieces.push(Piece::Dangling { offset: start }),
        }
        literal_start = i;
    }

    if literal_start < bytes.len() {
        pieces.push(Piece::Literal(&template[literal_start..]));
    }
    pieces
}

fn digits(bytes: &[u8], i: &mut usize) -> Option<usize> {
    let start = *i;
    let mut n: usize = 0;
    while let Some(&b) = bytes.get(*i) {
        if !b.is_ascii_digit() {
            break;
        }
        n = n.saturating_mul(10).saturating_add(usize::from(b - b'0'));
        *i += 1;
    }
    (*i > start).then_some(n.min(MAX_WIDTH))
}

/// The conversion specifiers of `template`, in order.
pub fn specifiers(template: &str) -> impl Iterator<Item = Specifier<'_>> {
    parse(template).into_iter().filter_map(|piece| match piece {
        Piece::Spec(spec) => Some(spec),
        _ => None,
    })
}

/// A value substituted into a path template.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
}

impl FormatArg {
    pub fn kind(&self) -> &'static str {
        match self {
            FormatArg::Str(_) => "string",
            FormatArg::Int(_) => "int",
            FormatArg::Uint(_) => "uint",
            FormatArg::Float(_) => "float",
            FormatArg::Bool(_) => "bool",
            FormatArg::Char(_) => "char",
        }
    }
}

macro_rules! format_arg_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(impl From<$t> for FormatArg {
            fn from(v: $t) -> Self {
                FormatArg::$variant(<$target>::from(v))
            }
        })*
    };
}

format_arg_from!(Int as i64: i8, i16, i32, i64);
format_arg_from!(Uint as u64: u8, u16, u32, u64);
format_arg_from!(Float as f64: f32, f64);
format_arg_from!(Bool as bool: bool);
format_arg_from!(Char as char: char);
format_arg_from!(Str as String: String, &str, &String);

impl From<isize> for FormatArg {
    fn from(v: isize) -> Self {
        FormatArg::Int(v as i64)
    }
}

impl From<usize> for FormatArg {
    fn from(v: usize) -> Self {
        FormatArg::Uint(v as u64)
    }
}

impl From<Uuid> for FormatArg {
    fn from(v: Uuid) -> Self {
        FormatArg::Str(v.to_string())
    }
}

/// Format `template` with `args`.
///
/// Every conversion specifier consumes exactly one value, in order. Fewer or
/// more values than specifiers is an error, as is a verb that does not apply
/// to the value it meets.
pub fn sprintf(template: &str, args: &[FormatArg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut used = 0;

    for piece in parse(template) {
        match piece {
            Piece::Literal(s) => out.push_str(s),
            Piece::Percent => out.push('%'),
            Piece::Dangling { offset } => return Err(FormatError::NoVerb { offset }),
            Piece::Spec(spec) => {
                let arg = args.get(used).ok_or_else(|| FormatError::MissingArgument {
                    index: used,
                    spec: spec.text.to_string(),
                })?;
                spec.render(arg, used, &mut out)?;
                used += 1;
            }
        }
    }

    if used < args.len() {
        return Err(FormatError::ExtraArguments {
            expected: used,
            supplied: args.len(),
        });
    }
    Ok(out)
}

impl Specifier<'_> {
    fn render(&self, arg: &FormatArg, index: usize, out: &mut String) -> Result<(), FormatError> {
        if !SUPPORTED_VERBS.contains(self.verb) {
            return Err(FormatError::UnsupportedVerb {
                verb: self.verb,
                offset: self.offset,
            });
        }

        match (self.verb, arg) {
            ('v' | 's', FormatArg::Str(s)) => self.pad(out, "", truncate(s, self.precision), false),
            ('q', FormatArg::Str(s)) => {
                let quoted = format!("{:?}", truncate(s, self.precision));
                self.pad(out, "", &quoted, false);
            }
            ('x' | 'X', FormatArg::Str(s)) => self.hex_bytes(out, s),
            ('v' | 't', FormatArg::Bool(b)) => self.pad(out, "", if *b { "true" } else { "false" }, false),
            ('v' | 'c', FormatArg::Char(c)) => self.pad(out, "", c.encode_utf8(&mut [0; 4]), false),
            ('q', FormatArg::Char(c)) => self.pad(out, "", &format!("{c:?}"), false),
            ('v' | 'd' | 'b' | 'o' | 'x' | 'X', FormatArg::Int(n)) => {
                self.integer(out, *n < 0, n.unsigned_abs());
            }
            ('v' | 'd' | 'b' | 'o' | 'x' | 'X', FormatArg::Uint(n)) => self.integer(out, false, *n),
            ('c', FormatArg::Int(n)) => self.codepoint(out, u32::try_from(*n).ok()),
            ('c', FormatArg::Uint(n)) => self.codepoint(out, u32::try_from(*n).ok()),
            ('v' | 'e' | 'E' | 'f' | 'F' | 'g' | 'G', FormatArg::Float(x)) => self.float(out, *x),
            _ => {
                return Err(FormatError::Mismatch {
                    index,
                    spec: self.text.to_string(),
                    kind: arg.kind(),
                })
            }
        }
        Ok(())
    }

    /// Pad `sign`+`body` to the field width. Zero padding goes between the
    /// sign and the body; integers with an explicit precision pad with spaces.
    fn pad(&self, out: &mut String, sign: &str, body: &str, numeric: bool) {
        let len = sign.chars().count() + body.chars().count();
        let fill = self.width.unwrap_or(0).saturating_sub(len);
        if fill == 0 {
            out.push_str(sign);
            out.push_str(body);
        } else if self.flags.minus {
            out.push_str(sign);
            out.push_str(body);
            out.extend(std::iter::repeat(' ').take(fill));
        } else if self.flags.zero && (!numeric || self.precision.is_none()) {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(fill));
            out.push_str(body);
        } else {
            out.extend(std::iter::repeat(' ').take(fill));
            out.push_str(sign);
            out.push_str(body);
        }
    }

    fn sign(&self, negative: bool) -> &'static str {
        if negative {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        }
    }

    fn integer(&self, out: &mut String, negative: bool, magnitude: u64) {
        let mut digits = match self.verb {
            'b' => format!("{magnitude:b}"),
            'o' => format!("{magnitude:o}"),
            'x' => format!("{magnitude:x}"),
            'X' => format!("{magnitude:X}"),
            _ => magnitude.to_string(),
        };
        if let Some(p) = self.precision {
            if p == 0 && magnitude == 0 {
                digits.clear();
            } else if digits.len() < p {
                digits.insert_str(0, &"0".repeat(p - digits.len()));
            }
        }
        let prefix = match self.verb {
            _ if !self.flags.sharp => "",
            'b' => "0b",
            'o' if !digits.starts_with('0') => "0",
            'x' => "0x",
            'X' => "0X",
            _ => "",
        };
        let sign = format!("{}{prefix}", self.sign(negative));
        self.pad(out, &sign, &digits, true);
    }

    fn codepoint(&self, out: &mut String, code: Option<u32>) {
        let c = code.and_then(char::from_u32).unwrap_or(char::REPLACEMENT_CHARACTER);
        self.pad(out, "", c.encode_utf8(&mut [0; 4]), false);
    }

    fn hex_bytes(&self, out: &mut String, s: &str) {
        let limit = self.precision.unwrap_or(usize::MAX);
        let mut hex = String::with_capacity(s.len() * 2 + 2);
        if self.flags.sharp {
            hex.push_str(if self.verb == 'X' { "0X" } else { "0x" });
        }
        for b in s.bytes().take(limit) {
            if self.verb == 'X' {
                hex.push_str(&format!("{b:02X}"));
            } else {
                hex.push_str(&format!("{b:02x}"));
            }
        }
        self.pad(out, "", &hex, false);
    }

    fn float(&self, out: &mut String, x: f64) {
        if x.is_nan() {
            let sign = if self.flags.plus {
                "+"
            } else if self.flags.space {
                " "
            } else {
                ""
            };
            self.pad_special(out, sign, "NaN");
            return;
        }
        if x.is_infinite() {
            let sign = if x < 0.0 {
                "-"
            } else if self.flags.space && !self.flags.plus {
                " "
            } else {
                "+"
            };
            self.pad_special(out, sign, "Inf");
            return;
        }

        let abs = x.abs();
        let body = match self.verb {
            'f' | 'F' => format!("{:.*}", self.precision.unwrap_or(6), abs),
            'e' | 'E' => exponent_form(abs, self.precision.unwrap_or(6), self.verb == 'E'),
            _ => general_form(abs, self.precision, self.verb == 'G'),
        };
        self.pad(out, self.sign(x.is_sign_negative()), &body, false);
    }

    // NaN and Inf are never zero padded.
    fn pad_special(&self, out: &mut String, sign: &str, body: &str) {
        let unpadded = Specifier {
            flags: Flags {
                zero: false,
                ..self.flags
            },
            ..self.clone()
        };
        unpadded.pad(out, sign, body, false);
    }
}

fn truncate(s: &str, precision: Option<usize>) -> &str {
    match precision.and_then(|p| s.char_indices().nth(p)) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn exponent_suffix(exp: i32, upper: bool) -> String {
    let e = if upper { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{e}{sign}{:02}", exp.unsigned_abs())
}

/// `%e`: `d.ddddde±XX`.
fn exponent_form(abs: f64, precision: usize, upper: bool) -> String {
    let s = format!("{:.*e}", precision, abs);
    let (mantissa, exp) = split_exponent(&s);
    format!("{mantissa}{}", exponent_suffix(exp, upper))
}

fn split_exponent(s: &str) -> (&str, i32) {
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

/// Significant decimal digits (no trailing zeros) and the decimal exponent
/// of the first digit. Without a precision the digits are the shortest
/// that round-trip.
fn decimal_digits(abs: f64, precision: Option<usize>) -> (String, i32) {
    let s = match precision {
        None => format!("{abs:e}"),
        Some(p) => format!("{:.*e}", p.max(1) - 1, abs),
    };
    let (mantissa, exp) = split_exponent(&s);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let digits = digits.trim_end_matches('0');
    if digits.is_empty() {
        ("0".to_string(), 0)
    } else {
        (digits.to_string(), exp)
    }
}

/// `%g`: exponent form when the exponent is below -4 or at least the
/// precision (6 for the shortest representation), plain decimal otherwise.
fn general_form(abs: f64, precision: Option<usize>, upper: bool) -> String {
    let (digits, exp) = decimal_digits(abs, precision);
    let nd = digits.len() as i32;
    let dp = exp + 1;
    let eprec = match precision {
        None => 6,
        Some(p) => {
            let p = p.max(1) as i32;
            if p > nd && nd >= dp {
                nd
            } else {
                p
            }
        }
    };

    if exp < -4 || exp >= eprec {
        let mut s = digits[..1].to_string();
        if digits.len() > 1 {
            s.push('.');
            s.push_str(&digits[1..]);
        }
        s.push_str(&exponent_suffix(exp, upper));
        return s;
    }

    if dp <= 0 {
        format!("0.{}{digits}", "0".repeat(dp.unsigned_abs() as usize))
    } else if dp >= nd {
        format!("{digits}{}", "0".repeat((dp - nd) as usize))
    } else {
        let (int, frac) = digits.split_at(dp as usize);
        format!("{int}.{frac}")
    }
}
