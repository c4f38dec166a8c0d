//! Break a string into a sequence of directory-object Items.
//!
//! This module defines [`Item`], which represents a basic entry in a
//! directory document, and [`Reader`], which is used to break a string
//! into Items.

use std::str::FromStr;

use crate::{Error, Result};

/// Constants for the object syntax of the directory metaformat.
mod object {
    /// Indicates the start of an object.
    pub(super) const BEGIN_STR: &str = "-----BEGIN ";
    /// Indicates the end of an object.
    pub(super) const END_STR: &str = "-----END ";
    /// Indicates the end of a begin or end tag.
    pub(super) const TAG_END: &str = "-----";
}

/// A single entry in a directory document.
///
/// Each item has a keyword, a (possibly empty) sequence of arguments on the
/// same line, and an optional PEM-style object on the following lines. This
/// is a zero-copy implementation that points into the containing string.
///
/// Unlike the documents themselves, we never need the object payload: the
/// tag is kept so that callers can tell the object was there, but the
/// base64 data is not decoded.
#[derive(Clone, Debug)]
pub(crate) struct Item<'a> {
    /// The keyword that determines the type of this item.
    kwd: &'a str,
    /// The arguments on the keyword line, unsplit.
    args: &'a str,
    /// The tag of the object that followed the keyword line, if any.
    #[allow(dead_code)] // don't warn about the tag not getting read.
    object_tag: Option<&'a str>,
    /// 1-based line number of the keyword line.
    line: usize,
}

impl<'a> Item<'a> {
    /// Return the keyword of this item.
    pub(crate) fn kwd(&self) -> &'a str {
        self.kwd
    }

    /// Return the line number of this item's keyword line.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Return the arguments of this item, as a single string.
    pub(crate) fn args_as_str(&self) -> &'a str {
        self.args
    }

    /// Return the `idx`th argument of this item, if it exists.
    pub(crate) fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.split_ascii_whitespace().nth(idx)
    }

    /// Return the `idx`th argument, or an error if it is absent.
    pub(crate) fn required_arg(&self, idx: usize) -> Result<&'a str> {
        self.arg(idx).ok_or_else(|| Error::MissingArgument {
            kwd: self.kwd.to_string(),
            idx,
            line: self.line,
        })
    }

    /// Parse the `idx`th argument of this item as a `T`.
    pub(crate) fn parse_arg<T>(&self, idx: usize) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.required_arg(idx)?
            .parse()
            .map_err(|e: T::Err| Error::BadArgument {
                kwd: self.kwd.to_string(),
                line: self.line,
                msg: e.to_string(),
            })
    }

    /// True if this item carried an object.
    #[cfg(test)]
    pub(crate) fn has_object(&self) -> bool {
        self.object_tag.is_some()
    }
}

/// Return true iff a given character may appear in a keyword.
fn kwd_char_ok(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '0'..='9' | '-')
}

/// Return true iff `s` is a valid keyword or annotation.
fn keyword_ok(mut s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    if s.starts_with('@') {
        s = &s[1..];
    }
    if s.starts_with('-') {
        return false;
    }
    s.chars().all(kwd_char_ok)
}

/// A cursor into a string that yields Items one by one.
#[derive(Debug)]
pub(crate) struct Reader<'a> {
    /// Remaining lines of the string we're parsing, with line numbers.
    lines: std::iter::Peekable<std::iter::Enumerate<std::str::Lines<'a>>>,
}

impl<'a> Reader<'a> {
    /// Create a new Reader to split `s` into items.
    pub(crate) fn new(s: &'a str) -> Self {
        Reader {
            lines: s.lines().enumerate().peekable(),
        }
    }

    /// Extract a (kwd, args) pair from a keyword line.
    fn kwdline(line: &'a str, lineno: usize) -> Result<(&'a str, &'a str)> {
        if line.is_empty() {
            return Err(Error::EmptyLine(lineno));
        }
        // The "opt" prefix marked non-critical items in older descriptor
        // versions; it is transparent to us.
        let line = line.strip_prefix("opt ").unwrap_or(line);
        let (kwd, args) = match line.split_once(|c| c == ' ' || c == '\t') {
            Some((kwd, args)) => (kwd, args),
            None => (line, ""),
        };
        if !keyword_ok(kwd) {
            return Err(Error::BadKeyword(lineno));
        }
        Ok((kwd, args))
    }

    /// Consume an object if one begins at the current position.
    ///
    /// Returns `Ok(Some(tag))` if an object was found and skipped,
    /// `Ok(None)` if there is no object here, and `Err` if an object was
    /// started but malformed or unterminated.
    fn object(&mut self) -> Result<Option<&'a str>> {
        use object::*;

        match self.lines.peek() {
            Some((_, l)) if l.starts_with(BEGIN_STR) => {}
            _ => return Ok(None),
        }
        let (beginno, beginline) = match self.lines.next() {
            Some((n, l)) => (n + 1, l),
            None => return Ok(None),
        };
        if !beginline.ends_with(TAG_END) || beginline.len() < BEGIN_STR.len() + TAG_END.len() {
            return Err(Error::BadObjectBeginTag(beginno));
        }
        let tag = &beginline[BEGIN_STR.len()..(beginline.len() - TAG_END.len())];

        let mut last_lineno = beginno;
        for (lineno, line) in self.lines.by_ref() {
            last_lineno = lineno + 1;
            if let Some(rest) = line.strip_prefix(END_STR) {
                let endtag = rest.strip_suffix(TAG_END).unwrap_or(rest);
                if endtag != tag {
                    return Err(Error::BadObjectMismatchedTag(last_lineno));
                }
                return Ok(Some(tag));
            }
        }
        Err(Error::UnterminatedObject(last_lineno))
    }

    /// Read the next Item from this Reader.
    ///
    /// Returns `Ok(Some(item))` on success, or `Ok(None)` when exhausted.
    fn item(&mut self) -> Result<Option<Item<'a>>> {
        let (lineno, line) = match self.lines.next() {
            Some((n, l)) => (n + 1, l),
            None => return Ok(None),
        };
        let (kwd, args) = Self::kwdline(line, lineno)?;
        let object_tag = self.object()?;
        Ok(Some(Item {
            kwd,
            args,
            object_tag,
            line: lineno,
        }))
    }

    /// Collect every item in the document, stopping at the first error.
    pub(crate) fn into_items(mut self) -> Result<Vec<Item<'a>>> {
        let mut items = Vec::new();
        while let Some(item) = self.item()? {
            items.push(item);
        }
        Ok(items)
    }
}
