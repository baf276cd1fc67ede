//! Parser for attribution lines.
//!
//! An attribution line bundles time, date and author of one message:
//!
//! ```text
//! [14:32, 3/4/2021] Alice:
//! ```
//!
//! Some renderers append the message text after the author separator
//! (`[14:32, 3/4/2021] Alice: hi`); that trailing text is returned as well.
//! Time and date are kept in the host's own formatting.

/// Fields decoded from one attribution line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub time: String,
    pub date: String,
    pub author: String,
    /// Text following the author separator, if any
    pub trailing: Option<String>,
}

/// Parse an attribution line.
///
/// Returns `None` when the line does not follow the
/// `[<time>, <date>] <author>:` grammar, so callers can fall back to other
/// sources instead of storing garbage.
pub fn parse_attribution(line: &str) -> Option<Attribution> {
    let rest = line.trim_start().strip_prefix('[')?;
    let (stamp, rest) = rest.split_once(']')?;
    let (time, date) = stamp.split_once(',')?;
    let (time, date) = (time.trim(), date.trim());
    if time.is_empty() || date.is_empty() {
        return None;
    }

    let (author, trailing) = match rest.split_once(':') {
        Some((author, trailing)) => (author, Some(trailing.trim())),
        None => (rest, None),
    };
    let author = author.trim();
    if author.is_empty() {
        return None;
    }

    let trailing = trailing
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    Some(Attribution {
        time: time.to_string(),
        date: date.to_string(),
        author: author.to_string(),
        trailing,
    })
}
