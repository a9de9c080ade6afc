//! Slash-segmented channel names.
//!
//! A channel is both an address (routing through composed machines) and,
//! at control points, a discriminator: a leading `continue` segment asks the
//! enclosing composite to keep going, a leading `break` segment hands
//! control to whatever comes next.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leading segment of a channel that keeps control inside a composite.
pub const CONTINUE: &str = "continue";
/// Leading segment of a channel that ends the current phase.
pub const BREAK: &str = "break";
/// Conventional channel for a value handed to or returned by a machine.
pub const RESULT: &str = "result";
/// Channel carrying recoverable errors as data.
pub const ERR: &str = "err";

/// A channel: an ordered list of segments, written `a/b/c`.
///
/// Channels compare by segment. Parsing never fails; an empty string is the
/// empty channel.
///
/// # Example
///
/// ```rust
/// use chanalg::core::Channel;
///
/// let channel = Channel::parse("left/element/2/set");
/// assert_eq!(channel.head(), Some("left"));
/// assert_eq!(channel.tail().to_string(), "element/2/set");
/// assert_eq!(channel.tail().prefixed("right").to_string(), "right/element/2/set");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Channel {
    segments: Vec<String>,
}

/// Control meaning of a channel's leading segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    /// `continue/<rest>`
    Continue(Channel),
    /// `break/<rest>`
    Break(Channel),
    /// Anything else.
    Data,
}

impl Channel {
    /// Parse a `/`-separated channel string.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            segments: text.split('/').map(str::to_string).collect(),
        }
    }

    /// Build a channel from already split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment, if any.
    pub fn head(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Everything after the first segment.
    pub fn tail(&self) -> Channel {
        Self {
            segments: self.segments.iter().skip(1).cloned().collect(),
        }
    }

    /// Split into the first segment and the rest.
    pub fn split_first(&self) -> Option<(&str, Channel)> {
        self.head().map(|head| (head, self.tail()))
    }

    /// A new channel with `segment` in front.
    pub fn prefixed(&self, segment: &str) -> Channel {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(segment.to_string());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// True if this channel is exactly the single segment `name`.
    pub fn is(&self, name: &str) -> bool {
        self.segments.len() == 1 && self.segments[0] == name
    }

    /// True if the leading segments equal all of `prefix`'s segments.
    pub fn starts_with(&self, prefix: &Channel) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// The suffix after `prefix`, if this channel starts with it.
    pub fn strip_prefix(&self, prefix: &Channel) -> Option<Channel> {
        self.segments
            .strip_prefix(prefix.segments.as_slice())
            .map(|rest| Self {
                segments: rest.to_vec(),
            })
    }

    /// Replace a leading `old` prefix with `new`, keeping the suffix.
    ///
    /// Channels that do not start with `old` come back unchanged.
    pub fn rename(&self, old: &Channel, new: &Channel) -> Channel {
        match self.strip_prefix(old) {
            Some(rest) => {
                let mut segments = new.segments.clone();
                segments.extend(rest.segments);
                Self { segments }
            }
            None => self.clone(),
        }
    }

    /// Interpret the leading segment as a control discriminator.
    pub fn control(&self) -> Control {
        match self.head() {
            Some(CONTINUE) => Control::Continue(self.tail()),
            Some(BREAK) => Control::Break(self.tail()),
            _ => Control::Data,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for Channel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Channel {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<String> for Channel {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<Channel> for String {
    fn from(channel: Channel) -> Self {
        channel.to_string()
    }
}

impl PartialEq<str> for Channel {
    fn eq(&self, other: &str) -> bool {
        *self == Channel::parse(other)
    }
}

impl PartialEq<&str> for Channel {
    fn eq(&self, other: &&str) -> bool {
        *self == Channel::parse(other)
    }
}
