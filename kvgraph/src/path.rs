use core::fmt;

/// Where an index segment points inside a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListIndex {
    /// A position; past the end means append.
    At(usize),
    /// The digits did not fit in a `usize`; always appends.
    Append,
}

/// One segment of a [`KeyPath`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// A property name, matched case-insensitively.
    Name(String),
    /// A list index: the segment consists of ASCII digits only.
    Index(ListIndex),
}

impl Segment {
    fn classify(text: &str) -> Self {
        if text.bytes().all(|b| b.is_ascii_digit()) {
            Segment::Index(text.parse().map_or(ListIndex::Append, ListIndex::At))
        } else {
            Segment::Name(text.to_owned())
        }
    }

    /// The property name, if this is a name segment.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Segment::Name(name) => Some(name),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Index(ListIndex::At(i)) => write!(f, "{i}"),
            Segment::Index(ListIndex::Append) => f.write_str("+"),
        }
    }
}

/// A parsed key path such as `Items:0:Name`.
///
/// Always has at least one segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Separator between segments.
    pub const DELIMITER: char = ':';

    /// Parses a key path.
    ///
    /// The input is trimmed and split on [`KeyPath::DELIMITER`]; blank segments
    /// are dropped, other segments are kept as written. Returns `None` when
    /// nothing is left.
    pub fn parse(text: &str) -> Option<Self> {
        let segments: Vec<Segment> = text
            .trim()
            .split(Self::DELIMITER)
            .filter(|s| !s.trim().is_empty())
            .map(Segment::classify)
            .collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self { segments })
    }

    /// The segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: a key path has at least one segment.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::DELIMITER)?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
