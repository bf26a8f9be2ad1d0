#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassRange {
    start: char,
    end: char,
}

impl ClassRange {
    pub fn new(a: char, b: char) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(c: char) -> Self {
        Self::new(c, c)
    }

    pub fn start(&self) -> char {
        self.start
    }

    pub fn end(&self) -> char {
        self.end
    }
}

/// A set of Unicode scalar values held as sorted, disjoint, inclusive ranges.
///
/// Ranges that merely touch are not merged by [`CharClass::union`], so
/// `"a" | "b" | "c"` keeps three single-character ranges. Overlapping ranges
/// always are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CharClass {
    ranges: Vec<ClassRange>,
}

impl CharClass {
    pub fn new(ranges: impl IntoIterator<Item = ClassRange>) -> Self {
        ranges
            .into_iter()
            .fold(CharClass::default(), |class, range| class.union(&range.into()))
    }

    pub fn full() -> Self {
        ClassRange::new('\0', char::MAX).into()
    }

    pub fn ranges(&self) -> &[ClassRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_full(&self) -> bool {
        !self.is_empty() && self.complement().is_none()
    }

    pub fn contains(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|range| {
                if range.end < c {
                    std::cmp::Ordering::Less
                } else if range.start > c {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    pub fn union(&self, other: &CharClass) -> CharClass {
        let mut left = self.boundaries().peekable();
        let mut right = other.boundaries().peekable();
        // Each side flips its own flag at its boundaries; an edge is emitted
        // whenever the combined membership changes.
        let (mut in_left, mut in_right, mut inside) = (false, false, false);
        let mut edges = Vec::with_capacity(self.ranges.len() * 2 + other.ranges.len() * 2);
        loop {
            let at = match (left.peek(), right.peek()) {
                (None, None) => break,
                (Some(&l), None) => l,
                (None, Some(&r)) => r,
                (Some(&l), Some(&r)) => l.min(r),
            };
            if left.next_if_eq(&at).is_some() {
                in_left = !in_left;
            }
            if right.next_if_eq(&at).is_some() {
                in_right = !in_right;
            }
            if (in_left || in_right) != inside {
                inside = !inside;
                edges.push(at);
            }
        }
        CharClass {
            ranges: edges
                .chunks_exact(2)
                .map(|edge| ClassRange::new(edge[0], edge[1]))
                .collect(),
        }
    }

    /// Returns the scalar values not in this class, or `None` when the class
    /// already covers all of them.
    pub fn complement(&self) -> Option<CharClass> {
        let mut ranges = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = Some('\0');
        for range in &self.ranges {
            if let Some(lo) = next
                && lo < range.start
                && let Some(hi) = decrement(range.start)
            {
                ranges.push(ClassRange::new(lo, hi));
            }
            next = increment(range.end);
        }
        if let Some(lo) = next {
            ranges.push(ClassRange::new(lo, char::MAX));
        }
        if ranges.is_empty() {
            return None;
        }
        Some(CharClass { ranges })
    }

    fn boundaries(&self) -> impl Iterator<Item = char> + '_ {
        self.ranges.iter().flat_map(|range| [range.start, range.end])
    }
}

impl From<ClassRange> for CharClass {
    fn from(range: ClassRange) -> Self {
        CharClass {
            ranges: vec![range],
        }
    }
}

impl From<char> for CharClass {
    fn from(c: char) -> Self {
        ClassRange::single(c).into()
    }
}

/// Steps over the surrogate block.
pub(crate) fn increment(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        c => char::from_u32(c as u32 + 1),
    }
}

pub(crate) fn decrement(c: char) -> Option<char> {
    match c {
        '\u{E000}' => Some('\u{D7FF}'),
        c => (c as u32).checked_sub(1).and_then(char::from_u32),
    }
}
