//! Codegen-time cleanup stack for the manual-memory backend.
//!
//! Each allocation emitted into a C routine gets a matching release
//! statement. Releases are collected into an immutable [`CleanupStack`]:
//! pushing returns a new, longer stack, so a nested emission can never leak
//! its frames into a sibling. Read emitters hand the releases their value
//! still owns back to the caller as [`Releases`]; the caller composes them
//! into the stack it uses for the following siblings.
//!
//! A failure branch writes the whole stack, most recent frame first.

use std::fmt::Write;

/// One release statement, possibly spanning several lines (loops).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    lines: Vec<String>,
}

impl Release {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }

    /* `free(ptr);` followed by `ptr = NULL;` so a later recycle is a no-op */
    pub fn free(free_fn: &str, pointer: &str) -> Self {
        Self {
            lines: vec![
                format!("{}({});", free_fn, pointer),
                format!("{} = NULL;", pointer),
            ],
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn write(&self, output: &mut String, prefix: &str) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(output, "{}{}", prefix, line)?;
        }
        Ok(())
    }
}

/// Releases still owned by a value after its read fragment, in allocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Releases(Vec<Release>);

impl Releases {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn one(release: Release) -> Self {
        Self(vec![release])
    }

    pub fn push(&mut self, release: Release) {
        self.0.push(release);
    }

    pub fn append(&mut self, mut other: Releases) {
        self.0.append(&mut other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Release> {
        self.0.iter()
    }
}

impl IntoIterator for Releases {
    type Item = Release;
    type IntoIter = std::vec::IntoIter<Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Pending releases of the enclosing scopes, bottom first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupStack {
    frames: Vec<Release>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, release: Release) -> CleanupStack {
        let mut frames = self.frames.clone();
        frames.push(release);
        CleanupStack { frames }
    }

    pub fn extend(&self, releases: &Releases) -> CleanupStack {
        let mut frames = self.frames.clone();
        frames.extend(releases.iter().cloned());
        CleanupStack { frames }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /* Top to bottom: the most recent allocation is released first */
    pub fn write_unwind(&self, output: &mut String, prefix: &str) -> std::fmt::Result {
        for release in self.frames.iter().rev() {
            release.write(output, prefix)?;
        }
        Ok(())
    }
}
