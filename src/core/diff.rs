//! Unified diff model and parser.

/// Classification of a hunk body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Present on both sides.
    Context,
    /// Only in the new file.
    Added,
    /// Only in the old file.
    Removed,
}

/// A single hunk body line, with its marker stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Line classification.
    pub kind: LineKind,
    /// Line content without the leading marker.
    pub text: String,
}

impl DiffLine {
    /// Create a line.
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// A contiguous change region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Old file range (start line, line count).
    pub old_range: (usize, usize),
    /// New file range (start line, line count).
    pub new_range: (usize, usize),
    /// Section heading git prints after the closing `@@`, if any.
    pub heading: String,
    /// Body lines in order.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Create an empty hunk with the given ranges.
    pub fn new(old_range: (usize, usize), new_range: (usize, usize)) -> Self {
        Self {
            old_range,
            new_range,
            heading: String::new(),
            lines: Vec::new(),
        }
    }

    /// Canonical `@@ -a,b +c,d @@` header line.
    pub fn header(&self) -> String {
        let mut header = format!(
            "@@ -{},{} +{},{} @@",
            self.old_range.0, self.old_range.1, self.new_range.0, self.new_range.1
        );
        if !self.heading.is_empty() {
            header.push(' ');
            header.push_str(&self.heading);
        }
        header
    }

    /// Count lines of the given kind.
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }

    /// Old and new line counts implied by the body.
    pub fn observed_counts(&self) -> (usize, usize) {
        let context = self.count(LineKind::Context);
        (
            context + self.count(LineKind::Removed),
            context + self.count(LineKind::Added),
        )
    }
}

/// Kind of file change in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    /// File was newly added.
    Added,
    /// File was modified.
    Modified,
    /// File was deleted.
    Deleted,
    /// File was renamed or copied.
    Renamed,
    /// Only the file mode changed.
    ModeChanged,
    /// Binary content changed.
    Binary,
}

impl FileChangeKind {
    /// Single-character badge for lists.
    pub fn badge(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::ModeChanged => 'T',
            Self::Binary => 'B',
        }
    }
}

/// All hunks for one file of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffFile {
    /// Path on the old side.
    pub left_path: String,
    /// Path on the new side.
    pub right_path: String,
    /// Kind of change.
    pub kind: FileChangeKind,
    /// Hunks in source order. Empty for renames, mode changes and binaries.
    pub hunks: Vec<Hunk>,
}

impl DiffFile {
    /// Create a modified file with no hunks.
    pub fn new(left_path: impl Into<String>, right_path: impl Into<String>) -> Self {
        Self {
            left_path: left_path.into(),
            right_path: right_path.into(),
            kind: FileChangeKind::Modified,
            hunks: Vec::new(),
        }
    }

    /// Whether the file moved.
    pub fn is_rename(&self) -> bool {
        self.left_path != self.right_path
    }

    /// Path to show in file lists.
    pub fn display_path(&self) -> String {
        if self.is_rename() {
            format!("{} → {}", self.left_path, self.right_path)
        } else {
            self.right_path.clone()
        }
    }

    /// Total added lines.
    pub fn additions(&self) -> usize {
        self.hunks.iter().map(|h| h.count(LineKind::Added)).sum()
    }

    /// Total removed lines.
    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(|h| h.count(LineKind::Removed)).sum()
    }
}

/// Tolerated anomalies seen while parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines outside any hunk that carried no recognized meaning.
    pub skipped: usize,
    /// Hunks that ended before their header counts were satisfied.
    pub truncated_hunks: usize,
}

/// Parse unified diff text into files, in source order.
///
/// Parsing never fails: unrecognized lines are skipped.
pub fn parse_unified_diff(raw_diff: &str) -> Vec<DiffFile> {
    parse_unified_diff_with_stats(raw_diff).0
}

/// Like [`parse_unified_diff`], also reporting what was tolerated.
pub fn parse_unified_diff_with_stats(raw_diff: &str) -> (Vec<DiffFile>, ParseStats) {
    let _timer = crate::metrics::Timer::start("parse_diff");
    let mut parser = DiffParser::default();
    for line in raw_diff.lines() {
        parser.feed(line);
    }
    let (files, stats) = parser.finish();
    if stats != ParseStats::default() {
        log::debug!(
            "diff parse tolerated {} skipped lines, {} truncated hunks",
            stats.skipped,
            stats.truncated_hunks
        );
    }
    (files, stats)
}

/// Line-driven parser state.
#[derive(Debug, Default)]
struct DiffParser {
    files: Vec<DiffFile>,
    file: Option<DiffFile>,
    hunk: Option<OpenHunk>,
    stats: ParseStats,
}

/// A hunk still expecting body lines.
#[derive(Debug)]
struct OpenHunk {
    hunk: Hunk,
    old_left: usize,
    new_left: usize,
}

impl DiffParser {
    fn feed(&mut self, line: &str) {
        if self.hunk.is_some() {
            if self.feed_hunk_line(line) {
                return;
            }
            // Header counts disagree with the body; treat the hunk as truncated.
            self.close_hunk();
        }
        self.feed_meta_line(line);
    }

    /// Consume a body line. Returns false if the line does not belong to the hunk.
    fn feed_hunk_line(&mut self, line: &str) -> bool {
        let Some(open) = self.hunk.as_mut() else {
            return false;
        };

        let (kind, text) = match line.as_bytes().first() {
            Some(b'+') => (LineKind::Added, &line[1..]),
            Some(b'-') => (LineKind::Removed, &line[1..]),
            Some(b' ') => (LineKind::Context, &line[1..]),
            None => (LineKind::Context, ""),
            // "\ No newline at end of file"
            Some(b'\\') => return true,
            Some(_) => return false,
        };

        match kind {
            LineKind::Added if open.new_left > 0 => open.new_left -= 1,
            LineKind::Removed if open.old_left > 0 => open.old_left -= 1,
            LineKind::Context if open.old_left > 0 && open.new_left > 0 => {
                open.old_left -= 1;
                open.new_left -= 1;
            }
            _ => return false,
        }

        open.hunk.lines.push(DiffLine::new(kind, text));

        if open.old_left == 0 && open.new_left == 0 {
            self.close_hunk();
        }
        true
    }

    fn feed_meta_line(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            self.close_file();
            let file = match parse_diff_header(rest) {
                Some((old, new)) => DiffFile::new(old, new),
                None => {
                    log::debug!("unparseable diff header: {}", line);
                    DiffFile::new("", "")
                }
            };
            self.file = Some(file);
        } else if line.starts_with("@@ ") {
            match parse_hunk_header(line) {
                Some(hunk) => self.open_hunk(hunk),
                None => self.skip(line),
            }
        } else if let Some(path) = line.strip_prefix("--- ") {
            // A second "---" after hunks starts a new file in plain unified diffs.
            if self.file.as_ref().map_or(true, |f| !f.hunks.is_empty()) {
                self.close_file();
                self.file = Some(DiffFile::new("", ""));
            }
            let left = side_path(path, "a/");
            let file = self.current_file();
            match left {
                Some(path) => file.left_path = path,
                None => file.kind = FileChangeKind::Added,
            }
        } else if let Some(path) = line.strip_prefix("+++ ") {
            let file = self.current_file();
            match side_path(path, "b/") {
                Some(path) => file.right_path = path,
                None => file.kind = FileChangeKind::Deleted,
            }
        } else if let Some(path) = line
            .strip_prefix("rename from ")
            .or_else(|| line.strip_prefix("copy from "))
        {
            let file = self.current_file();
            file.left_path = unquote_path(path);
            file.kind = FileChangeKind::Renamed;
        } else if let Some(path) = line
            .strip_prefix("rename to ")
            .or_else(|| line.strip_prefix("copy to "))
        {
            let file = self.current_file();
            file.right_path = unquote_path(path);
            file.kind = FileChangeKind::Renamed;
        } else if line.starts_with("new file mode") {
            self.current_file().kind = FileChangeKind::Added;
        } else if line.starts_with("deleted file mode") {
            self.current_file().kind = FileChangeKind::Deleted;
        } else if line.starts_with("old mode") || line.starts_with("new mode") {
            let file = self.current_file();
            if file.kind == FileChangeKind::Modified {
                file.kind = FileChangeKind::ModeChanged;
            }
        } else if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
            self.current_file().kind = FileChangeKind::Binary;
        } else if line.starts_with("index ")
            || line.starts_with("similarity index")
            || line.starts_with("dissimilarity index")
            || line.starts_with('\\')
        {
            // Metadata with no structural meaning here.
        } else {
            self.skip(line);
        }
    }

    fn skip(&mut self, line: &str) {
        log::trace!("skipping diff line: {}", line);
        self.stats.skipped += 1;
    }

    fn current_file(&mut self) -> &mut DiffFile {
        self.file.get_or_insert_with(|| DiffFile::new("", ""))
    }

    fn open_hunk(&mut self, hunk: Hunk) {
        self.current_file();
        let open = OpenHunk {
            old_left: hunk.old_range.1,
            new_left: hunk.new_range.1,
            hunk,
        };
        if open.old_left == 0 && open.new_left == 0 {
            self.push_hunk(open.hunk);
        } else {
            self.hunk = Some(open);
        }
    }

    fn close_hunk(&mut self) {
        let Some(open) = self.hunk.take() else {
            return;
        };
        let mut hunk = open.hunk;
        if open.old_left > 0 || open.new_left > 0 {
            let (old_count, new_count) = hunk.observed_counts();
            log::debug!(
                "truncated hunk {}: observed {} old / {} new lines",
                hunk.header(),
                old_count,
                new_count
            );
            hunk.old_range.1 = old_count;
            hunk.new_range.1 = new_count;
            self.stats.truncated_hunks += 1;
        }
        self.push_hunk(hunk);
    }

    fn push_hunk(&mut self, hunk: Hunk) {
        self.current_file().hunks.push(hunk);
    }

    fn close_file(&mut self) {
        self.close_hunk();
        if let Some(mut file) = self.file.take() {
            if file.left_path.is_empty() {
                file.left_path = file.right_path.clone();
            }
            if file.right_path.is_empty() {
                file.right_path = file.left_path.clone();
            }
            self.files.push(file);
        }
    }

    fn finish(mut self) -> (Vec<DiffFile>, ParseStats) {
        self.close_file();
        (self.files, self.stats)
    }
}

/// Parse `@@ -a[,b] +c[,d] @@ heading`. Omitted counts default to 1.
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, heading) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;

    let mut hunk = Hunk::new(parse_range(old)?, parse_range(new)?);
    hunk.heading = heading.trim_start().to_string();
    Some(hunk)
}

fn parse_range(range: &str) -> Option<(usize, usize)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Path from a `---`/`+++` line. `None` for `/dev/null`.
fn side_path(raw: &str, prefix: &str) -> Option<String> {
    // git appends a tab before timestamps in plain diffs
    let raw = raw.split('\t').next().unwrap_or(raw);
    let path = unquote_path(raw.trim_end());
    if path == "/dev/null" {
        return None;
    }
    Some(path.strip_prefix(prefix).unwrap_or(&path).to_string())
}

/// Unquote a C-style quoted string if present.
/// Git uses C-style quoting for paths with special chars, and with the
/// default `core.quotePath` it writes non-ASCII bytes as `\NNN` octal.
fn unquote_path(s: &str) -> String {
    if !(s.starts_with('"') && s.ends_with('"') && s.len() >= 2) {
        return s.to_string();
    }

    let inner = s[1..s.len() - 1].as_bytes();
    let mut bytes = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let b = inner[i];
        i += 1;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some(&esc) = inner.get(i) else {
            bytes.push(b'\\');
            break;
        };
        i += 1;
        match esc {
            b'n' => bytes.push(b'\n'),
            b't' => bytes.push(b'\t'),
            b'r' => bytes.push(b'\r'),
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'v' => bytes.push(0x0b),
            b'\\' => bytes.push(b'\\'),
            b'"' => bytes.push(b'"'),
            b'0'..=b'3' => match octal_byte(&inner[i - 1..]) {
                Some(value) => {
                    bytes.push(value);
                    i += 2;
                }
                None => {
                    bytes.push(b'\\');
                    bytes.push(esc);
                }
            },
            other => {
                bytes.push(b'\\');
                bytes.push(other);
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Three octal digits at the start of `digits` as one byte.
fn octal_byte(digits: &[u8]) -> Option<u8> {
    let digits = digits.get(..3)?;
    let mut value: u16 = 0;
    for &d in digits {
        if !(b'0'..=b'7').contains(&d) {
            return None;
        }
        value = value * 8 + u16::from(d - b'0');
    }
    u8::try_from(value).ok()
}

/// Parse the part of a `diff --git` line after the command.
/// Returns (old_path, new_path) without a/ b/ prefixes.
fn parse_diff_header(rest: &str) -> Option<(String, String)> {
    if rest.starts_with('"') {
        let first_end = find_closing_quote(rest, 0)?;
        let first_quoted = &rest[..=first_end];

        let remainder = rest.get(first_end + 2..)?;
        let old_path = unquote_path(first_quoted);
        let new_path = if remainder.starts_with('"') {
            let second_end = find_closing_quote(remainder, 0)?;
            unquote_path(&remainder[..=second_end])
        } else {
            remainder.to_string()
        };

        let old_path = old_path.strip_prefix("a/").unwrap_or(&old_path).to_string();
        let new_path = new_path.strip_prefix("b/").unwrap_or(&new_path).to_string();
        return Some((old_path, new_path));
    }

    // Paths may contain spaces; split on the last " b/".
    let b_idx = rest.rfind(" b/").or_else(|| rest.rfind(" \"b/"))?;

    let a_part = &rest[..b_idx];
    let b_part = unquote_path(&rest[b_idx + 1..]);

    let old_path = a_part.strip_prefix("a/").unwrap_or(a_part);
    let new_path = b_part.strip_prefix("b/").unwrap_or(&b_part);

    Some((old_path.to_string(), new_path.to_string()))
}

/// Find the index of the closing quote, accounting for escapes.
fn find_closing_quote(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(start) != Some(&b'"') {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
        } else if bytes[i] == b'"' {
            return Some(i);
        } else {
            i += 1;
        }
    }
    None
}
