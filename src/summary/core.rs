use memchr::memchr_iter;

/// Counts accumulated over a scanned byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCounts {
    pub newlines: u64,
    pub alnum: u64,
    pub utf8_units: u64,
    pub utf8_compliant: bool,
}

impl Default for SegmentCounts {
    fn default() -> Self {
        SegmentCounts {
            newlines: 0,
            alnum: 0,
            utf8_units: 0,
            utf8_compliant: true,
        }
    }
}

impl SegmentCounts {
    /// Score one buffer of file content into the running totals.
    ///
    /// Each metric uses its own tight pass over the buffer: after the
    /// first pass the data is hot in L1/L2, making the later passes
    /// nearly free compared to one branchy fused loop.
    /// The compliance flag only ever goes false; it is never reset.
    pub fn record(&mut self, data: &[u8]) {
        self.newlines += count_newlines(data);
        self.alnum += count_alnum(data);
        self.utf8_units += count_utf8_units(data);
        self.utf8_compliant &= !has_forbidden_lead(data);
    }

    /// Merge another set of totals into this one.
    /// A single non-compliant side makes the merged result non-compliant.
    pub fn merge(&mut self, other: &SegmentCounts) {
        self.newlines += other.newlines;
        self.alnum += other.alnum;
        self.utf8_units += other.utf8_units;
        self.utf8_compliant &= other.utf8_compliant;
    }
}

/// Count newlines using SIMD-accelerated memchr.
/// Newline bytes (`\n`) are counted, not logical lines.
#[inline]
pub fn count_newlines(data: &[u8]) -> u64 {
    memchr_iter(b'\n', data).count() as u64
}

/// Count ASCII alphanumeric bytes: digits and upper/lowercase letters.
/// Deliberately an explicit ASCII test, independent of the execution
/// locale; bytes above 0x7F never qualify.
pub fn count_alnum(data: &[u8]) -> u64 {
    let mut count = 0u64;
    for &b in data {
        count += b.is_ascii_alphanumeric() as u64;
    }
    count
}

/// Count UTF-8 character units by counting non-continuation bytes.
/// A continuation byte has the bit pattern `10xxxxxx` (0x80..0xBF).
/// Every other byte starts a new unit (ASCII, multi-byte leader, or
/// invalid), approximating the decoded-codepoint count.
pub fn count_utf8_units(data: &[u8]) -> u64 {
    let mut count = 0u64;
    for &b in data {
        count += ((b & 0xC0) != 0x80) as u64;
    }
    count
}

/// True if the range contains a byte with its five top bits set
/// (`11111xxx`), the lead pattern of the abolished 5-/6-byte UTF-8
/// forms, which no compliant encoder emits. Continuation structure,
/// overlong encodings and surrogates are not checked.
pub fn has_forbidden_lead(data: &[u8]) -> bool {
    data.iter().any(|&b| (b & 0xF8) == 0xF8)
}

/// Round a requested workload to the nearest multiple of the buffer
/// size, breaking exact half-buffer ties toward the larger multiple.
/// Workloads that already divide evenly come back unchanged.
///
/// Callers must uphold `0 < buffer_size <= workload`.
pub fn adjust_workload(workload: u64, buffer_size: u64) -> u64 {
    debug_assert!(workload > 0 && buffer_size > 0);
    debug_assert!(buffer_size <= workload);
    let lower = (workload / buffer_size) * buffer_size;
    let upper = lower + buffer_size;
    if workload - lower < upper - workload {
        lower
    } else {
        upper
    }
}
