//! HTTP Range request parsing module
//!
//! Range header parsing for partial content, compliant with RFC 7233.
//! Only a single `bytes` range is honored.

/// A satisfiable byte range with inclusive bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(&self, total_size: usize) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve the given slice with 206
    Valid(ByteRange),
    /// Start at or beyond the end of the content, answer 416
    NotSatisfiable,
    /// No Range header, unsupported or malformed: serve the full content
    None,
}

/// Parse HTTP Range header
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// Multiple ranges and empty content are answered with the full body.
pub fn parse_range_header(range_header: Option<&str>, total_size: usize) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(ranges) = header.trim().strip_prefix("bytes=") else {
        return RangeParseResult::None;
    };

    if ranges.contains(',') || total_size == 0 {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = ranges.split_once('-') else {
        return RangeParseResult::None;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        parse_suffix_range(end_str, total_size)
    } else {
        parse_standard_range(start_str, end_str, total_size)
    }
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, total_size: usize) -> RangeParseResult {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeParseResult::None;
    };

    if suffix == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start: total_size.saturating_sub(suffix),
        end: total_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, total_size: usize) -> RangeParseResult {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeParseResult::None;
    };

    if start >= total_size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        total_size - 1
    } else {
        let Ok(e) = end_str.parse::<usize>() else {
            return RangeParseResult::None;
        };
        e.min(total_size - 1)
    };

    if start > end {
        return RangeParseResult::None;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}
