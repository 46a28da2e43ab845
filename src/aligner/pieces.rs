use crate::error::AlignError;
use crate::offset::{slice_utf16, utf16_len};
use crate::parse_result::FuriganaPart;

/// Keep the parts of `parts` that fall inside the UTF-16 range `[start, end)`
///
/// Offsets are relative to the start of the first part. A part cut by the range keeps
/// only its covered base text. A cut reading pair keeps its reading on the piece that
/// holds the start of its base; any other piece of it becomes plain text.
pub fn restrict_parts(
    parts: &[FuriganaPart],
    start: usize,
    end: usize,
) -> Result<Vec<FuriganaPart>, AlignError> {
    let mut kept = Vec::new();
    if start >= end {
        return Ok(kept);
    }
    let mut part_start = 0usize;

    for part in parts {
        let base = part.base();
        let part_end = part_start + utf16_len(base);

        if part_end > start && part_start < end {
            let cut_start = start.max(part_start);
            let cut_end = end.min(part_end);

            if cut_start == part_start && cut_end == part_end {
                kept.push(part.clone());
            } else {
                let piece = slice_utf16(base, cut_start - part_start, cut_end - part_start)?;
                match part {
                    FuriganaPart::Ruby(_, reading) if cut_start == part_start => {
                        kept.push(FuriganaPart::Ruby(piece.to_string(), reading.clone()))
                    }
                    _ => kept.push(FuriganaPart::Plain(piece.to_string())),
                }
            }
        }

        if part_end >= end {
            break;
        }
        part_start = part_end;
    }

    Ok(kept)
}
