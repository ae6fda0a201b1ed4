//! Record segmenter - cuts filtered lines into chest boxes

use crate::config::LookaheadScope;
use crate::types::{ChestBox, CONTAINS_MARKER};
use std::fmt;
use tracing::{debug, warn};

/// Width of a box without a reward line
pub const OPEN_BOX_WIDTH: usize = 3;

/// Width of a box with a reward line
pub const EXPIRED_BOX_WIDTH: usize = 4;

/// Trailing lines too short to form the box they start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentUnderrun {
    /// Offset of the first unconsumed line
    pub offset: usize,
    /// Width the box needed
    pub required: usize,
    /// The leftover lines
    pub lines: Vec<String>,
}

impl fmt::Display for SegmentUnderrun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trailing line(s) at offset {} cannot form a {}-line chest box",
            self.lines.len(),
            self.offset,
            self.required
        )
    }
}

/// Boxes cut from a capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Boxes in capture order
    pub boxes: Vec<ChestBox>,
    /// Tail left over, if any
    pub underrun: Option<SegmentUnderrun>,
}

/// Partitions lines into 3- or 4-line chest boxes
#[derive(Debug, Clone, Copy, Default)]
pub struct ChestBoxSegmenter {
    scope: LookaheadScope,
}

impl ChestBoxSegmenter {
    /// Create a segmenter with the given lookahead
    pub fn new(scope: LookaheadScope) -> Self {
        Self { scope }
    }

    /// Box width starting at `offset`
    fn width_at(&self, lines: &[String], offset: usize) -> usize {
        let end = match self.scope {
            LookaheadScope::Box => (offset + EXPIRED_BOX_WIDTH).min(lines.len()),
            LookaheadScope::Remaining => lines.len(),
        };
        if lines[offset..end].iter().any(|l| l.starts_with(CONTAINS_MARKER)) {
            EXPIRED_BOX_WIDTH
        } else {
            OPEN_BOX_WIDTH
        }
    }

    /// Cut `lines` into boxes
    ///
    /// Never reads past the end: a tail shorter than the box it starts is
    /// returned as an underrun instead.
    pub fn segment(&self, lines: &[String]) -> Segmentation {
        let mut segmentation = Segmentation::default();
        let mut offset = 0;

        while offset < lines.len() {
            let width = self.width_at(lines, offset);
            if offset + width > lines.len() {
                let underrun = SegmentUnderrun {
                    offset,
                    required: width,
                    lines: lines[offset..].to_vec(),
                };
                warn!("Segmentation underrun: {}", underrun);
                segmentation.underrun = Some(underrun);
                break;
            }

            segmentation
                .boxes
                .push(ChestBox::new(lines[offset..offset + width].to_vec()));
            offset += width;
        }

        debug!("Segmented {} lines into {} chest boxes", lines.len(), segmentation.boxes.len());
        segmentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mixed_widths() {
        let input = lines(&[
            "Epic Chest",
            "From: Bob",
            "Source: Level 10 Crypt",
            "Contains: 500 Gold",
            "Rare Chest",
            "From: Alice",
            "Source: Level 5 Crypt",
        ]);

        let seg = ChestBoxSegmenter::default().segment(&input);
        assert_eq!(seg.boxes.len(), 2);
        assert_eq!(seg.boxes[0].len(), 4);
        assert_eq!(seg.boxes[1].len(), 3);
        assert!(seg.underrun.is_none());
    }

    #[test]
    fn test_box_scope_ignores_distant_contains() {
        let input = lines(&[
            "A Chest", "From: A", "Source: Crypt",
            "B Chest", "From: B", "Source: Crypt",
            "C Chest", "From: C", "Source: Crypt", "Contains: Gems",
        ]);

        let seg = ChestBoxSegmenter::new(LookaheadScope::Box).segment(&input);
        let widths: Vec<usize> = seg.boxes.iter().map(ChestBox::len).collect();
        assert_eq!(widths, vec![3, 3, 4]);
    }

    #[test]
    fn test_remaining_scope_scans_to_end() {
        let input = lines(&[
            "A Chest", "From: A", "Source: Crypt",
            "B Chest", "From: B", "Source: Crypt", "Contains: Gems",
        ]);

        let seg = ChestBoxSegmenter::new(LookaheadScope::Remaining).segment(&input);
        assert_eq!(seg.boxes.len(), 1);
        assert_eq!(seg.boxes[0].lines()[3], "B Chest");
        let underrun = seg.underrun.unwrap();
        assert_eq!(underrun.offset, 4);
        assert_eq!(underrun.required, 4);
        assert_eq!(underrun.lines.len(), 3);
    }

    #[test]
    fn test_short_tail_is_underrun() {
        let input = lines(&["Epic Chest", "From: Bob", "Source: Crypt", "Rare Chest", "From: Alice"]);

        let seg = ChestBoxSegmenter::default().segment(&input);
        assert_eq!(seg.boxes.len(), 1);
        let underrun = seg.underrun.unwrap();
        assert_eq!(underrun.lines, lines(&["Rare Chest", "From: Alice"]));
        assert_eq!(underrun.required, 3);
    }

    #[test]
    fn test_empty_input() {
        let seg = ChestBoxSegmenter::default().segment(&[]);
        assert!(seg.boxes.is_empty());
        assert!(seg.underrun.is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn line() -> impl Strategy<Value = String> {
            prop_oneof![
                Just("Epic Chest".to_string()),
                Just("From: Bob".to_string()),
                Just("Source: Level 5 Crypt".to_string()),
                Just("Contains: Gems".to_string()),
            ]
        }

        proptest! {
            #[test]
            fn width_is_four_iff_box_slice_has_contains(input in prop::collection::vec(line(), 0..30)) {
                let seg = ChestBoxSegmenter::new(LookaheadScope::Box).segment(&input);
                let mut offset = 0;
                for chest_box in &seg.boxes {
                    let window_end = (offset + EXPIRED_BOX_WIDTH).min(input.len());
                    let has_contains = input[offset..window_end]
                        .iter()
                        .any(|l| l.starts_with(CONTAINS_MARKER));
                    prop_assert_eq!(chest_box.len() == EXPIRED_BOX_WIDTH, has_contains);
                    prop_assert_eq!(chest_box.lines(), &input[offset..offset + chest_box.len()]);
                    offset += chest_box.len();
                }
                let leftover = seg.underrun.map(|u| u.lines.len()).unwrap_or(0);
                prop_assert_eq!(offset + leftover, input.len());
            }
        }
    }
}
