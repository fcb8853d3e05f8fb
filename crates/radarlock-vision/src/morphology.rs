// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Binary morphology with rectangular structuring elements
//!
//! Rectangles are separable, so every operation is a horizontal pass
//! followed by a vertical pass, each a sliding-window count over one line.
//! The anchor sits at the kernel center. Outside the image, dilation sees
//! background and erosion ignores the missing pixels, so borders neither
//! grow nor shrink shapes.

use ndarray::{ArrayView1, ArrayViewMut1, Zip};

use crate::color::Mask;
use crate::error::{VisionError, VisionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOp {
    Dilate,
    Erode,
}

fn check_kernel(width: usize, height: usize) -> VisionResult<()> {
    if width == 0 || height == 0 {
        return Err(VisionError::InvalidKernel { width, height });
    }
    Ok(())
}

pub fn dilate(mask: &Mask, kernel_width: usize, kernel_height: usize) -> VisionResult<Mask> {
    check_kernel(kernel_width, kernel_height)?;
    Ok(apply_rect(mask, kernel_width, kernel_height, LineOp::Dilate))
}

pub fn erode(mask: &Mask, kernel_width: usize, kernel_height: usize) -> VisionResult<Mask> {
    check_kernel(kernel_width, kernel_height)?;
    Ok(apply_rect(mask, kernel_width, kernel_height, LineOp::Erode))
}

/// Morphological closing (dilate then erode): fills gaps narrower than the kernel
pub fn close(mask: &Mask, kernel_width: usize, kernel_height: usize) -> VisionResult<Mask> {
    check_kernel(kernel_width, kernel_height)?;
    let dilated = apply_rect(mask, kernel_width, kernel_height, LineOp::Dilate);
    Ok(apply_rect(&dilated, kernel_width, kernel_height, LineOp::Erode))
}

fn apply_rect(mask: &Mask, kernel_width: usize, kernel_height: usize, op: LineOp) -> Mask {
    let mut current = mask.clone();

    if kernel_width > 1 {
        let mut next = Mask::from_elem(current.raw_dim(), false);
        Zip::from(next.rows_mut())
            .and(current.rows())
            .par_for_each(|out, line| apply_line(line, out, kernel_width, op));
        current = next;
    }

    if kernel_height > 1 {
        let mut next = Mask::from_elem(current.raw_dim(), false);
        Zip::from(next.columns_mut())
            .and(current.columns())
            .par_for_each(|out, line| apply_line(line, out, kernel_height, op));
        current = next;
    }

    current
}

fn apply_line(input: ArrayView1<bool>, mut output: ArrayViewMut1<bool>, size: usize, op: LineOp) {
    let n = input.len();
    let anchor = size / 2;

    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0usize);
    for &v in input.iter() {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + v as usize);
    }

    for i in 0..n {
        let lo = i.saturating_sub(anchor);
        let hi = (i + size - anchor).min(n);
        let count = prefix[hi] - prefix[lo];
        output[i] = match op {
            LineOp::Dilate => count > 0,
            LineOp::Erode => count == hi - lo,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn row(bits: &str) -> Mask {
        let values: Vec<bool> = bits.chars().map(|c| c == '#').collect();
        Array2::from_shape_vec((1, values.len()), values).unwrap()
    }

    fn render(mask: &Mask) -> String {
        mask.iter().map(|&b| if b { '#' } else { '.' }).collect()
    }

    #[test]
    fn test_closing_bridges_small_gaps() {
        let mask = row("##...##.........##");
        let closed = close(&mask, 5, 1).unwrap();
        assert_eq!(render(&closed), "#######.........##");
    }

    #[test]
    fn test_closing_keeps_border_pixels() {
        let mask = row("#.......#");
        let closed = close(&mask, 3, 1).unwrap();
        assert_eq!(render(&closed), "#.......#");
    }

    #[test]
    fn test_dilate_and_erode_single_line() {
        let mask = row("...#...");
        assert_eq!(render(&dilate(&mask, 3, 1).unwrap()), "..###..");
        assert_eq!(render(&erode(&row("..###.."), 3, 1).unwrap()), "...#...");
    }

    #[test]
    fn test_vertical_kernel() {
        let mut mask = Mask::from_elem((5, 1), false);
        mask[[0, 0]] = true;
        mask[[2, 0]] = true;
        let closed = close(&mask, 1, 3).unwrap();
        assert_eq!(render(&closed), "###..");
    }

    #[test]
    fn test_closing_is_extensive() {
        let mask = row("#.#..#...#....#");
        let closed = close(&mask, 25, 1).unwrap();
        for (before, after) in mask.iter().zip(closed.iter()) {
            assert!(!before || *after);
        }
    }

    #[test]
    fn test_identity_kernel_and_invalid_kernel() {
        let mask = row("#.#");
        assert_eq!(close(&mask, 1, 1).unwrap(), mask);
        assert!(matches!(close(&mask, 0, 1), Err(VisionError::InvalidKernel { .. })));
    }
}
