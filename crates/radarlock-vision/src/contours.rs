// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! External contour extraction and shape metrics
//!
//! Foreground pixels are grouped into 8-connected components. Each
//! component's outer boundary is traced with Moore-neighbour tracing starting
//! from its first pixel in raster order, so contours come out in raster-scan
//! order of their top-left pixel.

use ndarray::Array2;
use std::f64::consts::PI;

use crate::color::Mask;

/// Clockwise neighbour offsets (x, y) with y pointing down: E, SE, S, SW, W, NW, N, NE
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];
const WEST: usize = 4;

/// Closed outer boundary of one connected component, pixel centers as (x, y)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<(i32, i32)>,
}

/// Area, perimeter and centroid of a contour polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourMetrics {
    pub area: f64,
    pub perimeter: f64,
    pub centroid: (f64, f64),
}

impl ContourMetrics {
    pub fn from_contour(contour: &Contour) -> Self {
        let points = &contour.points;
        let n = points.len();

        let mut twice_area = 0.0;
        let mut cx_acc = 0.0;
        let mut cy_acc = 0.0;
        let mut perimeter = 0.0;

        for i in 0..n {
            let (x0, y0) = (points[i].0 as f64, points[i].1 as f64);
            let (x1, y1) = (points[(i + 1) % n].0 as f64, points[(i + 1) % n].1 as f64);
            let cross = x0 * y1 - x1 * y0;
            twice_area += cross;
            cx_acc += (x0 + x1) * cross;
            cy_acc += (y0 + y1) * cross;
            perimeter += ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        }

        let centroid = if twice_area.abs() > f64::EPSILON {
            (cx_acc / (3.0 * twice_area), cy_acc / (3.0 * twice_area))
        } else if n > 0 {
            // Degenerate polygon (line or single pixel): average the points
            let sx: f64 = points.iter().map(|p| p.0 as f64).sum();
            let sy: f64 = points.iter().map(|p| p.1 as f64).sum();
            (sx / n as f64, sy / n as f64)
        } else {
            (0.0, 0.0)
        };

        ContourMetrics {
            area: twice_area.abs() / 2.0,
            perimeter,
            centroid,
        }
    }

    /// `4*pi*area / perimeter^2`, 1.0 for a perfect circle, 0.0 if the perimeter is zero
    pub fn circularity(&self) -> f64 {
        if self.perimeter <= 0.0 {
            return 0.0;
        }
        4.0 * PI * self.area / (self.perimeter * self.perimeter)
    }
}

/// Accepts blob-shaped contours inside an exclusive area band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourFilter {
    pub min_area: f64,
    pub max_area: f64,
    pub min_circularity: f64,
}

impl ContourFilter {
    pub fn accepts(&self, metrics: &ContourMetrics) -> bool {
        metrics.area > self.min_area
            && metrics.area < self.max_area
            && metrics.perimeter > 0.0
            && metrics.circularity() > self.min_circularity
    }
}

/// Outer boundaries of all 8-connected foreground components
pub fn find_external_contours(mask: &Mask) -> Vec<Contour> {
    let (height, width) = mask.dim();
    let mut visited = Array2::<bool>::from_elem((height, width), false);
    let mut contours = Vec::new();
    let mut stack = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if !mask[[y, x]] || visited[[y, x]] {
                continue;
            }

            // Flood-fill the component so its interior is never a start pixel
            visited[[y, x]] = true;
            stack.push((x, y));
            while let Some((px, py)) = stack.pop() {
                for (dx, dy) in DIRECTIONS {
                    let nx = px as i64 + dx as i64;
                    let ny = py as i64 + dy as i64;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let (nx, ny) = (nx as usize, ny as usize);
                    if mask[[ny, nx]] && !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        stack.push((nx, ny));
                    }
                }
            }

            contours.push(trace_boundary(mask, (x as i32, y as i32)));
        }
    }

    contours
}

fn is_foreground(mask: &Mask, x: i32, y: i32) -> bool {
    let (height, width) = mask.dim();
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height && mask[[y as usize, x as usize]]
}

/// Moore-neighbour trace with Jacob's stopping criterion
///
/// `start` must be the component's first pixel in raster order, so its west
/// neighbour is background.
fn trace_boundary(mask: &Mask, start: (i32, i32)) -> Contour {
    let mut points = vec![start];
    let mut current = start;
    let mut backtrack = WEST;
    let mut first_move: Option<usize> = None;

    loop {
        let next = (1..=8)
            .map(|k| (backtrack + k) % 8)
            .find(|&d| is_foreground(mask, current.0 + DIRECTIONS[d].0, current.1 + DIRECTIONS[d].1));

        let Some(direction) = next else {
            break; // isolated pixel
        };

        if current == start {
            match first_move {
                None => first_move = Some(direction),
                Some(first) if first == direction => break,
                Some(_) => {}
            }
        }

        current = (current.0 + DIRECTIONS[direction].0, current.1 + DIRECTIONS[direction].1);
        points.push(current);
        // Background pixel examined just before `direction`, seen from the new pixel
        backtrack = if direction % 2 == 0 {
            (direction + 6) % 8
        } else {
            (direction + 5) % 8
        };
    }

    if points.len() > 1 && points.last() == Some(&start) {
        points.pop();
    }

    Contour { points }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(rows: &[&str]) -> Mask {
        let height = rows.len();
        let width = rows[0].len();
        let values: Vec<bool> = rows.iter().flat_map(|r| r.chars().map(|c| c == '#')).collect();
        Array2::from_shape_vec((height, width), values).unwrap()
    }

    fn disk_mask(size: usize, cx: f64, cy: f64, radius: f64) -> Mask {
        Array2::from_shape_fn((size, size), |(y, x)| {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            dx * dx + dy * dy <= radius * radius
        })
    }

    #[test]
    fn test_single_pixel() {
        let contours = find_external_contours(&mask_from(&["...", ".#.", "..."]));
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points, vec![(1, 1)]);
        let metrics = ContourMetrics::from_contour(&contours[0]);
        assert_eq!(metrics.area, 0.0);
        assert_eq!(metrics.perimeter, 0.0);
        assert_eq!(metrics.centroid, (1.0, 1.0));
    }

    #[test]
    fn test_square_boundary() {
        let contours = find_external_contours(&mask_from(&[".....", ".###.", ".###.", ".###.", "....."]));
        assert_eq!(contours.len(), 1);
        assert_eq!(
            contours[0].points,
            vec![(1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (2, 3), (1, 3), (1, 2)]
        );
        let metrics = ContourMetrics::from_contour(&contours[0]);
        assert_eq!(metrics.area, 4.0);
        assert_eq!(metrics.perimeter, 8.0);
        assert_eq!(metrics.centroid, (2.0, 2.0));
    }

    #[test]
    fn test_horizontal_line() {
        let contours = find_external_contours(&mask_from(&["###"]));
        assert_eq!(contours[0].points, vec![(0, 0), (1, 0), (2, 0), (1, 0)]);
        let metrics = ContourMetrics::from_contour(&contours[0]);
        assert_eq!(metrics.area, 0.0);
        assert_eq!(metrics.perimeter, 4.0);
    }

    #[test]
    fn test_diagonal_pixels_are_connected() {
        let contours = find_external_contours(&mask_from(&["#..", ".#.", "..#"]));
        assert_eq!(contours.len(), 1);
    }

    #[test]
    fn test_components_in_raster_order() {
        let contours = find_external_contours(&mask_from(&["....##", "......", "##....", "##...."]));
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points[0], (4, 0));
        assert_eq!(contours[1].points[0], (0, 2));
    }

    #[test]
    fn test_hole_is_not_a_contour() {
        let contours = find_external_contours(&mask_from(&["#####", "#...#", "#...#", "#####"]));
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 14);
    }

    #[test]
    fn test_disk_is_circular() {
        let mask = disk_mask(40, 20.0, 20.0, 8.0);
        let contours = find_external_contours(&mask);
        assert_eq!(contours.len(), 1);
        let metrics = ContourMetrics::from_contour(&contours[0]);
        assert!(metrics.area > 150.0 && metrics.area < 220.0, "area {}", metrics.area);
        assert!(metrics.circularity() > 0.7, "circularity {}", metrics.circularity());
        assert!((metrics.centroid.0 - 20.0).abs() < 0.5);
        assert!((metrics.centroid.1 - 20.0).abs() < 0.5);
    }

    #[test]
    fn test_filter_band_and_circularity() {
        let filter = ContourFilter {
            min_area: 40.0,
            max_area: 600.0,
            min_circularity: 0.6,
        };
        // Perimeter chosen so circularity = 1.0 and 0.3 respectively
        let perimeter_for = |area: f64, circularity: f64| (4.0 * PI * area / circularity).sqrt();
        let metrics = |area: f64, circularity: f64| ContourMetrics {
            area,
            perimeter: perimeter_for(area, circularity),
            centroid: (0.0, 0.0),
        };

        assert!(filter.accepts(&metrics(300.0, 1.0)));
        assert!(!filter.accepts(&metrics(300.0, 0.3)));
        assert!(!filter.accepts(&metrics(20.0, 1.0)));
        assert!(!filter.accepts(&metrics(1000.0, 1.0)));
        assert!(!filter.accepts(&metrics(40.0, 1.0)));
        assert!(!filter.accepts(&ContourMetrics {
            area: 300.0,
            perimeter: 0.0,
            centroid: (0.0, 0.0)
        }));
    }
}
