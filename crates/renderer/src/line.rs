//! Line rasterization for overlay maps.

use map_common::EmbarkPoint;

use crate::canvas::DenseBuffer;
use crate::palette::LineStyle;

/// Integer Bresenham walk from `from` to `to`, both ends included.
pub fn line_points(from: EmbarkPoint, to: EmbarkPoint) -> Vec<EmbarkPoint> {
    let (x0, y0) = (from.x as i64, from.y as i64);
    let (x1, y1) = (to.x as i64, to.y as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    let mut points = Vec::with_capacity(dx.max(-dy) as usize + 1);
    loop {
        points.push(EmbarkPoint::new(x as u32, y as u32));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Draw a thick line between two embark pixels.
pub fn draw_thick_line(buffer: &mut DenseBuffer, from: EmbarkPoint, to: EmbarkPoint, style: LineStyle) {
    for point in line_points(from, to) {
        buffer.write_thick_line_point(point, style.center, style.border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use map_common::WorldDims;

    fn pt(x: u32, y: u32) -> EmbarkPoint {
        EmbarkPoint::new(x, y)
    }

    #[test]
    fn test_single_point_line() {
        assert_eq!(line_points(pt(3, 4), pt(3, 4)), vec![pt(3, 4)]);
    }

    #[test]
    fn test_horizontal_and_vertical() {
        assert_eq!(line_points(pt(0, 2), pt(3, 2)), vec![pt(0, 2), pt(1, 2), pt(2, 2), pt(3, 2)]);
        assert_eq!(line_points(pt(5, 3), pt(5, 0)), vec![pt(5, 3), pt(5, 2), pt(5, 1), pt(5, 0)]);
    }

    #[test]
    fn test_diagonal() {
        assert_eq!(line_points(pt(0, 0), pt(3, 3)), vec![pt(0, 0), pt(1, 1), pt(2, 2), pt(3, 3)]);
    }

    #[test]
    fn test_steep_line_is_connected() {
        let points = line_points(pt(2, 1), pt(7, 20));
        assert_eq!(points.first(), Some(&pt(2, 1)));
        assert_eq!(points.last(), Some(&pt(7, 20)));
        for pair in points.windows(2) {
            let dx = (pair[1].x as i64 - pair[0].x as i64).abs();
            let dy = (pair[1].y as i64 - pair[0].y as i64).abs();
            assert!(dx <= 1 && dy <= 1);
        }
        assert_eq!(points.len(), 20);
    }

    #[test]
    fn test_thick_line_keeps_centers() {
        let mut buf = DenseBuffer::new(WorldDims::new(2, 2).unwrap()).unwrap();
        let style = LineStyle {
            center: Rgb::new(250, 200, 0),
            border: Rgb::BLACK,
        };
        draw_thick_line(&mut buf, pt(2, 2), pt(20, 9), style);
        for point in line_points(pt(2, 2), pt(20, 9)) {
            assert_eq!(buf.rgb_at(point.x, point.y), Some(style.center));
        }
    }
}
