// Plotting-surface geometry on kurbo, plus the relative path commands renderers consume

pub use kurbo::{Affine, BezPath, PathEl, Point, Rect, Size, Vec2};

/// One step of an outline. Lowercase SVG semantics: everything except
/// `MoveTo` is relative to the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineBy(f64, f64),
    HorizontalBy(f64),
    VerticalBy(f64),
    Close,
}

/// Resolve relative commands into an absolute kurbo path.
///
/// Drawing before any `MoveTo` starts at the surface origin.
pub fn to_bez_path(commands: &[PathCommand]) -> BezPath {
    let mut path = BezPath::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;

    for command in commands {
        if path.elements().is_empty() && !matches!(command, PathCommand::MoveTo(..)) {
            path.move_to(current);
        }
        match *command {
            PathCommand::MoveTo(x, y) => {
                current = Point::new(x, y);
                start = current;
                path.move_to(current);
            }
            PathCommand::LineBy(dx, dy) => {
                current += Vec2::new(dx, dy);
                path.line_to(current);
            }
            PathCommand::HorizontalBy(dx) => {
                current.x += dx;
                path.line_to(current);
            }
            PathCommand::VerticalBy(dy) => {
                current.y += dy;
                path.line_to(current);
            }
            PathCommand::Close => {
                current = start;
                path.close_path();
            }
        }
    }

    path
}

/// Absolute polylines, one per subpath.
///
/// A closed subpath ends with its starting vertex repeated.
pub fn path_vertices(commands: &[PathCommand]) -> Vec<Vec<Point>> {
    let mut subpaths: Vec<Vec<Point>> = Vec::new();
    let mut start = Point::ZERO;

    for el in to_bez_path(commands).elements() {
        let vertex = match *el {
            PathEl::MoveTo(p) => {
                start = p;
                subpaths.push(vec![p]);
                continue;
            }
            PathEl::LineTo(p) => p,
            PathEl::ClosePath => start,
            // only straight segments are ever built
            PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => p,
        };
        if let Some(points) = subpaths.last_mut() {
            points.push(vertex);
        }
    }

    subpaths
}

/// Rotation by `degrees` clockwise on screen (y grows downwards) around `pivot`
pub fn rotation_about(degrees: f64, pivot: Point) -> Affine {
    Affine::rotate_about(degrees.to_radians(), pivot)
}

/// Non-uniform scale that keeps `pivot` fixed
pub fn scale_about(sx: f64, sy: f64, pivot: Point) -> Affine {
    let offset = pivot.to_vec2();
    Affine::translate(offset) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-offset)
}

/// Top-left, top-right, bottom-right, bottom-left
pub fn corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Smallest box containing every point, `None` for an empty iterator
pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p)))
}
