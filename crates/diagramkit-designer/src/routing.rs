//! Orthogonal connector routing.

use diagramkit_core::{Bounds, Direction, Position};

const EPSILON: f64 = 1e-9;

/// Elbow path: halfway horizontally, then vertically, then to the end.
pub fn default_elbow(start: Position, end: Position) -> Vec<Position> {
    let mid_x = (start.x + end.x) / 2.0;
    vec![
        start,
        Position::new(mid_x, start.y),
        Position::new(mid_x, end.y),
        end,
    ]
}

/// Snaps a direction to its dominant axis (`(±1, 0)`, `(0, ±1)` or zero).
fn axis(dir: Direction) -> (f64, f64) {
    if dir.is_none() {
        (0.0, 0.0)
    } else if dir.is_horizontal() {
        (dir.dx.signum(), 0.0)
    } else {
        (0.0, dir.dy.signum())
    }
}

/// Orthogonal path that leaves `start` along `start_dir` and enters `end`
/// against `end_dir` (both outward anchor directions), stepping `stub`
/// units clear of each shape before turning.
///
/// When the path would reach `end` from the side its anchor faces away
/// from, it detours around `target` (the end shape's bounds, if known).
///
/// `center` anchors have no direction and get no stub.
pub fn route_orthogonal(
    start: Position,
    start_dir: Direction,
    end: Position,
    end_dir: Direction,
    target: Option<Bounds>,
    stub: f64,
) -> Vec<Position> {
    let (sdx, sdy) = axis(start_dir);
    let (edx, edy) = axis(end_dir);
    let s_out = start.offset(sdx * stub, sdy * stub);
    let e_in = end.offset(edx * stub, edy * stub);

    let start_vertical = sdy != 0.0;
    let end_vertical = edy != 0.0;
    let end_horizontal = edx != 0.0;
    // target sits on the far side of the exit direction
    let behind = (e_in.x - s_out.x) * sdx + (e_in.y - s_out.y) * sdy < 0.0;

    let mid_x = (s_out.x + e_in.x) / 2.0;
    let mid_y = (s_out.y + e_in.y) / 2.0;
    let via_mid_x = || {
        vec![
            Position::new(mid_x, s_out.y),
            Position::new(mid_x, e_in.y),
        ]
    };
    let via_mid_y = || {
        vec![
            Position::new(s_out.x, mid_y),
            Position::new(e_in.x, mid_y),
        ]
    };
    let horizontal_first = || vec![Position::new(e_in.x, s_out.y)];
    let vertical_first = || vec![Position::new(s_out.x, e_in.y)];

    // approach from behind the target: go around it
    let wrong_side = (s_out.x - e_in.x) * edx + (s_out.y - e_in.y) * edy < 0.0;

    let middle = if wrong_side {
        around_target(s_out, e_in, end, end_vertical, target, stub)
    } else if start_vertical {
        match (end_horizontal, behind) {
            (true, true) => horizontal_first(),
            (true, false) => vertical_first(),
            (false, true) => via_mid_x(),
            (false, false) => via_mid_y(),
        }
    } else if end_vertical {
        if behind {
            vertical_first()
        } else {
            horizontal_first()
        }
    } else if behind {
        via_mid_y()
    } else {
        via_mid_x()
    };

    let mut points = Vec::with_capacity(middle.len() + 4);
    points.push(start);
    points.push(s_out);
    points.extend(middle);
    points.push(e_in);
    points.push(end);
    simplify(points)
}

/// Two corners on a line parallel to the end direction, clear of `target`
/// by `stub` on the side nearer to `s_out`.
fn around_target(
    s_out: Position,
    e_in: Position,
    end: Position,
    end_vertical: bool,
    target: Option<Bounds>,
    stub: f64,
) -> Vec<Position> {
    let (center, half) = match target {
        Some(b) if end_vertical => (b.x + b.width / 2.0, b.width / 2.0),
        Some(b) => (b.y + b.height / 2.0, b.height / 2.0),
        None if end_vertical => (end.x, 0.0),
        None => (end.y, 0.0),
    };
    let from = if end_vertical { s_out.x } else { s_out.y };
    let clearance = half + stub;
    let detour = if from > center {
        from.max(center + clearance)
    } else {
        from.min(center - clearance)
    };

    if end_vertical {
        vec![Position::new(detour, s_out.y), Position::new(detour, e_in.y)]
    } else {
        vec![Position::new(s_out.x, detour), Position::new(e_in.x, detour)]
    }
}

/// Drops repeated points and interior points that continue a straight run.
pub fn simplify(points: Vec<Position>) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::with_capacity(points.len());
    for p in points {
        if out
            .last()
            .is_some_and(|last| last.distance_to(&p) < EPSILON)
        {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let (abx, aby) = (b.x - a.x, b.y - a.y);
            let (bcx, bcy) = (p.x - b.x, p.y - b.y);
            let cross = abx * bcy - aby * bcx;
            let dot = abx * bcx + aby * bcy;
            if cross.abs() < EPSILON && dot > 0.0 {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}
