use orders_core::Position;

/// Offset of the `index`-th member of a formation around its shared goal.
///
/// Members walk an outward square spiral: `0` stays on the goal, `1..=8`
/// fill the first ring starting east and turning counter-clockwise, and so on.
pub fn spiral_offset(index: usize) -> Position {
    let (mut x, mut y) = (0i32, 0i32);
    let (mut dx, mut dy) = (1i32, 0i32);
    let mut leg = 1;
    let mut walked = 0;
    let mut turns = 0;

    for _ in 0..index {
        x += dx;
        y += dy;
        walked += 1;
        if walked == leg {
            walked = 0;
            (dx, dy) = (-dy, dx);
            turns += 1;
            if turns % 2 == 0 {
                leg += 1;
            }
        }
    }
    Position::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ring_circles_the_goal() {
        let ring: Vec<_> = (0..10).map(spiral_offset).collect();
        assert_eq!(
            ring,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
                Position::new(-1, 1),
                Position::new(-1, 0),
                Position::new(-1, -1),
                Position::new(0, -1),
                Position::new(1, -1),
                Position::new(2, -1),
            ]
        );
    }

    #[test]
    fn offsets_never_collide() {
        let offsets: std::collections::BTreeSet<_> = (0..49).map(spiral_offset).collect();
        assert_eq!(offsets.len(), 49);
    }
}
