use crate::{Cell, Coords};
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Still,
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> Coords {
        match self {
            Still => (0, 0),
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Still => Still,
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// True when both directions move along the same axis. `Still` has no axis.
    pub fn is_colinear(self, other: Direction) -> bool {
        match (self, other) {
            (Up, Up) | (Up, Down) | (Down, Up) | (Down, Down) => true,
            (Left, Left) | (Left, Right) | (Right, Left) | (Right, Right) => true,
            _ => false,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum MoveResult {
    Moved { new_head: Coords, old_tail: Option<Coords> },
    HitWall { at: Coords },
    HitSelf { at: Coords },
}

#[derive(Clone, Debug)]
pub struct Snake {
    body: Vec<Coords>,
}

impl Snake {
    pub fn new(pos: Coords) -> Self {
        Snake { body: vec![pos] }
    }

    /// Builds a snake from explicit segments, head first. `None` for an
    /// empty body.
    pub fn from_segments(body: Vec<Coords>) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Snake { body })
    }

    pub fn body(&self) -> &[Coords] {
        &self.body
    }

    pub fn head(&self) -> Coords {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: &Coords) -> bool {
        self.body.contains(pos)
    }

    /// Advances one cell in `direction` on a `grid_count` square board.
    /// The tail is kept when `grow` is set.
    pub fn move_step(&mut self, direction: Direction, grid_count: Cell, grow: impl FnOnce(Coords) -> bool) -> MoveResult {
        let (dx, dy) = direction.delta();
        let old_head = self.head();
        let new_head = (old_head.0 + dx, old_head.1 + dy);

        if new_head.0 < 0 || new_head.1 < 0 || new_head.0 >= grid_count || new_head.1 >= grid_count {
            return HitWall { at: new_head };
        }
        if self.body.contains(&new_head) {
            return HitSelf { at: new_head };
        }

        self.body.insert(0, new_head);

        if grow(new_head) {
            Moved { new_head, old_tail: None }
        } else {
            let old_tail = self.body.pop();
            Moved { new_head, old_tail }
        }
    }

    pub fn head_char(direction: Direction) -> char {
        match direction {
            Still => '■',
            Up => '▲',
            Down => '▼',
            Left => '◀',
            Right => '▶',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colinear_is_axis_based() {
        assert!(Up.is_colinear(Down));
        assert!(Left.is_colinear(Left));
        assert!(!Up.is_colinear(Left));
        assert!(!Still.is_colinear(Up));
        assert!(!Right.is_colinear(Still));
    }

    #[test]
    fn opposites() {
        assert_eq!(Up.opposite(), Down);
        assert_eq!(Left.opposite(), Right);
        assert_eq!(Still.opposite(), Still);
    }

    #[test]
    fn empty_body_is_not_a_snake() {
        assert!(Snake::from_segments(vec![]).is_none());
        assert_eq!(Snake::from_segments(vec![(1, 2)]).map(|s| s.head()), Some((1, 2)));
    }

    #[test]
    fn moving_without_growth_keeps_length() {
        let mut snake = Snake::from_segments(vec![(5, 5), (4, 5), (3, 5)]).unwrap();
        let res = snake.move_step(Right, 20, |_| false);
        assert_eq!(res, Moved { new_head: (6, 5), old_tail: Some((3, 5)) });
        assert_eq!(snake.body(), &[(6, 5), (5, 5), (4, 5)]);
    }

    #[test]
    fn growth_keeps_the_tail() {
        let mut snake = Snake::new((0, 0));
        let res = snake.move_step(Down, 20, |_| true);
        assert_eq!(res, Moved { new_head: (0, 1), old_tail: None });
        assert_eq!(snake.len(), 2);
    }

    #[test]
    fn walls_on_every_side() {
        for (pos, dir) in [((0, 3), Left), ((19, 3), Right), ((3, 0), Up), ((3, 19), Down)].iter() {
            let mut snake = Snake::new(*pos);
            assert!(matches!(snake.move_step(*dir, 20, |_| false), HitWall { .. }));
            assert_eq!(snake.body(), &[*pos]);
        }
    }

    #[test]
    fn running_into_the_body_is_a_crash() {
        // Head at (2,2) turning up into (2,1), which is part of the body.
        let mut snake = Snake::from_segments(vec![(2, 2), (3, 2), (3, 1), (2, 1), (1, 1)]).unwrap();
        assert_eq!(snake.move_step(Up, 20, |_| false), HitSelf { at: (2, 1) });
    }
}
