use rand::{seq::SliceRandom, Rng};

use crate::snake::{Cell, Snake};

/// Every grid-aligned cell that fits entirely inside a `width` x `height`
/// surface.
pub fn grid_cells(cell: i32, width: i32, height: i32) -> Vec<Cell> {
    let (cols, rows) = (width / cell, height / cell);
    (0..rows)
        .flat_map(|row| (0..cols).map(move |col| Cell::new(col * cell, row * cell)))
        .collect()
}

/// Picks a random free cell for the next apple.
///
/// Chooses uniformly among the cells the snake does not cover, so it always
/// terminates. Returns `None` once the snake fills the whole grid.
pub fn place_apple<R: Rng + ?Sized>(
    snake: &Snake,
    cell: i32,
    width: i32,
    height: i32,
    rng: &mut R,
) -> Option<Cell> {
    let free: Vec<Cell> = grid_cells(cell, width, height)
        .into_iter()
        .filter(|pos| !snake.contains(pos))
        .collect();

    free.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_grid_cells() {
        let cells = grid_cells(20, 60, 40);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[5], Cell::new(40, 20));

        // A partial column at the right edge is not part of the grid.
        assert_eq!(grid_cells(20, 70, 20).len(), 3);
    }

    #[test]
    fn test_never_on_snake() {
        let mut rng = StdRng::seed_from_u64(7);
        let snake = Snake::initial(20, 100, 100).unwrap();

        for _ in 0..500 {
            let apple = place_apple(&snake, 20, 100, 100, &mut rng).unwrap();
            assert!(!snake.contains(&apple));
            assert_eq!(apple.x % 20, 0);
            assert_eq!(apple.y % 20, 0);
            assert!((0..100).contains(&apple.x) && (0..100).contains(&apple.y));
        }
    }

    #[test]
    fn test_last_free_cell() {
        let mut rng = StdRng::seed_from_u64(1);
        let body = vec![Cell::new(0, 0), Cell::new(20, 0), Cell::new(20, 20)];
        let snake = Snake::from_cells(body).unwrap();

        for _ in 0..20 {
            assert_eq!(place_apple(&snake, 20, 40, 40, &mut rng), Some(Cell::new(0, 20)));
        }
    }

    #[test]
    fn test_full_board() {
        let mut rng = StdRng::seed_from_u64(1);
        let snake = Snake::from_cells(grid_cells(20, 40, 40)).unwrap();
        assert_eq!(place_apple(&snake, 20, 40, 40, &mut rng), None);
    }
}
