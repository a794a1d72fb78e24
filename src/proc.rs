use log::{debug, info, trace};
use rand::Rng;

use crate::error::{Error, Result};
use crate::grid::Grid;

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A Life board together with its edge policy.
///
/// On a torus every coordinate wraps onto the board; on a bounded board
/// coordinates outside it are invalid and neighbors past the edge simply do
/// not exist.
#[derive(Clone, Debug)]
pub struct Simulation {
    rows: usize,
    cols: usize,
    on_torus: bool,
    board: Grid,
    generation: u64,
    settled: bool,
}

impl Simulation {
    /// All-dead board.
    pub fn new(rows: usize, cols: usize, on_torus: bool) -> Result<Self> {
        let board = Grid::new(rows, cols)?;
        debug!("new {}x{} board, torus: {}", rows, cols, on_torus);
        Ok(Self::with_board(board, on_torus))
    }

    /// Board read from text; see `Grid::from_pattern` for the format.
    pub fn from_pattern(s: &str, on_torus: bool) -> Result<Self> {
        Ok(Self::from_grid(Grid::from_pattern(s)?, on_torus))
    }

    /// Wraps an already-built board.
    pub fn from_grid(board: Grid, on_torus: bool) -> Self {
        debug!(
            "{}x{} board with {} live cells, torus: {}",
            board.rows(),
            board.cols(),
            board.count_alive(),
            on_torus
        );
        Self::with_board(board, on_torus)
    }

    fn with_board(board: Grid, on_torus: bool) -> Self {
        Simulation {
            rows: board.rows(),
            cols: board.cols(),
            on_torus,
            board,
            generation: 0,
            settled: false,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn on_torus(&self) -> bool {
        self.on_torus
    }

    /// Completed generations since the last reseed.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once an `advance` left the board exactly as it was.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    #[inline]
    pub fn board(&self) -> &Grid {
        &self.board
    }

    /// Reseeds every cell, each alive with probability `p`.
    pub fn randomize(&mut self, p: f64) -> Result<()> {
        self.randomize_with(p, &mut rand::thread_rng())
    }

    pub fn randomize_with<R: Rng + ?Sized>(&mut self, p: f64, rng: &mut R) -> Result<()> {
        if !(p > 0.0 && p < 1.0) {
            return Err(Error::InvalidProbability(p));
        }

        let board = self.board.map(|_, _, _| rng.gen_bool(p));
        self.reseed(board);
        debug!(
            "randomized with p = {}: {} of {} cells alive",
            p,
            self.count_alive(),
            self.rows * self.cols
        );
        Ok(())
    }

    /// Kills every cell.
    pub fn clear(&mut self) -> Result<()> {
        self.reseed(Grid::new(self.rows, self.cols)?);
        Ok(())
    }

    fn reseed(&mut self, board: Grid) {
        self.board = board;
        self.generation = 0;
        self.settled = false;
    }

    /// Maps a coordinate onto the board under the edge policy.
    fn resolve(&self, row: isize, col: isize) -> (isize, isize) {
        if self.on_torus {
            (
                row.rem_euclid(self.rows as isize),
                col.rem_euclid(self.cols as isize),
            )
        } else {
            (row, col)
        }
    }

    pub fn get(&self, row: isize, col: isize) -> Result<bool> {
        let (r, c) = self.resolve(row, col);
        self.board.get(r, c)
    }

    pub fn set(&mut self, row: isize, col: isize, value: bool) -> Result<()> {
        let (r, c) = self.resolve(row, col);
        self.board.set(r, c, value)
    }

    /// Live cells among the eight around `(row, col)`. Only canonical
    /// coordinates are accepted, whatever the topology.
    pub fn count_neighbors(&self, row: isize, col: isize) -> Result<u8> {
        if !self.board.contains(row, col) {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.neighbors(row, col))
    }

    fn neighbors(&self, row: isize, col: isize) -> u8 {
        OFFSETS
            .iter()
            .map(|&(dr, dc)| self.resolve(row + dr, col + dc))
            .filter(|&(r, c)| self.board.get(r, c).unwrap_or(false))
            .count() as u8
    }

    /// Steps one generation under B3/S23. Every next state is computed from
    /// the current board before the new one replaces it.
    pub fn advance(&mut self) {
        let next = self
            .board
            .map(|i, j, alive| Self::produce_value(alive, self.neighbors(i, j)));

        let before = self.has_life();
        self.settled = next == self.board;
        self.board = next;
        self.generation += 1;

        trace!(
            "generation {}: {} alive",
            self.generation,
            self.count_alive()
        );
        if before && !self.has_life() {
            info!("extinct after {} generations", self.generation);
        } else if self.settled && before {
            info!("settled after {} generations", self.generation);
        }
    }

    fn produce_value(current: bool, n: u8) -> bool {
        matches!((current, n), (true, 2) | (true, 3) | (false, 3))
    }

    #[inline]
    pub fn count_alive(&self) -> usize {
        self.board.count_alive()
    }

    #[inline]
    pub fn has_life(&self) -> bool {
        self.count_alive() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn alive_set(s: &Simulation) -> Vec<(isize, isize)> {
        let mut v = vec![];
        for i in 0..s.rows() as isize {
            for j in 0..s.cols() as isize {
                if s.get(i, j).unwrap() {
                    v.push((i, j));
                }
            }
        }
        v
    }

    #[test]
    fn test_fresh_board_is_dead() {
        let s = Simulation::new(6, 9, false).unwrap();
        assert!(!s.has_life());
        assert_eq!(s.generation(), 0);
        assert!(!s.is_settled());
        assert!(alive_set(&s).is_empty());
    }

    #[test]
    fn test_invalid_dimension() {
        assert!(matches!(
            Simulation::new(0, 3, true),
            Err(Error::InvalidDimension { rows: 0, cols: 3 })
        ));
    }

    #[test]
    fn test_invalid_probability() {
        let mut s = Simulation::new(3, 3, false).unwrap();
        for p in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(s.randomize(p), Err(Error::InvalidProbability(_))));
        }
        assert!(!s.has_life());
    }

    #[test]
    fn test_randomize_density() {
        let mut s = Simulation::new(200, 200, false).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        s.randomize_with(0.3, &mut rng).unwrap();
        let frac = s.count_alive() as f64 / 40_000.0;
        assert!((frac - 0.3).abs() < 0.02, "fraction {}", frac);
    }

    #[test]
    fn test_randomize_resets_counters() {
        let mut s = Simulation::from_pattern("##\n##", false).unwrap();
        s.advance();
        assert!(s.is_settled());
        s.randomize(0.5).unwrap();
        assert_eq!(s.generation(), 0);
        assert!(!s.is_settled());
    }

    #[test]
    fn test_torus_wraps() {
        let mut s = Simulation::new(3, 3, true).unwrap();
        s.set(2, 2, true).unwrap();
        assert!(s.get(-1, -1).unwrap());
        s.set(0, 0, true).unwrap();
        assert_eq!(s.get(3, 3).unwrap(), s.get(0, 0).unwrap());
        s.set(-4, 7, true).unwrap();
        assert!(s.get(2, 1).unwrap());
    }

    #[test]
    fn test_bounded_rejects_outside() {
        let mut s = Simulation::new(3, 3, false).unwrap();
        assert!(matches!(s.get(-1, 0), Err(Error::IndexOutOfBounds { .. })));
        assert!(s.get(0, 3).is_err());
        assert!(s.set(3, 3, true).is_err());
        assert!(s.count_neighbors(3, 0).is_err());
    }

    #[test]
    fn test_count_neighbors_canonical_only() {
        let s = Simulation::new(3, 3, true).unwrap();
        assert!(s.count_neighbors(-1, 0).is_err());
        assert!(s.count_neighbors(0, 3).is_err());
        assert_eq!(s.count_neighbors(2, 2), Ok(0));
    }

    #[test]
    fn test_count_neighbors() {
        let lone = Simulation::from_pattern("...\n.#.\n...", false).unwrap();
        assert_eq!(lone.count_neighbors(1, 1), Ok(0));
        assert_eq!(lone.count_neighbors(0, 0), Ok(1));

        let full = Simulation::from_pattern("###\n###\n###", false).unwrap();
        assert_eq!(full.count_neighbors(1, 1), Ok(8));
        assert_eq!(full.count_neighbors(0, 0), Ok(3));
        assert_eq!(full.count_neighbors(0, 1), Ok(5));

        let full = Simulation::from_pattern("###\n###\n###", true).unwrap();
        assert_eq!(full.count_neighbors(0, 0), Ok(8));

        let corners = Simulation::from_pattern("#.#\n...\n#.#", true).unwrap();
        assert_eq!(corners.count_neighbors(0, 0), Ok(3));
        let corners = Simulation::from_pattern("#.#\n...\n#.#", false).unwrap();
        assert_eq!(corners.count_neighbors(0, 0), Ok(0));
    }

    #[test]
    fn test_lone_cell_dies() {
        let mut s = Simulation::new(5, 5, false).unwrap();
        s.set(4, 0, true).unwrap();
        s.advance();
        assert!(!s.has_life());
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn test_birth_and_overcrowding() {
        // Three in an L give birth to the fourth corner.
        let mut s = Simulation::from_pattern("##..\n#...\n....", false).unwrap();
        s.advance();
        assert_eq!(alive_set(&s), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

        // Centre of a plus has four neighbours and dies.
        let mut s = Simulation::from_pattern(".#.\n###\n.#.", false).unwrap();
        s.advance();
        assert!(!s.get(1, 1).unwrap());
    }

    #[test]
    fn test_blinker_on_torus() {
        let mut s = Simulation::new(5, 5, true).unwrap();
        for j in 1..4 {
            s.set(2, j, true).unwrap();
        }
        let horizontal = alive_set(&s);

        s.advance();
        assert_eq!(alive_set(&s), vec![(1, 2), (2, 2), (3, 2)]);
        assert!(!s.is_settled());

        s.advance();
        assert_eq!(alive_set(&s), horizontal);
    }

    #[test]
    fn test_block_is_still() {
        let text = "....\n.##.\n.##.\n....";
        let mut s = Simulation::from_pattern(text, false).unwrap();
        let before = s.board().clone();
        s.advance();
        assert_eq!(s.board(), &before);
        assert!(s.is_settled());
    }

    #[test]
    fn test_glider_crosses_torus_edge() {
        let mut s = Simulation::from_pattern(".#...\n..#..\n###..\n.....\n.....", true).unwrap();
        let start = s.board().clone();
        // A glider moves one cell diagonally every four generations, so after
        // 20 it has travelled once around a 5x5 torus.
        for _ in 0..20 {
            s.advance();
        }
        assert_eq!(s.board(), &start);
        assert_eq!(s.count_alive(), 5);
    }

    #[test]
    fn test_dead_board_stays_dead() {
        let mut s = Simulation::new(4, 4, true).unwrap();
        for _ in 0..5 {
            s.advance();
            assert!(!s.has_life());
            assert!(s.is_settled());
        }
    }

    #[test]
    fn test_clear() {
        let mut s = Simulation::from_pattern("#.#\n.#.", false).unwrap();
        s.advance();
        s.clear().unwrap();
        assert!(!s.has_life());
        assert_eq!(s.generation(), 0);
        assert_eq!((s.rows(), s.cols()), (2, 3));
    }

    #[test]
    fn test_malformed_pattern() {
        assert!(matches!(
            Simulation::from_pattern("##\n#", false),
            Err(Error::MalformedPattern(_))
        ));
        assert!(matches!(
            Simulation::from_pattern("\n\n", false),
            Err(Error::MalformedPattern(_))
        ));
    }

    #[test]
    fn test_row_of_spaces_is_dead_row() {
        let spaced = Simulation::from_pattern("#.#\n   \n#.#", false).unwrap();
        let dotted = Simulation::from_pattern("#.#\n...\n#.#", false).unwrap();
        assert_eq!((spaced.rows(), spaced.cols()), (3, 3));
        assert_eq!(spaced.board(), dotted.board());
        // The blank row keeps the two live rows apart.
        assert_eq!(spaced.count_neighbors(0, 0), Ok(0));
        assert_eq!(spaced.count_neighbors(1, 1), Ok(4));
    }

    #[test]
    fn test_advance_commits_every_generation() {
        let mut s = Simulation::from_pattern(".#.\n.#.\n.#.", false).unwrap();
        for n in 1..=4 {
            let before = s.board().clone();
            s.advance();
            assert_eq!(s.generation(), n);
            assert_ne!(s.board(), &before);
            assert!(!s.is_settled());
            assert_eq!((s.board().rows(), s.board().cols()), (3, 3));
        }
    }

    proptest! {
        #[test]
        fn test_advance_is_deterministic(seed in any::<u64>(), rows in 1..12usize, cols in 1..12usize, on_torus in any::<bool>()) {
            let mut a = Simulation::new(rows, cols, on_torus).unwrap();
            a.randomize_with(0.4, &mut StdRng::seed_from_u64(seed)).unwrap();
            let mut b = a.clone();
            for _ in 0..4 {
                a.advance();
                b.advance();
                prop_assert_eq!(a.board(), b.board());
            }
        }

        #[test]
        fn test_torus_get_is_periodic(row in -30..30isize, col in -30..30isize, seed in any::<u64>()) {
            let mut s = Simulation::new(4, 5, true).unwrap();
            s.randomize_with(0.5, &mut StdRng::seed_from_u64(seed)).unwrap();
            prop_assert_eq!(s.get(row, col), s.get(row + 4, col - 5));
            prop_assert_eq!(s.get(row, col), s.get(row.rem_euclid(4), col.rem_euclid(5)));
        }

        #[test]
        fn test_neighbor_count_in_range(seed in any::<u64>(), rows in 1..8usize, cols in 1..8usize, on_torus in any::<bool>()) {
            let mut s = Simulation::new(rows, cols, on_torus).unwrap();
            s.randomize_with(0.5, &mut StdRng::seed_from_u64(seed)).unwrap();
            for i in 0..rows as isize {
                for j in 0..cols as isize {
                    prop_assert!(s.count_neighbors(i, j).unwrap() <= 8);
                }
            }
        }
    }
}
