use std::str::FromStr;

use anyhow::{anyhow, bail, Context};

use crate::common::Cell;

const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)]; // Up, down, left, right

/// Manhattan distance, admissible and consistent for unit 4-connected moves.
pub fn heuristic(position: Cell, goal: Cell) -> usize {
    (position.0.abs_diff(goal.0) + position.1.abs_diff(goal.1)) as usize
}

/// The four orthogonally adjacent cells. There is no "stay" move.
pub fn neighbors(position: Cell) -> [Cell; 4] {
    DIRECTIONS.map(|(dx, dy)| (position.0 + dx, position.1 + dy))
}

/// Environment the searches run on.
pub trait Grid {
    fn contains(&self, position: Cell) -> bool;

    /// Traversable cells one move away from `position`.
    fn neighbors(&self, position: Cell) -> Vec<Cell>;

    fn heuristic(&self, position: Cell, goal: Cell) -> usize {
        heuristic(position, goal)
    }
}

/// Unbounded, obstacle-free plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGrid;

impl Grid for OpenGrid {
    fn contains(&self, _position: Cell) -> bool {
        true
    }

    fn neighbors(&self, position: Cell) -> Vec<Cell> {
        neighbors(position).to_vec()
    }
}

#[derive(Debug, Clone)]
pub struct Tile {
    passable: bool,
    pub neighbors: Vec<Cell>, // Stores coordinates of accessible neighbors
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

/// Bounded grid read from the MovingAI `.map` format. Cells are `(row, col)`.
#[derive(Debug, Clone)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read map file: {path}"))?;
        contents
            .parse()
            .with_context(|| format!("error with map file: {path}"))
    }

    fn initialize_neighbors(&mut self) {
        for x in 0..self.height {
            for y in 0..self.width {
                if self.grid[x][y].passable {
                    self.grid[x][y].neighbors = self.get_neighbors(x, y);
                }
            }
        }
    }

    pub fn get_neighbors(&self, x: usize, y: usize) -> Vec<Cell> {
        neighbors((x as i32, y as i32))
            .into_iter()
            .filter(|&neighbor| {
                self.tile(neighbor)
                    .is_some_and(|tile| tile.is_passable())
            })
            .collect()
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.grid[x][y].is_passable()
    }

    fn tile(&self, position: Cell) -> Option<&Tile> {
        let x = usize::try_from(position.0).ok()?;
        let y = usize::try_from(position.1).ok()?;
        self.grid.get(x)?.get(y)
    }
}

fn parse_header(line: Option<&str>, key: &str) -> anyhow::Result<usize> {
    let line = line.ok_or_else(|| anyhow!("missing `{key}` line"))?;
    match line.split_whitespace().collect::<Vec<_>>().as_slice() {
        [name, value] if *name == key => value
            .parse()
            .with_context(|| format!("invalid {key}: {value}")),
        _ => bail!("expected `{key} <n>`, got `{line}`"),
    }
}

impl FromStr for Map {
    type Err = anyhow::Error;

    fn from_str(contents: &str) -> anyhow::Result<Self> {
        let mut lines = contents.lines();

        let _type = lines.next().ok_or_else(|| anyhow!("empty map"))?;
        let height = parse_header(lines.next(), "height")?;
        let width = parse_header(lines.next(), "width")?;
        match lines.next() {
            Some(line) if line.trim() == "map" => {}
            other => bail!("expected `map`, got {other:?}"),
        }

        let mut grid = Vec::with_capacity(height);
        for (row, line) in lines.take(height).enumerate() {
            let line = line.trim_end();
            if line.chars().count() != width {
                bail!(
                    "row {row} has {} cells, expected {width}",
                    line.chars().count()
                );
            }
            grid.push(
                line.chars()
                    .map(|ch| Tile {
                        passable: matches!(ch, '.' | 'G' | 'S'),
                        neighbors: Vec::new(),
                    })
                    .collect(),
            );
        }
        if grid.len() != height {
            bail!("map has {} rows, expected {height}", grid.len());
        }

        let mut map = Map {
            height,
            width,
            grid,
        };
        map.initialize_neighbors();

        Ok(map)
    }
}

impl Grid for Map {
    fn contains(&self, position: Cell) -> bool {
        self.tile(position).is_some_and(|tile| tile.is_passable())
    }

    fn neighbors(&self, position: Cell) -> Vec<Cell> {
        self.tile(position)
            .map(|tile| tile.neighbors.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic() {
        assert_eq!(heuristic((0, 0), (0, 0)), 0);
        assert_eq!(heuristic((2, 2), (0, 0)), 4);
        assert_eq!(heuristic((-1, 3), (2, -1)), 7);
    }

    #[test]
    fn test_open_grid_neighbors() {
        let mut cells = OpenGrid.neighbors((0, 0));
        cells.sort();
        assert_eq!(cells, vec![(-1, 0), (0, -1), (0, 1), (1, 0)]);
        assert!(!cells.contains(&(0, 0)));
        assert!(OpenGrid.contains((-100, 42)));
    }

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map").unwrap();

        assert_eq!(map.height, 3);
        assert_eq!(map.width, 3);

        assert!(map.is_passable(0, 0));
        assert!(!map.is_passable(1, 1));
        assert!(!map.contains((1, 1)));
        assert!(!map.contains((3, 0)));
        assert!(!map.contains((0, -1)));

        let neighbors = map.get_neighbors(0, 1);
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors.contains(&(0, 0)));
        assert!(neighbors.contains(&(0, 2)));
        assert_eq!(Grid::neighbors(&map, (0, 1)), neighbors);
        assert!(Grid::neighbors(&map, (1, 1)).is_empty());
        assert!(Grid::neighbors(&map, (-1, 0)).is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Map>().is_err());
        assert!("type octile\nheight 2\nwidth 2\nmap\n..\n".parse::<Map>().is_err());
        assert!("type octile\nheight 1\nwidth 3\nmap\n..\n".parse::<Map>().is_err());
        assert!("type octile\nwidth 3\nheight 1\nmap\n...\n".parse::<Map>().is_err());
        assert!("type octile\nheight x\nwidth 3\nmap\n...\n".parse::<Map>().is_err());

        let map: Map = "type octile\nheight 1\nwidth 3\nmap\n.T.\n".parse().unwrap();
        assert!(map.get_neighbors(0, 0).is_empty());
    }
}
