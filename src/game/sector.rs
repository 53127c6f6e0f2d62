use super::config::WorldConfig;
use super::types::{Cell, Circle, Food, Point, SnakeId};

#[derive(Debug, Clone)]
pub struct Sector {
    pub col: u8,
    pub row: u8,
    /// Coverage circle: the cell centre with half the cell diagonal as radius.
    pub circle: Circle,
    /// Snakes whose collision box currently overlaps this sector.
    pub occupants: Vec<SnakeId>,
    /// Kept sorted ascending by `x`.
    pub food: Vec<Food>,
}

impl Sector {
    fn new(col: u8, row: u8, config: &WorldConfig) -> Self {
        let size = config.sector_size as f64;
        let half = size / 2.0;
        Self {
            col,
            row,
            circle: Circle {
                x: size * col as f64 + half,
                y: size * row as f64 + half,
                r: config.sector_diag_size() as f64 / 2.0,
            },
            occupants: Vec::new(),
            food: Vec::new(),
        }
    }

    pub fn intersects(&self, circle: &Circle) -> bool {
        self.circle.intersects(circle)
    }

    pub fn insert_food(&mut self, food: Food) {
        let index = self.food.partition_point(|item| item.x < food.x);
        self.food.insert(index, food);
    }

    pub fn remove_food(&mut self, index: usize) -> Food {
        self.food.remove(index)
    }

    /// Sorted insertion point for `x`; callers scan outward from here.
    pub fn find_closest_food(&self, x: u16) -> usize {
        self.food.partition_point(|item| item.x < x)
    }

    pub fn sort_food(&mut self) {
        self.food.sort_by_key(|item| item.x);
    }

    pub fn add_occupant(&mut self, id: SnakeId) {
        self.occupants.push(id);
    }

    pub fn remove_occupant(&mut self, id: SnakeId) {
        self.occupants.retain(|&occupant| occupant != id);
    }
}

/// Fixed uniform grid over the world's bounding square, row-major.
#[derive(Debug, Clone)]
pub struct SectorGrid {
    edge: u16,
    size: f64,
    sectors: Vec<Sector>,
}

impl SectorGrid {
    pub fn new(config: &WorldConfig) -> Self {
        let edge = config.sector_count_along_edge();
        let len = edge as usize * edge as usize;
        let mut sectors = Vec::with_capacity(len);
        for index in 0..len {
            let col = (index % edge as usize) as u8;
            let row = (index / edge as usize) as u8;
            sectors.push(Sector::new(col, row, config));
        }
        Self {
            edge,
            size: config.sector_size as f64,
            sectors,
        }
    }

    pub fn edge(&self) -> u16 {
        self.edge
    }

    pub fn sector_size(&self) -> f64 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    pub fn cell_of(&self, point: Point) -> Cell {
        Cell {
            col: (point.x / self.size).floor() as i32,
            row: (point.y / self.size).floor() as i32,
        }
    }

    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        let edge = self.edge as i32;
        if cell.col < 0 || cell.row < 0 || cell.col >= edge || cell.row >= edge {
            return None;
        }
        Some(cell.row as usize * self.edge as usize + cell.col as usize)
    }

    pub fn index_at(&self, point: Point) -> Option<usize> {
        self.index_of(self.cell_of(point))
    }

    pub fn get(&self, index: usize) -> Option<&Sector> {
        self.sectors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Sector> {
        self.sectors.get_mut(index)
    }

    pub fn sector(&self, col: i32, row: i32) -> Option<&Sector> {
        let index = self.index_of(Cell { col, row })?;
        self.sectors.get(index)
    }

    pub fn sector_mut(&mut self, col: i32, row: i32) -> Option<&mut Sector> {
        let index = self.index_of(Cell { col, row })?;
        self.sectors.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sector> {
        self.sectors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sector> {
        self.sectors.iter_mut()
    }

    /// Half-width, in cells, of the window that holds every sector a circle of
    /// `radius` centred anywhere in one cell can touch.
    pub fn window_reach(&self, radius: f64) -> i32 {
        let sector_radius = self.sectors.first().map(|s| s.circle.r).unwrap_or(0.0);
        ((radius + sector_radius) / self.size + 0.5).floor().max(0.0) as i32
    }

    /// Indices of in-grid cells within `reach` cells of `center`, row-major.
    pub fn window(&self, center: Cell, reach: i32) -> impl Iterator<Item = usize> + '_ {
        (center.row - reach..=center.row + reach).flat_map(move |row| {
            (center.col - reach..=center.col + reach)
                .filter_map(move |col| self.index_of(Cell { col, row }))
        })
    }

    /// Routes food into the sector containing it. Food outside the grid is dropped.
    pub fn insert_food(&mut self, food: Food) -> bool {
        let point = Point::new(food.x as f64, food.y as f64);
        let Some(index) = self.index_at(point) else {
            return false;
        };
        self.sectors[index].insert_food(food);
        true
    }

    pub fn food_count(&self) -> usize {
        self.sectors.iter().map(|sector| sector.food.len()).sum()
    }
}
