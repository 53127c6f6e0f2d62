use super::World;
use crate::game::types::{Circle, SnakeId};
use serde::Serialize;

/// Snapshot of every snake's trackers, for the debug endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DebugFrame {
    pub frames: u64,
    pub snakes: Vec<DebugSnake>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugSnake {
    pub id: SnakeId,
    pub bot: bool,
    pub dying: bool,
    pub length: usize,
    pub score: u16,
    pub head: Circle,
    #[serde(rename = "box")]
    pub collision_box: Circle,
    pub viewport: Circle,
    /// Coverage circles of the sectors the collision box is registered in.
    pub sectors: Vec<Circle>,
}

impl World {
    pub fn debug_frame(&self) -> DebugFrame {
        let snakes = self
            .snakes
            .values()
            .map(|snake| DebugSnake {
                id: snake.id,
                bot: snake.bot,
                dying: snake.is_dying(),
                length: snake.parts.len(),
                score: snake.score(),
                head: Circle::around(snake.head(), snake.body_part_radius()),
                collision_box: snake.collision_box().circle(),
                viewport: snake.viewport().circle(),
                sectors: snake
                    .collision_box()
                    .sectors()
                    .iter()
                    .filter_map(|&index| self.grid.get(index))
                    .map(|sector| sector.circle)
                    .collect(),
            })
            .collect();
        DebugFrame {
            frames: self.frames,
            snakes,
        }
    }
}
