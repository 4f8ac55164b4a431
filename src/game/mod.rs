pub mod constants;
pub mod state;
pub mod systems;
pub mod game_loop;
pub mod render;
pub mod inbox;
