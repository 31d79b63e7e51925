// --- Global Simulation Constants ---

// Population
pub const DEFAULT_SPECIES_COUNT: usize = 5;
pub const DEFAULT_PARTICLES_PER_SPECIES: usize = 200;
pub const DEFAULT_SPAWN_RADIUS: f32 = 300.0;

// Interaction matrix
pub const DEFAULT_MATRIX_SCALAR: f32 = 10.0;
pub const DEFAULT_SELF_OVERRIDE_VALUE: f32 = -1.0;

// Force law
pub const DEFAULT_MIN_RADIUS: f32 = 50.0;
pub const DEFAULT_MAX_RADIUS: f32 = 150.0;
pub const DEFAULT_MIN_FORCE: f32 = 1.0;
pub const DEFAULT_FORCE_SCALAR: f32 = 200.0;
pub const DEFAULT_PARTICLE_MASS: f32 = 10.0;

// Applied once per tick, independent of dt.
pub const DEFAULT_VELOCITY_DECAY: f32 = 0.99;

// Attractor point and orbit
pub const DEFAULT_GRAVITY: f32 = 100.0;
pub const DEFAULT_GRAVITY_X: f32 = 50.0;
pub const DEFAULT_GRAVITY_Y: f32 = 50.0;

// Upper bound on any single force term (pair, gravity, orbit) a config may produce.
pub const MAX_FORCE_MAGNITUDE: f32 = 1.0e6;

// Spatial index
pub const DEFAULT_QUADTREE_CAPACITY: usize = 5;
// Nodes this deep stop subdividing and hold overflow instead.
pub const MAX_TREE_DEPTH: usize = 24;

// --- Frame driver / window ---
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 800;
pub const FPS_UPDATE_INTERVAL_SECS: f64 = 0.5;
pub const PARTICLES_PER_SPECIES_STEP: usize = 50;
pub const MAX_SPECIES_COUNT: usize = 16;
pub const BACKGROUND_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];
pub const GRID_OVERLAY_COLOR: [f32; 4] = [0.35, 0.35, 0.35, 1.0];
pub const PARTICLE_DRAW_RADIUS: f32 = 2.0;
