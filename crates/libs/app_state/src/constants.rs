/// InsightFace w600k_r50 embedding dimension.
pub const EMBEDDING_DIM: usize = 512;

/// Cosine similarity weight in the combined face score.
pub const W_COSINE: f32 = 0.80;

/// L2 distance weight in the combined face score.
pub const W_L2: f32 = 0.20;

/// Exponential decay factor for the L2 term.
pub const GAMMA: f32 = 0.5;

/// Decimal places kept when a candidate score enters the search engine.
/// Keeps threshold comparisons stable at tier boundaries.
pub const SCORE_PRECISION: u32 = 4;

/// Decimal places exposed to clients.
pub const DISPLAY_PRECISION: u32 = 3;
