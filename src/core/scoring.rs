pub const BASE_SCORE: i64 = 1000;
pub const MOVE_PENALTY: i64 = 5;
pub const SECOND_PENALTY: i64 = 2;
pub const SCORE_FLOOR: i64 = 100;

/// Final score for a finished round, never below [`SCORE_FLOOR`].
pub fn final_score(move_count: u32, elapsed_seconds: u32) -> u32 {
    let raw = BASE_SCORE
        - MOVE_PENALTY * i64::from(move_count)
        - SECOND_PENALTY * i64::from(elapsed_seconds);
    // raw.max(SCORE_FLOOR) fits in 0..=BASE_SCORE
    raw.max(SCORE_FLOOR) as u32
}
