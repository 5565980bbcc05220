//! How suspicious a claimed play looks to a tracker.

use rand::Rng;

/// Plays of this many cards or more draw extra suspicion.
pub const LARGE_PLAY_THRESHOLD: usize = 3;
pub const LARGE_PLAY_MULTIPLIER: f32 = 1.3;

/// Probability that an observer calls a play claiming a rank it believes the
/// target holds `believed` copies of. Always in `[0, 1]`.
///
/// Small hands make a bluff look more valuable and more worth challenging;
/// very large hands mean the target plausibly holds anything.
pub fn call_probability(believed: u8, target_hand_size: usize, cards_played: usize) -> f32 {
    let base: f32 = match believed {
        0 => 0.08,
        1 => 0.15,
        2 => 0.25,
        3 => 0.40,
        _ => 0.60,
    };

    let hand_factor = if target_hand_size <= 3 {
        2.0
    } else if target_hand_size <= 6 {
        1.5
    } else if target_hand_size <= 10 {
        1.2
    } else if target_hand_size >= 20 {
        0.7
    } else {
        1.0
    };

    let mut probability = (base * hand_factor).clamp(0.0, 1.0);

    if cards_played >= LARGE_PLAY_THRESHOLD {
        probability = (probability * LARGE_PLAY_MULTIPLIER).clamp(0.0, 1.0);
    }

    probability
}

/// One uniform draw decides; calls iff strictly below the probability.
pub fn decide_call<R: Rng + ?Sized>(rng: &mut R, probability: f32) -> bool {
    rng.r#gen::<f32>() < probability
}
