/// Characters per "standard word" used by every wpm figure.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Net words per minute from correctly typed characters.
///
/// Rounds half away from zero (`f64::round`). Zero elapsed time yields 0.
pub fn wpm(correct_chars: usize, elapsed_secs: u64) -> u32 {
    if elapsed_secs == 0 {
        return 0;
    }
    let minutes = elapsed_secs as f64 / 60.0;
    ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Percentage of correct characters, rounded half away from zero.
///
/// With no attempts yet the score is a perfect 100.
pub fn accuracy(correct_chars: usize, total_chars: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    let pct = (correct_chars as f64 / total_chars as f64) * 100.0;
    pct.round().clamp(0.0, 100.0) as u32
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}
