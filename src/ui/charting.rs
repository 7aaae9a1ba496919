use keypace::history::HistoryEntry;

/// Bars for the most recent tests that fit in `width` columns, oldest first.
/// Labels are 1-based test numbers.
pub fn history_bars(
    entries: &[HistoryEntry],
    width: u16,
    bar_width: u16,
    bar_gap: u16,
) -> Vec<(String, u64)> {
    let slot = (bar_width + bar_gap).max(1);
    let fit = (width / slot) as usize;
    let skip = entries.len().saturating_sub(fit);

    entries
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, e)| ((i + 1).to_string(), u64::from(e.stats.wpm)))
        .collect()
}

/// Y bound for the history chart, never below 1 so an all-zero chart
/// still has a scale.
pub fn compute_chart_max(bars: &[(String, u64)]) -> u64 {
    bars.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1)
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
