//! Text shown around the playfield: the status line and the end-of-session leaderboard.

use thousands::Separable;

use crate::leaderboard::LeaderboardView;
use crate::systems::state::GameStage;
use crate::timer::format_countdown;

use std::time::Duration;

/// Formats a score with thousands separators, e.g. `12,340`.
pub fn format_score(score: u32) -> String {
    score.separate_with_commas()
}

/// The one-line session summary: score, time left and any stage marker.
pub fn status_line(score: u32, time_left: Duration, stage: GameStage, paused: bool) -> String {
    let mut line = format!("SCORE {}   TIME {}", format_score(score), format_countdown(time_left));

    match stage {
        GameStage::Setup => line.push_str("   READY!"),
        GameStage::GameOver(_) => line.push_str("   GAME OVER"),
        GameStage::Playing | GameStage::Dying { .. } if paused => line.push_str("   PAUSED"),
        _ => {}
    }

    line
}

/// Lines of the end-of-session screen, top to bottom.
pub fn leaderboard_lines(view: &LeaderboardView) -> Vec<String> {
    let mut lines = vec![
        format!("FINAL SCORE {}", format_score(view.final_score)),
        view.save_status.to_string(),
        String::new(),
    ];

    if let Some(error) = &view.error {
        lines.push(error.clone());
    }

    lines.extend(
        view.rows
            .iter()
            .map(|row| format!("{:>2}. {:<24} {:>7}", row.rank, row.username, row.score)),
    );
    lines
}
