use crate::app::{App, Screen, Tone, HELP};
use crate::palette::Palette;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use quiz_core::{ClueType, Difficulty, GameState, RoundStatus, MAX_GUESSES};
use std::io::{self, Write};

/// Draw the current screen followed by the message line
pub fn render<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    queue!(out, Print("\n"))?;
    match app.screen {
        Screen::Playing => render_round(out, &app.palette, &app.game)?,
        Screen::Stats => render_stats(out, app)?,
        Screen::Help => render_help(out, &app.palette)?,
    }

    if let Some(message) = &app.message {
        let color = match message.tone {
            Tone::Info => app.palette.fg,
            Tone::Success => app.palette.success,
            Tone::Error => app.palette.error,
        };
        line(out, color, &message.text)?;
    }

    queue!(out, SetForegroundColor(app.palette.key), Print("> "), ResetColor)?;
    out.flush()
}

fn line<W: Write>(out: &mut W, color: Color, text: &str) -> io::Result<()> {
    queue!(out, SetForegroundColor(color), Print(text), ResetColor, Print("\n"))
}

fn render_round<W: Write>(out: &mut W, palette: &Palette, game: &GameState) -> io::Result<()> {
    let Some(country) = game.current_country() else {
        return line(out, palette.muted, "No game running. Type 'new' to start.");
    };

    let difficulty = game.difficulty();
    queue!(
        out,
        SetForegroundColor(palette.title),
        Print(format!(
            "Round {}/{}  ",
            game.round_number(),
            game.playable_rounds()
        )),
        SetForegroundColor(palette.difficulty(difficulty)),
        Print(format!("{} {}", difficulty.emoji(), difficulty.label())),
        SetForegroundColor(palette.muted),
        Print(format!("  Score {}\n\n", game.total_score())),
        ResetColor
    )?;

    for clue in ClueType::ALL {
        if game.is_revealed(clue) {
            queue!(
                out,
                SetForegroundColor(palette.muted),
                Print(format!("  {} {:<13}", clue.emoji(), clue.label())),
                SetForegroundColor(palette.clue),
                Print(country.clue_text(clue)),
                Print("\n"),
                ResetColor
            )?;
        } else {
            line(
                out,
                palette.muted,
                &format!("  {} {:<13}hidden (clue {})", clue.emoji(), clue.label(), clue),
            )?;
        }
    }
    queue!(out, Print("\n"))?;

    match game.status() {
        RoundStatus::Playing => {
            let hearts: String = (0..MAX_GUESSES)
                .map(|i| if i < game.guesses_remaining() { '●' } else { '○' })
                .collect();
            line(out, palette.fg, &format!("Guesses {hearts}"))?;
        }
        RoundStatus::Won => line(
            out,
            palette.success,
            &format!("{} it is! {} points.", country.name, game.score()),
        )?,
        RoundStatus::Lost => line(out, palette.error, &format!("It was {}.", country.name))?,
    }
    Ok(())
}

fn render_stats<W: Write>(out: &mut W, app: &App) -> io::Result<()> {
    let palette = &app.palette;
    line(out, palette.title, "Statistics")?;

    let Some(a) = app.achievements() else {
        return line(out, palette.error, "Statistics are unavailable right now.");
    };

    let rows = [
        ("Games played", a.total_games.to_string()),
        ("Wins", a.total_wins.to_string()),
        ("Win rate", format!("{:.1}%", a.win_rate())),
        ("Current streak", a.current_streak.to_string()),
        ("Best streak", a.best_streak.to_string()),
        ("Perfect games", a.perfect_games.to_string()),
        ("Avg clues", format!("{:.1}", a.avg_clues())),
    ];
    for (label, value) in rows {
        queue!(
            out,
            SetForegroundColor(palette.muted),
            Print(format!("  {label:<16}")),
            SetForegroundColor(palette.fg),
            Print(value),
            Print("\n"),
            ResetColor
        )?;
    }
    for difficulty in Difficulty::ALL {
        queue!(
            out,
            SetForegroundColor(palette.difficulty(difficulty)),
            Print(format!("  {:<16}", format!("{} wins", difficulty.label()))),
            SetForegroundColor(palette.fg),
            Print(a.wins_for(difficulty)),
            Print("\n"),
            ResetColor
        )?;
    }

    let recent = app.recent_games();
    queue!(out, Print("\n"))?;
    line(out, palette.title, "Recent games")?;
    if recent.is_empty() {
        return line(out, palette.muted, "  Nothing played yet.");
    }
    for game in recent {
        let (mark, color) = if game.won {
            ("✓", palette.success)
        } else {
            ("✗", palette.error)
        };
        queue!(
            out,
            SetForegroundColor(color),
            Print(format!("  {mark} ")),
            SetForegroundColor(palette.fg),
            Print(format!("{:<24}", game.country_name)),
            SetForegroundColor(palette.muted),
            Print(format!(
                "{:<7} {:>4} pts  {} clues\n",
                game.difficulty.as_str(),
                game.score,
                game.clues_used
            )),
            ResetColor
        )?;
    }
    Ok(())
}

fn render_help<W: Write>(out: &mut W, palette: &Palette) -> io::Result<()> {
    line(out, palette.title, "Commands")?;
    for (command, description) in HELP {
        queue!(
            out,
            SetForegroundColor(palette.key),
            Print(format!("  {command:<28}")),
            SetForegroundColor(palette.fg),
            Print(description),
            Print("\n"),
            ResetColor
        )?;
    }
    Ok(())
}
