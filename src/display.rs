//! Terminal renderer. Every crossterm draw call in the game goes through here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state. A tile is two columns wide and one row tall; row 0 holds the
//! HUD and the last row the controls hint.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use dig_survive::achievements::Achievement;
use dig_survive::constants::TILE_SIZE;
use dig_survive::entities::{
    AttackPhase, Enemy, EnemyMode, GameState, GameStatus, LevelPhase, Missile, Player, Tile,
    Vitality,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_DIRT: Color = Color::DarkYellow;
const C_STONE: Color = Color::DarkGrey;
const C_TREASURE: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_PLAYER_HIDDEN: Color = Color::Grey;
const C_ENEMY_PATROL: Color = Color::DarkRed;
const C_ENEMY_CHASE: Color = Color::Red;
const C_MISSILE: Color = Color::Magenta;
const C_TRAIL: Color = Color::DarkMagenta;
const C_BACKGROUND_MISSILE: Color = Color::DarkGrey;
const C_WARNING: Color = Color::Red;
const C_EXPLOSION: Color = Color::Yellow;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_ENERGY: Color = Color::Green;
const C_HUD_LOW_ENERGY: Color = Color::Red;
const C_ACHIEVEMENT: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// First screen row of the playfield (row 0 is the HUD).
const FIELD_TOP: u16 = 1;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    achievement: Option<&Achievement>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_tiles(out, state)?;
    draw_treasures(out, state)?;
    draw_effects(out, state)?;
    for enemy in &state.enemies {
        draw_enemy(out, state, enemy)?;
    }
    draw_player(out, state, &state.player)?;
    draw_strike(out, state)?;

    draw_hud(out, state, achievement)?;
    draw_controls_hint(out, state)?;

    if let LevelPhase::Complete { countdown, .. } = state.phase {
        draw_level_complete(out, state, countdown)?;
    }
    if state.paused {
        draw_box(out, state, &[("  PAUSED  ", Color::White), ("P - Resume", C_HINT)])?;
    }
    if state.status == GameStatus::GameOver {
        draw_game_over(out, state)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen_rows(state).saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Coordinates ───────────────────────────────────────────────────────────────

fn screen_cols(state: &GameState) -> u16 {
    (state.grid.width() * 2).min(u16::MAX as usize) as u16
}

fn screen_rows(state: &GameState) -> u16 {
    (state.grid.height() + 2).min(u16::MAX as usize) as u16
}

/// World position to a screen cell, or `None` when off the playfield.
fn cell(state: &GameState, x: f32, y: f32) -> Option<(u16, u16)> {
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let col = (x / TILE_SIZE * 2.0) as usize;
    let row = (y / TILE_SIZE) as usize;
    if col >= state.grid.width() * 2 || row >= state.grid.height() {
        return None;
    }
    Some((col as u16, row as u16 + FIELD_TOP))
}

fn put<W: Write>(
    out: &mut W,
    state: &GameState,
    x: f32,
    y: f32,
    color: Color,
    glyph: &str,
) -> std::io::Result<()> {
    if let Some((col, row)) = cell(state, x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Terrain ───────────────────────────────────────────────────────────────────

fn draw_tiles<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    for y in 0..state.grid.height() {
        out.queue(cursor::MoveTo(0, y as u16 + FIELD_TOP))?;
        for x in 0..state.grid.width() {
            match state.grid.get(x, y) {
                Some(Tile::Dirt) => {
                    out.queue(style::SetForegroundColor(C_DIRT))?;
                    out.queue(Print("▓▓"))?;
                }
                Some(Tile::Stone) => {
                    out.queue(style::SetForegroundColor(C_STONE))?;
                    out.queue(Print("██"))?;
                }
                _ => {
                    out.queue(Print("  "))?;
                }
            }
        }
    }
    Ok(())
}

fn draw_treasures<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    for treasure in state.treasures.iter().filter(|t| !t.collected) {
        put(out, state, treasure.x, treasure.y, C_TREASURE, "◆◆")?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, state: &GameState, player: &Player) -> std::io::Result<()> {
    // Two rows tall:
    //   ()   ← head
    //   /\   ← legs (or ⛏ while digging)
    let b = &player.body;
    let (head, feet) = match player.vitality {
        Vitality::Alive if player.is_digging => {
            ("()", if player.facing_right { "/⛏" } else { "⛏\\" })
        }
        Vitality::Alive => ("()", "/\\"),
        Vitality::Dying { .. } | Vitality::Dead => ("xx", "__"),
    };
    let color = if player.is_hidden { C_PLAYER_HIDDEN } else { C_PLAYER };
    put(out, state, b.x, b.y, color, head)?;
    put(out, state, b.x, b.bottom() - 1.0, color, feet)
}

fn draw_enemy<W: Write>(out: &mut W, state: &GameState, enemy: &Enemy) -> std::io::Result<()> {
    let b = &enemy.body;
    let (color, face) = match enemy.mode {
        EnemyMode::Chase => (C_ENEMY_CHASE, if enemy.facing_right { "[>" } else { "<]" }),
        EnemyMode::Patrol => (C_ENEMY_PATROL, "[]"),
    };
    put(out, state, b.x, b.bottom() - 1.0, color, face)
}

fn draw_missile<W: Write>(
    out: &mut W,
    state: &GameState,
    missile: &Missile,
    head: Color,
    trail: Color,
) -> std::io::Result<()> {
    for point in &missile.trail {
        put(out, state, point.x, point.y, trail, "·")?;
    }
    put(out, state, missile.x, missile.y, head, "▼")
}

fn draw_effects<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let system = &state.missiles;
    for cloud in &system.smoke_clouds {
        put(out, state, cloud.x, cloud.y, C_STONE, "░")?;
    }
    for missile in &system.missiles {
        draw_missile(out, state, missile, C_BACKGROUND_MISSILE, C_BACKGROUND_MISSILE)?;
    }
    for explosion in &system.explosions {
        // Bigger glyph early in the blast, fading out toward the end.
        let glyph = if explosion.frame * 2 < explosion.max_frames {
            "✹✹"
        } else {
            "**"
        };
        put(out, state, explosion.x, explosion.y, C_EXPLOSION, glyph)?;
    }
    Ok(())
}

/// Crosshair during the warning, then the incoming missile and its trail.
fn draw_strike<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    match &state.missiles.attack {
        AttackPhase::Idle => Ok(()),
        AttackPhase::Warning { missile, .. } => {
            // Blink at roughly 4 Hz.
            if (state.now / 250) % 2 == 0 {
                let y = missile.target_y.max(TILE_SIZE / 2.0) - 1.0;
                put(out, state, missile.target_x, y, C_WARNING, "⊕")?;
            }
            Ok(())
        }
        AttackPhase::Flying { missile } => draw_missile(out, state, missile, C_MISSILE, C_TRAIL),
    }
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    achievement: Option<&Achievement>,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Level:{:>3}  Diamonds:{:>5}  Kills:{:>3}  ",
        state.level, state.score, state.kills
    )))?;

    let energy_color = if state.player.energy < 5.0 {
        C_HUD_LOW_ENERGY
    } else {
        C_HUD_ENERGY
    };
    out.queue(style::SetForegroundColor(energy_color))?;
    out.queue(Print(format!("Energy:{:>6.1}", state.player.energy.max(0.0))))?;

    let left = state.treasures.iter().filter(|t| !t.collected).count();
    out.queue(style::SetForegroundColor(C_TREASURE))?;
    out.queue(Print(format!("  ◆ left:{left:>3}")))?;

    if let Some(achievement) = achievement {
        let text = format!("{} {}", achievement.icon, achievement.title);
        let col = screen_cols(state).saturating_sub(text.chars().count() as u16 + 2);
        out.queue(cursor::MoveTo(col, 0))?;
        out.queue(style::SetForegroundColor(C_ACHIEVEMENT))?;
        out.queue(Print(text))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, screen_rows(state).saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    let hint = if state.player.is_hidden {
        "← → / A D : Move   ↑ W SPACE : Jump   ↓ S : Dig   P : Pause   Q : Quit   [hidden]"
    } else {
        "← → / A D : Move   ↑ W SPACE : Jump   ↓ S : Dig   P : Pause   Q : Quit"
    };
    out.queue(Print(hint))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_box<W: Write>(
    out: &mut W,
    state: &GameState,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let inner = lines
        .iter()
        .map(|(text, _)| text.chars().count())
        .max()
        .unwrap_or(0)
        + 4;
    let cx = screen_cols(state) / 2;
    let start_row = (screen_rows(state) / 2).saturating_sub((lines.len() as u16 + 2) / 2);
    let col = cx.saturating_sub(inner as u16 / 2 + 1);

    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(cursor::MoveTo(col, start_row))?;
    out.queue(Print(format!("╔{}╗", "═".repeat(inner))))?;
    for (i, (text, color)) in lines.iter().enumerate() {
        let pad = inner - text.chars().count();
        out.queue(cursor::MoveTo(col, start_row + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print("║"))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!(
            "{}{}{}",
            " ".repeat(pad / 2),
            text,
            " ".repeat(pad - pad / 2)
        )))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print("║"))?;
    }
    out.queue(cursor::MoveTo(col, start_row + 1 + lines.len() as u16))?;
    out.queue(Print(format!("╚{}╝", "═".repeat(inner))))?;
    Ok(())
}

fn draw_level_complete<W: Write>(
    out: &mut W,
    state: &GameState,
    countdown: u32,
) -> std::io::Result<()> {
    let title = format!("LEVEL {} COMPLETE", state.level);
    let score = format!("Diamonds: {}", state.score);
    let next = format!("Next level in {countdown}...");
    draw_box(
        out,
        state,
        &[
            (title.as_str(), Color::Green),
            (score.as_str(), C_HUD_SCORE),
            (next.as_str(), Color::White),
        ],
    )
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let score = format!("Diamonds: {:>6}", state.score);
    let reached = format!(
        "Level {}   Robots scrapped {}   Achievements {}",
        state.level,
        state.kills,
        state.achievements.reached().count()
    );
    draw_box(
        out,
        state,
        &[
            ("GAME  OVER", Color::Red),
            (score.as_str(), C_HUD_SCORE),
            (reached.as_str(), Color::Grey),
            ("R - Play Again  Q - Quit", Color::White),
        ],
    )
}
