use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use bluff_bot::bot::{PlayPlanner, decide_call};
use bluff_core::game::event::GameEvent;
use bluff_core::game::table::{EngineError, GameState, TurnToken};
use bluff_core::model::player::PlayerId;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ResolvedOutputs, SimConfig};
use crate::director::{DirectorSettings, GameDirector, PeekStats};

/// Stops a pathological game from spinning forever; generous enough for
/// thousands of turns at the default tick granularity.
const MAX_TICKS_PER_GAME: u64 = 200_000;

/// Plays the configured number of games headless, streaming one JSONL row
/// per game and writing a Markdown summary at the end.
pub struct SimRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub wins_by_seat: Vec<usize>,
    pub unfinished: usize,
    pub calls: usize,
    pub successful_calls: usize,
    pub avg_turns: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize log row: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("engine rejected an operation: {0}")]
    Engine(#[from] EngineError),
}

#[derive(Debug, Serialize)]
struct GameLogRow {
    run_id: String,
    game_index: usize,
    seed: u64,
    players: usize,
    winner: Option<usize>,
    turns: usize,
    calls: usize,
    successful_calls: usize,
    peek_attempts: u32,
    deflected_peeks: u32,
    ticks: u64,
}

struct GameOutcome {
    winner: Option<PlayerId>,
    turns: usize,
    calls: usize,
    successful_calls: usize,
    peeks: PeekStats,
    ticks: u64,
}

impl SimRunner {
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.table.seed.unwrap_or(0));

        let mut wins_by_seat = vec![0usize; self.config.table.players];
        let mut unfinished = 0usize;
        let mut calls = 0usize;
        let mut successful_calls = 0usize;
        let mut total_turns = 0usize;
        let mut rows_written = 0usize;

        for game_index in 0..self.config.table.games {
            let seed = rng.next_u64();
            let outcome = self.play_game(seed)?;

            match outcome.winner {
                Some(winner) => wins_by_seat[winner.index()] += 1,
                None => unfinished += 1,
            }
            calls += outcome.calls;
            successful_calls += outcome.successful_calls;
            total_turns += outcome.turns;

            event!(
                target: "bluff_sim::runner",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index,
                seed,
                winner = ?outcome.winner.map(PlayerId::index),
                turns = outcome.turns,
                calls = outcome.calls,
                "game finished"
            );

            let row = GameLogRow {
                run_id: self.config.run_id.clone(),
                game_index,
                seed,
                players: self.config.table.players,
                winner: outcome.winner.map(PlayerId::index),
                turns: outcome.turns,
                calls: outcome.calls,
                successful_calls: outcome.successful_calls,
                peek_attempts: outcome.peeks.attempts,
                deflected_peeks: outcome.peeks.deflected,
                ticks: outcome.ticks,
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;
        }

        writer.flush()?;

        let games = self.config.table.games;
        let avg_turns = if games > 0 {
            total_turns as f64 / games as f64
        } else {
            0.0
        };
        let summary = RunSummary {
            games_played: games,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            wins_by_seat,
            unfinished,
            calls,
            successful_calls,
            avg_turns,
        };
        fs::write(&self.outputs.summary_md, self.render_summary(&summary))?;

        Ok(summary)
    }

    fn play_game(&self, seed: u64) -> Result<GameOutcome, RunnerError> {
        let mut director = GameDirector::new(seed, self.director_settings());
        director.start(self.config.table.players)?;
        director.drain_events();

        let tick = Duration::from_millis(self.config.timing.tick_millis);
        let mut now = Duration::ZERO;
        let mut ticks = 0u64;
        // the simulated human rolls its own dice so the director's stream
        // stays identical whether or not a human is scripted
        let mut human_rng = StdRng::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
        let mut last_judged: Option<TurnToken> = None;

        let mut turns = 0usize;
        let mut calls = 0usize;
        let mut successful_calls = 0usize;

        while director.state() != GameState::Inactive && ticks < MAX_TICKS_PER_GAME {
            if director.is_human_turn() {
                let cards =
                    PlayPlanner::choose(director.hand(PlayerId::HUMAN), director.expected_rank());
                director.submit_play(&cards)?;
            } else if matches!(
                director.state(),
                GameState::TruthTold | GameState::LieTold
            ) && !director.current_player().is_human()
                && last_judged != Some(director.turn_token())
            {
                last_judged = Some(director.turn_token());
                let probability = director.suspicion(PlayerId::HUMAN);
                if decide_call(&mut human_rng, probability) {
                    director.call(PlayerId::HUMAN)?;
                }
            } else {
                now += tick;
                ticks += 1;
                director.tick(now)?;
            }

            for event in director.drain_events() {
                match event {
                    GameEvent::CardsPlayed { .. } => turns += 1,
                    GameEvent::CallResolved { success, .. } => {
                        calls += 1;
                        if success {
                            successful_calls += 1;
                        }
                    }
                    _ => {}
                }
            }
        }

        let winner = director.winner();
        if director.state() != GameState::Inactive {
            director.abort();
        }

        Ok(GameOutcome {
            winner,
            turns,
            calls,
            successful_calls,
            peeks: director.peek_stats(),
            ticks,
        })
    }

    fn director_settings(&self) -> DirectorSettings {
        DirectorSettings {
            turn_timer: Duration::from_secs_f32(self.config.timing.turn_timer_secs),
            peek_interval_min: Duration::from_secs_f32(self.config.peeks.min_interval_secs),
            peek_interval_max: Duration::from_secs_f32(self.config.peeks.max_interval_secs),
            deflect_chance: self.config.peeks.deflect_chance,
            seat_cooldown_turns: self.config.peeks.seat_cooldown_turns,
            global_cooldown_turns: self.config.peeks.global_cooldown_turns,
        }
    }

    fn render_summary(&self, summary: &RunSummary) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "# monkeybluff simulation — {}\n\n",
            self.config.run_id
        ));
        out.push_str(&format!(
            "- games: {} ({} unfinished)\n",
            summary.games_played, summary.unfinished
        ));
        out.push_str(&format!("- players: {}\n", self.config.table.players));
        out.push_str(&format!(
            "- master seed: {}\n",
            self.config.table.seed.unwrap_or(0)
        ));
        out.push_str(&format!(
            "- average turns per game: {:.1}\n",
            summary.avg_turns
        ));
        out.push_str(&format!(
            "- calls: {} total, {} successful\n\n",
            summary.calls, summary.successful_calls
        ));

        out.push_str("| seat | wins |\n|---|---|\n");
        for (index, wins) in summary.wins_by_seat.iter().enumerate() {
            out.push_str(&format!("| {} | {} |\n", PlayerId::new(index), wins));
        }
        out
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
