use alloc::vec::Vec;
use core::sync::atomic::AtomicBool;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::*;

/// Everything that happened during one action, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Mines were placed by the first open.
    Generated(GenerationSummary),
    Opened(AreaIndex),
    /// Areas opened by a flood fill that started at the preceding `Opened`.
    Cascaded(Vec<AreaIndex>),
    Flagged(AreaIndex),
    Unflagged(AreaIndex),
    Questioned(AreaIndex),
    Unquestioned(AreaIndex),
    Victory(Score),
    /// Carries the index of the mine that was opened.
    Defeat(AreaIndex),
}

/// Board after an action plus the events it produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub snapshot: BoardState,
    pub events: Vec<GameEvent>,
}

/// Owns one board and serializes every action on it.
///
/// All actions take `&mut self`, callers sharing a session across threads wrap it in a mutex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    board: BoardState,
    assistant: FlagAssistant,
    score: Option<Score>,
}

impl GameSession {
    /// Starts a pending session. A missing seed is drawn now so it can be saved and replayed.
    pub fn new(config: MinefieldConfig, options: AssistOptions) -> Result<Self> {
        config.validate()?;
        let config = config.resolved();
        log::debug!("new session: {config:?}");
        Ok(Self::from_board(BoardState::new(config), options))
    }

    pub(crate) fn from_board(board: BoardState, options: AssistOptions) -> Self {
        let score = board.is_finished().then(|| board.score());
        Self {
            board,
            assistant: FlagAssistant::new(options),
            score,
        }
    }

    /// Fresh pending session on the same configuration and seed, the same first open replays the
    /// same board.
    pub fn retry(&self) -> Self {
        Self::from_board(BoardState::new(*self.board.config()), self.options())
    }

    pub fn options(&self) -> AssistOptions {
        self.assistant.options()
    }

    /// Uses a different oracle for hints and auto-assist.
    pub fn with_oracle(self, oracle: SolverOracle) -> Self {
        Self {
            assistant: self.assistant.with_oracle(oracle),
            ..self
        }
    }

    pub fn config(&self) -> &MinefieldConfig {
        self.board.config()
    }

    pub fn current_state(&self) -> &BoardState {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Set once the game reached Victory or Defeat.
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn open(&mut self, index: AreaIndex) -> Result<ActionReport> {
        let result = reveal::open(&mut self.board, index)?;
        let mut events = Vec::new();
        push_open_events(&result, &mut events);
        self.after_open(&mut events);
        Ok(self.report(events))
    }

    /// Opens the first area using a layout produced by [`GameSession::prepare`].
    pub fn open_with_layout(&mut self, layout: &MineLayout) -> Result<ActionReport> {
        let result = reveal::open_with_layout(&mut self.board, layout)?;
        let mut events = Vec::new();
        push_open_events(&result, &mut events);
        self.after_open(&mut events);
        Ok(self.report(events))
    }

    pub fn flag(&mut self, index: AreaIndex) -> Result<ActionReport> {
        let change = self.assistant.flag(&mut self.board, index)?;
        Ok(self.report(alloc::vec![mark_event(change, index)]))
    }

    pub fn toggle_question(&mut self, index: AreaIndex) -> Result<ActionReport> {
        let change = self.assistant.toggle_question(&mut self.board, index)?;
        Ok(self.report(alloc::vec![mark_event(change, index)]))
    }

    pub fn chord(&mut self, index: AreaIndex) -> Result<ActionReport> {
        let mut events = Vec::new();
        match self.assistant.chord(&mut self.board, index)? {
            ChordResult::Opened(results) => {
                for result in &results {
                    push_open_events(result, &mut events);
                }
                if !results.is_empty() {
                    self.after_open(&mut events);
                }
            }
            ChordResult::Flagged(flagged) => {
                events.extend(flagged.into_iter().map(GameEvent::Flagged));
            }
        }
        Ok(self.report(events))
    }

    /// Adds play time, only counted while the game is running.
    pub fn advance_time(&mut self, delta: Duration) {
        self.board.advance_time(delta);
    }

    /// First area the oracle proves safe, for hint features accounted for by the caller.
    pub fn hint(&self) -> Option<AreaIndex> {
        if self.board.is_finished() {
            return None;
        }
        self.deductions()
            .safe_to_open
            .into_iter()
            .find(|&index| self.board.cover_at(index).is_openable())
    }

    pub fn deductions(&self) -> DeductionResult {
        self.assistant.oracle().deduce(&self.board)
    }

    pub fn save(&self) -> SaveRecord {
        save::serialize(&self.board)
    }

    pub fn restore(record: &SaveRecord, options: AssistOptions) -> Result<Self> {
        let board = save::restore(record)?;
        Ok(Self::from_board(board, options))
    }

    /// Generates the layout for a first open at `first_open` without touching any session, so it
    /// can run on a worker. Setting `cancel` abandons it.
    pub fn prepare(
        config: &MinefieldConfig,
        first_open: AreaIndex,
        cancel: &AtomicBool,
    ) -> Result<MineLayout> {
        generator::generate_cancellable(config, first_open, cancel)
    }

    fn after_open(&mut self, events: &mut Vec<GameEvent>) {
        if !self.board.is_finished() {
            let assisted = self.assistant.assist(&mut self.board);
            events.extend(assisted.flagged.iter().copied().map(GameEvent::Flagged));
            for result in &assisted.opened {
                push_open_events(result, events);
            }
        }

        if self.board.is_finished() && self.score.is_none() {
            let score = self.board.score();
            self.score = Some(score);
            match self.board.status() {
                GameStatus::Victory => events.push(GameEvent::Victory(score)),
                GameStatus::Defeat => {
                    if let Some(index) = self.board.triggered_mine() {
                        events.push(GameEvent::Defeat(index));
                    }
                }
                GameStatus::Pending | GameStatus::Running => {}
            }
        }
    }

    fn report(&self, events: Vec<GameEvent>) -> ActionReport {
        ActionReport {
            snapshot: self.board.clone(),
            events,
        }
    }
}

fn push_open_events(result: &OpenResult, events: &mut Vec<GameEvent>) {
    if let Some(summary) = result.generated {
        events.push(GameEvent::Generated(summary));
    }
    if let Some(&first) = result.opened.first() {
        events.push(GameEvent::Opened(first));
    }
    let cascaded = result.cascaded();
    if !cascaded.is_empty() {
        events.push(GameEvent::Cascaded(cascaded.to_vec()));
    }
}

fn mark_event(change: MarkChange, index: AreaIndex) -> GameEvent {
    match change {
        MarkChange::Flagged => GameEvent::Flagged(index),
        MarkChange::Unflagged => GameEvent::Unflagged(index),
        MarkChange::Questioned => GameEvent::Questioned(index),
        MarkChange::Unquestioned => GameEvent::Unquestioned(index),
    }
}
