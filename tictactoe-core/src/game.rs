//! Click-driven game session: gate, engine and notifications.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{MoveResult, OccupiedCells, Outcome, Player, Pos, Result, TallyEngine};

/// How a finished game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOver {
    Won(Player),
    Draw,
}

impl GameOver {
    /// Build from a move result; `None` while the game goes on.
    pub fn from_result(result: MoveResult) -> Option<GameOver> {
        match result.outcome {
            Outcome::Continue => None,
            Outcome::Win => Some(GameOver::Won(result.player)),
            Outcome::Draw => Some(GameOver::Draw),
        }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            GameOver::Won(player) => Some(player),
            GameOver::Draw => None,
        }
    }

    /// Text shown to the players.
    pub fn message(self) -> String {
        match self {
            GameOver::Won(player) => format!("Congrats {} you win!", player.mark()),
            GameOver::Draw => "No winner, resetting game".to_string(),
        }
    }
}

/// Everything a page needs to redraw after a move.
///
/// Built once the game has settled, so a click handler can update the whole
/// page from this value without reading the game again.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    /// Who moved.
    pub player: Player,
    /// Mark to draw into the clicked cell.
    pub mark: char,
    pub outcome: Outcome,
    pub winner: Option<Player>,
    /// Game-over text, `None` while the game goes on.
    pub message: Option<String>,
    /// True when the visual board has been wiped for a new game.
    pub clear_board: bool,
    pub next_player: Player,
    pub next_mark: char,
    pub turn_label: String,
}

impl MoveReport {
    /// Describe `result`, with `next` on turn afterwards.
    pub fn new(result: MoveResult, next: Player) -> MoveReport {
        let over = GameOver::from_result(result);
        MoveReport {
            player: result.player,
            mark: result.player.mark(),
            outcome: result.outcome,
            winner: over.and_then(GameOver::winner),
            message: over.map(GameOver::message),
            clear_board: over.is_some(),
            next_player: next,
            next_mark: next.mark(),
            turn_label: turn_label(next),
        }
    }
}

/// Turn indicator text for `player`.
pub fn turn_label(player: Player) -> String {
    format!("Player {} it's your turn!", player.mark())
}

/// Receives game events from a [`Game`].
///
/// Both hooks are called after the engine has settled, so the board and
/// engine are already in their new state.
pub trait GameObserver {
    /// The game continues and `next` is now on turn.
    fn on_turn(&mut self, _next: Player) {}

    /// A game finished. The board has already been cleared.
    fn on_game_over(&mut self, _result: GameOver) {}
}

impl GameObserver for () {}

/// One running game: the visual board, the tally engine and an observer.
#[derive(Clone, Debug, Default)]
pub struct Game<O = ()> {
    engine: TallyEngine,
    board: OccupiedCells,
    observer: O,
}

impl Game<()> {
    /// Create a game nobody listens to.
    pub fn new() -> Game<()> {
        Game::with_observer(())
    }
}

impl<O: GameObserver> Game<O> {
    pub fn with_observer(observer: O) -> Game<O> {
        Game {
            engine: TallyEngine::new(),
            board: OccupiedCells::new(),
            observer,
        }
    }

    /// Handle a click on (row, col).
    ///
    /// Returns `Ok(None)` when the cell already shows a mark; nothing changes
    /// in that case.
    #[instrument(skip(self))]
    pub fn select(&mut self, row: u8, col: u8) -> Result<Option<MoveResult>> {
        let pos = Pos::try_from_row_col(row, col)?;
        let player = self.engine.current_player();

        if !self.board.mark(pos, player) {
            debug!("cell already marked, ignoring");
            return Ok(None);
        }

        let result = self.engine.apply(pos);
        match GameOver::from_result(result) {
            None => self.observer.on_turn(self.engine.current_player()),
            Some(over) => {
                info!(?over, "game over");
                self.board.clear();
                self.observer.on_game_over(over);
            }
        }

        Ok(Some(result))
    }

    /// Start over without finishing the current game. The turn is kept.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) {
        self.board.clear();
        self.engine.reset();
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.engine.current_player()
    }

    /// Turn indicator text for the current player.
    pub fn turn_label(&self) -> String {
        turn_label(self.current_player())
    }

    pub fn engine(&self) -> &TallyEngine {
        &self.engine
    }

    pub fn board(&self) -> &OccupiedCells {
        &self.board
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;

    #[derive(Default)]
    struct Recorder {
        turns: Vec<Player>,
        finished: Vec<GameOver>,
    }

    impl GameObserver for Recorder {
        fn on_turn(&mut self, next: Player) {
            self.turns.push(next);
        }

        fn on_game_over(&mut self, result: GameOver) {
            self.finished.push(result);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(turn_label(Player::One), "Player O it's your turn!");
        assert_eq!(GameOver::Won(Player::Two).message(), "Congrats X you win!");
        assert_eq!(GameOver::Draw.message(), "No winner, resetting game");
        assert_eq!(GameOver::Draw.winner(), None);
    }

    #[test]
    fn test_report_while_playing() {
        let mut game = Game::new();
        let result = game.select(0, 1).unwrap().unwrap();
        let report = MoveReport::new(result, game.current_player());

        assert_eq!(report.player, Player::One);
        assert_eq!(report.mark, 'O');
        assert_eq!(report.outcome, Outcome::Continue);
        assert_eq!(report.winner, None);
        assert_eq!(report.message, None);
        assert!(!report.clear_board);
        assert_eq!(report.next_player, Player::Two);
        assert_eq!(report.turn_label, "Player X it's your turn!");
    }

    #[test]
    fn test_report_carries_game_over_details() {
        let mut game = Game::new();
        for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            game.select(row, col).unwrap();
        }
        let result = game.select(0, 2).unwrap().unwrap();
        let report = MoveReport::new(result, game.current_player());

        assert_eq!(report.outcome, Outcome::Win);
        assert_eq!(report.winner, Some(Player::One));
        assert_eq!(report.message.as_deref(), Some("Congrats O you win!"));
        assert!(report.clear_board);
        assert_eq!(report.next_mark, 'O');
        assert_eq!(report.turn_label, "Player O it's your turn!");

        let draw = MoveReport::new(
            MoveResult { player: Player::Two, outcome: Outcome::Draw },
            Player::Two,
        );
        assert_eq!(draw.winner, None);
        assert_eq!(draw.message.as_deref(), Some("No winner, resetting game"));
        assert!(draw.clear_board);
    }

    #[test]
    fn test_report_wire_names() {
        let report = MoveReport::new(
            MoveResult { player: Player::One, outcome: Outcome::Win },
            Player::One,
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["mark"], "O");
        assert_eq!(json["winner"], "one");
        assert_eq!(json["clearBoard"], true);
        assert_eq!(json["nextMark"], "O");
        assert_eq!(json["turnLabel"], "Player O it's your turn!");
        assert_eq!(json["message"], "Congrats O you win!");
    }

    #[test]
    fn test_select_marks_and_notifies_turn() {
        let mut game = Game::with_observer(Recorder::default());
        let result = game.select(1, 1).unwrap();

        assert_eq!(result, Some(MoveResult { player: Player::One, outcome: Outcome::Continue }));
        assert_eq!(game.board().mark_at(Pos::from_row_col(1, 1)), Some(Player::One));
        assert_eq!(game.observer().turns, vec![Player::Two]);
        assert_eq!(game.turn_label(), "Player X it's your turn!");
    }

    #[test]
    fn test_click_on_marked_cell_is_ignored() {
        let mut game = Game::with_observer(Recorder::default());
        game.select(0, 0).unwrap();

        assert_eq!(game.select(0, 0).unwrap(), None);
        assert_eq!(game.engine().move_count(), 1);
        assert_eq!(game.current_player(), Player::Two);
        assert_eq!(game.observer().turns.len(), 1);
    }

    #[test]
    fn test_win_clears_board_and_notifies() {
        let mut game = Game::with_observer(Recorder::default());
        for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            game.select(row, col).unwrap();
        }
        let result = game.select(0, 2).unwrap();

        assert_eq!(result, Some(MoveResult { player: Player::One, outcome: Outcome::Win }));
        assert!(game.board().is_empty());
        assert!(game.engine().is_fresh());
        assert_eq!(game.observer().finished, vec![GameOver::Won(Player::One)]);
        // No turn notification for the winning move
        assert_eq!(game.observer().turns.len(), 4);
    }

    #[test]
    fn test_draw_clears_board_and_notifies() {
        let mut game = Game::with_observer(Recorder::default());
        let moves = [(0, 0), (0, 1), (1, 0), (1, 1), (2, 1), (2, 0), (0, 2), (1, 2), (2, 2)];
        let results: Vec<_> = moves
            .iter()
            .map(|&(row, col)| game.select(row, col).unwrap())
            .collect();

        assert_eq!(results[8].map(|r| r.outcome), Some(Outcome::Draw));
        assert!(game.board().is_empty());
        assert_eq!(game.observer().finished, vec![GameOver::Draw]);
    }

    #[test]
    fn test_new_game_keeps_turn() {
        let mut game = Game::new();
        game.select(0, 0).unwrap();
        game.new_game();

        assert!(game.board().is_empty());
        assert!(game.engine().is_fresh());
        assert_eq!(game.current_player(), Player::Two);
        // The cleared cell is playable again
        assert!(game.select(0, 0).unwrap().is_some());
    }

    #[test]
    fn test_invalid_click() {
        let mut game = Game::new();
        assert_eq!(
            game.select(5, 1),
            Err(GameError::InvalidPosition { row: 5, col: 1 })
        );
        assert!(game.board().is_empty());
    }
}
