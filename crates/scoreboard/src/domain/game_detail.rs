use log::{debug, error, info, warn};
use scoreboard_core::{GameDetails, Transition};
use tokio::sync::Mutex;

use super::{Error, Notice, Snapshot, Ticket};
use crate::infra::{BackendError, GameApi};

/// A start or end call that has been let through and not answered yet
#[derive(Debug)]
pub struct PendingTransition {
    game_id: String,
    transition: Transition,
}

impl PendingTransition {
    pub fn transition(&self) -> Transition {
        self.transition
    }

    pub async fn send(&self, api: &dyn GameApi) -> Result<(), BackendError> {
        match self.transition {
            Transition::Start => api.start_game(&self.game_id).await,
            Transition::End => api.end_game(&self.game_id).await,
        }
    }
}

fn unable_message(transition: Transition) -> &'static str {
    match transition {
        Transition::Start => "Unable to start game",
        Transition::End => "Unable to end game",
    }
}

/// One game's record plus the controls to move it along its lifecycle.
///
/// Status changes are optimistic: as soon as the API answers a start or end,
/// whatever the answer, the local record shows the new status until the next
/// full fetch replaces it.
#[derive(Debug)]
pub struct GameDetailView {
    game_id: String,
    details: Snapshot<Option<GameDetails>>,
    fetched: bool,
    reconcile_requested: bool,
    awaiting_reconcile: bool,
    pending: Option<Transition>,
    notice: Option<Notice>,
    mounted: bool,
}

impl GameDetailView {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            details: Snapshot::new(),
            fetched: false,
            reconcile_requested: false,
            awaiting_reconcile: false,
            pending: None,
            notice: None,
            mounted: true,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn details(&self) -> Option<&GameDetails> {
        self.details.get().as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending(&self) -> Option<Transition> {
        self.pending
    }

    /// Shown status came from a transition, not from the API
    pub fn awaiting_reconcile(&self) -> bool {
        self.awaiting_reconcile
    }

    /// The one control to offer right now, if any
    pub fn available_transition(&self) -> Option<Transition> {
        if self.pending.is_some() {
            return None;
        }
        self.details().and_then(|d| d.status.transition())
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Ask for one more fetch on the next sync
    pub fn request_reconcile(&mut self) {
        self.reconcile_requested = true;
    }

    pub fn begin_fetch(&mut self) -> Option<Ticket> {
        if !self.mounted || (self.fetched && !self.reconcile_requested) {
            return None;
        }
        self.fetched = true;
        self.reconcile_requested = false;
        Some(self.details.begin())
    }

    pub fn finish_fetch(&mut self, ticket: Ticket, result: Result<GameDetails, BackendError>) {
        match result {
            Ok(details) => {
                debug!("loaded details of game {}: {}", self.game_id, details.status);
                if self.details.apply(ticket, Some(details)) {
                    self.awaiting_reconcile = false;
                }
            }
            Err(e) => {
                if self.details.fail(ticket) {
                    error!("failed to load game details {}: {}", self.game_id, e);
                    self.awaiting_reconcile = false;
                    self.notice = Some(Notice::error("Failed to load game details"));
                }
            }
        }
    }

    /// Lets a transition through only if the shown status offers it
    pub fn begin_transition(&mut self, transition: Transition) -> Result<PendingTransition, Error> {
        if self.pending.is_some() {
            return Err(Error::TransitionInFlight);
        }
        let status = self.details().map(|d| d.status);
        if status.and_then(|s| s.transition()) != Some(transition) {
            let shown = status.map_or_else(|| String::from("not loaded"), |s| s.to_string());
            warn!(
                "refusing to {} game {} while {}",
                transition, self.game_id, shown
            );
            return Err(Error::TransitionUnavailable(transition, shown));
        }

        self.pending = Some(transition);
        self.notice = None;
        Ok(PendingTransition {
            game_id: self.game_id.clone(),
            transition,
        })
    }

    pub fn finish_transition(
        &mut self,
        pending: &PendingTransition,
        result: Result<(), BackendError>,
    ) {
        self.pending = None;
        if !self.mounted {
            return;
        }

        let transition = pending.transition;
        match result {
            Err(e) if e.is_transport() => {
                error!("could not {} game {}: {}", transition, self.game_id, e);
                self.notice = Some(Notice::error(unable_message(transition)));
                return;
            }
            Err(e) => {
                warn!(
                    "game api did not accept {} of game {}: {}",
                    transition, self.game_id, e
                );
                let answer = e
                    .status()
                    .map_or_else(|| e.to_string(), |status| status.to_string());
                self.notice = Some(Notice::warning(format!(
                    "Game API answered {} to {}, the status shown may be out of date",
                    answer, transition
                )));
            }
            Ok(()) => info!("{} of game {} went through", transition, self.game_id),
        }

        self.details.update(|details| {
            if let Some(details) = details {
                details.status = transition.target();
            }
        });
        self.awaiting_reconcile = true;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.details.clear();
    }
}

pub async fn sync(view: &Mutex<GameDetailView>, api: &dyn GameApi) {
    let (ticket, game_id) = {
        let mut view = view.lock().await;
        (view.begin_fetch(), view.game_id.clone())
    };
    if let Some(ticket) = ticket {
        let result = api.game_details(&game_id).await;
        view.lock().await.finish_fetch(ticket, result);
    }
}

/// Start or end the game; with `reconcile` the record is fetched again right after
pub async fn transition(
    view: &Mutex<GameDetailView>,
    api: &dyn GameApi,
    transition: Transition,
    reconcile: bool,
) -> Result<(), Error> {
    let pending = view.lock().await.begin_transition(transition)?;
    let result = pending.send(api).await;
    {
        let mut view = view.lock().await;
        view.finish_transition(&pending, result);
        if reconcile {
            view.request_reconcile();
        }
    }
    sync(view, api).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{mock_api::MockGameApi, InMemoryBackend};
    use reqwest_middleware::reqwest::StatusCode;
    use scoreboard_core::{CreateGame, GameStatus};

    fn details(status: GameStatus) -> GameDetails {
        GameDetails {
            game_id: "g1".into(),
            title: "Trivia Night".into(),
            status,
            started_at: None,
            ended_at: None,
            w1: 0.0,
            w2: 4.0,
            w3: 9.0,
            w4: 0.0,
            w5: 0.0,
            popularity_index: 0.45,
        }
    }

    fn transport_error() -> BackendError {
        BackendError::Middleware(reqwest_middleware::Error::Middleware(anyhow::anyhow!(
            "connection refused"
        )))
    }

    #[tokio::test]
    async fn test_start_applies_status_whatever_the_answer() {
        let mut api = MockGameApi::new();
        api.expect_game_details()
            .withf(|game_id| game_id == "g1")
            .times(1)
            .returning(|_| Ok(details(GameStatus::Pending)));
        api.expect_start_game()
            .withf(|game_id| game_id == "g1")
            .times(1)
            .returning(|_| Ok(()));

        let view = Mutex::new(GameDetailView::new("g1"));
        sync(&view, &api).await;
        assert_eq!(
            view.lock().await.available_transition(),
            Some(Transition::Start)
        );

        transition(&view, &api, Transition::Start, false)
            .await
            .unwrap();

        let view = view.lock().await;
        assert_eq!(view.details().unwrap().status, GameStatus::Started);
        assert!(view.awaiting_reconcile());
        assert_eq!(view.available_transition(), Some(Transition::End));
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_rejected_end_still_applies_with_warning() {
        let mut api = MockGameApi::new();
        api.expect_game_details()
            .times(1)
            .returning(|_| Ok(details(GameStatus::Started)));
        api.expect_end_game().times(1).returning(|_| {
            Err(BackendError::Status {
                status: StatusCode::BAD_REQUEST,
                context: "end game".into(),
            })
        });

        let view = Mutex::new(GameDetailView::new("g1"));
        sync(&view, &api).await;
        transition(&view, &api, Transition::End, false).await.unwrap();

        let view = view.lock().await;
        assert_eq!(view.details().unwrap().status, GameStatus::Ended);
        assert_eq!(view.available_transition(), None);
        let notice = view.notice().unwrap();
        assert_eq!(notice.level, crate::domain::NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_transport_failure_applies_nothing() {
        let mut view = GameDetailView::new("g1");
        let ticket = view.begin_fetch().unwrap();
        view.finish_fetch(ticket, Ok(details(GameStatus::Pending)));

        let pending = view.begin_transition(Transition::Start).unwrap();
        view.finish_transition(&pending, Err(transport_error()));

        assert_eq!(view.details().unwrap().status, GameStatus::Pending);
        assert!(!view.awaiting_reconcile());
        assert_eq!(
            view.notice().map(|n| n.message.as_str()),
            Some("Unable to start game")
        );
    }

    #[tokio::test]
    async fn test_unavailable_transition_makes_no_call() {
        let mut api = MockGameApi::new();
        api.expect_game_details()
            .times(1)
            .returning(|_| Ok(details(GameStatus::Ended)));

        let view = Mutex::new(GameDetailView::new("g1"));
        sync(&view, &api).await;

        let err = transition(&view, &api, Transition::Start, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransitionUnavailable(Transition::Start, _)));
        assert!(matches!(
            transition(&view, &api, Transition::End, false).await,
            Err(Error::TransitionUnavailable(Transition::End, _))
        ));
    }

    #[tokio::test]
    async fn test_second_transition_while_in_flight_is_rejected() {
        let mut view = GameDetailView::new("g1");
        let ticket = view.begin_fetch().unwrap();
        view.finish_fetch(ticket, Ok(details(GameStatus::Pending)));

        let _pending = view.begin_transition(Transition::Start).unwrap();
        assert!(matches!(
            view.begin_transition(Transition::Start),
            Err(Error::TransitionInFlight)
        ));
        assert_eq!(view.available_transition(), None);
    }

    #[tokio::test]
    async fn test_optimistic_status_beats_fetch_in_flight() {
        let mut view = GameDetailView::new("g1");
        let ticket = view.begin_fetch().unwrap();
        view.finish_fetch(ticket, Ok(details(GameStatus::Pending)));

        view.request_reconcile();
        let slow = view.begin_fetch().unwrap();
        let pending = view.begin_transition(Transition::Start).unwrap();
        view.finish_transition(&pending, Ok(()));
        view.finish_fetch(slow, Ok(details(GameStatus::Pending)));

        assert_eq!(view.details().unwrap().status, GameStatus::Started);
    }

    #[tokio::test]
    async fn test_reconcile_refetches_real_record() {
        let backend = InMemoryBackend::new();
        let game = backend
            .create_game(CreateGame {
                title: "Trivia Night".into(),
            })
            .await
            .unwrap();
        let view = Mutex::new(GameDetailView::new(game.id.clone()));
        sync(&view, &backend).await;
        backend.clear_calls().await;

        transition(&view, &backend, Transition::Start, true)
            .await
            .unwrap();

        assert_eq!(
            backend.calls().await,
            vec![
                format!("PUT /games/{}/start", game.id),
                format!("GET /games/{}/details", game.id),
            ]
        );
        let view = view.lock().await;
        let details = view.details().unwrap();
        assert_eq!(details.status, GameStatus::Started);
        assert!(details.started_at.is_some());
        assert!(!view.awaiting_reconcile());
    }

    #[tokio::test]
    async fn test_missing_game_shows_load_error() {
        let backend = InMemoryBackend::new();
        let view = Mutex::new(GameDetailView::new("404"));
        sync(&view, &backend).await;

        let view = view.lock().await;
        assert!(view.details().is_none());
        assert_eq!(
            view.notice().map(|n| n.message.as_str()),
            Some("Failed to load game details")
        );
    }
}
