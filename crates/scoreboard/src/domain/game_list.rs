use log::{debug, error, info, warn};
use scoreboard_core::Game;
use tokio::sync::Mutex;

use super::{CreationForm, Error, FormKind, FormSuccess, Notice, Snapshot, Submission, Ticket};
use crate::infra::{BackendError, GameApi};

#[derive(Debug)]
pub struct GameListView {
    games: Snapshot<Vec<Game>>,
    /// Games created through this view, kept across a list fetch racing the create
    created: Vec<Game>,
    fetched: bool,
    form: Option<CreationForm>,
    forms_opened: u64,
    notice: Option<Notice>,
    mounted: bool,
}

impl Default for GameListView {
    fn default() -> Self {
        Self::new()
    }
}

impl GameListView {
    pub fn new() -> Self {
        Self {
            games: Snapshot::new(),
            created: Vec::new(),
            fetched: false,
            form: None,
            forms_opened: 0,
            notice: None,
            mounted: true,
        }
    }

    pub fn games(&self) -> &[Game] {
        self.games.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.games.is_loaded()
    }

    pub fn form(&self) -> Option<&CreationForm> {
        self.form.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// The list is fetched once per mount; afterwards only local appends change it
    pub fn begin_fetch(&mut self) -> Option<Ticket> {
        if self.fetched || !self.mounted {
            return None;
        }
        self.fetched = true;
        Some(self.games.begin())
    }

    pub fn finish_fetch(&mut self, ticket: Ticket, result: Result<Vec<Game>, BackendError>) {
        match result {
            Ok(mut games) => {
                debug!("loaded {} games", games.len());
                for game in &self.created {
                    upsert(&mut games, game.clone());
                }
                self.games.apply(ticket, games);
            }
            Err(e) => {
                if self.games.fail(ticket) {
                    error!("failed to load games: {}", e);
                    self.notice = Some(Notice::error("Failed to load games"));
                }
            }
        }
    }

    pub fn open_form(&mut self) -> &CreationForm {
        match &mut self.form {
            Some(form) => form,
            slot => {
                self.forms_opened += 1;
                slot.insert(CreationForm::new(self.forms_opened, FormKind::CreateGame))
            }
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn dismiss_form_error(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.dismiss_error();
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn begin_submit(&mut self, input: &str) -> Result<Submission, Error> {
        self.form
            .as_mut()
            .ok_or(Error::FormNotOpen)?
            .begin_submit(input)
    }

    pub fn finish_submit(
        &mut self,
        submission: &Submission,
        result: Result<FormSuccess, BackendError>,
    ) {
        let Some(form) = self
            .form
            .as_mut()
            .filter(|form| form.id() == submission.form_id())
        else {
            debug!(
                "dropping result of form {} which is no longer open",
                submission.form_id()
            );
            return;
        };

        match form.finish_submit(result) {
            Some(FormSuccess::GameCreated(game)) => {
                info!("game created: {} ({})", game.title, game.id);
                self.form = None;
                self.add_game(game);
            }
            Some(other) => {
                warn!("game list form got unexpected result {:?}", other);
                self.form = None;
            }
            None => {}
        }
    }

    fn add_game(&mut self, game: Game) {
        upsert(&mut self.created, game.clone());
        self.games.modify(|games| upsert(games, game));
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.form = None;
        self.created.clear();
        self.games.clear();
    }
}

/// Appends, or replaces the row with the same id so a game shows once
fn upsert(games: &mut Vec<Game>, game: Game) {
    match games.iter_mut().find(|existing| existing.id == game.id) {
        Some(existing) => *existing = game,
        None => games.push(game),
    }
}

pub async fn sync(view: &Mutex<GameListView>, api: &dyn GameApi) {
    let ticket = view.lock().await.begin_fetch();
    if let Some(ticket) = ticket {
        let result = api.list_games().await;
        view.lock().await.finish_fetch(ticket, result);
    }
}

pub async fn submit_form(
    view: &Mutex<GameListView>,
    api: &dyn GameApi,
    input: &str,
) -> Result<(), Error> {
    let submission = view.lock().await.begin_submit(input)?;
    let result = submission.send(api).await;
    view.lock().await.finish_submit(&submission, result);
    Ok(())
}
