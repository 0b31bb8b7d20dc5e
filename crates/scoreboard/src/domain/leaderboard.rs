use log::{debug, error, info, warn};
use scoreboard_core::LeaderboardEntry;
use tokio::sync::Mutex;

use super::{
    CreationForm, Error, FormKind, FormSuccess, Notice, RefreshToggle, Snapshot, Submission,
    Ticket,
};
use crate::infra::{BackendError, GameApi};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeaderboardScope {
    Global,
    Game(String),
}

impl LeaderboardScope {
    pub fn game_id(&self) -> Option<&str> {
        match self {
            LeaderboardScope::Global => None,
            LeaderboardScope::Game(id) => Some(id),
        }
    }

    fn form_kind(&self) -> FormKind {
        match self {
            LeaderboardScope::Global => FormKind::CreatePlayer,
            LeaderboardScope::Game(game_id) => FormKind::AddPlayer {
                game_id: game_id.clone(),
            },
        }
    }
}

/// A leaderboard request tied to the scope and generation it was started for
#[derive(Debug)]
pub struct LeaderboardFetch {
    ticket: Ticket,
    scope: LeaderboardScope,
}

impl LeaderboardFetch {
    pub async fn send(&self, api: &dyn GameApi) -> Result<Vec<LeaderboardEntry>, BackendError> {
        match &self.scope {
            LeaderboardScope::Global => api.global_leaderboard().await,
            LeaderboardScope::Game(game_id) => api.game_leaderboard(game_id).await,
        }
    }
}

/// Exit from the game in game scope, delete outright in global scope
#[derive(Debug, Clone)]
pub struct Removal {
    scope: LeaderboardScope,
    player_id: String,
}

impl Removal {
    pub async fn send(&self, api: &dyn GameApi) -> Result<(), BackendError> {
        match &self.scope {
            LeaderboardScope::Global => api.delete_player(&self.player_id).await,
            LeaderboardScope::Game(game_id) => api.exit_game(game_id, &self.player_id).await,
        }
    }

    fn failure_message(&self) -> &'static str {
        match self.scope {
            LeaderboardScope::Global => "Failed to Delete player",
            LeaderboardScope::Game(_) => "Failed to exit",
        }
    }
}

/// State of one mounted leaderboard.
///
/// The rows are refetched whenever the scope or the refresh toggle differ from
/// what the last fetch was issued for; see [`LeaderboardView::needs_fetch`].
#[derive(Debug)]
pub struct LeaderboardView {
    /// Scope the view was mounted with; the game page can switch back to it
    home: LeaderboardScope,
    scope: LeaderboardScope,
    entries: Snapshot<Vec<LeaderboardEntry>>,
    refresh: RefreshToggle,
    fetched_for: Option<(LeaderboardScope, u64)>,
    form: Option<CreationForm>,
    forms_opened: u64,
    notice: Option<Notice>,
    mounted: bool,
}

impl LeaderboardView {
    pub fn new(scope: LeaderboardScope) -> Self {
        Self {
            home: scope.clone(),
            scope,
            entries: Snapshot::new(),
            refresh: RefreshToggle::default(),
            fetched_for: None,
            form: None,
            forms_opened: 0,
            notice: None,
            mounted: true,
        }
    }

    pub fn scope(&self) -> &LeaderboardScope {
        &self.scope
    }

    pub fn home_scope(&self) -> &LeaderboardScope {
        &self.home
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        self.entries.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.is_loaded()
    }

    pub fn form(&self) -> Option<&CreationForm> {
        self.form.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn needs_fetch(&self) -> bool {
        self.mounted && self.fetched_for.as_ref() != Some(&self.dependencies())
    }

    fn dependencies(&self) -> (LeaderboardScope, u64) {
        (self.scope.clone(), self.refresh.flips())
    }

    /// Starts a fetch only when a dependency changed since the last one.
    /// A changed dependency also closes any open form.
    pub fn begin_fetch(&mut self) -> Option<LeaderboardFetch> {
        if !self.needs_fetch() {
            return None;
        }
        if self.form.take().is_some() {
            debug!("closing leaderboard form before refetch of {:?}", self.scope);
        }
        self.fetched_for = Some(self.dependencies());
        Some(LeaderboardFetch {
            ticket: self.entries.begin(),
            scope: self.scope.clone(),
        })
    }

    pub fn finish_fetch(
        &mut self,
        fetch: LeaderboardFetch,
        result: Result<Vec<LeaderboardEntry>, BackendError>,
    ) {
        match result {
            Ok(rows) => {
                debug!("leaderboard {:?} loaded {} rows", fetch.scope, rows.len());
                self.entries.apply(fetch.ticket, rows);
            }
            Err(e) => {
                if self.entries.fail(fetch.ticket) {
                    error!("failed to load leaderboard {:?}: {}", fetch.scope, e);
                    self.notice = Some(Notice::error("Failed to load leaderboard"));
                }
            }
        }
    }

    /// Switching scope drops the old rows and closes any form
    pub fn set_scope(&mut self, scope: LeaderboardScope) {
        if scope == self.scope {
            return;
        }
        info!("leaderboard scope {:?} -> {:?}", self.scope, scope);
        self.scope = scope;
        self.entries.clear();
        self.form = None;
        self.notice = None;
    }

    pub fn request_refresh(&mut self) {
        self.refresh.flip();
    }

    pub fn open_form(&mut self) -> &CreationForm {
        let kind = self.scope.form_kind();
        if self.form.as_ref().map_or(true, |form| *form.kind() != kind) {
            self.forms_opened += 1;
            self.form = Some(CreationForm::new(self.forms_opened, kind.clone()));
        }
        let id = self.forms_opened;
        self.form.get_or_insert_with(|| CreationForm::new(id, kind))
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
            Some(FormSuccess::PlayerCreated(player)) => {
                info!("player created: {} ({})", player.name, player.id);
                self.form = None;
                self.notice = Some(Notice::info(format!("Player Created: {}", player.id)));
            }
            Some(FormSuccess::PlayerAdded { player_id }) => {
                info!("player {} added to {:?}", player_id, self.scope);
                self.form = None;
                self.refresh.flip();
            }
            Some(other) => {
                warn!("leaderboard form got unexpected result {:?}", other);
                self.form = None;
            }
            None => {}
        }
    }

    pub fn begin_remove(&mut self, player_id: &str) -> Removal {
        Removal {
            scope: self.scope.clone(),
            player_id: player_id.to_string(),
        }
    }

    pub fn finish_remove(&mut self, removal: &Removal, result: Result<(), BackendError>) {
        if !self.mounted {
            return;
        }
        match result {
            Ok(()) => {
                info!("removed player {} from {:?}", removal.player_id, removal.scope);
                self.refresh.flip();
            }
            Err(e) => {
                error!(
                    "failed to remove player {} from {:?}: {}",
                    removal.player_id, removal.scope, e
                );
                self.notice = Some(Notice::error(removal.failure_message()));
            }
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.form = None;
        self.entries.clear();
    }
}

/// Fetch if a dependency changed, applying the answer only if it is still wanted
pub async fn sync(view: &Mutex<LeaderboardView>, api: &dyn GameApi) {
    let fetch = view.lock().await.begin_fetch();
    if let Some(fetch) = fetch {
        let result = fetch.send(api).await;
        view.lock().await.finish_fetch(fetch, result);
    }
}

pub async fn refresh(view: &Mutex<LeaderboardView>, api: &dyn GameApi) {
    view.lock().await.request_refresh();
    sync(view, api).await;
}

pub async fn change_scope(
    view: &Mutex<LeaderboardView>,
    api: &dyn GameApi,
    scope: LeaderboardScope,
) {
    view.lock().await.set_scope(scope);
    sync(view, api).await;
}

pub async fn submit_form(
    view: &Mutex<LeaderboardView>,
    api: &dyn GameApi,
    input: &str,
) -> Result<(), Error> {
    let submission = view.lock().await.begin_submit(input)?;
    let result = submission.send(api).await;
    view.lock().await.finish_submit(&submission, result);
    sync(view, api).await;
    Ok(())
}

pub async fn remove_player(view: &Mutex<LeaderboardView>, api: &dyn GameApi, player_id: &str) {
    let removal = view.lock().await.begin_remove(player_id);
    let result = removal.send(api).await;
    view.lock().await.finish_remove(&removal, result);
    sync(view, api).await;
}
