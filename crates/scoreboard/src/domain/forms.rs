use log::{error, warn};
use scoreboard_core::{
    validate_player_id, validate_player_name, validate_title, CoreError, CreateGame,
    CreatePlayer, Game, Player,
};

use super::Error;
use crate::infra::{BackendError, GameApi};

/// Which creation form is open, and what it submits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    CreateGame,
    CreatePlayer,
    AddPlayer { game_id: String },
}

impl FormKind {
    pub fn field_name(&self) -> &'static str {
        match self {
            FormKind::CreateGame => "title",
            FormKind::CreatePlayer => "name",
            FormKind::AddPlayer { .. } => "id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormKind::CreateGame => "Create New Game",
            FormKind::CreatePlayer => "Create New Player",
            FormKind::AddPlayer { .. } => "Add player to the game",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormKind::CreateGame => "Enter Title",
            FormKind::CreatePlayer => "Enter Unique Username",
            FormKind::AddPlayer { .. } => "Enter user id",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            FormKind::AddPlayer { .. } => "Add",
            _ => "Create",
        }
    }

    fn validate(&self, value: &str) -> Result<(), CoreError> {
        match self {
            FormKind::CreateGame => validate_title(value),
            FormKind::CreatePlayer => validate_player_name(value),
            FormKind::AddPlayer { .. } => validate_player_id(value),
        }
    }

    /// Message for a submit that failed; the API's own error body is never shown
    fn failure_message(&self, err: &BackendError) -> &'static str {
        match (self, err.is_transport()) {
            (FormKind::CreateGame, false) => "Failed to create game",
            (FormKind::CreateGame, true) => "Error creating game",
            (FormKind::CreatePlayer, false) => "Failed to create player",
            (FormKind::CreatePlayer, true) => "Error creating player",
            (FormKind::AddPlayer { .. }, false) => "Failed to add player",
            (FormKind::AddPlayer { .. }, true) => "Error adding player",
        }
    }
}

/// Idle -> Validating -> (error -> Idle | Submitting -> (success -> Closed | error -> Idle))
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
    Closed,
}

/// What a successful submit hands back to the view owning the form
#[derive(Debug, Clone, PartialEq)]
pub enum FormSuccess {
    GameCreated(Game),
    PlayerCreated(Player),
    PlayerAdded { player_id: String },
}

/// A validated submit waiting to be sent. Exactly one API call per submission.
#[derive(Debug, Clone)]
pub struct Submission {
    form_id: u64,
    kind: FormKind,
    value: String,
}

impl Submission {
    pub fn form_id(&self) -> u64 {
        self.form_id
    }

    pub fn kind(&self) -> &FormKind {
        &self.kind
    }

    pub async fn send(&self, api: &dyn GameApi) -> Result<FormSuccess, BackendError> {
        match &self.kind {
            FormKind::CreateGame => api
                .create_game(CreateGame {
                    title: self.value.clone(),
                })
                .await
                .map(FormSuccess::GameCreated),
            FormKind::CreatePlayer => api
                .create_player(CreatePlayer {
                    name: self.value.clone(),
                })
                .await
                .map(FormSuccess::PlayerCreated),
            FormKind::AddPlayer { game_id } => api
                .join_game(game_id, &self.value)
                .await
                .map(|_| FormSuccess::PlayerAdded {
                    player_id: self.value.clone(),
                }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreationForm {
    id: u64,
    kind: FormKind,
    phase: FormPhase,
    value: String,
    error: Option<String>,
}

impl CreationForm {
    /// `id` tells successive forms of one view apart, so a response meant for a
    /// form that was cancelled never lands on its replacement.
    pub fn new(id: u64, kind: FormKind) -> Self {
        Self {
            id,
            kind,
            phase: FormPhase::Idle,
            value: String::new(),
            error: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> &FormKind {
        &self.kind
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Last submitted input, kept so the user can fix it
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn close(&mut self) {
        self.phase = FormPhase::Closed;
    }

    /// Validate locally; on success the form is Submitting and the returned
    /// submission must be sent and handed back to [`CreationForm::finish_submit`].
    pub fn begin_submit(&mut self, input: &str) -> Result<Submission, Error> {
        match self.phase {
            FormPhase::Submitting | FormPhase::Validating => return Err(Error::FormBusy),
            FormPhase::Closed => return Err(Error::FormNotOpen),
            FormPhase::Idle => {}
        }

        self.phase = FormPhase::Validating;
        self.error = None;
        self.value = input.to_string();

        if let Err(e) = self.kind.validate(input) {
            self.error = Some(e.to_string());
            self.phase = FormPhase::Idle;
            return Err(e.into());
        }

        self.phase = FormPhase::Submitting;
        Ok(Submission {
            form_id: self.id,
            kind: self.kind.clone(),
            value: input.to_string(),
        })
    }

    pub fn finish_submit(
        &mut self,
        result: Result<FormSuccess, BackendError>,
    ) -> Option<FormSuccess> {
        if self.phase != FormPhase::Submitting {
            warn!("form {} got a submit result while {:?}", self.id, self.phase);
            return None;
        }
        match result {
            Ok(success) => {
                self.phase = FormPhase::Closed;
                Some(success)
            }
            Err(e) => {
                error!("form {} submit failed: {}", self.id, e);
                self.error = Some(self.kind.failure_message(&e).to_string());
                self.phase = FormPhase::Idle;
                None
            }
        }
    }
}
