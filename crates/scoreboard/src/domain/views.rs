use log::{debug, info};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{sync::Mutex, time::sleep};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Error, GameDetailView, GameListView, LeaderboardScope, LeaderboardView};

#[derive(Clone)]
pub enum MountedView {
    Games(Arc<Mutex<GameListView>>),
    Leaderboard(Arc<Mutex<LeaderboardView>>),
    Details(Arc<Mutex<GameDetailView>>),
}

impl MountedView {
    fn kind(&self) -> &'static str {
        match self {
            MountedView::Games(_) => "game list",
            MountedView::Leaderboard(_) => "leaderboard",
            MountedView::Details(_) => "game details",
        }
    }

    async fn unmount(&self) {
        match self {
            MountedView::Games(view) => view.lock().await.unmount(),
            MountedView::Leaderboard(view) => view.lock().await.unmount(),
            MountedView::Details(view) => view.lock().await.unmount(),
        }
    }
}

struct Entry {
    view: MountedView,
    touched: Instant,
}

/// Every view a browser page currently has mounted, addressed by an opaque id
#[derive(Default)]
pub struct ViewRegistry {
    views: Mutex<HashMap<Uuid, Entry>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.views.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.views.lock().await.is_empty()
    }

    async fn mount(&self, view: MountedView) -> Uuid {
        let id = Uuid::now_v7();
        debug!("mounting {} view {}", view.kind(), id);
        self.views.lock().await.insert(
            id,
            Entry {
                view,
                touched: Instant::now(),
            },
        );
        id
    }

    pub async fn mount_games(&self) -> (Uuid, Arc<Mutex<GameListView>>) {
        let view = Arc::new(Mutex::new(GameListView::new()));
        let id = self.mount(MountedView::Games(view.clone())).await;
        (id, view)
    }

    pub async fn mount_leaderboard(
        &self,
        scope: LeaderboardScope,
    ) -> (Uuid, Arc<Mutex<LeaderboardView>>) {
        let view = Arc::new(Mutex::new(LeaderboardView::new(scope)));
        let id = self.mount(MountedView::Leaderboard(view.clone())).await;
        (id, view)
    }

    pub async fn mount_details(&self, game_id: &str) -> (Uuid, Arc<Mutex<GameDetailView>>) {
        let view = Arc::new(Mutex::new(GameDetailView::new(game_id)));
        let id = self.mount(MountedView::Details(view.clone())).await;
        (id, view)
    }

    /// Looks a view up and marks it as used
    pub async fn get(&self, view_id: &str) -> Result<MountedView, Error> {
        let id = parse_id(view_id)?;
        let mut views = self.views.lock().await;
        let entry = views
            .get_mut(&id)
            .ok_or_else(|| Error::ViewNotFound(view_id.to_string()))?;
        entry.touched = Instant::now();
        Ok(entry.view.clone())
    }

    pub async fn games(&self, view_id: &str) -> Result<Arc<Mutex<GameListView>>, Error> {
        match self.get(view_id).await? {
            MountedView::Games(view) => Ok(view),
            _ => Err(Error::ViewNotFound(view_id.to_string())),
        }
    }

    pub async fn leaderboard(&self, view_id: &str) -> Result<Arc<Mutex<LeaderboardView>>, Error> {
        match self.get(view_id).await? {
            MountedView::Leaderboard(view) => Ok(view),
            _ => Err(Error::ViewNotFound(view_id.to_string())),
        }
    }

    pub async fn details(&self, view_id: &str) -> Result<Arc<Mutex<GameDetailView>>, Error> {
        match self.get(view_id).await? {
            MountedView::Details(view) => Ok(view),
            _ => Err(Error::ViewNotFound(view_id.to_string())),
        }
    }

    /// Drops the view; anything still in flight for it is discarded when it lands
    pub async fn unmount(&self, view_id: &str) -> Result<(), Error> {
        let id = parse_id(view_id)?;
        let entry = self
            .views
            .lock()
            .await
            .remove(&id)
            .ok_or_else(|| Error::ViewNotFound(view_id.to_string()))?;
        debug!("unmounting {} view {}", entry.view.kind(), id);
        entry.view.unmount().await;
        Ok(())
    }

    /// Unmounts views nobody touched for `ttl`, returns how many went
    pub async fn sweep(&self, ttl: Duration) -> usize {
        let expired: Vec<Entry> = {
            let mut views = self.views.lock().await;
            let ids: Vec<Uuid> = views
                .iter()
                .filter(|(_, entry)| entry.touched.elapsed() >= ttl)
                .map(|(id, _)| *id)
                .collect();
            ids.iter().filter_map(|id| views.remove(id)).collect()
        };
        for entry in &expired {
            entry.view.unmount().await;
        }
        expired.len()
    }
}

fn parse_id(view_id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(view_id).map_err(|_| Error::ViewNotFound(view_id.to_string()))
}

/// Periodically unmounts views whose page went away without saying so
pub struct ViewSweeper {
    views: Arc<ViewRegistry>,
    ttl: Duration,
    sweep_interval: Duration,
    cancel_token: CancellationToken,
}

impl ViewSweeper {
    pub fn new(
        views: Arc<ViewRegistry>,
        cancel_token: CancellationToken,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            views,
            ttl,
            sweep_interval,
            cancel_token,
        }
    }

    pub async fn watch(&self) -> Result<(), anyhow::Error> {
        info!("Starting view sweeper");

        loop {
            if self.cancel_token.is_cancelled() {
                info!("View sweeper received cancellation");
                break;
            }

            let swept = self.views.sweep(self.ttl).await;
            if swept > 0 {
                info!("Unmounted {} abandoned views", swept);
            } else {
                debug!("No abandoned views");
            }

            tokio::select! {
                _ = sleep(self.sweep_interval) => continue,
                _ = self.cancel_token.cancelled() => {
                    info!("View sweeper cancelled during sleep");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_lookup_by_kind() {
        let registry = ViewRegistry::new();
        let (games_id, _) = registry.mount_games().await;
        let (details_id, _) = registry.mount_details("g1").await;

        assert_ok!(registry.games(&games_id.to_string()).await);
        assert_err!(registry.leaderboard(&games_id.to_string()).await);
        let details = registry.details(&details_id.to_string()).await.unwrap();
        assert_eq!(details.lock().await.game_id(), "g1");
        assert!(matches!(
            registry.games("not-a-view").await,
            Err(Error::ViewNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unmount_clears_view_state() {
        let registry = ViewRegistry::new();
        let (id, view) = registry.mount_leaderboard(LeaderboardScope::Global).await;
        view.lock().await.open_form();

        assert_ok!(registry.unmount(&id.to_string()).await);

        assert!(registry.is_empty().await);
        let view = view.lock().await;
        assert!(!view.is_mounted());
        assert!(view.form().is_none());
        assert_err!(registry.unmount(&id.to_string()).await);
    }

    #[tokio::test]
    async fn test_sweep_only_takes_stale_views() {
        let registry = ViewRegistry::new();
        registry.mount_games().await;
        registry.mount_games().await;

        assert_eq!(registry.sweep(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.len().await, 2);
        assert_eq!(registry.sweep(Duration::ZERO).await, 2);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_cancel() {
        let registry = Arc::new(ViewRegistry::new());
        registry.mount_games().await;
        let cancel_token = CancellationToken::new();
        let sweeper = ViewSweeper::new(
            registry.clone(),
            cancel_token.clone(),
            Duration::ZERO,
            Duration::from_secs(3600),
        );

        let handle = tokio::spawn(async move { sweeper.watch().await });
        while !registry.is_empty().await {
            tokio::task::yield_now().await;
        }
        cancel_token.cancel();

        assert_ok!(handle.await.unwrap());
    }
}
