use localbib_core::{BibView, LoadError, Loader, ViewOptions};
use localbib_render::RenderOptions;
use tokio::sync::RwLock;

/// Shared application state accessible from all handlers.
pub struct AppState {
    /// The loaded bibliography. Handlers clone it before applying
    /// per-request search and grouping.
    pub view: RwLock<BibView>,
    pub loader: Loader,
    /// Where the bibliography is fetched from on (re)load.
    pub source: String,
    pub render: RenderOptions,
}

impl AppState {
    pub fn new(view_options: ViewOptions, loader: Loader, source: String, render: RenderOptions) -> Self {
        Self {
            view: RwLock::new(BibView::new(view_options)),
            loader,
            source,
            render,
        }
    }

    /// Fetch the source again and swap the result into the view.
    ///
    /// The lock is only taken once the fetch is done, so pages keep showing
    /// the previous records while a reload is in flight.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        let result = self.loader.fetch_entries(&self.source).await;
        self.view.write().await.finish_load(&self.source, result)
    }

    /// First load after startup: the page shows the loading state until it
    /// completes.
    pub async fn initial_load(&self) -> Result<usize, LoadError> {
        self.view.write().await.begin_load();
        self.reload().await
    }
}
