// Entrypoint for the OneNote console sample.
// - Loads settings; a bad config prints a hint and returns before any call.
// - Builds one token provider, shared by the typed and raw clients.
// - Returns `anyhow::Result` so remote and auth failures end the run.

use std::sync::Arc;

use onenote_sample::api::{AuthenticatedClient, BearerAuth};
use onenote_sample::auth::{ClientCredentialsProvider, GRAPH_DEFAULT_SCOPE};
use onenote_sample::config::AppSettings;
use onenote_sample::graph::{GraphClient, PageClient};
use onenote_sample::onenote::OneNoteHelper;
use onenote_sample::ui;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    ui::start(AppSettings::load(), |settings| {
        let tokens = Arc::new(ClientCredentialsProvider::new(
            settings,
            &[GRAPH_DEFAULT_SCOPE],
        )?);

        // Typed client for notebooks/sections, raw client for multipart pages.
        let http = AuthenticatedClient::from_env()?.with_interceptor(BearerAuth::new(tokens));
        let graph = GraphClient::new(http.clone());
        let pages = PageClient::new(http);

        let helper = OneNoteHelper::new(&graph, &pages);
        ui::run(&helper, &ui::sample_targets())
    })?;
    Ok(())
}
