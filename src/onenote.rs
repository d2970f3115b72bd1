// Get-or-create orchestration for notebook -> section -> page.
//
// The helper borrows both client styles instead of holding global handles.
// Each level is looked up first and created only when absent. Nothing is
// rolled back: if a later level fails, earlier creations stay in place.

use anyhow::Result;

use crate::graph::{Notebook, OneNoteApi, Page, PageWriter, Section};

/// Whether a resource already existed or was created by this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Found(T),
    Created(T),
}

impl<T> Resolved<T> {
    pub fn get(&self) -> &T {
        match self {
            Resolved::Found(v) | Resolved::Created(v) => v,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }
}

/// User and display names a provisioning run works on.
#[derive(Debug, Clone)]
pub struct Targets {
    pub user: String,
    pub notebook: String,
    pub section: String,
    pub page: String,
}

/// Result of a full provisioning run.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub notebook: Resolved<Notebook>,
    pub section: Resolved<Section>,
    pub page: Resolved<Page>,
}

pub struct OneNoteHelper<'a> {
    api: &'a dyn OneNoteApi,
    pages: &'a dyn PageWriter,
}

impl<'a> OneNoteHelper<'a> {
    pub fn new(api: &'a dyn OneNoteApi, pages: &'a dyn PageWriter) -> Self {
        OneNoteHelper { api, pages }
    }

    pub fn get_notebook(&self, user: &str, name: &str) -> Result<Option<Notebook>> {
        self.api.get_notebook(user, name)
    }

    pub fn create_notebook(&self, user: &str, name: &str) -> Result<Notebook> {
        self.api.create_notebook(user, name)
    }

    pub fn get_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Option<Section>> {
        self.api.get_section(user, notebook, name)
    }

    pub fn create_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Section> {
        self.api.create_section(user, notebook, name)
    }

    pub fn get_page(&self, user: &str, section: &Section, name: &str) -> Result<Option<Page>> {
        self.api.get_page(user, section, name)
    }

    pub fn create_page(&self, user: &str, section: &Section, name: &str) -> Result<Page> {
        self.pages.create_page(user, section, name)
    }

    pub fn notebook(&self, user: &str, name: &str) -> Result<Resolved<Notebook>> {
        get_or_create(
            "notebook",
            name,
            || self.get_notebook(user, name),
            || self.create_notebook(user, name),
        )
    }

    pub fn section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Resolved<Section>> {
        get_or_create(
            "section",
            name,
            || self.get_section(user, notebook, name),
            || self.create_section(user, notebook, name),
        )
    }

    pub fn page(&self, user: &str, section: &Section, name: &str) -> Result<Resolved<Page>> {
        get_or_create(
            "page",
            name,
            || self.get_page(user, section, name),
            || self.create_page(user, section, name),
        )
    }

    /// Resolve notebook, section and page in order, stopping at the first
    /// error.
    pub fn provision(&self, targets: &Targets) -> Result<Provisioned> {
        let notebook = self.notebook(&targets.user, &targets.notebook)?;
        let section = self.section(&targets.user, notebook.get(), &targets.section)?;
        let page = self.page(&targets.user, section.get(), &targets.page)?;
        Ok(Provisioned {
            notebook,
            section,
            page,
        })
    }
}

fn get_or_create<T>(
    kind: &str,
    name: &str,
    get: impl FnOnce() -> Result<Option<T>>,
    create: impl FnOnce() -> Result<T>,
) -> Result<Resolved<T>> {
    if let Some(found) = get()? {
        tracing::info!(kind, name, "found existing resource");
        return Ok(Resolved::Found(found));
    }
    tracing::info!(kind, name, "resource absent, creating");
    Ok(Resolved::Created(create()?))
}
