// Typed OneNote surface over Microsoft Graph.
//
// `GraphClient` covers notebook and section reads/creates and page reads
// with JSON bodies. Page creation needs a multipart body, so it lives in
// `PageClient`, which drives the raw `AuthenticatedClient` directly.

use anyhow::{Context, Result};
use reqwest::blocking::multipart;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::AuthenticatedClient;

/// A OneNote notebook owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    pub display_name: String,
}

/// A section inside a notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub display_name: String,
}

/// A page inside a section. Pages are named by their title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
}

/// Read and create operations the typed client supports.
pub trait OneNoteApi {
    fn get_notebook(&self, user: &str, name: &str) -> Result<Option<Notebook>>;
    fn create_notebook(&self, user: &str, name: &str) -> Result<Notebook>;
    fn get_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Option<Section>>;
    fn create_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Section>;
    fn get_page(&self, user: &str, section: &Section, name: &str) -> Result<Option<Page>>;
}

/// Page creation, which goes through the raw HTTP path.
pub trait PageWriter {
    fn create_page(&self, user: &str, section: &Section, name: &str) -> Result<Page>;
}

/// OData collection envelope.
#[derive(Deserialize)]
struct Collection<T> {
    value: Vec<T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateNamed<'a> {
    display_name: &'a str,
}

pub(crate) fn notebooks_path(user: &str) -> String {
    format!("users/{}/onenote/notebooks", user)
}

pub(crate) fn sections_path(user: &str, notebook: &Notebook) -> String {
    format!("users/{}/onenote/notebooks/{}/sections", user, notebook.id)
}

pub(crate) fn pages_path(user: &str, section: &Section) -> String {
    format!("users/{}/onenote/sections/{}/pages", user, section.id)
}

/// `$filter` expression matching `field` exactly. Single quotes are
/// doubled as OData requires.
pub(crate) fn eq_filter(field: &str, value: &str) -> String {
    format!("{} eq '{}'", field, value.replace('\'', "''"))
}

/// Escape text for inclusion in the page's XHTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// XHTML document posted as the `Presentation` part of a new page.
pub(crate) fn page_document(title: &str, created: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>{}</title>
    <meta name="created" content="{}" />
  </head>
  <body>
    <p>Created by the OneNote console sample.</p>
  </body>
</html>"#,
        escape_html(title),
        created
    )
}

/// Typed Graph client for notebooks, sections and page lookups.
#[derive(Clone)]
pub struct GraphClient {
    http: AuthenticatedClient,
}

impl GraphClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        GraphClient { http }
    }

    /// First element of a filtered collection, if any.
    fn find_first<T: DeserializeOwned>(&self, path: &str, filter: String) -> Result<Option<T>> {
        tracing::debug!(%path, %filter, "graph lookup");
        let res = self
            .http
            .send(self.http.get(path).query(&[("$filter", filter)]))?;
        let body: Collection<T> = res.json().context("Parsing Graph collection json")?;
        Ok(body.value.into_iter().next())
    }

    fn create_named<T: DeserializeOwned>(&self, path: &str, name: &str) -> Result<T> {
        tracing::debug!(%path, %name, "graph create");
        let res = self
            .http
            .send(self.http.post(path).json(&CreateNamed { display_name: name }))?;
        res.json().context("Parsing Graph create response json")
    }
}

impl OneNoteApi for GraphClient {
    fn get_notebook(&self, user: &str, name: &str) -> Result<Option<Notebook>> {
        self.find_first(&notebooks_path(user), eq_filter("displayName", name))
    }

    fn create_notebook(&self, user: &str, name: &str) -> Result<Notebook> {
        self.create_named(&notebooks_path(user), name)
            .with_context(|| format!("Creating notebook '{}'", name))
    }

    fn get_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Option<Section>> {
        self.find_first(&sections_path(user, notebook), eq_filter("displayName", name))
    }

    fn create_section(&self, user: &str, notebook: &Notebook, name: &str) -> Result<Section> {
        self.create_named(&sections_path(user, notebook), name)
            .with_context(|| format!("Creating section '{}'", name))
    }

    fn get_page(&self, user: &str, section: &Section, name: &str) -> Result<Option<Page>> {
        self.find_first(&pages_path(user, section), eq_filter("title", name))
    }
}

/// Raw-HTTP page creator. Sends the page as multipart/form-data.
#[derive(Clone)]
pub struct PageClient {
    http: AuthenticatedClient,
}

impl PageClient {
    pub fn new(http: AuthenticatedClient) -> Self {
        PageClient { http }
    }
}

impl PageWriter for PageClient {
    fn create_page(&self, user: &str, section: &Section, name: &str) -> Result<Page> {
        let path = pages_path(user, section);
        tracing::debug!(%path, %name, "graph create page");

        let html = page_document(name, &chrono::Utc::now().to_rfc3339());
        let part = multipart::Part::text(html)
            .mime_str("text/html")
            .context("Building page presentation part")?;
        let form = multipart::Form::new().part("Presentation", part);

        let res = self
            .http
            .send(self.http.post(&path).multipart(form))
            .with_context(|| format!("Creating page '{}'", name))?;
        res.json().context("Parsing page create response json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook() -> Notebook {
        Notebook {
            id: "1-abc".into(),
            display_name: "Microsoft Graph notes".into(),
        }
    }

    #[test]
    fn paths_nest_under_user() {
        let user = "adelev@contoso.com";
        assert_eq!(notebooks_path(user), "users/adelev@contoso.com/onenote/notebooks");
        assert_eq!(
            sections_path(user, &notebook()),
            "users/adelev@contoso.com/onenote/notebooks/1-abc/sections"
        );
        let section = Section {
            id: "1-def".into(),
            display_name: "Required Reading".into(),
        };
        assert_eq!(
            pages_path(user, &section),
            "users/adelev@contoso.com/onenote/sections/1-def/pages"
        );
    }

    #[test]
    fn filter_escapes_quotes() {
        assert_eq!(
            eq_filter("displayName", "Adele's notes"),
            "displayName eq 'Adele''s notes'"
        );
    }

    #[test]
    fn filter_query_is_url_encoded() {
        let client = AuthenticatedClient::new("https://graph.example/v1.0").unwrap();
        let request = client
            .get(&notebooks_path("u"))
            .query(&[("$filter", eq_filter("displayName", "A & B"))])
            .build()
            .unwrap();
        let (key, value) = request.url().query_pairs().next().unwrap();
        assert_eq!(key, "$filter");
        assert_eq!(value, "displayName eq 'A & B'");
    }

    #[test]
    fn collection_yields_first_match() {
        let json = r#"{
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#notebooks",
            "value": [
                {"id": "1-abc", "displayName": "Microsoft Graph notes", "isDefault": false},
                {"id": "1-xyz", "displayName": "Microsoft Graph notes"}
            ]
        }"#;
        let body: Collection<Notebook> = serde_json::from_str(json).unwrap();
        assert_eq!(body.value.into_iter().next(), Some(notebook()));
    }

    #[test]
    fn empty_collection_is_absence() {
        let body: Collection<Page> = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(body.value.is_empty());
    }

    #[test]
    fn create_body_uses_display_name() {
        let body = serde_json::to_value(CreateNamed {
            display_name: "Required Reading",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"displayName": "Required Reading"}));
    }

    #[test]
    fn page_document_escapes_title() {
        let doc = page_document("<b>Q&A</b>", "2024-01-01T00:00:00+00:00");
        assert!(doc.contains("<title>&lt;b&gt;Q&amp;A&lt;/b&gt;</title>"));
        assert!(doc.contains(r#"content="2024-01-01T00:00:00+00:00""#));
    }
}
