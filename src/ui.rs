// Console layer: runs the provisioning flow behind a spinner and prints one
// status line per resource. Status lines go to stdout; the spinner and logs
// use stderr.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::{AppSettings, ConfigError};
use crate::onenote::{OneNoteHelper, Provisioned, Resolved, Targets};

/// Printed when `appsettings.json` is absent or incomplete.
pub const SETTINGS_HINT: &str =
    "Missing or invalid appsettings.json file. Please see README.md for configuration instructions.";

/// User and names the console sample works on.
pub fn sample_targets() -> Targets {
    Targets {
        user: "adelev@m365x974797.onmicrosoft.com".into(),
        notebook: "Microsoft Graph notes".into(),
        section: "Required Reading".into(),
        page: "30DaysMSGraph".into(),
    }
}

/// `Found notebook: X` or `Created notebook: X`.
pub fn status_line<T>(kind: &str, resolved: &Resolved<T>, name: &str) -> String {
    let verb = if resolved.was_created() { "Created" } else { "Found" };
    format!("{} {}: {}", verb, kind, name)
}

/// Status lines for a finished run, in notebook, section, page order.
pub fn report(result: &Provisioned) -> Vec<String> {
    vec![
        status_line("notebook", &result.notebook, &result.notebook.get().display_name),
        status_line("section", &result.section, &result.section.get().display_name),
        status_line("page", &result.page, &result.page.get().title),
    ]
}

/// Gate the run on the settings result. A rejected config prints the hint
/// and returns `None` without calling `provision`, so no client is built
/// and no request is sent.
pub fn start<F>(settings: Result<AppSettings, ConfigError>, provision: F) -> Result<Option<Provisioned>>
where
    F: FnOnce(&AppSettings) -> Result<Provisioned>,
{
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(error = %e, "settings rejected");
            println!("{}", SETTINGS_HINT);
            return Ok(None);
        }
    };
    tracing::debug!(?settings, authority = %settings.authority(), "settings loaded");
    provision(&settings).map(Some)
}

/// Provision the targets, then print the status lines.
pub fn run(helper: &OneNoteHelper<'_>, targets: &Targets) -> Result<Provisioned> {
    // `ProgressBar::new_spinner` ticks in the background while the
    // blocking calls run.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Preparing notebook '{}'...", targets.notebook));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = helper.provision(targets);
    spinner.finish_and_clear();

    let result = result?;
    for line in report(&result) {
        println!("{}", line);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Notebook, Page, Section};

    #[test]
    fn status_line_reflects_creation() {
        let nb = Notebook {
            id: "1".into(),
            display_name: "Microsoft Graph notes".into(),
        };
        assert_eq!(
            status_line("notebook", &Resolved::Created(nb.clone()), &nb.display_name),
            "Created notebook: Microsoft Graph notes"
        );
        assert_eq!(
            status_line("notebook", &Resolved::Found(nb.clone()), &nb.display_name),
            "Found notebook: Microsoft Graph notes"
        );
    }

    #[test]
    fn report_lists_all_three_levels() {
        let result = Provisioned {
            notebook: Resolved::Found(Notebook {
                id: "1".into(),
                display_name: "Microsoft Graph notes".into(),
            }),
            section: Resolved::Created(Section {
                id: "2".into(),
                display_name: "Required Reading".into(),
            }),
            page: Resolved::Created(Page {
                id: "3".into(),
                title: "30DaysMSGraph".into(),
            }),
        };
        assert_eq!(
            report(&result),
            vec![
                "Found notebook: Microsoft Graph notes",
                "Created section: Required Reading",
                "Created page: 30DaysMSGraph",
            ]
        );
    }
}
