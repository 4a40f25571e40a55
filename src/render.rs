//! Text and JSON presentation of pipeline outcomes.

use crate::i18n::{
    MSG_AUTOCORRECT, MSG_DID_YOU_MEAN, MSG_INSTALL_WITH, MSG_INSTALLED_AT, MSG_NOT_FOUND,
    MSG_NOT_ON_PATH, MSG_PACKAGE_INSTALLED, MSG_PERHAPS, MSG_TRY, Translator, format_message,
};
use crate::pipeline::{Outcome, Report};
use anyhow::Result;

/// Command templates shown to the user; `%s` is the package or query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hints {
    pub install: String,
    pub search: String,
}

impl Default for Hints {
    fn default() -> Self {
        Self {
            install: "sudo apt-get install %s".to_string(),
            search: "apt-cache search %s".to_string(),
        }
    }
}

/// Human-readable stdout text for `outcome`.
pub fn render_text(outcome: &Outcome, tr: &dyn Translator, hints: &Hints) -> String {
    match outcome {
        Outcome::Execute(plan) => match &plan.autocorrected_from {
            Some(original) => {
                let mut out = format_message(
                    &tr.tr(MSG_AUTOCORRECT),
                    &[original.as_str(), plan.command.as_str()],
                );
                out.push('\n');
                out
            }
            None => String::new(),
        },
        Outcome::NotFound(report) => render_report(report, tr, hints),
    }
}

fn render_report(report: &Report, tr: &dyn Translator, hints: &Hints) -> String {
    let mut out = String::new();
    if let Some(corrected) = &report.did_you_mean {
        out.push_str(&format!("{} '{corrected}'? ", tr.tr(MSG_DID_YOU_MEAN)));
    }
    out.push_str(&format!("{}: {}\n", report.command, tr.tr(MSG_NOT_FOUND)));

    if let Some(hit) = &report.system_location {
        out.push_str(&format!(
            "{} {} {} {}\n",
            hit.name,
            tr.tr(MSG_INSTALLED_AT),
            hit.path.display(),
            tr.tr(MSG_NOT_ON_PATH)
        ));
        return out;
    }

    if let Some(owner) = &report.owner {
        if owner.installed {
            out.push_str(&format_message(
                &tr.tr(MSG_PACKAGE_INSTALLED),
                &[owner.package.name.as_str()],
            ));
            out.push('\n');
        } else {
            out.push_str(&format!("{}\n", tr.tr(MSG_INSTALL_WITH)));
            out.push_str(&format_message(&hints.install, &[owner.package.name.as_str()]));
            out.push('\n');
        }
        return out;
    }

    out.push_str(&format!("{}\n", tr.tr(MSG_PERHAPS)));
    if report.similar.is_empty() {
        let search = format_message(&hints.search, &[report.query.as_str()]);
        out.push_str(&format_message(&tr.tr(MSG_TRY), &[search.as_str()]));
        out.push('\n');
        return out;
    }
    for record in &report.similar {
        if record.description.is_empty() {
            out.push_str(&format!("{}\n", record.name));
        } else {
            out.push_str(&format!("{} - {}\n", record.name, record.description));
        }
    }
    out
}

pub fn render_json(outcome: &Outcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}
