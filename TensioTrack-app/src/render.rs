use std::fmt::Write;

use serde::Serialize;
use serde_json::{json, Value};

use tensio_track_domain::controllers::{
    AuthFormController, AuthMode, DashboardContent, DashboardView, MeasurementFormController,
};
use tensio_track_domain::entities::{Measurement, SessionUser};

const LOADING: &str = "Chargement...";
const LOADING_DATA: &str = "Chargement des données...";

/// A screen the shell can print
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    Waiting,
    Auth(&'a AuthFormController),
    MeasurementEntry(&'a MeasurementFormController),
    Dashboard(&'a DashboardView),
}

/// Turns controller state into the text printed by the shell
///
/// In JSON mode every call returns exactly one JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    json: bool,
}

impl Renderer {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Marker printed before each command; JSON output has none
    pub fn command_prompt(&self) -> &'static str {
        if self.json {
            ""
        } else {
            "> "
        }
    }

    pub fn page(&self, page: Page<'_>) -> String {
        if self.json {
            return to_json(&page_value(page));
        }
        page_text(page)
    }

    /// Waiting screen shown while the session is looked up
    pub fn waiting(&self) -> String {
        self.page(Page::Waiting)
    }

    pub fn auth(&self, form: &AuthFormController) -> String {
        self.page(Page::Auth(form))
    }

    pub fn measurement_form(&self, form: &MeasurementFormController) -> String {
        self.page(Page::MeasurementEntry(form))
    }

    pub fn dashboard(&self, view: &DashboardView) -> String {
        self.page(Page::Dashboard(view))
    }

    /// Plain message
    pub fn message(&self, text: &str) -> String {
        if self.json {
            return to_json(&json!({ "message": text }));
        }
        text.to_string()
    }

    /// Message printed above a screen
    pub fn message_with(&self, text: &str, page: Page<'_>) -> String {
        if self.json {
            let mut value = page_value(page);
            if let Value::Object(fields) = &mut value {
                fields.insert("message".to_string(), json!(text));
            }
            return to_json(&value);
        }
        format!("{}\n{}", text, page_text(page))
    }

    /// Greeting of the signed-in user printed above a screen
    pub fn greeting_with(&self, user: &SessionUser, page: Page<'_>) -> String {
        if self.json {
            let mut value = page_value(page);
            if let Value::Object(fields) = &mut value {
                fields.insert("user".to_string(), json!(user));
            }
            return to_json(&value);
        }
        format!("Bonjour, {}\n{}", user.first_name, page_text(page))
    }

    /// Question asked before a measurement is deleted
    ///
    /// The text form stays on the line so the answer follows it.
    pub fn confirm_delete(&self, measurement: &Measurement) -> String {
        let question = format!(
            "Êtes-vous sûr de vouloir supprimer cette mesure ({} {}/{}) ?",
            measurement.measurement_date.format("%d/%m/%Y"),
            measurement.systolic,
            measurement.diastolic
        );
        if self.json {
            let value = json!({ "prompt": "confirm_delete", "id": measurement.id, "message": question });
            return format!("{}\n", value);
        }
        format!("{} [o/N] ", question)
    }
}

fn page_value(page: Page<'_>) -> Value {
    match page {
        Page::Waiting => json!({ "screen": "waiting" }),
        Page::Auth(form) => json!({ "screen": "auth", "form": form }),
        Page::MeasurementEntry(form) => json!({ "screen": "measurement_entry", "form": form }),
        Page::Dashboard(view) => json!({ "screen": "dashboard", "view": view }),
    }
}

fn page_text(page: Page<'_>) -> String {
    match page {
        Page::Waiting => LOADING.to_string(),
        Page::Auth(form) => auth_text(form),
        Page::MeasurementEntry(form) => measurement_form_text(form),
        Page::Dashboard(view) => dashboard_text(view),
    }
}

fn auth_text(form: &AuthFormController) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", form.mode().title());
    if let Some(error) = form.error() {
        let _ = writeln!(out, "! {}", error);
    }
    match form.mode() {
        AuthMode::Login => {
            let _ = writeln!(out, "login <email> <mot de passe>  ({})", form.submit_label());
            let _ = write!(out, "Pas encore de compte ? tapez `mode` pour vous inscrire.");
        }
        AuthMode::Register => {
            let _ = writeln!(
                out,
                "register <email> <mot de passe> <prénom> <nom> [--born AAAA-MM-JJ]  ({})",
                form.submit_label()
            );
            let _ = write!(out, "Déjà un compte ? tapez `mode` pour vous connecter.");
        }
    }
    out
}

fn measurement_form_text(form: &MeasurementFormController) -> String {
    let input = form.input();
    let mut out = String::new();
    let _ = writeln!(out, "== Nouvelle mesure ==");
    if let Some(error) = form.error() {
        let _ = writeln!(out, "! {}", error);
    }
    if let Some(notice) = form.notice() {
        let _ = writeln!(out, "✓ {}", notice);
    }
    let _ = writeln!(out, "Systolique (mmHg)  : {}", input.systolic);
    let _ = writeln!(out, "Diastolique (mmHg) : {}", input.diastolic);
    let _ = writeln!(out, "Pouls (bpm)        : {}", input.pulse);
    let _ = writeln!(out, "Date               : {}", input.measurement_date);
    let _ = writeln!(out, "Heure              : {}", input.measurement_time);
    let _ = writeln!(out, "Notes (optionnel)  : {}", input.notes);
    let _ = write!(
        out,
        "add <systolique> <diastolique> <pouls> [--date AAAA-MM-JJ] [--time HH:MM] [--notes \"...\"]  ({})",
        form.submit_label()
    );
    out
}

fn dashboard_text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Tableau de bord ==");
    let _ = writeln!(
        out,
        "Période : du {} au {}",
        view.range.start_date.format("%d/%m/%Y"),
        view.range.end_date.format("%d/%m/%Y")
    );
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}", error);
    }
    if view.loading {
        let _ = write!(out, "{}", LOADING_DATA);
        return out;
    }

    if let Some(stats) = &view.stats {
        let _ = writeln!(out, "Mesures totales     : {}", stats.count);
        let _ = writeln!(
            out,
            "Moyenne systolique  : {} mmHg ({} - {})",
            stats.avg_systolic, stats.min_systolic, stats.max_systolic
        );
        let _ = writeln!(
            out,
            "Moyenne diastolique : {} mmHg ({} - {})",
            stats.avg_diastolic, stats.min_diastolic, stats.max_diastolic
        );
        let _ = writeln!(out, "Pouls moyen         : {} bpm", stats.avg_pulse);
    }

    match &view.content {
        DashboardContent::Empty { message } => {
            let _ = write!(out, "{}", message);
        }
        DashboardContent::Data { series, recent } => {
            let _ = writeln!(out);
            let _ = writeln!(out, "-- Évolution de la tension --");
            for point in series {
                let _ = writeln!(
                    out,
                    "{}  {:>3}/{:<3} mmHg  {:>3} bpm",
                    point.sort_key, point.systolic, point.diastolic, point.pulse
                );
            }
            let _ = writeln!(out);
            let _ = writeln!(out, "-- Mesures récentes --");
            let _ = writeln!(
                out,
                "{:<10}  {:<5}  {:>4}  {:>4}  {:>5}  {:<22}  Id",
                "Date", "Heure", "Sys.", "Dia.", "Pouls", "Catégorie"
            );
            for row in recent {
                let badge = format!("[{}] {}", row.classification.color, row.label);
                let id = if row.deleting { "..." } else { row.id.as_str() };
                let _ = writeln!(
                    out,
                    "{:<10}  {:<5}  {:>4}  {:>4}  {:>5}  {:<22}  {}",
                    row.date, row.time, row.systolic, row.diastolic, row.pulse, badge, id
                );
            }
        }
    }
    out.trim_end().to_string()
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| json!({ "error": err.to_string() }).to_string())
}
