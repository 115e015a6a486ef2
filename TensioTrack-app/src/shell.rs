use std::io::Write;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cli::{parse_line, ShellCommand};
use crate::render::{Page, Renderer};
use tensio_track_data::repository::AuthGatewayTrait;
use tensio_track_domain::controllers::{
    AuthField, AuthFormController, AuthMode, DashboardController, DeleteConfirmation,
    DeleteOutcome, FormError, MeasurementFormController,
};
use tensio_track_domain::entities::{DateRange, Measurement, MeasurementField};
use tensio_track_domain::events::{AppEvent, Notifier};
use tensio_track_domain::services::{AuthService, MeasurementServiceTrait};
use tensio_track_domain::session::{Screen, SessionGate, SessionStatus};

/// Input lines shared between the command loop and the delete prompt
pub type SharedLines<R> = Arc<Mutex<Lines<BufReader<R>>>>;

/// Wrap a reader so both the shell and the confirmation prompt can read from it
pub fn shared_lines<R: AsyncRead + Unpin>(reader: R) -> SharedLines<R> {
    Arc::new(Mutex::new(BufReader::new(reader).lines()))
}

/// Asks on the terminal before a measurement is deleted
///
/// The question goes to `out` and the answer is the next input line. End of
/// input or anything but a yes declines.
pub struct PromptConfirmation<R, P> {
    lines: SharedLines<R>,
    out: StdMutex<P>,
    renderer: Renderer,
    assume_yes: bool,
}

impl<R, P: Write> PromptConfirmation<R, P> {
    /// `assume_yes` answers every question with yes without asking
    pub fn new(lines: SharedLines<R>, out: P, renderer: Renderer, assume_yes: bool) -> Self {
        Self {
            lines,
            out: StdMutex::new(out),
            renderer,
            assume_yes,
        }
    }

    fn ask(&self, measurement: &Measurement) {
        let question = self.renderer.confirm_delete(measurement);
        match self.out.lock() {
            Ok(mut out) => {
                let _ = out.write_all(question.as_bytes());
                let _ = out.flush();
            }
            Err(err) => warn!("Confirmation prompt unavailable: {}", err),
        }
    }
}

#[async_trait]
impl<R, P> DeleteConfirmation for PromptConfirmation<R, P>
where
    R: AsyncRead + Unpin + Send,
    P: Write + Send,
{
    async fn confirm(&self, measurement: &Measurement) -> bool {
        if self.assume_yes {
            return true;
        }

        self.ask(measurement);
        let answer = self.lines.lock().await.next_line().await;
        match answer {
            Ok(Some(answer)) => matches!(answer.trim().to_lowercase().as_str(), "o" | "oui" | "y" | "yes"),
            _ => false,
        }
    }
}

/// What the shell does after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Print the text and read the next command
    Continue(String),
    Quit,
}

/// The terminal application: session gate, screens and the event loop
pub struct App<M, G, C>
where
    M: MeasurementServiceTrait,
    G: AuthGatewayTrait,
    C: DeleteConfirmation,
{
    gate: SessionGate,
    auth: AuthService<G>,
    measurements: M,
    confirmation: C,
    renderer: Renderer,
    notifier: Notifier,
    events: UnboundedReceiver<AppEvent>,
    auth_form: AuthFormController,
    entry_form: MeasurementFormController,
    dashboard: DashboardController,
}

impl<M, G, C> App<M, G, C>
where
    M: MeasurementServiceTrait,
    G: AuthGatewayTrait,
    C: DeleteConfirmation,
{
    pub fn new(measurements: M, auth: AuthService<G>, confirmation: C, renderer: Renderer) -> Self {
        let (notifier, events) = Notifier::channel();
        Self {
            gate: SessionGate::new(notifier.clone()),
            auth,
            measurements,
            confirmation,
            renderer,
            auth_form: AuthFormController::new(),
            entry_form: MeasurementFormController::new(now(), notifier.clone()),
            dashboard: DashboardController::new(DateRange::default(), notifier.clone()),
            notifier,
            events,
        }
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn dashboard(&self) -> &DashboardController {
        &self.dashboard
    }

    pub fn entry_form(&self) -> &MeasurementFormController {
        &self.entry_form
    }

    pub fn measurements(&self) -> &M {
        &self.measurements
    }

    /// Look up an existing session and show the first screen
    pub async fn start(&mut self) -> String {
        let restored = match self.auth.restore().await {
            Ok(user) => user,
            Err(err) => {
                warn!("Session lookup failed: {}", err);
                None
            }
        };
        if let Err(err) = self.gate.establish(restored) {
            debug!("Session already established: {}", err);
        }
        self.process_events().await;

        match self.gate.user() {
            Some(user) => self
                .renderer
                .greeting_with(user, Page::Dashboard(&self.dashboard.view())),
            None => self.renderer.auth(&self.auth_form),
        }
    }

    /// Screen for the current session state
    pub fn current_screen(&self) -> String {
        self.current_screen_with(None)
    }

    fn current_screen_with(&self, message: Option<&str>) -> String {
        let view;
        let page = if self.gate.can_reach(Screen::Dashboard) {
            view = self.dashboard.view();
            Page::Dashboard(&view)
        } else if self.gate.can_reach(Screen::Auth) {
            Page::Auth(&self.auth_form)
        } else {
            Page::Waiting
        };
        match message {
            Some(text) => self.renderer.message_with(text, page),
            None => self.renderer.page(page),
        }
    }

    /// Run one command
    pub async fn execute(&mut self, command: ShellCommand) -> Flow {
        if command == ShellCommand::Quit {
            return Flow::Quit;
        }

        let required = match &command {
            ShellCommand::Login { .. } | ShellCommand::Register { .. } | ShellCommand::Mode => Screen::Auth,
            ShellCommand::Form | ShellCommand::Add { .. } => Screen::MeasurementEntry,
            _ => Screen::Dashboard,
        };
        if !self.gate.can_reach(required) {
            let text = match self.gate.status() {
                SessionStatus::Authenticated => "Vous êtes déjà connecté.",
                SessionStatus::Unauthenticated => "Veuillez vous connecter.",
                SessionStatus::Loading => "Chargement...",
            };
            return Flow::Continue(self.current_screen_with(Some(text)));
        }

        let text = match command {
            ShellCommand::Login { email, password } => {
                if self.auth_form.mode() != AuthMode::Login {
                    self.auth_form.toggle_mode();
                }
                self.auth_form.set(AuthField::Email, email);
                self.auth_form.set(AuthField::Password, password);
                self.submit_auth().await
            }
            ShellCommand::Register {
                email,
                password,
                first_name,
                last_name,
                born,
            } => {
                if self.auth_form.mode() != AuthMode::Register {
                    self.auth_form.toggle_mode();
                }
                self.auth_form.set(AuthField::Email, email);
                self.auth_form.set(AuthField::Password, password);
                self.auth_form.set(AuthField::FirstName, first_name);
                self.auth_form.set(AuthField::LastName, last_name);
                self.auth_form.set(AuthField::DateOfBirth, born.unwrap_or_default());
                self.submit_auth().await
            }
            ShellCommand::Mode => {
                self.auth_form.toggle_mode();
                self.renderer.auth(&self.auth_form)
            }
            ShellCommand::Form => {
                self.entry_form.clear_notice();
                self.renderer.measurement_form(&self.entry_form)
            }
            ShellCommand::Add {
                systolic,
                diastolic,
                pulse,
                date,
                time,
                notes,
            } => {
                self.entry_form.set(MeasurementField::Systolic, systolic);
                self.entry_form.set(MeasurementField::Diastolic, diastolic);
                self.entry_form.set(MeasurementField::Pulse, pulse);
                if let Some(date) = date {
                    self.entry_form.set(MeasurementField::Date, date);
                }
                if let Some(time) = time {
                    self.entry_form.set(MeasurementField::Time, time);
                }
                self.entry_form.set(MeasurementField::Notes, notes.unwrap_or_default());
                self.submit_measurement().await
            }
            ShellCommand::Dashboard => self.renderer.dashboard(&self.dashboard.view()),
            ShellCommand::Refresh => {
                self.dashboard.refresh(&self.measurements).await;
                self.process_events().await;
                self.renderer.dashboard(&self.dashboard.view())
            }
            ShellCommand::From { date } => {
                let ticket = self.dashboard.set_start_date(date);
                self.dashboard.load(&self.measurements, ticket).await;
                self.process_events().await;
                self.renderer.dashboard(&self.dashboard.view())
            }
            ShellCommand::To { date } => {
                let ticket = self.dashboard.set_end_date(date);
                self.dashboard.load(&self.measurements, ticket).await;
                self.process_events().await;
                self.renderer.dashboard(&self.dashboard.view())
            }
            ShellCommand::Delete { id } => {
                let outcome = self
                    .dashboard
                    .delete(&self.measurements, &self.confirmation, &id)
                    .await;
                self.process_events().await;
                match outcome {
                    DeleteOutcome::Deleted | DeleteOutcome::Failed => {
                        self.renderer.dashboard(&self.dashboard.view())
                    }
                    DeleteOutcome::Cancelled => self.renderer.message("Suppression annulée."),
                    DeleteOutcome::NotFound => {
                        self.renderer.message(&format!("Aucune mesure affichée avec l'identifiant {}.", id))
                    }
                    DeleteOutcome::Busy => self.renderer.message("Suppression déjà en cours."),
                }
            }
            ShellCommand::Logout => self.logout().await,
            ShellCommand::Quit => return Flow::Quit,
        };
        Flow::Continue(text)
    }

    /// Read commands until end of input or `quit`
    pub async fn run<R, W>(&mut self, lines: SharedLines<R>, out: &mut W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: Write,
    {
        writeln!(out, "{}", self.start().await)?;

        loop {
            write!(out, "{}", self.renderer.command_prompt())?;
            out.flush()?;

            let line = lines
                .lock()
                .await
                .next_line()
                .await
                .context("Lecture de l'entrée impossible")?;
            let Some(line) = line else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let text = match parse_line(line) {
                Ok(command) => match self.execute(command).await {
                    Flow::Continue(text) => text,
                    Flow::Quit => break,
                },
                Err(help) => self.renderer.message(help.trim_end()),
            };
            writeln!(out, "{}", text)?;
        }

        info!("Shell closed");
        Ok(())
    }

    async fn submit_auth(&mut self) -> String {
        match self.auth_form.submit(&self.auth, &mut self.gate).await {
            Ok(user) => {
                self.process_events().await;
                self.renderer
                    .greeting_with(&user, Page::Dashboard(&self.dashboard.view()))
            }
            Err(FormError::Unreachable) => self.current_screen(),
            Err(_) => self.renderer.auth(&self.auth_form),
        }
    }

    async fn submit_measurement(&mut self) -> String {
        match self.entry_form.submit(&self.measurements, &self.gate).await {
            Ok(_) => {
                self.process_events().await;
                self.renderer.message_with(
                    self.entry_form.notice().unwrap_or_default(),
                    Page::Dashboard(&self.dashboard.view()),
                )
            }
            Err(_) => self.renderer.measurement_form(&self.entry_form),
        }
    }

    /// End the session and rebuild every screen from scratch
    async fn logout(&mut self) -> String {
        if let Some(user) = self.gate.user().cloned() {
            if let Err(err) = self.auth.logout(&user).await {
                debug!("Remote logout failed, closing locally: {}", err);
            }
        }
        if let Err(err) = self.gate.sign_out() {
            warn!("Logout without a session: {}", err);
        }
        self.process_events().await;

        self.auth_form = AuthFormController::new();
        self.entry_form = MeasurementFormController::new(now(), self.notifier.clone());
        self.dashboard = DashboardController::new(DateRange::default(), self.notifier.clone());

        self.renderer
            .message_with("Vous êtes déconnecté.", Page::Auth(&self.auth_form))
    }

    /// Deliver pending events to the screens
    async fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "Event");
            self.dashboard.handle_event(&event);
            if event == AppEvent::SessionChanged(SessionStatus::Authenticated) {
                self.dashboard.refresh(&self.measurements).await;
            }
        }
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tensio_track_domain::services::MeasurementService;
    use chrono::NaiveDate;
    use tensio_track_domain::testing::{
        sample_measurement, sample_record, sample_user_record, InMemoryAuthGateway,
        InMemoryMeasurementRepository,
    };

    struct Decline(AtomicBool);

    #[async_trait]
    impl DeleteConfirmation for Decline {
        async fn confirm(&self, _measurement: &Measurement) -> bool {
            self.0.store(true, Ordering::SeqCst);
            false
        }
    }

    type TestApp<C> = App<MeasurementService<InMemoryMeasurementRepository>, InMemoryAuthGateway, C>;

    fn app<C: DeleteConfirmation>(
        repo: InMemoryMeasurementRepository,
        gateway: InMemoryAuthGateway,
        confirmation: C,
    ) -> TestApp<C> {
        App::new(
            MeasurementService::new(repo),
            AuthService::new(gateway),
            confirmation,
            Renderer::new(false),
        )
    }

    fn today_record(id: &str) -> tensio_track_data::models::measurement::MeasurementRecord {
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        sample_record(id, &today, "08:00", 150, 95)
    }

    #[tokio::test]
    async fn test_start_without_session_shows_auth() {
        let mut app = app(
            InMemoryMeasurementRepository::new(),
            InMemoryAuthGateway::new(),
            Decline(AtomicBool::new(false)),
        );
        let screen = app.start().await;
        assert!(screen.starts_with("== Connexion =="));
        assert_eq!(app.gate().status(), SessionStatus::Unauthenticated);

        let flow = app.execute(ShellCommand::Dashboard).await;
        match flow {
            Flow::Continue(text) => assert!(text.starts_with("Veuillez vous connecter.")),
            Flow::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_restored_session_loads_dashboard() {
        let mut app = app(
            InMemoryMeasurementRepository::with_records(vec![today_record("a")]),
            InMemoryAuthGateway::new().with_session(sample_user_record()),
            Decline(AtomicBool::new(false)),
        );
        let screen = app.start().await;
        assert!(screen.starts_with("Bonjour, Ana\n"));
        assert_eq!(app.dashboard().measurements().len(), 1);
        assert!(screen.contains("Hypertension grade 1"));
    }

    #[tokio::test]
    async fn test_login_add_and_logout() {
        let repo = InMemoryMeasurementRepository::new();
        let mut app = app(
            repo.clone(),
            InMemoryAuthGateway::new().with_account(sample_user_record(), "secret1"),
            Decline(AtomicBool::new(false)),
        );
        app.start().await;

        let flow = app
            .execute(ShellCommand::Login {
                email: "ana@example.org".to_string(),
                password: "secret1".to_string(),
            })
            .await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.contains("Aucune mesure trouvée")));
        assert_eq!(app.gate().status(), SessionStatus::Authenticated);

        let flow = app
            .execute(ShellCommand::Add {
                systolic: "140".to_string(),
                diastolic: "90".to_string(),
                pulse: "72".to_string(),
                date: None,
                time: None,
                notes: None,
            })
            .await;
        match flow {
            Flow::Continue(text) => assert!(text.starts_with("Mesure enregistrée avec succès !")),
            Flow::Quit => panic!("unexpected quit"),
        }
        assert_eq!(repo.submitted()[0].systolic, 140);
        assert_eq!(app.dashboard().measurements().len(), 1);

        app.execute(ShellCommand::Logout).await;
        assert_eq!(app.gate().status(), SessionStatus::Unauthenticated);
        assert!(app.dashboard().measurements().is_empty());
        assert!(app.entry_form().notice().is_none());
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_measurement() {
        let repo = InMemoryMeasurementRepository::with_records(vec![today_record("a")]);
        let mut app = app(
            repo.clone(),
            InMemoryAuthGateway::new().with_session(sample_user_record()),
            Decline(AtomicBool::new(false)),
        );
        app.start().await;

        let flow = app.execute(ShellCommand::Delete { id: "a".to_string() }).await;
        assert_eq!(flow, Flow::Continue("Suppression annulée.".to_string()));
        assert!(repo.deleted().is_empty());
        assert_eq!(app.dashboard().measurements().len(), 1);

        let flow = app.execute(ShellCommand::Delete { id: "zzz".to_string() }).await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.contains("zzz")));
    }

    #[tokio::test]
    async fn test_run_reads_commands_until_quit() {
        let repo = InMemoryMeasurementRepository::with_records(vec![today_record("a")]);
        let input: &[u8] = b"delete a\noui\nshow\nquit\nshow\n";
        let lines = shared_lines(input);
        let mut app = app(
            repo.clone(),
            InMemoryAuthGateway::new().with_session(sample_user_record()),
            PromptConfirmation::new(lines.clone(), Vec::new(), Renderer::new(false), false),
        );

        let mut out = Vec::new();
        app.run(lines, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(repo.deleted(), vec!["a".to_string()]);
        assert!(printed.contains("Aucune mesure trouvée pour cette période."));
        assert_eq!(printed.matches("> ").count(), 3);
    }

    fn prompt(input: &'static [u8], assume_yes: bool) -> PromptConfirmation<&'static [u8], Vec<u8>> {
        PromptConfirmation::new(shared_lines(input), Vec::new(), Renderer::new(false), assume_yes)
    }

    fn asked(confirmation: &PromptConfirmation<&'static [u8], Vec<u8>>) -> String {
        String::from_utf8(confirmation.out.lock().unwrap().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_prompt_accepts_only_yes() {
        let measurement = sample_measurement("a", "2024-05-02", "08:00", 150, 95);

        let confirmation = prompt(b"Oui\n", false);
        assert!(confirmation.confirm(&measurement).await);
        assert_eq!(
            asked(&confirmation),
            "Êtes-vous sûr de vouloir supprimer cette mesure (02/05/2024 150/95) ? [o/N] "
        );

        assert!(!prompt(b"n\n", false).confirm(&measurement).await);
        assert!(!prompt(b"\n", false).confirm(&measurement).await);
    }

    #[tokio::test]
    async fn test_prompt_declines_at_end_of_input() {
        let measurement = sample_measurement("a", "2024-05-02", "08:00", 150, 95);
        let confirmation = prompt(b"", false);
        assert!(!confirmation.confirm(&measurement).await);
        assert!(asked(&confirmation).ends_with("[o/N] "));
    }

    #[tokio::test]
    async fn test_assume_yes_skips_the_question() {
        let measurement = sample_measurement("a", "2024-05-02", "08:00", 150, 95);
        let confirmation = prompt(b"n\n", true);
        assert!(confirmation.confirm(&measurement).await);
        assert!(asked(&confirmation).is_empty());
    }

    #[tokio::test]
    async fn test_range_commands_reload_the_dashboard() {
        let mut app = app(
            InMemoryMeasurementRepository::with_records(vec![
                sample_record("may", "2024-05-02", "08:00", 150, 95),
                sample_record("june", "2024-06-15", "08:00", 118, 75),
            ]),
            InMemoryAuthGateway::new().with_session(sample_user_record()),
            Decline(AtomicBool::new(false)),
        );
        app.start().await;
        assert!(app.dashboard().measurements().is_empty());

        let flow = app
            .execute(ShellCommand::From {
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            })
            .await;
        assert!(matches!(flow, Flow::Continue(ref text) if text.contains("Période : du 01/05/2024")));
        assert_eq!(app.dashboard().measurements().len(), 2);

        let flow = app
            .execute(ShellCommand::To {
                date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            })
            .await;
        match flow {
            Flow::Continue(text) => {
                assert!(text.contains("Période : du 01/05/2024 au 31/05/2024"));
                assert!(text.contains("Mesures totales     : 1"));
            }
            Flow::Quit => panic!("unexpected quit"),
        }
        let ids: Vec<_> = app.dashboard().measurements().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["may"]);
    }
}
