use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use crate::diagnosis::DiagnoseClient;
use crate::records::{DiagnosisReport, PatientRecord};
use crate::session::ChatSession;
use crate::wallet::WalletProvider;

/// Screens mirror the routes of the original client: `/`, `/diagnose`,
/// `/report`, `/profile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Diagnose,
    Report,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileTab {
    Profile,
    Medical,
    History,
}

impl ProfileTab {
    pub fn next(self) -> Self {
        match self {
            ProfileTab::Profile => ProfileTab::Medical,
            ProfileTab::Medical => ProfileTab::History,
            ProfileTab::History => ProfileTab::Profile,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ProfileTab::Profile => ProfileTab::History,
            ProfileTab::Medical => ProfileTab::Profile,
            ProfileTab::History => ProfileTab::Medical,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ProfileTab::Profile => 0,
            ProfileTab::Medical => 1,
            ProfileTab::History => 2,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Diagnose state
    pub session: ChatSession,
    pub diagnose_task: Option<JoinHandle<anyhow::Result<String>>>,
    pub pending_symptoms: Option<String>,
    pub chat_scroll: u16,
    pub chat_height: u16, // inner chat area size, updated during render
    pub chat_width: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Report state
    pub reports: Vec<DiagnosisReport>,
    pub report_state: ListState,

    // Profile state
    pub record: PatientRecord,
    pub profile_tab: ProfileTab,

    // Wallet
    pub wallet: Box<dyn WalletProvider>,
    pub wallet_account: Option<String>,
    pub wallet_notice: Option<String>,

    pub client: DiagnoseClient,
}

impl App {
    pub fn new(
        client: DiagnoseClient,
        wallet: Box<dyn WalletProvider>,
        record: PatientRecord,
    ) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,

            session: ChatSession::new(),
            diagnose_task: None,
            pending_symptoms: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            reports: Vec::new(),
            report_state: ListState::default(),

            record,
            profile_tab: ProfileTab::Profile,

            wallet,
            wallet_account: None,
            wallet_notice: None,

            client,
        }
    }

    /// Switch screens. Leaving the Diagnose screen discards the chat session
    /// and any in-flight request; entering it starts a fresh session in
    /// editing mode.
    pub fn goto(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }

        if self.screen == Screen::Diagnose {
            if let Some(task) = self.diagnose_task.take() {
                task.abort();
            }
            self.pending_symptoms = None;
            self.session = ChatSession::new();
            self.chat_scroll = 0;
        }

        self.screen = screen;
        self.input_mode = if screen == Screen::Diagnose {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    /// Submit the current draft: advance the session state machine and, if it
    /// accepted, hand exactly one request to a background task. A no-op for a
    /// blank draft or while a request is outstanding.
    pub fn submit_draft(&mut self) {
        let Some(text) = self.session.submit() else {
            return;
        };

        tracing::info!(chars = text.chars().count(), "submitting symptoms");
        self.pending_symptoms = Some(text.clone());

        let client = self.client.clone();
        self.diagnose_task = Some(tokio::spawn(
            async move { client.diagnose(&text).await },
        ));

        self.scroll_chat_to_bottom();
    }

    /// Observe the outstanding request, if it has finished, and settle the
    /// session. Failures never propagate: they are logged and surfaced as the
    /// fixed apology message.
    pub async fn poll_diagnosis(&mut self) {
        let finished = matches!(&self.diagnose_task, Some(task) if task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.diagnose_task.take() else {
            return;
        };

        match task.await {
            Ok(Ok(reply)) => {
                if let Some(symptoms) = self.pending_symptoms.take() {
                    self.push_report(DiagnosisReport::new(symptoms, reply.clone()));
                }
                self.session.resolve(reply);
            }
            Ok(Err(err)) => {
                tracing::warn!(%err, "diagnosis request failed");
                self.pending_symptoms = None;
                self.session.fail();
            }
            Err(err) => {
                tracing::error!(%err, "diagnosis task aborted");
                self.pending_symptoms = None;
                self.session.fail();
            }
        }

        self.scroll_chat_to_bottom();
    }

    fn push_report(&mut self, report: DiagnosisReport) {
        self.reports.push(report);
        if self.report_state.selected().is_none() {
            self.report_state.select(Some(0));
        }
    }

    pub fn connect_wallet(&mut self) {
        match self.wallet.request_address() {
            Ok(address) => {
                tracing::info!("wallet connected");
                self.wallet_account = Some(address);
                self.wallet_notice = None;
            }
            Err(err) => {
                tracing::warn!(%err, "wallet connection failed");
                self.wallet_notice =
                    Some("No wallet available. Set wallet_address in the config file.".to_string());
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Scroll the transcript so the newest message (or the pending
    /// placeholder) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            60
        };

        let mut total_lines: u16 = 0;
        for msg in self.session.messages() {
            total_lines += 1; // role line
            for line in msg.text.split('\n') {
                // Character count, not byte length, for wrap estimation.
                let char_count = line.chars().count();
                total_lines += ((char_count / wrap_width) + 1) as u16;
            }
            total_lines += 1; // blank line after message
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    // Report navigation

    pub fn report_nav_down(&mut self) {
        let len = self.reports.len();
        if len > 0 {
            let i = self.report_state.selected().unwrap_or(0);
            self.report_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn report_nav_up(&mut self) {
        let i = self.report_state.selected().unwrap_or(0);
        self.report_state.select(Some(i.saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::stub;
    use crate::session::{self, ChatRole};
    use anyhow::anyhow;
    use std::time::Duration;

    struct NoWallet;

    impl WalletProvider for NoWallet {
        fn request_address(&self) -> anyhow::Result<String> {
            Err(anyhow!("not installed"))
        }
    }

    struct TestWallet;

    impl WalletProvider for TestWallet {
        fn request_address(&self) -> anyhow::Result<String> {
            Ok("0x89205A3A3b2A69De6Dbf7f01ED13B2108B2c43e7".to_string())
        }
    }

    fn test_app(base_url: &str) -> App {
        App::new(
            DiagnoseClient::new(base_url),
            Box::new(TestWallet),
            PatientRecord::sample(),
        )
    }

    fn type_draft(app: &mut App, text: &str) {
        for c in text.chars() {
            app.session.insert_char(c);
        }
    }

    async fn settle(app: &mut App) {
        for _ in 0..500 {
            app.poll_diagnosis().await;
            if !app.session.in_flight() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("diagnosis request never settled");
    }

    #[tokio::test]
    async fn successful_round_trip_appends_reply_and_report() {
        let base = stub::serve("200 OK", r#"{"response": "Take rest."}"#).await;
        let mut app = test_app(&base);
        app.goto(Screen::Diagnose);

        type_draft(&mut app, "I have a headache");
        app.submit_draft();
        assert!(app.session.in_flight());

        settle(&mut app).await;

        let last = app.session.messages().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "Take rest.");
        assert!(!last.pending);

        assert_eq!(app.reports.len(), 1);
        assert_eq!(app.reports[0].symptoms, "I have a headache");
        assert_eq!(app.reports[0].recommendation, "Take rest.");
    }

    #[tokio::test]
    async fn failed_request_surfaces_apology_and_returns_to_idle() {
        let mut app = test_app("http://127.0.0.1:9");
        app.goto(Screen::Diagnose);

        type_draft(&mut app, "I feel dizzy");
        app.submit_draft();
        settle(&mut app).await;

        assert!(!app.session.in_flight());
        assert_eq!(
            app.session.messages().last().map(|m| m.text.as_str()),
            Some(session::ERROR_REPLY)
        );
        assert!(app.reports.is_empty());
        assert!(app.session.draft().is_empty());
    }

    #[tokio::test]
    async fn leaving_diagnose_discards_the_session() {
        let mut app = test_app("http://127.0.0.1:9");
        app.goto(Screen::Diagnose);
        assert_eq!(app.input_mode, InputMode::Editing);

        type_draft(&mut app, "sore throat");
        app.submit_draft();

        app.goto(Screen::Home);
        assert!(app.diagnose_task.is_none());
        assert!(app.session.messages().is_empty());
        assert!(!app.session.in_flight());

        // Reports survive navigation; the session does not.
        app.goto(Screen::Diagnose);
        assert!(app.session.messages().is_empty());
    }

    #[tokio::test]
    async fn wallet_connection_failure_sets_notice() {
        let mut app = App::new(
            DiagnoseClient::new("http://127.0.0.1:9"),
            Box::new(NoWallet),
            PatientRecord::sample(),
        );
        app.connect_wallet();
        assert!(app.wallet_account.is_none());
        assert!(app.wallet_notice.is_some());
    }

    #[tokio::test]
    async fn wallet_connection_success_stores_address() {
        let mut app = test_app("http://127.0.0.1:9");
        app.connect_wallet();
        assert!(app.wallet_account.is_some());
        assert!(app.wallet_notice.is_none());
    }
}
