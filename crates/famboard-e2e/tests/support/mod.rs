//! An in-memory family organizer implementing [`Driver`].
//!
//! It understands the selectors the page objects use and models just enough
//! of the application (auth, roles, family members, tasks, archive,
//! calendar, messages, deep links) to drive the page objects and the
//! journey without a browser. Knobs on [`FakeFamilyApp`] inject the
//! behaviors the suite has to cope with: lagging completions, late member
//! listings, duplicate logout controls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use famboard_browser::{BrowserError, Driver, Locator, Result, SelectOption, WaitConfig};
use famboard_config::{Credentials, Role};
use famboard_e2e::selectors as sel;
use famboard_e2e::{AppWaits, FamilyAppPage};

pub const APP_URL: &str = "http://famboard.test/index.html";
pub const PARENT_EMAIL: &str = "parent@example.com";
pub const PARENT_PASSWORD: &str = "parent-pass";
pub const FAMILY_NAME: &str = "The Sagals";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Tasks,
    Calendar,
    Messages,
    Settings,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    role: Role,
    display_name: String,
    id: String,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub title: String,
    pub details: String,
    pub assignee: Option<String>,
    pub completed: bool,
}

#[derive(Debug)]
pub struct AppState {
    pub url: String,
    accounts: HashMap<String, Account>,
    pub logged_in: Option<String>,
    pub section: Section,
    pub family_name: Option<String>,
    /// Member markers rendered in the members list.
    pub members: Vec<String>,
    /// Members added but not rendered until settings are reopened.
    pending_members: Vec<String>,
    fields: HashMap<String, String>,
    selected: HashMap<String, String>,
    pub task_form_open: bool,
    pub archive_expanded: bool,
    pub event_modal_open: bool,
    pub tasks: Vec<Task>,
    pub events: Vec<String>,
    pub messages: Vec<String>,
    pub auth_error: String,
    pub status: String,
    pub clicks: Vec<String>,
    pub reloads: u32,

    // Knobs
    pub sidebar_logout_visible: bool,
    pub auth_panel_logout_visible: bool,
    /// Completion clicks to drop before one sticks.
    pub dropped_completions: u32,
    /// Render new members only after settings are reopened.
    pub members_listed_on_reopen: bool,
    /// Reject child creation with this auth error.
    pub reject_child_with: Option<String>,
    /// Let children open settings through the deep link.
    pub deep_link_leaks: bool,
    /// Show the settings family name as a dash.
    pub settings_name_placeholder: bool,
    /// Render task cards without the assignee line for children.
    pub assignee_hidden_from_children: bool,
}

impl AppState {
    fn new() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            PARENT_EMAIL.to_string(),
            Account {
                password: PARENT_PASSWORD.to_string(),
                role: Role::Parent,
                display_name: "Dina".to_string(),
                id: "u-1".to_string(),
            },
        );

        Self {
            url: "about:blank".to_string(),
            accounts,
            logged_in: None,
            section: Section::Tasks,
            family_name: Some(FAMILY_NAME.to_string()),
            members: vec![format!("Dina ({PARENT_EMAIL})")],
            pending_members: Vec::new(),
            fields: HashMap::new(),
            selected: HashMap::new(),
            task_form_open: false,
            archive_expanded: false,
            event_modal_open: false,
            tasks: Vec::new(),
            events: Vec::new(),
            messages: Vec::new(),
            auth_error: String::new(),
            status: String::new(),
            clicks: Vec::new(),
            reloads: 0,
            sidebar_logout_visible: true,
            auth_panel_logout_visible: false,
            dropped_completions: 0,
            members_listed_on_reopen: false,
            reject_child_with: None,
            deep_link_leaks: false,
            settings_name_placeholder: false,
            assignee_hidden_from_children: false,
        }
    }

    fn current(&self) -> Option<&Account> {
        self.logged_in.as_ref().and_then(|email| self.accounts.get(email))
    }

    fn is_parent(&self) -> bool {
        self.current().is_some_and(|a| a.role == Role::Parent)
    }

    fn authed(&self) -> bool {
        self.logged_in.is_some()
    }

    fn in_section(&self, section: Section) -> bool {
        self.authed() && self.section == section
    }

    fn settings_open(&self) -> bool {
        self.in_section(Section::Settings) && (self.is_parent() || self.deep_link_leaks)
    }

    fn field(&self, selector: &str) -> String {
        self.fields.get(selector).cloned().unwrap_or_default()
    }

    fn label_for(&self, email: &str) -> String {
        match self.accounts.get(email) {
            Some(account) => format!("{} ({email})", account.display_name),
            None => email.to_string(),
        }
    }

    /// Tasks the current user sees: parents see all, children their own.
    fn visible_tasks(&self) -> Vec<&Task> {
        let Some(email) = self.logged_in.as_deref() else {
            return Vec::new();
        };
        let parent = self.is_parent();
        self.tasks
            .iter()
            .filter(|t| parent || t.assignee.as_deref() == Some(email))
            .collect()
    }

    fn card_text(&self, task: &Task) -> String {
        let mut text = task.title.clone();
        let hidden = self.assignee_hidden_from_children && !self.is_parent();
        if let Some(assignee) = task.assignee.as_ref().filter(|_| !hidden) {
            text.push_str(&format!("\nAssigned: {}", self.label_for(assignee)));
        }
        text
    }

    fn task_cards(&self, archived: bool) -> Vec<String> {
        self.visible_tasks()
            .into_iter()
            .filter(|t| t.completed == archived)
            .map(|t| self.card_text(t))
            .collect()
    }

    /// Texts of all elements matching the selector, with visibility.
    fn elements(&self, selector: &str) -> Vec<(String, bool)> {
        let authed = self.authed();
        let one = |visible: bool, text: String| vec![(text, visible)];

        match selector {
            sel::AUTH_SECTION => one(!authed, String::new()),
            sel::LOGIN_EMAIL | sel::LOGIN_PASSWORD | sel::LOGIN_BUTTON => {
                one(!authed, String::new())
            }
            sel::TASKS_SECTION | sel::TASKS_LIST | sel::NEW_TASK_BUTTON => {
                one(self.in_section(Section::Tasks), String::new())
            }
            sel::SIDEBAR | sel::NAV_TASKS | sel::NAV_CALENDAR | sel::NAV_MESSAGES => {
                if authed { one(true, String::new()) } else { Vec::new() }
            }
            sel::USER_EMAIL => one(authed, self.logged_in.clone().unwrap_or_default()),
            sel::SIDEBAR_LOGOUT => one(authed && self.sidebar_logout_visible, String::new()),
            sel::AUTH_PANEL_LOGOUT => {
                one(authed && self.auth_panel_logout_visible, String::new())
            }
            sel::NAV_SETTINGS | sel::NAV_SETTINGS_LINK => {
                if self.is_parent() { one(true, "Family Settings".into()) } else { Vec::new() }
            }
            sel::AUTH_ERROR => one(!self.auth_error.is_empty(), self.auth_error.clone()),
            sel::STATUS => one(!self.status.is_empty(), self.status.clone()),
            sel::FAMILY_PANEL => one(self.is_parent() && self.family_name.is_some(), String::new()),
            sel::FAMILY_NAME => one(
                self.is_parent(),
                self.family_name.clone().unwrap_or_else(|| "—".into()),
            ),
            sel::CREATE_FAMILY_SECTION | sel::CREATE_FAMILY_FORM => {
                one(self.is_parent() && self.family_name.is_none(), String::new())
            }
            sel::CREATE_FAMILY_NAME_INPUT | sel::CREATE_FAMILY_SUBMIT => {
                one(self.is_parent() && self.family_name.is_none(), String::new())
            }
            sel::FAMILY_SETTINGS_SECTION
            | sel::FAMILY_MEMBERS_SECTION
            | sel::ADD_CHILD_FORM
            | sel::CHILD_EMAIL
            | sel::CHILD_PASSWORD
            | sel::CHILD_NAME
            | sel::PARENT_PASSWORD
            | sel::ADD_CHILD_SUBMIT => one(self.settings_open(), String::new()),
            sel::SETTINGS_FAMILY_NAME => {
                let name = if self.settings_name_placeholder {
                    "—".to_string()
                } else {
                    self.family_name.clone().unwrap_or_else(|| "—".into())
                };
                one(self.settings_open(), name)
            }
            sel::FAMILY_MEMBERS_LIST => one(self.settings_open(), self.members.join("\n")),
            sel::TASK_FORM | sel::TASK_TITLE | sel::TASK_DETAILS | sel::TASK_SAVE_BUTTON
            | sel::TASK_ASSIGNEE_SELECT => {
                one(self.in_section(Section::Tasks) && self.task_form_open, String::new())
            }
            sel::OPEN_TASK_CARD => {
                let visible = self.in_section(Section::Tasks);
                self.task_cards(false).into_iter().map(|t| (t, visible)).collect()
            }
            sel::ARCHIVE_TOGGLE => one(self.in_section(Section::Tasks), String::new()),
            sel::ARCHIVE_SECTION | sel::ARCHIVE_LIST => {
                one(self.in_section(Section::Tasks) && self.archive_expanded, String::new())
            }
            sel::ARCHIVED_TASK_CARD => {
                let visible = self.in_section(Section::Tasks) && self.archive_expanded;
                self.task_cards(true).into_iter().map(|t| (t, visible)).collect()
            }
            sel::CALENDAR_SECTION | sel::CALENDAR_USER_SELECT => {
                one(self.in_section(Section::Calendar), String::new())
            }
            sel::CALENDAR_DAY_IN_MONTH => {
                if self.in_section(Section::Calendar) {
                    (1..=28).map(|d| (d.to_string(), true)).collect()
                } else {
                    Vec::new()
                }
            }
            sel::CALENDAR_EVENT => {
                let visible = self.in_section(Section::Calendar);
                self.events.iter().map(|e| (e.clone(), visible)).collect()
            }
            sel::EVENT_MODAL | sel::EVENT_TITLE | sel::EVENT_DATE | sel::EVENT_TIME
            | sel::EVENT_SUBMIT => one(self.event_modal_open, String::new()),
            sel::MESSAGES_SECTION | sel::MESSAGE_FORM | sel::MESSAGE_TEXT | sel::MESSAGE_SUBMIT => {
                one(self.in_section(Section::Messages), String::new())
            }
            sel::MESSAGES_LIST => one(
                self.in_section(Section::Messages),
                self.messages.join("\n"),
            ),
            _ => Vec::new(),
        }
    }

    fn matches(&self, locator: &Locator) -> Vec<(String, bool)> {
        let mut matches = self.elements(locator.selector());
        if let Some(text) = locator.text_filter() {
            matches.retain(|(content, _)| content.contains(text));
        }
        if let Some(inner) = locator.inner_selector() {
            // Task cards render one checkbox each; nothing else nests.
            if inner != sel::TASK_CHECKBOX {
                matches.clear();
            }
        }
        matches
    }

    fn options(&self, selector: &str) -> Vec<SelectOption> {
        let mut accounts: Vec<(&String, &Account)> = self.accounts.iter().collect();
        accounts.sort_by(|a, b| a.1.id.cmp(&b.1.id));
        let members = accounts.into_iter().map(|(email, account)| SelectOption {
            value: account.id.clone(),
            label: format!("{} ({email})", account.display_name),
        });

        match selector {
            sel::TASK_ASSIGNEE_SELECT => std::iter::once(SelectOption {
                value: String::new(),
                label: "Unassigned".into(),
            })
            .chain(members)
            .collect(),
            sel::CALENDAR_USER_SELECT => members.collect(),
            _ => Vec::new(),
        }
    }

    fn email_for_id(&self, id: &str) -> Option<String> {
        self.accounts
            .iter()
            .find(|(_, a)| a.id == id)
            .map(|(email, _)| email.clone())
    }

    fn click(&mut self, selector: &str) {
        self.clicks.push(selector.to_string());
        match selector {
            sel::LOGIN_BUTTON => {
                let email = self.field(sel::LOGIN_EMAIL);
                let password = self.field(sel::LOGIN_PASSWORD);
                match self.accounts.get(&email) {
                    Some(account) if account.password == password => {
                        self.logged_in = Some(email);
                        self.section = Section::Tasks;
                        self.auth_error.clear();
                    }
                    _ => self.auth_error = "Invalid email or password".into(),
                }
                self.fields.clear();
            }
            sel::SIDEBAR_LOGOUT | sel::AUTH_PANEL_LOGOUT => {
                self.logged_in = None;
                self.task_form_open = false;
                self.archive_expanded = false;
            }
            sel::NAV_TASKS => self.section = Section::Tasks,
            sel::NAV_CALENDAR => self.section = Section::Calendar,
            sel::NAV_MESSAGES => self.section = Section::Messages,
            sel::NAV_SETTINGS_LINK => {
                if self.is_parent() {
                    self.section = Section::Settings;
                    let pending = std::mem::take(&mut self.pending_members);
                    self.members.extend(pending);
                }
            }
            sel::ARCHIVE_TOGGLE => self.archive_expanded = !self.archive_expanded,
            sel::CREATE_FAMILY_SUBMIT => {
                self.family_name = Some(self.field(sel::CREATE_FAMILY_NAME_INPUT));
            }
            sel::ADD_CHILD_SUBMIT => self.add_child(),
            sel::NEW_TASK_BUTTON => self.task_form_open = true,
            sel::TASK_SAVE_BUTTON => {
                let assignee = self
                    .selected
                    .remove(sel::TASK_ASSIGNEE_SELECT)
                    .and_then(|id| self.email_for_id(&id));
                let task = Task {
                    title: self.field(sel::TASK_TITLE),
                    details: self.field(sel::TASK_DETAILS),
                    assignee,
                    completed: false,
                };
                self.tasks.push(task);
                self.task_form_open = false;
            }
            sel::CALENDAR_DAY_IN_MONTH => self.event_modal_open = true,
            sel::EVENT_SUBMIT => {
                let date = self.field(sel::EVENT_DATE);
                if !date.is_empty() {
                    let title = self.field(sel::EVENT_TITLE);
                    self.events.push(title);
                    self.event_modal_open = false;
                }
            }
            sel::MESSAGE_SUBMIT => {
                let text = self.field(sel::MESSAGE_TEXT);
                let author = self.logged_in.clone().unwrap_or_default();
                self.messages.push(format!("{author}: {text}"));
            }
            _ => {}
        }
    }

    fn add_child(&mut self) {
        if let Some(reason) = &self.reject_child_with {
            self.auth_error = reason.clone();
            return;
        }
        if self.field(sel::PARENT_PASSWORD) != PARENT_PASSWORD {
            self.auth_error = "Parent password is incorrect".into();
            return;
        }

        let email = self.field(sel::CHILD_EMAIL);
        let display_name = self.field(sel::CHILD_NAME);
        let id = format!("u-{}", self.accounts.len() + 1);
        self.accounts.insert(
            email.clone(),
            Account {
                password: self.field(sel::CHILD_PASSWORD),
                role: Role::Child,
                display_name: display_name.clone(),
                id,
            },
        );

        let marker = format!("{display_name} ({email})");
        if self.members_listed_on_reopen {
            self.pending_members.push(marker);
        } else {
            self.members.push(marker);
        }
        self.status = format!("Child {email} added");
    }

    fn complete(&mut self, title: &str) {
        if self.dropped_completions > 0 {
            self.dropped_completions -= 1;
            return;
        }
        if let Some(task) = self
            .tasks
            .iter_mut()
            .find(|t| !t.completed && t.title.contains(title))
        {
            task.completed = true;
        }
    }
}

/// Cloneable handle to one in-memory app; clones share state.
#[derive(Clone)]
pub struct FakeFamilyApp {
    state: Arc<Mutex<AppState>>,
}

impl FakeFamilyApp {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new())),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap()
    }

    /// Applies a knob or seeds data.
    pub fn with(self, configure: impl FnOnce(&mut AppState)) -> Self {
        configure(&mut self.state());
        self
    }

    /// Registers an existing child account.
    pub fn with_child(self, credentials: &Credentials, display_name: &str) -> Self {
        {
            let mut state = self.state();
            let id = format!("u-{}", state.accounts.len() + 1);
            state.accounts.insert(
                credentials.email().to_string(),
                Account {
                    password: credentials.password().to_string(),
                    role: credentials.role(),
                    display_name: display_name.to_string(),
                    id,
                },
            );
            state
                .members
                .push(format!("{display_name} ({})", credentials.email()));
        }
        self
    }

    /// Logs `email` in directly, skipping the form.
    pub fn signed_in_as(self, email: &str) -> Self {
        {
            let mut state = self.state();
            state.logged_in = Some(email.to_string());
            state.section = Section::Tasks;
        }
        self
    }

    fn not_found(locator: &Locator) -> BrowserError {
        BrowserError::ElementNotFound(locator.to_string())
    }
}

#[async_trait]
impl Driver for FakeFamilyApp {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state();
        state.url = url.to_string();
        state.task_form_open = false;
        state.event_modal_open = false;
        state.section = match url.split_once('#') {
            Some((_, route)) if route.starts_with("settings") => Section::Settings,
            _ => Section::Tasks,
        };
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        let mut state = self.state();
        state.reloads += 1;
        state.section = Section::Tasks;
        state.task_form_open = false;
        state.event_modal_open = false;
        state.archive_expanded = false;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state().url.clone())
    }

    async fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(self.state().matches(locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self
            .state()
            .matches(locator)
            .first()
            .is_some_and(|(_, visible)| *visible))
    }

    async fn text_content(&self, locator: &Locator) -> Result<Option<String>> {
        Ok(self.state().matches(locator).into_iter().next().map(|(t, _)| t))
    }

    async fn all_text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        Ok(self
            .state()
            .matches(locator)
            .into_iter()
            .map(|(t, _)| t)
            .collect())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let mut state = self.state();
        if !state.matches(locator).first().is_some_and(|(_, v)| *v) {
            return Err(Self::not_found(locator));
        }
        state
            .fields
            .insert(locator.selector().to_string(), value.to_string());
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut state = self.state();
        if !state.matches(locator).first().is_some_and(|(_, v)| *v) {
            return Err(Self::not_found(locator));
        }
        state.click(locator.selector());
        Ok(())
    }

    async fn check(&self, locator: &Locator) -> Result<()> {
        let mut state = self.state();
        if state.matches(locator).is_empty() {
            return Err(Self::not_found(locator));
        }
        let title = locator.text_filter().unwrap_or_default().to_string();
        state.complete(&title);
        Ok(())
    }

    async fn options(&self, locator: &Locator) -> Result<Vec<SelectOption>> {
        let state = self.state();
        if state.matches(locator).is_empty() {
            return Err(Self::not_found(locator));
        }
        Ok(state.options(locator.selector()))
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> Result<()> {
        let mut state = self.state();
        if !state
            .options(locator.selector())
            .iter()
            .any(|o| o.value == value)
        {
            return Err(BrowserError::ElementNotFound(format!(
                "option '{value}' in {locator}"
            )));
        }
        state
            .selected
            .insert(locator.selector().to_string(), value.to_string());
        Ok(())
    }

    async fn diagnostics(&self) -> String {
        let state = self.state();
        format!(
            "url={} user={:?} section={:?} auth_error={:?} status={:?}",
            state.url, state.logged_in, state.section, state.auth_error, state.status
        )
    }
}

/// Waits short enough to keep soft-wait timeouts fast in tests.
pub fn fast_waits() -> AppWaits {
    AppWaits::uniform(WaitConfig::new(
        Duration::from_millis(30),
        Duration::from_millis(1),
    ))
}

/// A page object over `app` with fast waits.
pub fn family_page(app: &FakeFamilyApp) -> FamilyAppPage<FakeFamilyApp> {
    FamilyAppPage::new(app.clone(), APP_URL, fast_waits())
}

pub fn parent() -> Credentials {
    Credentials::new(PARENT_EMAIL, PARENT_PASSWORD, Role::Parent)
}
