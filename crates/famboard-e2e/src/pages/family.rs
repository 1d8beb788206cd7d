use chrono::Local;
use famboard_browser::wait::{poll_until_result, wait_until};
use famboard_browser::{AppServer, Driver, Locator, StaticUrlServer};
use tracing::{debug, info, warn};

use super::{
    AppWaits, click_single_visible, logout_probes, poll_text_contains, trimmed_text,
    wait_hidden, wait_text_contains, wait_visible,
};
use crate::error::{E2eError, Result, ensure};
use crate::selectors as sel;

/// Placeholder the UI renders for an unset label.
const EMPTY_LABEL: &str = "—";

/// Lifecycle state of a task as rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Open,
    Completed,
}

/// A task as observed in the task lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub title: String,
    /// Text following `Assigned:` on the card, if any.
    pub assignee: Option<String>,
    pub state: TaskState,
    pub archived: bool,
}

impl TaskRecord {
    fn from_card(title: &str, card_text: &str, state: TaskState, archived: bool) -> Self {
        Self {
            title: title.to_string(),
            assignee: assignee_from_card(card_text),
            state,
            archived,
        }
    }
}

fn assignee_from_card(card_text: &str) -> Option<String> {
    let (_, rest) = card_text.split_once("Assigned:")?;
    let assignee = rest.lines().next().unwrap_or_default().trim();
    (!assignee.is_empty()).then(|| assignee.to_string())
}

fn task_card(title: &str, archived: bool) -> Locator {
    let list = if archived {
        sel::ARCHIVED_TASK_CARD
    } else {
        sel::OPEN_TASK_CARD
    };
    Locator::css(list).has_text(title)
}

fn is_blank_label(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == EMPTY_LABEL
}

/// The family organizer single-page app: auth, tasks, calendar, messages
/// and family settings.
pub struct FamilyAppPage<D> {
    driver: D,
    app: StaticUrlServer,
    waits: AppWaits,
}

impl<D: Driver> FamilyAppPage<D> {
    pub fn new(driver: D, app_url: impl Into<String>, waits: AppWaits) -> Self {
        Self {
            driver,
            app: StaticUrlServer::new(app_url),
            waits,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Gives the driver back, e.g. to release the browser page.
    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn waits(&self) -> &AppWaits {
        &self.waits
    }

    pub fn app_url(&self) -> &str {
        self.app.base_url()
    }

    // --- session ---------------------------------------------------------

    pub async fn open_home(&self) -> Result<()> {
        self.driver.goto(self.app.base_url()).await?;
        wait_visible(&self.driver, &Locator::css(sel::AUTH_SECTION), self.waits.default).await
    }

    /// Submits the login form. Does not wait for the outcome.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let email_input = Locator::css(sel::LOGIN_EMAIL);
        wait_visible(&self.driver, &email_input, self.waits.default).await?;
        self.driver.fill(&email_input, email).await?;
        self.driver.fill(&Locator::css(sel::LOGIN_PASSWORD), password).await?;
        self.driver.click(&Locator::css(sel::LOGIN_BUTTON)).await?;
        Ok(())
    }

    pub async fn wait_until_logged_in(&self, email: &str) -> Result<()> {
        let waits = self.waits.default;
        wait_visible(&self.driver, &Locator::css(sel::TASKS_SECTION), waits).await?;
        wait_visible(&self.driver, &Locator::css(sel::SIDEBAR), waits).await?;
        wait_text_contains(&self.driver, &Locator::css(sel::USER_EMAIL), &[email], waits).await
    }

    pub async fn wait_until_logged_out(&self) -> Result<()> {
        let waits = self.waits.default;
        wait_visible(&self.driver, &Locator::css(sel::AUTH_SECTION), waits).await?;
        wait_hidden(&self.driver, &Locator::css(sel::TASKS_SECTION), waits).await
    }

    /// Logs out through whichever single logout control is visible.
    pub async fn logout(&self) -> Result<()> {
        click_single_visible(&self.driver, &logout_probes(), "logout").await?;
        self.wait_until_logged_out().await
    }

    /// Logout, login, confirm. Either the whole switch is confirmed or an
    /// error is returned.
    pub async fn switch_identity(&self, email: &str, password: &str) -> Result<()> {
        self.logout().await?;
        self.login(email, password).await?;
        self.wait_until_logged_in(email).await
    }

    /// The identity the UI shows as logged in.
    pub async fn whoami(&self) -> Result<String> {
        trimmed_text(&self.driver, &Locator::css(sel::USER_EMAIL)).await
    }

    pub async fn refresh_and_wait_user(&self, email: &str) -> Result<()> {
        self.driver.reload().await?;
        self.wait_until_logged_in(email).await
    }

    // --- navigation ------------------------------------------------------

    async fn open_section(&self, nav: &str, section: &str) -> Result<()> {
        self.driver.click(&Locator::css(nav)).await?;
        wait_visible(&self.driver, &Locator::css(section), self.waits.default).await
    }

    pub async fn open_tasks(&self) -> Result<()> {
        self.open_section(sel::NAV_TASKS, sel::TASKS_SECTION).await
    }

    pub async fn open_calendar(&self) -> Result<()> {
        self.open_section(sel::NAV_CALENDAR, sel::CALENDAR_SECTION).await
    }

    pub async fn open_messages(&self) -> Result<()> {
        self.open_section(sel::NAV_MESSAGES, sel::MESSAGES_SECTION).await
    }

    pub async fn open_family_settings(&self) -> Result<()> {
        self.open_section(sel::NAV_SETTINGS_LINK, sel::FAMILY_SETTINGS_SECTION)
            .await
    }

    /// Opens the tasks view and expands the archive if collapsed.
    pub async fn open_archive(&self) -> Result<()> {
        self.open_tasks().await?;
        let archive = Locator::css(sel::ARCHIVE_SECTION);
        if self.driver.is_hidden(&archive).await? {
            self.driver.click(&Locator::css(sel::ARCHIVE_TOGGLE)).await?;
        }
        wait_visible(&self.driver, &archive, self.waits.default).await
    }

    /// Navigates straight to the add-member settings route.
    pub async fn open_direct_settings_url(&self) -> Result<()> {
        let url = self.app.route(sel::SETTINGS_ADD_MEMBER_ROUTE);
        debug!("deep link: {}", url);
        self.driver.goto(&url).await?;
        Ok(())
    }

    // --- structural queries ---------------------------------------------

    async fn visible(&self, selector: &str) -> Result<bool> {
        Ok(self.driver.is_visible(&Locator::css(selector)).await?)
    }

    pub async fn is_tasks_section_visible(&self) -> Result<bool> {
        self.visible(sel::TASKS_SECTION).await
    }

    pub async fn is_sidebar_visible(&self) -> Result<bool> {
        self.visible(sel::SIDEBAR).await
    }

    pub async fn is_family_panel_visible(&self) -> Result<bool> {
        self.visible(sel::FAMILY_PANEL).await
    }

    pub async fn is_create_family_visible(&self) -> Result<bool> {
        self.visible(sel::CREATE_FAMILY_SECTION).await
    }

    pub async fn is_family_settings_nav_visible(&self) -> Result<bool> {
        self.visible(sel::NAV_SETTINGS).await
    }

    pub async fn is_family_settings_section_visible(&self) -> Result<bool> {
        self.visible(sel::FAMILY_SETTINGS_SECTION).await
    }

    pub async fn is_family_members_section_visible(&self) -> Result<bool> {
        self.visible(sel::FAMILY_MEMBERS_SECTION).await
    }

    pub async fn is_add_child_form_visible(&self) -> Result<bool> {
        self.visible(sel::ADD_CHILD_FORM).await
    }

    // --- family ----------------------------------------------------------

    pub async fn get_family_name_text(&self) -> Result<String> {
        trimmed_text(&self.driver, &Locator::css(sel::FAMILY_NAME)).await
    }

    pub async fn get_settings_family_name_text(&self) -> Result<String> {
        trimmed_text(&self.driver, &Locator::css(sel::SETTINGS_FAMILY_NAME)).await
    }

    /// Soft wait for the settings family name label to be populated.
    ///
    /// Returns an empty string when it stays empty (or `—`) for the whole
    /// family-name budget.
    pub async fn wait_for_settings_family_name(&self) -> Result<String> {
        let label = Locator::css(sel::SETTINGS_FAMILY_NAME);
        let driver = &self.driver;
        let label = &label;
        let populated = poll_until_result(
            move || async move {
                let text = driver.text_content(label).await?.unwrap_or_default();
                Ok(!is_blank_label(&text))
            },
            self.waits.family_name,
        )
        .await;

        if !populated {
            return Ok(String::new());
        }
        self.get_settings_family_name_text().await
    }

    pub async fn create_family(&self, name: &str) -> Result<()> {
        wait_visible(&self.driver, &Locator::css(sel::CREATE_FAMILY_FORM), self.waits.default)
            .await?;
        self.driver
            .fill(&Locator::css(sel::CREATE_FAMILY_NAME_INPUT), name)
            .await?;
        self.driver
            .click(&Locator::css(sel::CREATE_FAMILY_SUBMIT))
            .await?;
        wait_visible(&self.driver, &Locator::css(sel::FAMILY_PANEL), self.waits.default).await
    }

    /// Provisions a child account from family settings.
    ///
    /// The members list is given the child-listing budget to show the new
    /// child (by display name or email). Failing that, settings are
    /// reopened and the list gets the retry budget. If the child still does
    /// not show, the error carries the UI's auth-error or status text.
    pub async fn add_child_user(
        &self,
        child_email: &str,
        child_password: &str,
        parent_password: &str,
        display_name: &str,
    ) -> Result<()> {
        let waits = self.waits;
        wait_visible(&self.driver, &Locator::css(sel::ADD_CHILD_FORM), waits.default).await?;
        self.driver.fill(&Locator::css(sel::CHILD_EMAIL), child_email).await?;
        self.driver
            .fill(&Locator::css(sel::CHILD_PASSWORD), child_password)
            .await?;
        self.driver.fill(&Locator::css(sel::CHILD_NAME), display_name).await?;
        self.driver
            .fill(&Locator::css(sel::PARENT_PASSWORD), parent_password)
            .await?;
        self.driver.click(&Locator::css(sel::ADD_CHILD_SUBMIT)).await?;

        let members = Locator::css(sel::FAMILY_MEMBERS_LIST);
        wait_visible(&self.driver, &members, waits.default).await?;

        let display_name = display_name.trim();
        let mut markers = Vec::with_capacity(2);
        if !is_blank_label(display_name) {
            markers.push(display_name);
        }
        markers.push(child_email);

        if poll_text_contains(&self.driver, &members, &markers, waits.child_listing).await {
            info!("child {} listed in family members", child_email);
            return Ok(());
        }

        warn!(
            "child {} not listed after {:?}; reopening family settings",
            child_email, waits.child_listing.timeout
        );
        self.open_family_settings().await?;
        wait_visible(&self.driver, &members, waits.default).await?;

        if poll_text_contains(&self.driver, &members, &markers, waits.child_listing_retry).await {
            info!("child {} listed after reopening settings", child_email);
            return Ok(());
        }

        let auth_error = trimmed_text(&self.driver, &Locator::css(sel::AUTH_ERROR)).await?;
        let status = trimmed_text(&self.driver, &Locator::css(sel::STATUS)).await?;
        let details = [auth_error, status]
            .into_iter()
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| "Child did not appear in family list within timeout.".to_string());

        Err(E2eError::assertion(
            format!("Child creation not confirmed in UI for '{child_email}'"),
            details,
        ))
    }

    pub async fn is_family_member_listed(&self, member_text: &str) -> Result<bool> {
        let text = trimmed_text(&self.driver, &Locator::css(sel::FAMILY_MEMBERS_LIST)).await?;
        Ok(!member_text.is_empty() && text.contains(member_text))
    }

    // --- tasks -----------------------------------------------------------

    /// Creates a task, optionally assigned to the member whose option label
    /// contains `assignee`, and waits for its card in the open list.
    pub async fn create_task(&self, title: &str, assignee: Option<&str>, details: &str) -> Result<()> {
        let waits = self.waits.default;
        self.open_tasks().await?;

        let new_task = Locator::css(sel::NEW_TASK_BUTTON);
        wait_visible(&self.driver, &new_task, waits).await?;
        self.driver.click(&new_task).await?;
        wait_visible(&self.driver, &Locator::css(sel::TASK_FORM), waits).await?;

        self.driver.fill(&Locator::css(sel::TASK_TITLE), title).await?;
        self.driver.fill(&Locator::css(sel::TASK_DETAILS), details).await?;

        if let Some(assignee) = assignee.filter(|a| !a.is_empty()) {
            let select = Locator::css(sel::TASK_ASSIGNEE_SELECT);
            let options = self.driver.options(&select).await?;
            let option = match options.iter().find(|o| o.label.contains(assignee)) {
                Some(option) => option,
                None => {
                    return Err(E2eError::assertion(
                        format!("No assignee option found for: {assignee}"),
                        self.driver.diagnostics().await,
                    ));
                }
            };
            if option.value.is_empty() {
                return Err(E2eError::assertion(
                    format!("Selected assignee option has no value: {assignee}"),
                    self.driver.diagnostics().await,
                ));
            }
            debug!("assigning '{}' to option {:?}", title, option);
            self.driver.select_option(&select, &option.value).await?;
        }

        self.driver.click(&Locator::css(sel::TASK_SAVE_BUTTON)).await?;
        wait_visible(&self.driver, &Locator::css(sel::TASKS_LIST), waits).await?;

        let card = task_card(title, false);
        let driver = &self.driver;
        let card = &card;
        wait_until(
            driver,
            move || driver.exists(card),
            waits,
            &format!("task '{title}' in the open list"),
        )
        .await?;
        Ok(())
    }

    pub async fn is_open_task_visible(&self, title: &str) -> Result<bool> {
        Ok(self.driver.is_visible(&task_card(title, false)).await?)
    }

    /// Cards currently rendered in the open task list.
    pub async fn open_task_count(&self) -> Result<usize> {
        Ok(self.driver.count(&Locator::css(sel::OPEN_TASK_CARD)).await?)
    }

    pub async fn is_archive_task_visible(&self, title: &str) -> Result<bool> {
        Ok(self.driver.is_visible(&task_card(title, true)).await?)
    }

    /// Text of the task card. A missing card is a failure.
    pub async fn get_task_card_text(&self, title: &str, archived: bool) -> Result<String> {
        match self.driver.text_content(&task_card(title, archived)).await? {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(E2eError::assertion(
                format!("Task card not found for title: {title}"),
                self.driver.diagnostics().await,
            )),
        }
    }

    /// Ticks the completion checkbox of an open task.
    ///
    /// A missing card or checkbox is a failure. Whether the card then
    /// leaves the open list within the completion budget is returned, not
    /// asserted: the list may only catch up after a refresh.
    pub async fn complete_task(&self, title: &str) -> Result<bool> {
        let card = task_card(title, false);
        if !self.driver.exists(&card).await? {
            return Err(E2eError::assertion(
                format!("Open task not found for completion: {title}"),
                self.driver.diagnostics().await,
            ));
        }

        let checkbox = card.clone().inner(sel::TASK_CHECKBOX);
        if !self.driver.exists(&checkbox).await? {
            return Err(E2eError::assertion(
                format!("Completion checkbox not found for task: {title}"),
                self.driver.diagnostics().await,
            ));
        }
        self.driver.check(&checkbox).await?;

        let driver = &self.driver;
        let card = &card;
        Ok(poll_until_result(move || driver.is_hidden(card), self.waits.completion).await)
    }

    /// Soft wait for a task to show up in the archive.
    pub async fn wait_for_archive_task(&self, title: &str) -> Result<bool> {
        self.open_archive().await?;
        let card = task_card(title, true);
        let driver = &self.driver;
        let card = &card;
        Ok(poll_until_result(move || driver.exists(card), self.waits.archive).await)
    }

    /// Builds a [`TaskRecord`] from what the task lists currently render.
    pub async fn observe_task(&self, title: &str) -> Result<Option<TaskRecord>> {
        let open = self.driver.text_content(&task_card(title, false)).await?;
        let archived = self.driver.text_content(&task_card(title, true)).await?;

        Ok(match (open, archived) {
            (Some(text), archived) => Some(TaskRecord::from_card(
                title,
                &text,
                TaskState::Open,
                archived.is_some(),
            )),
            (None, Some(text)) => Some(TaskRecord::from_card(
                title,
                &text,
                TaskState::Completed,
                true,
            )),
            (None, None) => None,
        })
    }

    // --- calendar --------------------------------------------------------

    /// Creates an all-day event for today through the first in-month day
    /// cell of the grid.
    pub async fn create_calendar_event(&self, title: &str) -> Result<()> {
        let waits = self.waits;
        self.open_calendar().await?;

        let owner = Locator::css(sel::CALENDAR_USER_SELECT);
        if self.driver.exists(&owner).await? {
            let first = self.driver.options(&owner).await?.into_iter().next();
            if let Some(first) = first.filter(|o| !o.value.is_empty()) {
                self.driver.select_option(&owner, &first.value).await?;
            }
        }

        let day = Locator::css(sel::CALENDAR_DAY_IN_MONTH);
        let driver = &self.driver;
        let day_ref = &day;
        wait_until(
            driver,
            move || driver.exists(day_ref),
            waits.calendar_grid,
            "an in-month day in the calendar grid",
        )
        .await?;
        self.driver.click(&day).await?;

        let modal = Locator::css(sel::EVENT_MODAL);
        wait_visible(&self.driver, &modal, waits.default).await?;
        self.driver.fill(&Locator::css(sel::EVENT_TITLE), title).await?;
        let today = Local::now().format("%Y-%m-%d").to_string();
        self.driver.fill(&Locator::css(sel::EVENT_DATE), &today).await?;
        self.driver.fill(&Locator::css(sel::EVENT_TIME), "").await?;
        self.driver.click(&Locator::css(sel::EVENT_SUBMIT)).await?;

        wait_hidden(&self.driver, &modal, waits.default).await?;

        let event = Locator::css(sel::CALENDAR_EVENT).has_text(title);
        let event = &event;
        wait_until(
            driver,
            move || driver.exists(event),
            waits.default,
            &format!("calendar event '{title}'"),
        )
        .await?;
        Ok(())
    }

    pub async fn is_calendar_event_visible(&self, title: &str) -> Result<bool> {
        let event = Locator::css(sel::CALENDAR_EVENT).has_text(title);
        Ok(self.driver.exists(&event).await?)
    }

    // --- messages --------------------------------------------------------

    /// Posts to the message board and waits for the feed to show it.
    pub async fn post_message(&self, text: &str) -> Result<()> {
        self.open_messages().await?;
        wait_visible(&self.driver, &Locator::css(sel::MESSAGE_FORM), self.waits.default).await?;
        self.driver.fill(&Locator::css(sel::MESSAGE_TEXT), text).await?;
        self.driver.click(&Locator::css(sel::MESSAGE_SUBMIT)).await?;
        wait_text_contains(
            &self.driver,
            &Locator::css(sel::MESSAGES_LIST),
            &[text],
            self.waits.default,
        )
        .await
    }

    pub async fn message_exists(&self, text: &str) -> Result<bool> {
        let feed = trimmed_text(&self.driver, &Locator::css(sel::MESSAGES_LIST)).await?;
        Ok(!text.is_empty() && feed.contains(text))
    }

    /// Fails with the UI snapshot unless `condition` holds.
    pub async fn ensure(&self, condition: bool, message: &str) -> Result<()> {
        ensure(&self.driver, condition, message).await
    }
}
