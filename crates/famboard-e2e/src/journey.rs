//! The family lifecycle journey.
//!
//! One continuous, stateful script over a single page: parent login, child
//! provisioning, identity switches, the task lifecycle, calendar, messaging
//! and a permission check. Steps share a [`SessionContext`] and run in a
//! fixed order; the first failing step ends the run with its error.
//!
//! ```ignore
//! let page = FamilyAppPage::new(browser_page, &settings.app_url, AppWaits::from_settings(&settings.waits));
//! let mut ctx = SessionContext::new(page, parent, JourneyArtifacts::generate());
//! Journey::from_settings(&settings).run(&mut ctx).await?;
//! ```

use std::fmt;

use famboard_browser::{Driver, RetryPolicy};
use famboard_config::{Credentials, SuiteSettings};
use tracing::{debug, error, info, warn};

use crate::data::JourneyArtifacts;
use crate::error::{E2eError, Result};
use crate::pages::{FamilyAppPage, TaskRecord, TaskState};
use crate::session::ActorSession;

/// The steps of the journey, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JourneyStep {
    ParentLogin,
    FamilyExists,
    AddChild,
    ChildLogin,
    AssignTask,
    CompleteTask,
    VerifyArchive,
    CalendarEvent,
    ParentMessage,
    ChildReply,
    DeepLinkGuard,
}

impl JourneyStep {
    pub const ALL: [JourneyStep; 11] = [
        JourneyStep::ParentLogin,
        JourneyStep::FamilyExists,
        JourneyStep::AddChild,
        JourneyStep::ChildLogin,
        JourneyStep::AssignTask,
        JourneyStep::CompleteTask,
        JourneyStep::VerifyArchive,
        JourneyStep::CalendarEvent,
        JourneyStep::ParentMessage,
        JourneyStep::ChildReply,
        JourneyStep::DeepLinkGuard,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JourneyStep::ParentLogin => "parent_login",
            JourneyStep::FamilyExists => "family_exists",
            JourneyStep::AddChild => "add_child",
            JourneyStep::ChildLogin => "child_login",
            JourneyStep::AssignTask => "assign_task",
            JourneyStep::CompleteTask => "complete_task",
            JourneyStep::VerifyArchive => "verify_archive",
            JourneyStep::CalendarEvent => "calendar_event",
            JourneyStep::ParentMessage => "parent_message",
            JourneyStep::ChildReply => "child_reply",
            JourneyStep::DeepLinkGuard => "deep_link_guard",
        }
    }

    /// 1-based position in the journey.
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .map_or(0, |index| index + 1)
    }
}

impl fmt::Display for JourneyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State shared by the steps of one journey run.
pub struct SessionContext<D> {
    pub page: FamilyAppPage<D>,
    pub session: ActorSession,
    pub artifacts: JourneyArtifacts,
    parent: Credentials,
    /// Steps completed so far, in order.
    completed: Vec<JourneyStep>,
}

impl<D: Driver> SessionContext<D> {
    pub fn new(page: FamilyAppPage<D>, parent: Credentials, artifacts: JourneyArtifacts) -> Self {
        Self {
            page,
            session: ActorSession::new(),
            artifacts,
            parent,
            completed: Vec::new(),
        }
    }

    pub fn parent(&self) -> &Credentials {
        &self.parent
    }

    pub fn completed_steps(&self) -> &[JourneyStep] {
        &self.completed
    }

    /// Hands back the page object, ending the context.
    pub fn into_page(self) -> FamilyAppPage<D> {
        self.page
    }

    async fn switch_to_parent(&mut self) -> Result<()> {
        self.session.switch_identity(&self.page, &self.parent).await
    }

    async fn switch_to_child(&mut self) -> Result<()> {
        let child = self.artifacts.child.clone();
        self.session.switch_identity(&self.page, &child).await
    }
}

/// Runs the journey steps against a [`SessionContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Journey {
    completion_retry: RetryPolicy,
}

impl Journey {
    pub fn new(completion_retry: RetryPolicy) -> Self {
        Self { completion_retry }
    }

    pub fn from_settings(settings: &SuiteSettings) -> Self {
        Self::new(RetryPolicy::new(
            settings.retry.attempts,
            settings.retry.backoff(),
        ))
    }

    /// Runs every step in order.
    pub async fn run<D: Driver>(&self, ctx: &mut SessionContext<D>) -> Result<()> {
        self.run_steps(ctx, &JourneyStep::ALL).await
    }

    /// Runs the given steps in order, stopping at the first failure.
    pub async fn run_steps<D: Driver>(
        &self,
        ctx: &mut SessionContext<D>,
        steps: &[JourneyStep],
    ) -> Result<()> {
        for &step in steps {
            info!("Step {:02}: {}", step.number(), step.name());
            if let Err(err) = self.run_step(ctx, step).await {
                error!(step = step.name(), "step failed: {}", err);
                return Err(err);
            }
            ctx.completed.push(step);
        }
        Ok(())
    }

    async fn run_step<D: Driver>(&self, ctx: &mut SessionContext<D>, step: JourneyStep) -> Result<()> {
        match step {
            JourneyStep::ParentLogin => parent_login(ctx).await,
            JourneyStep::FamilyExists => family_exists(ctx).await,
            JourneyStep::AddChild => add_child(ctx).await,
            JourneyStep::ChildLogin => child_login(ctx).await,
            JourneyStep::AssignTask => assign_task(ctx).await,
            JourneyStep::CompleteTask => self.complete_task(ctx).await,
            JourneyStep::VerifyArchive => verify_archive(ctx).await,
            JourneyStep::CalendarEvent => calendar_event(ctx).await,
            JourneyStep::ParentMessage => parent_message(ctx).await,
            JourneyStep::ChildReply => child_reply(ctx).await,
            JourneyStep::DeepLinkGuard => deep_link_guard(ctx).await,
        }
    }

    /// Completes the task as the child, refreshing until it leaves the open
    /// list or the retry budget runs out.
    async fn complete_task<D: Driver>(&self, ctx: &mut SessionContext<D>) -> Result<()> {
        ctx.switch_to_child().await?;
        let page = &ctx.page;
        let title = ctx.artifacts.task_title.as_str();
        let child_email = ctx.artifacts.child.email();

        page.ensure(
            page.is_open_task_visible(title).await?,
            "Child should see assigned open task before completion",
        )
        .await?;
        let card = page.get_task_card_text(title, false).await?;
        page.ensure(
            card.contains("Assigned:") && ctx.artifacts.mentions_child(&card),
            "Child should see assignment metadata with own identity",
        )
        .await?;

        let policy = self.completion_retry;
        let mut diagnostics = String::new();
        for attempt in policy.attempts() {
            if page.is_open_task_visible(title).await? {
                let left_list = page.complete_task(title).await?;
                debug!(attempt, left_list, "completion submitted for '{}'", title);
                page.refresh_and_wait_user(child_email).await?;
            }

            if !page.is_open_task_visible(title).await? {
                info!(attempt, "task '{}' completed", title);
                return Ok(());
            }

            diagnostics = page.driver().diagnostics().await;
            warn!(
                attempt,
                attempts = policy.attempts,
                "task '{}' still open after completion: {}",
                title,
                diagnostics
            );
            policy.pause(attempt).await;
        }

        Err(E2eError::RetryExhausted {
            operation: format!("complete task '{title}'"),
            attempts: policy.attempts,
            diagnostics,
        })
    }
}

async fn parent_login<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.page.open_home().await?;
    ctx.session.login(&ctx.page, &ctx.parent).await?;

    let page = &ctx.page;
    page.ensure(
        page.is_tasks_section_visible().await?,
        "Parent should be redirected to Tasks section after login",
    )
    .await?;
    page.ensure(
        page.is_sidebar_visible().await?,
        "Sidebar should be visible for logged-in parent",
    )
    .await
}

async fn family_exists<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    let page = &ctx.page;
    page.open_family_settings().await?;
    page.ensure(
        page.is_family_settings_section_visible().await?,
        "Family settings section should be visible for parent",
    )
    .await?;
    page.ensure(
        page.is_family_members_section_visible().await?,
        "Family members section should be visible in Family Settings",
    )
    .await?;

    let mut family_name = page.wait_for_settings_family_name().await?;
    if family_name.is_empty() || family_name == "—" {
        family_name = page.get_family_name_text().await?;
    }
    page.ensure(
        !family_name.is_empty() && family_name != "—",
        "Family name should exist in UI family labels",
    )
    .await?;
    info!("family '{}' exists", family_name);
    Ok(())
}

async fn add_child<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    let page = &ctx.page;
    let artifacts = &ctx.artifacts;
    page.add_child_user(
        artifacts.child.email(),
        artifacts.child.password(),
        ctx.parent.password(),
        &artifacts.child_display_name,
    )
    .await?;

    let listed = page
        .is_family_member_listed(&artifacts.child_display_name)
        .await?
        || page.is_family_member_listed(artifacts.child.email()).await?;
    page.ensure(listed, "New child should appear in family members list")
        .await
}

async fn child_login<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.switch_to_child().await?;

    let page = &ctx.page;
    page.ensure(
        page.is_tasks_section_visible().await?,
        "Child should land on Tasks section after login",
    )
    .await?;
    page.ensure(
        page.open_task_count().await? == 0,
        "Child task list should be empty before any assignment",
    )
    .await?;
    page.ensure(
        !page.is_family_settings_nav_visible().await?,
        "Child must not see Family Settings entry in sidebar",
    )
    .await
}

async fn assign_task<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.switch_to_parent().await?;

    let page = &ctx.page;
    let artifacts = &ctx.artifacts;
    page.create_task(
        &artifacts.task_title,
        Some(artifacts.child.email()),
        &artifacts.task_details,
    )
    .await?;

    let card = page.get_task_card_text(&artifacts.task_title, false).await?;
    page.ensure(
        card.contains("Assigned:"),
        "Task card should show assignment metadata",
    )
    .await?;
    page.ensure(
        artifacts.mentions_child(&card),
        "Task card should show child assignee identity",
    )
    .await
}

async fn verify_archive<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.switch_to_parent().await?;

    let page = &ctx.page;
    let artifacts = &ctx.artifacts;
    let title = artifacts.task_title.as_str();

    page.ensure(
        page.wait_for_archive_task(title).await?,
        "Parent archive should contain completed child task",
    )
    .await?;

    let card = page.get_task_card_text(title, true).await?;
    page.ensure(
        artifacts.mentions_child(&card),
        "Archived task should preserve child assignment display",
    )
    .await?;

    let record = page.observe_task(title).await?;
    let archived_once = matches!(
        record,
        Some(TaskRecord {
            state: TaskState::Completed,
            archived: true,
            ..
        })
    );
    page.ensure(
        archived_once,
        &format!("Task should be completed and archived only, observed {record:?}"),
    )
    .await?;
    page.ensure(
        !page.is_open_task_visible(title).await?,
        "Archived task must not reappear in the open list",
    )
    .await
}

async fn calendar_event<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    let page = &ctx.page;
    let title = ctx.artifacts.event_title.as_str();
    page.create_calendar_event(title).await?;
    page.ensure(
        page.is_calendar_event_visible(title).await?,
        "Newly created calendar event should appear in month grid",
    )
    .await
}

async fn parent_message<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    let page = &ctx.page;
    let text = ctx.artifacts.message_text.as_str();
    page.post_message(text).await?;
    page.ensure(
        page.message_exists(text).await?,
        "Parent message should appear in message feed",
    )
    .await
}

async fn child_reply<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.switch_to_child().await?;

    let page = &ctx.page;
    let artifacts = &ctx.artifacts;
    page.post_message(&artifacts.reply_text).await?;
    page.ensure(
        page.message_exists(&artifacts.message_text).await?,
        "Parent message should remain visible to child",
    )
    .await?;
    page.ensure(
        page.message_exists(&artifacts.reply_text).await?,
        "Child reply should appear in message feed",
    )
    .await?;

    ctx.switch_to_parent().await?;
    let page = &ctx.page;
    page.open_messages().await?;
    page.ensure(
        page.message_exists(&ctx.artifacts.reply_text).await?,
        "Child reply should be visible to parent",
    )
    .await
}

async fn deep_link_guard<D: Driver>(ctx: &mut SessionContext<D>) -> Result<()> {
    ctx.switch_to_child().await?;

    let page = &ctx.page;
    page.open_direct_settings_url().await?;

    page.ensure(
        !page.is_family_settings_nav_visible().await?,
        "Child direct navigation should not expose Family Settings sidebar link",
    )
    .await?;
    page.ensure(
        !page.is_family_settings_section_visible().await?,
        "Child should not be able to view family settings section",
    )
    .await?;
    page.ensure(
        !page.is_add_child_form_visible().await?,
        "Child should not be able to access add-child form",
    )
    .await
}
