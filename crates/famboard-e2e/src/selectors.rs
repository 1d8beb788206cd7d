//! CSS selectors of the family organizer UI.

// Sections
pub const AUTH_SECTION: &str = "#auth-section";
pub const TASKS_SECTION: &str = "#tasks-section";
pub const CALENDAR_SECTION: &str = "#calendar-section";
pub const MESSAGES_SECTION: &str = "#messages-section";
pub const FAMILY_SETTINGS_SECTION: &str = "#family-settings-section";

// Shell
pub const SIDEBAR: &str = "#sidebar";
pub const USER_EMAIL: &str = "#user-email";
pub const SIDEBAR_LOGOUT: &str = "#sidebar-logout";
pub const AUTH_PANEL_LOGOUT: &str = "#logout-btn";
pub const NAV_SETTINGS: &str = "#nav-settings";
pub const AUTH_ERROR: &str = "#auth-error";
pub const STATUS: &str = "#status";

// Login
pub const LOGIN_EMAIL: &str = "#login-form input[name='email']";
pub const LOGIN_PASSWORD: &str = "#login-form input[name='password']";
pub const LOGIN_BUTTON: &str = "#login-form button[type='submit']";

// Family
pub const FAMILY_PANEL: &str = "#family-panel";
pub const FAMILY_NAME: &str = "#family-name";
pub const CREATE_FAMILY_SECTION: &str = "#create-family-section";
pub const CREATE_FAMILY_FORM: &str = "#create-family-form";
pub const CREATE_FAMILY_NAME_INPUT: &str = "#create-family-form input[name='familyName']";
pub const CREATE_FAMILY_SUBMIT: &str = "#create-family-form button[type='submit']";

pub const ADD_CHILD_FORM: &str = "#add-child-form";
pub const CHILD_EMAIL: &str = "#add-child-form input[name='childEmail']";
pub const CHILD_PASSWORD: &str = "#add-child-form input[name='childPassword']";
pub const CHILD_NAME: &str = "#add-child-form input[name='childName']";
pub const PARENT_PASSWORD: &str = "#add-child-form input[name='parentPassword']";
pub const ADD_CHILD_SUBMIT: &str = "#add-child-form button[type='submit']";
pub const FAMILY_MEMBERS_SECTION: &str = "#family-members-section";
pub const SETTINGS_FAMILY_NAME: &str = "#settings-family-name";
pub const FAMILY_MEMBERS_LIST: &str = "#family-members-list";

// Tasks
pub const NEW_TASK_BUTTON: &str = "#new-task-btn";
pub const TASK_FORM: &str = "#task-form";
pub const TASK_TITLE: &str = "#task-form input[name='title']";
pub const TASK_DETAILS: &str = "#task-form textarea[name='content']";
pub const TASK_ASSIGNEE_SELECT: &str = "#assigned-user";
pub const TASK_SAVE_BUTTON: &str = "#task-form button[type='submit']";
pub const TASKS_LIST: &str = "#tasks-list";
pub const OPEN_TASK_CARD: &str = "#tasks-list .task-card";
pub const ARCHIVE_TOGGLE: &str = "#archive-toggle";
pub const ARCHIVE_SECTION: &str = "#archive-section";
pub const ARCHIVE_LIST: &str = "#archive-list";
pub const ARCHIVED_TASK_CARD: &str = "#archive-list .task-card";
pub const TASK_CHECKBOX: &str = "input[type='checkbox']";

// Navigation
pub const NAV_TASKS: &str = "a.nav-link[data-section='tasks']";
pub const NAV_CALENDAR: &str = "a.nav-link[data-section='calendar']";
pub const NAV_MESSAGES: &str = "a.nav-link[data-section='messages']";
pub const NAV_SETTINGS_LINK: &str = "a.nav-link[data-section='settings']";

// Calendar
pub const CALENDAR_USER_SELECT: &str = "#calendar-user-select";
pub const CALENDAR_DAY_IN_MONTH: &str = "#calendar-days-container .calendar-day:not(.other-month)";
pub const CALENDAR_EVENT: &str = ".calendar-event";
pub const EVENT_MODAL: &str = "#event-modal";
pub const EVENT_TITLE: &str = "#event-title";
pub const EVENT_DATE: &str = "#event-date";
pub const EVENT_TIME: &str = "#event-time";
pub const EVENT_SUBMIT: &str = "#event-form button[type='submit']";

// Messages
pub const MESSAGE_FORM: &str = "#message-form";
pub const MESSAGE_TEXT: &str = "#message-text";
pub const MESSAGE_SUBMIT: &str = "#message-form button[type='submit']";
pub const MESSAGES_LIST: &str = "#messages-list";

/// Client-side route of the add-member settings screen.
pub const SETTINGS_ADD_MEMBER_ROUTE: &str = "settings/add-member";
