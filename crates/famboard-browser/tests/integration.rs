//! Integration tests for famboard-browser
//!
//! These tests require Chrome/Chromium to be installed and are marked #[ignore]
//! by default. Run with: cargo test --package famboard-browser -- --ignored

use famboard_browser::wait::{poll_until_result, wait_until};
use famboard_browser::{
    BrowserError, Driver, Locator, Page, TestBrowser, TestBrowserConfig, WaitConfig,
};
use std::time::Duration;

/// A miniature login + task list, enough to exercise every driver capability.
fn fixture_html() -> String {
    r#"
    <!DOCTYPE html>
    <html>
    <head><title>Fixture</title></head>
    <body>
        <section id="auth-section">
            <form id="login-form">
                <input name="email" />
                <button type="submit">Log in</button>
            </form>
        </section>
        <section id="tasks-section" style="display:none">
            <span id="user-email"></span>
            <select id="assigned-user">
                <option value="">Unassigned</option>
                <option value="u-42">kid@example.com</option>
            </select>
            <div id="tasks-list">
                <div class="task-card">Homework <input type="checkbox" /></div>
                <div class="task-card">Dishes <input type="checkbox" /></div>
            </div>
        </section>
        <div id="status">idle</div>
        <script>
            document.getElementById('login-form').addEventListener('submit', (e) => {
                e.preventDefault();
                const email = e.target.elements.email.value;
                setTimeout(() => {
                    document.getElementById('auth-section').style.display = 'none';
                    document.getElementById('tasks-section').style.display = 'block';
                    document.getElementById('user-email').textContent = email;
                }, 150);
            });
            document.querySelectorAll('.task-card input').forEach((box) => {
                box.addEventListener('change', () => box.closest('.task-card').remove());
            });
            console.error("fixture ready");
        </script>
    </body>
    </html>
    "#
    .to_string()
}

async fn open_fixture() -> (TestBrowser, Page) {
    let browser = TestBrowser::launch(TestBrowserConfig::default())
        .await
        .expect("failed to launch");
    let page = browser
        .new_isolated_page()
        .await
        .expect("failed to create page");

    let data_url = format!("data:text/html,{}", urlencoding::encode(&fixture_html()));
    page.goto(&data_url).await.expect("failed to navigate");
    (browser, page)
}

async fn teardown(browser: TestBrowser, page: Page) {
    browser.release(page).await.expect("failed to release page");
    browser.close().await.expect("failed to close");
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn test_login_flow_with_hard_wait() {
    let (browser, page) = open_fixture().await;

    page.fill(&Locator::css("#login-form input[name='email']"), "parent@example.com")
        .await
        .expect("fill");
    page.click(&Locator::css("#login-form button[type='submit']"))
        .await
        .expect("click");

    let label = &Locator::css("#user-email");
    let p = &page;
    wait_until(
        p,
        || async move {
            let text = p.text_content(label).await?;
            Ok(text.is_some_and(|t| t.contains("parent@example.com")))
        },
        WaitConfig::with_timeout(Duration::from_secs(5)),
        "user email label",
    )
    .await
    .expect("login should be confirmed");

    assert!(page.is_hidden(&Locator::css("#auth-section")).await.unwrap());
    teardown(browser, page).await;
}

#[tokio::test]
#[ignore]
async fn test_hard_wait_timeout_carries_snapshot() {
    let (browser, page) = open_fixture().await;

    let missing = &Locator::css("#never");
    let p = &page;
    let result = wait_until(
        p,
        || async move { p.exists(missing).await },
        WaitConfig::new(Duration::from_millis(300), Duration::from_millis(50)),
        "#never present",
    )
    .await;

    match result {
        Err(BrowserError::WaitTimeout {
            snapshot: Some(snapshot),
            ..
        }) => {
            assert!(snapshot.contains("idle"), "snapshot: {snapshot}");
            assert!(snapshot.contains("fixture ready"), "snapshot: {snapshot}");
        }
        other => panic!("expected timeout with snapshot, got {other:?}"),
    }

    teardown(browser, page).await;
}

#[tokio::test]
#[ignore]
async fn test_has_text_and_inner_locators() {
    let (browser, page) = open_fixture().await;
    page.click(&Locator::css("#login-form button[type='submit']"))
        .await
        .expect("click");
    tokio::time::sleep(Duration::from_millis(300)).await;

    let cards = Locator::css("#tasks-list .task-card");
    assert_eq!(page.count(&cards).await.unwrap(), 2);

    let dishes = cards.clone().has_text("Dishes");
    assert!(page.is_visible(&dishes).await.unwrap());

    page.check(&dishes.clone().inner("input[type='checkbox']"))
        .await
        .expect("check");

    let (p, d) = (&page, &dishes);
    let gone = poll_until_result(
        || async move { p.is_hidden(d).await },
        WaitConfig::with_timeout(Duration::from_secs(2)),
    )
    .await;
    assert!(gone, "checked card should be removed");
    assert_eq!(
        page.all_text_contents(&cards).await.unwrap().len(),
        1,
        "only Homework remains"
    );

    teardown(browser, page).await;
}

#[tokio::test]
#[ignore]
async fn test_select_options() {
    let (browser, page) = open_fixture().await;

    let select = Locator::css("#assigned-user");
    let options = page.options(&select).await.expect("options");
    assert_eq!(options.len(), 2);
    assert_eq!(options[1].value, "u-42");
    assert_eq!(options[1].label, "kid@example.com");

    page.select_option(&select, "u-42").await.expect("select");
    let missing = page.select_option(&select, "nope").await;
    assert!(matches!(missing, Err(BrowserError::ElementNotFound(_))));

    teardown(browser, page).await;
}

#[tokio::test]
#[ignore]
async fn test_actions_on_missing_elements_fail() {
    let (browser, page) = open_fixture().await;

    let result = page.click(&Locator::css("#sidebar-logout")).await;
    assert!(matches!(result, Err(BrowserError::ElementNotFound(_))));
    assert_eq!(
        page.text_content(&Locator::css("#sidebar-logout")).await.unwrap(),
        None
    );

    teardown(browser, page).await;
}

#[tokio::test]
#[ignore]
async fn test_console_capture_records_errors() {
    let (browser, page) = open_fixture().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(page.console().error_count() >= 1);
    assert!(page
        .console()
        .errors()
        .iter()
        .any(|m| m.text.contains("fixture ready")));

    teardown(browser, page).await;
}
