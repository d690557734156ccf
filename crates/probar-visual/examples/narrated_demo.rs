//! Narrated Demo - Visual Instrumentation Walkthrough
//!
//! Runs a narrated "add a user" scenario against the in-memory page and
//! prints what the page runtime received.
//!
//! # Running
//!
//! ```bash
//! cargo run --example narrated_demo -p jugar-probar-visual
//! PROBAR_SLOW_MO=400 cargo run --example narrated_demo -p jugar-probar-visual
//! ```

#![allow(clippy::uninlined_format_args, clippy::unwrap_used)]

use probar_visual::{
    BoundingBox, Locator, MockPage, ModeConfig, StoryStep, TestInfo, Timings, VisualFixture,
};

#[tokio::main]
async fn main() {
    println!("=== Probar Visual Narrated Demo ===\n");

    let mut mode = ModeConfig::from_env();
    mode.visual_enabled = true;
    println!("Mode:");
    println!("  timing multiplier: {}", mode.timing_multiplier());
    println!("  panels visible:    {}", mode.panels_visible());
    println!("  focus toggle:      {}", mode.focus_toggle_enabled());

    let name = Locator::test_id("user-name");
    let add = Locator::test_id("add-user");
    let probe = MockPage::new()
        .with_element(name.clone(), BoundingBox::new(120.0, 160.0, 280.0, 36.0))
        .with_element(add.clone(), BoundingBox::new(420.0, 160.0, 96.0, 36.0));

    let fixture =
        VisualFixture::new(mode).with_timings(Timings::default().with_result_hold(400, 800));
    let info = TestInfo::new("Adds a user").with_project("mock");

    let (field, button) = (name.clone(), add.clone());
    let result = fixture
        .run(probe.clone(), &info, |page, cursor, story| {
            Box::pin(async move {
                story
                    .setup(
                        page,
                        "User management",
                        "Add a user",
                        vec![
                            StoryStep::given("an empty user list"),
                            StoryStep::when("I type a name and press add"),
                            StoryStep::then("the name is stored"),
                        ],
                    )
                    .await;

                story.step(page).await;
                story.step(page).await;
                cursor.fill(page, &field, "Ada Lovelace").await?;
                cursor.click(page, &button).await?;
                story.step(page).await;
                Ok(())
            })
        })
        .await;

    println!("\nResult: {:?}", result);
    println!("Value typed: {:?}", probe.value(&name));
    println!("\nRuntime calls:");
    for op in probe.runtime_ops() {
        println!("  {}", op);
    }
    let model = probe.runtime();
    println!("\nFinal page state:");
    println!("  cursor:      ({:.0}, {:.0})", model.cursor.x, model.cursor.y);
    println!("  step index:  {}", model.step_index);
    println!("  result:      {:?}", model.result);
}
