use promo_page::{
    fade_opacity, scroll_progress, Harness, Product, Result, FADE_SPAN, SCROLL_THRESHOLD,
};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseResult};

const FADE_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/fade_property_fuzz_test.txt";
const DEFAULT_FADE_PROPTEST_CASES: u32 = 256;

fn fade_proptest_cases() -> u32 {
    std::env::var("PROMO_PAGE_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_FADE_PROPTEST_CASES)
}

fn lineup() -> Vec<Product> {
    vec![
        Product::new("Mango", "Smoothie", 5.50),
        Product::new("Lime", "Soda", 3.25),
    ]
}

#[derive(Clone, Debug)]
enum PageAction {
    Scroll(f64),
    RunFrame,
    EndIntroVideo,
}

fn scroll_offset_strategy() -> BoxedStrategy<f64> {
    (0u32..=4_000u32).prop_map(f64::from).boxed()
}

fn page_action_strategy() -> BoxedStrategy<PageAction> {
    prop_oneof![
        4 => scroll_offset_strategy().prop_map(PageAction::Scroll),
        3 => Just(PageAction::RunFrame),
        1 => Just(PageAction::EndIntroVideo),
    ]
    .boxed()
}

fn apply_action(harness: &mut Harness, action: &PageAction) -> Result<()> {
    match action {
        PageAction::Scroll(offset) => harness.scroll_to(*offset),
        PageAction::RunFrame => harness.run_frame().map(|_| ()),
        PageAction::EndIntroVideo => {
            harness.end_intro_video()?;
            Ok(())
        }
    }
}

fn assert_fade_sequence_is_stable(actions: &[PageAction]) -> TestCaseResult {
    let mut harness = Harness::from_products(&lineup())
        .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;

    for (step, action) in actions.iter().enumerate() {
        if let Err(error) = apply_action(&mut harness, action) {
            prop_assert!(
                false,
                "action returned error at step {step}: {action:?}, error={error:?}, actions={actions:?}"
            );
        }

        let opacity = harness
            .opacity(".scroll-logo")
            .map_err(|err| proptest::test_runner::TestCaseError::fail(format!("{err:?}")))?;
        prop_assert!(
            (0.0..=1.0).contains(&opacity),
            "opacity out of range after step {step}: {opacity}, actions={actions:?}"
        );
        prop_assert!(
            harness.pending_frames() <= 1,
            "more than one pending frame after step {step}, actions={actions:?}"
        );
        if !harness.flags().video_ended {
            prop_assert!(
                opacity == 0.0,
                "logo visible before video ended after step {step}: {opacity}, actions={actions:?}"
            );
        }
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: fade_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(FADE_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn fade_opacity_stays_in_unit_interval(progress in 0.0f64..100.0) {
        if let Some(opacity) = fade_opacity(progress) {
            prop_assert!((0.0..=1.0).contains(&opacity), "opacity={opacity}");
        } else {
            prop_assert!(progress <= SCROLL_THRESHOLD);
        }
    }

    #[test]
    fn fade_opacity_is_monotonically_non_increasing(
        a in 0.0f64..10.0,
        b in 0.0f64..10.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let low_opacity = fade_opacity(low).unwrap_or(1.0);
        let high_opacity = fade_opacity(high).unwrap_or(1.0);
        prop_assert!(
            high_opacity <= low_opacity + 1e-12,
            "fade increased: f({low})={low_opacity} f({high})={high_opacity}"
        );
    }

    #[test]
    fn fade_opacity_is_linear_inside_the_fade_window(
        progress in (SCROLL_THRESHOLD + 1e-6)..(SCROLL_THRESHOLD + FADE_SPAN),
    ) {
        let opacity = fade_opacity(progress).unwrap_or(-1.0);
        let expected = 1.0 - (progress - SCROLL_THRESHOLD) / FADE_SPAN;
        prop_assert!(
            (opacity - expected).abs() < 1e-9,
            "expected {expected}, got {opacity} at progress {progress}"
        );
    }

    #[test]
    fn scroll_progress_never_goes_negative(
        section_top in -10_000.0f64..10_000.0,
        viewport_height in 1.0f64..4_000.0,
    ) {
        let progress = scroll_progress(section_top, viewport_height);
        prop_assert!(progress >= 0.0, "progress={progress}");
        if section_top >= 0.0 {
            prop_assert!(progress == 0.0, "progress={progress} for top={section_top}");
        }
    }

    #[test]
    fn random_page_action_sequences_keep_invariants(
        actions in vec(page_action_strategy(), 1..40),
    ) {
        assert_fade_sequence_is_stable(&actions)?;
    }
}
