use std::sync::Arc;

use mixfinder::engine::{similarity, Mixbox, PigmentModel};
use mixfinder::{Palette, PigmentId, Rgb, SearchConfig, SearchMode, SearchSession};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg as PcgRng;

fn model() -> Arc<dyn PigmentModel> {
    Arc::new(Mixbox)
}

#[test]
fn primaries_toward_blue_favor_blue() {
    let palette = Palette::primaries();
    let target: Rgb = "#3b82f6".parse().unwrap();
    let mut rng = PcgRng::seed_from_u64(2024);
    let mut session = SearchSession::start(&palette, target, SearchMode::Normal, &SearchConfig::default(), model(), &mut rng);

    let initial = session.published().score;
    for _ in 0..150 {
        session.tick(&mut rng);
    }
    let result = session.published();
    assert!(result.score >= initial);
    assert!((similarity(result.resulting_color, target) - result.score).abs() < 1e-9);

    let parts = |id| result.recipe.parts_of(PigmentId(id)).unwrap();
    let (red, blue, yellow) = (parts(1), parts(2), parts(3));
    assert!(blue >= red && blue >= yellow, "red {red} blue {blue} yellow {yellow}");
    assert!(result.total_parts() <= 10);
}

#[test]
fn same_seed_same_search() {
    let palette = Palette::primaries();
    let target: Rgb = "#6b8e23".parse().unwrap();
    let run = |seed| {
        let mut rng = PcgRng::seed_from_u64(seed);
        let mut session =
            SearchSession::start(&palette, target, SearchMode::Precision, &SearchConfig::default(), model(), &mut rng);
        for _ in 0..20 {
            session.tick(&mut rng);
        }
        (session.published().clone(), session.stats().clone())
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn no_progress_is_not_an_error() {
    // A single pigment cannot get any closer than its own color.
    let palette = Palette::from_hex(&["#ff0000"]).unwrap();
    let mut rng = PcgRng::seed_from_u64(77);
    let mut session = SearchSession::start(
        &palette,
        "#00ff00".parse().unwrap(),
        SearchMode::Normal,
        &SearchConfig::default(),
        model(),
        &mut rng,
    );
    let before = session.published().score;
    for _ in 0..30 {
        session.tick(&mut rng);
    }
    assert_eq!(session.published().score, before);
    assert!(session.is_running());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_caps_hold_and_normal_never_regresses(
        seed in any::<u64>(),
        (r, g, b) in any::<(u8, u8, u8)>(),
        precision in any::<bool>(),
    ) {
        let mode = if precision { SearchMode::Precision } else { SearchMode::Normal };
        let config = SearchConfig { trials_per_tick: 100, ..SearchConfig::default() };
        let cap = config.tuning(mode).parts_cap;
        let mut rng = PcgRng::seed_from_u64(seed);
        let mut session = SearchSession::start(&Palette::primaries(), Rgb::new(r, g, b), mode, &config, model(), &mut rng);

        let mut last = session.published().score;
        for _ in 0..10 {
            session.tick(&mut rng);
            for branch in session.branches() {
                prop_assert!(branch.total_parts() > 0 && branch.total_parts() <= cap);
                prop_assert_eq!(branch.total_parts(), branch.parts().iter().sum::<u32>());
                prop_assert!((0.0..=100.0).contains(&branch.score()));
            }
            let now = session.published().score;
            if mode == SearchMode::Normal {
                prop_assert!(now >= last);
            }
            last = now;
        }
    }
}
