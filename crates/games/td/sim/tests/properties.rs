use bastion_host::Session;
use bastion_td::actions;
use bastion_td::{Grid, TdAction, TdConfig, TdGame, Terrain, TowerKind};
use proptest::prelude::*;

fn rich_game(seed: u64) -> TdGame {
    let mut config = TdConfig::default();
    config.starting_gold = 100_000;
    let grid = Grid::open(config.width, config.height, config.castle);
    TdGame::with_grid(config, seed, grid)
}

fn placement() -> impl Strategy<Value = (u16, u16, usize)> {
    (0u16..20, 0u16..30, 0usize..TowerKind::ALL.len())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever gets built, the top edge keeps a road to the castle and
    /// every built cell has exactly one tower on it.
    #[test]
    fn castle_stays_reachable(placements in prop::collection::vec(placement(), 1..120)) {
        let mut game = rich_game(1);
        let state = game.state_mut();
        let mut events = Vec::new();
        for (x, y, k) in placements {
            let _ = actions::build(state, x, y, TowerKind::ALL[k], &mut events);
            prop_assert!(state.field.spawn_edge_routed(&state.grid));
        }

        let built = state.grid.count(Terrain::Built);
        prop_assert_eq!(built, state.world.towers.len());
        for tower in state.world.towers.values() {
            let (x, y) = tower.cell;
            prop_assert_eq!(state.grid.terrain(x, y), Terrain::Built);
        }
    }

    /// Gold only moves by tower cost out and refund in.
    #[test]
    fn build_and_sell_balance_the_books(
        placements in prop::collection::vec(placement(), 1..60),
        sell_every in 1usize..4,
    ) {
        let mut game = rich_game(2);
        let state = game.state_mut();
        let mut events = Vec::new();
        let mut expected = state.gold;

        for (i, (x, y, k)) in placements.into_iter().enumerate() {
            let kind = TowerKind::ALL[k];
            if let Ok(id) = actions::build(state, x, y, kind, &mut events) {
                expected -= kind.spec().cost;
                if i % sell_every == 0 {
                    let refund = actions::sell(state, id, &mut events).unwrap();
                    prop_assert_eq!(refund, kind.spec().cost * 70 / 100);
                    expected += refund;
                }
            }
            prop_assert_eq!(state.gold, expected);
        }
    }

    /// Running waves unattended only ever costs lives, and the wave counter
    /// steps by one once a wave is fully spent.
    #[test]
    fn waves_advance_and_lives_only_fall(seed in any::<u64>(), start in 1u32..25) {
        let mut config = TdConfig::default();
        config.starting_lives = 1_000;
        let grid = Grid::open(config.width, config.height, config.castle);
        let mut game = TdGame::with_grid(config.clone(), seed, grid);
        game.state_mut().wave = start;
        let mut session = Session::from_game(game, config, seed, 60);
        session.submit(TdAction::SetSpeed(5));

        let mut lives = session.game().state().lives;
        let mut wave = start;
        let mut field_was_clear = false;
        for _ in 0..3_000 {
            if !session.game().state().wave_active {
                session.submit(TdAction::StartWave);
            }
            if session.step_one_tick().is_none() {
                break;
            }
            let state = session.game().state();
            prop_assert!(state.lives <= lives);
            prop_assert!(state.wave == wave || state.wave == wave + 1);
            if state.wave > wave {
                // Waves only close once the roster is out and the field is empty.
                prop_assert!(field_was_clear);
            }
            prop_assert!(state.world.enemies.values().all(|e| e.hp > 0.0));
            lives = state.lives;
            wave = state.wave;
            field_was_clear = state.spawn_queue.is_empty() && state.world.enemies.is_empty();
        }
    }
}
