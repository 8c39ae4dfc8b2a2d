use crate::events::TdEvent;
use crate::world::TdState;

/// Day time eased per frame toward its target.
const DAY_STEP: f32 = 0.0005;
/// Day time held during night waves.
const NIGHT: f32 = 0.7;
/// Waves per half day/night cycle.
const WAVES_PER_PHASE: u32 = 5;
const SEASON_BLEND_STEP: f32 = 0.005;

pub fn advance(state: &mut TdState, events: &mut Vec<TdEvent>) {
    let night = ((state.wave.saturating_sub(1)) / WAVES_PER_PHASE) % 2 == 1;
    let target = if night { NIGHT } else { 0.0 };
    if state.day_time < target {
        state.day_time = (state.day_time + DAY_STEP).min(target);
    } else if state.day_time > target {
        state.day_time = (state.day_time - DAY_STEP).max(target);
    }

    if state.next_season != state.season {
        state.season_blend += SEASON_BLEND_STEP;
        if state.season_blend >= 1.0 {
            state.season = state.next_season;
            state.season_blend = 0.0;
            tracing::info!(season = state.season.as_str(), "season changed");
            events.push(TdEvent::SeasonChanged {
                season: state.season,
            });
        }
    }

    let abilities = &mut state.abilities;
    abilities.arrow = abilities.arrow.saturating_sub(1);
    abilities.tax = abilities.tax.saturating_sub(1);
    abilities.ice = abilities.ice.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TdConfig;
    use crate::terrain::Grid;
    use crate::world::Season;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn state() -> TdState {
        let config = TdConfig::default();
        let grid = Grid::open(config.width, config.height, config.castle);
        TdState::with_grid(config, ChaCha8Rng::seed_from_u64(3), grid)
    }

    #[test]
    fn night_falls_on_waves_six_to_ten() {
        let mut s = state();
        let mut events = Vec::new();
        s.wave = 6;
        for _ in 0..2000 {
            advance(&mut s, &mut events);
        }
        assert_eq!(s.day_time, NIGHT);

        s.wave = 11;
        for _ in 0..2000 {
            advance(&mut s, &mut events);
        }
        assert_eq!(s.day_time, 0.0);
    }

    #[test]
    fn season_blends_over_two_hundred_frames() {
        let mut s = state();
        let mut events = Vec::new();
        s.next_season = Season::Autumn;
        for _ in 0..150 {
            advance(&mut s, &mut events);
        }
        assert_eq!(s.season, Season::Summer);
        for _ in 0..60 {
            advance(&mut s, &mut events);
        }
        assert_eq!(s.season, Season::Autumn);
        assert_eq!(s.season_blend, 0.0);
        assert_eq!(
            events,
            vec![TdEvent::SeasonChanged {
                season: Season::Autumn
            }]
        );
    }

    #[test]
    fn cooldowns_tick_down_to_zero() {
        let mut s = state();
        let mut events = Vec::new();
        s.abilities.arrow = 2;
        s.abilities.ice = 1;
        for _ in 0..3 {
            advance(&mut s, &mut events);
        }
        assert_eq!(s.abilities.arrow, 0);
        assert_eq!(s.abilities.ice, 0);
    }
}
