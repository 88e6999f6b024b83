//! Frame step
//!
//! Advances a round by one real frame. Velocities are in pixels per
//! reference frame (1/60 s), so the elapsed time is converted into a
//! number of reference frames and split into substeps small enough that
//! the ball cannot skip over a brick.

use super::collision::{
    AngledBounce, ball_lost, ball_overlaps_brick, bounce_off_paddle, paddle_contact,
    penetration_power, power_ratio, register_brick_hit, resolve_walls,
};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Player intent for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Keyboard direction: -1 left, 0 none, 1 right
    pub direction: i8,
    /// Absolute paddle center from the pointer
    pub target_x: Option<f32>,
    /// Relative paddle movement from a touch drag
    pub drag_dx: f32,
    /// Pointer or touch held (squeezes the paddle)
    pub pressed: bool,
    /// Launch the ball (space/enter/click)
    pub start: bool,
    /// Deal a fresh round
    pub restart: bool,
}

/// Advance the round by `dt` real seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        state.restart();
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    if state.phase.is_terminal() {
        return;
    }
    state.frame += 1;

    if input.start && state.phase == GamePhase::Waiting {
        serve(state);
    }

    let field_width = state.width;
    if let Some(x) = input.target_x {
        state.paddle.set_center_x(x, field_width);
    }
    if input.drag_dx != 0.0 {
        state.paddle.nudge(input.drag_dx, field_width);
    }

    let paddle_cfg = state.config.paddle;
    state.paddle.ease_width(
        input.pressed,
        dt,
        paddle_cfg.shrink_secs,
        paddle_cfg.expand_secs,
        field_width,
    );

    match state.phase {
        GamePhase::Waiting => {
            state.paddle.dx = 0.0;
            state.ball.rest_on(&state.paddle);
        }
        GamePhase::Playing => step_playing(state, input.direction, dt),
        GamePhase::GameOver | GamePhase::Cleared => {}
    }
}

/// Launch the ball off the paddle
fn serve(state: &mut GameState) {
    let launch = state.launch();
    state.ball.reset(&state.paddle, launch);
    state.penetration.destroyed = 0;
    if let Some(pen) = &state.config.penetration {
        state.penetration.power = penetration_power(&state.paddle, pen);
        log::debug!("Penetration power {} at launch", state.penetration.power);
    }
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::Started);
    log::info!("Ball launched ({} lives)", state.lives);
}

fn step_playing(state: &mut GameState, direction: i8, dt: f32) {
    let frames = dt / REFERENCE_FRAME_DT;
    let substeps = (frames.ceil() as u32).clamp(1, MAX_SUBSTEPS);
    let sub = frames / substeps as f32;
    let field_width = state.width;

    state.paddle.dx = direction.signum() as f32 * state.paddle.max_speed;
    // Bricks reflect the ball at most once per frame, across all substeps
    let mut reflected = false;

    for _ in 0..substeps {
        state.paddle.pos.x += state.paddle.dx * sub;
        state.paddle.clamp(field_width);

        state.ball.pos += state.ball.vel * sub;

        if resolve_walls(&mut state.ball, field_width).any() {
            state.events.push(GameEvent::WallBounce);
        }
        resolve_paddle(state);
        resolve_bricks(state, &mut reflected);

        if state.remaining == 0 {
            state.phase = GamePhase::Cleared;
            state.events.push(GameEvent::Cleared);
            log::info!("Board cleared with score {}", state.score);
            return;
        }

        if ball_lost(&state.ball, state.height) {
            lose_life(state);
            return;
        }
    }
}

fn resolve_paddle(state: &mut GameState) {
    // Only a descending ball can land on the paddle
    if state.ball.vel.y <= 0.0 {
        return;
    }
    let Some(offset) = paddle_contact(&state.ball, &state.paddle) else {
        return;
    };

    let angled = state.config.angled_bounce.then(|| AngledBounce {
        max_angle: state.config.max_bounce_angle_deg.to_radians(),
        speed: state.base_speed() * (1.0 + power_ratio(&state.paddle)),
    });
    bounce_off_paddle(&mut state.ball, &state.paddle, offset, angled);

    state.penetration.destroyed = 0;
    if let Some(pen) = &state.config.penetration {
        state.penetration.power = penetration_power(&state.paddle, pen);
    }
    state.events.push(GameEvent::PaddleHit { offset });
}

/// Destroy every visible brick the ball overlaps. Reflects only if the
/// frame has not reflected off a brick yet.
fn resolve_bricks(state: &mut GameState, reflected: &mut bool) {
    let dy = state.ball.vel.y;
    let half_cell = state.layout.cell_size() / 2.0;

    for brick in state.bricks.iter_mut().filter(|b| b.visible) {
        if !ball_overlaps_brick(&state.ball, brick, &state.layout) {
            continue;
        }
        brick.visible = false;
        state.remaining -= 1;
        state.score = state.score.saturating_add(state.config.brick_value);

        let turn = register_brick_hit(&mut state.penetration, state.config.penetration.as_ref(), dy);
        if turn && !*reflected {
            state.ball.vel.y = -state.ball.vel.y;
            *reflected = true;
        }

        state.events.push(GameEvent::BrickDestroyed {
            row: brick.row,
            col: brick.col,
            center: brick.pos + half_cell,
            color: brick.color,
        });
    }
}

fn lose_life(state: &mut GameState) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });

    let launch = state.launch();
    state.paddle.dx = 0.0;
    state.ball.reset(&state.paddle, launch);
    state.penetration.destroyed = 0;

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over with score {}", state.score);
    } else {
        state.phase = GamePhase::Waiting;
        log::debug!("Life lost, {} left", state.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, GridSpec, PenetrationConfig};
    use glam::Vec2;
    use proptest::prelude::*;

    const DT: f32 = REFERENCE_FRAME_DT;

    fn reference_state() -> GameState {
        GameState::new(GameConfig::default(), 800.0, 600.0, 12345).unwrap()
    }

    fn playing_state(config: GameConfig) -> GameState {
        let mut state = GameState::new(config, 800.0, 600.0, 12345).unwrap();
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_one_reference_frame_moves_ball() {
        let mut state = playing_state(GameConfig::default());
        state.ball.pos = Vec2::new(400.0, 300.0);
        state.ball.vel = Vec2::new(4.0, -4.0);

        tick(&mut state, &TickInput::default(), DT);
        assert!((state.ball.pos - Vec2::new(404.0, 296.0)).length() < 1e-4);
        assert_eq!(state.ball.vel, Vec2::new(4.0, -4.0));
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut state = playing_state(GameConfig::default());
        state.ball.pos = Vec2::new(400.0, 300.0);
        state.ball.vel = Vec2::new(4.0, -4.0);

        // A one second stall only simulates MAX_FRAME_DT
        tick(&mut state, &TickInput::default(), 1.0);
        assert!((state.ball.pos - Vec2::new(424.0, 276.0)).length() < 1e-3);
    }

    #[test]
    fn test_start_launches_ball() {
        let mut state = reference_state();
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.ball.pos, Vec2::new(400.0, 562.0));

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!((state.ball.pos - Vec2::new(404.0, 558.0)).length() < 1e-4);
        assert_eq!(state.drain_events(), vec![GameEvent::Started]);
        assert_eq!(state.penetration.power, 1);
    }

    #[test]
    fn test_waiting_ball_rides_paddle() {
        let mut state = reference_state();
        let input = TickInput {
            target_x: Some(200.0),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.paddle.center_x(), 200.0);
        assert_eq!(state.ball.pos, Vec2::new(200.0, 562.0));
    }

    #[test]
    fn test_keyboard_moves_paddle_while_playing() {
        let mut state = playing_state(GameConfig::default());
        let right = TickInput {
            direction: 1,
            ..Default::default()
        };
        tick(&mut state, &right, DT);
        assert!((state.paddle.pos.x - 333.0).abs() < 1e-4);

        state.paddle.pos.x = 2.0;
        let left = TickInput {
            direction: -1,
            ..Default::default()
        };
        tick(&mut state, &left, DT);
        assert_eq!(state.paddle.pos.x, 0.0);
    }

    #[test]
    fn test_paddle_bounce_sends_ball_up() {
        let mut state = playing_state(GameConfig::default());
        state.ball.pos = Vec2::new(400.0, 560.0);
        state.ball.vel = Vec2::new(0.0, 4.0);

        tick(&mut state, &TickInput::default(), DT);
        assert!(state.ball.vel.y < 0.0);
        assert_eq!(state.ball.pos.y, state.paddle.pos.y - state.ball.radius);
        // Center hit at full width goes straight up at base speed
        assert!(state.ball.vel.x.abs() < 1e-5);
        assert!((state.ball.vel.length() - state.base_speed()).abs() < 1e-4);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PaddleHit { offset: 0.0 }]
        );
    }

    #[test]
    fn test_classic_paddle_bounce_keeps_dx() {
        let mut state = playing_state(GameConfig::classic());
        state.ball.pos = Vec2::new(420.0, 560.0);
        state.ball.vel = Vec2::new(3.0, 4.0);

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.ball.vel, Vec2::new(3.0, -4.0));
    }

    #[test]
    fn test_squeezed_paddle_raises_power_and_speed() {
        let mut state = reference_state();
        let squeeze = TickInput {
            pressed: true,
            ..Default::default()
        };
        for _ in 0..20 {
            tick(&mut state, &squeeze, 0.1);
        }
        assert_eq!(state.paddle.width, state.paddle.min_width);
        assert!(state.paddle.at_min_width);

        let launch = TickInput {
            pressed: true,
            start: true,
            ..Default::default()
        };
        tick(&mut state, &launch, DT);
        assert_eq!(state.penetration.power, 5);

        // Landing on the squeezed paddle doubles the speed
        state.ball.pos = Vec2::new(state.paddle.center_x(), 560.0);
        state.ball.vel = Vec2::new(0.0, 4.0);
        tick(&mut state, &squeeze, DT);
        assert!((state.ball.vel.length() - 2.0 * state.base_speed()).abs() < 1e-3);
    }

    fn fire_up_column_zero(state: &mut GameState) {
        state.ball.pos = Vec2::new(40.0, 240.0);
        state.ball.vel = Vec2::new(0.0, -4.0);
        for _ in 0..60 {
            tick(state, &TickInput::default(), DT);
            if state.ball.vel.y > 0.0 {
                break;
            }
        }
    }

    #[test]
    fn test_classic_reflects_on_first_brick() {
        let mut state = playing_state(GameConfig::classic());
        fire_up_column_zero(&mut state);

        assert!(state.ball.vel.y > 0.0);
        assert_eq!(state.score, 10);
        assert_eq!(state.remaining, 44);
        assert!(!state.bricks[4 * 9].visible);
        assert!(state.bricks[3 * 9].visible);
    }

    #[test]
    fn test_long_frame_reflects_off_bricks_once() {
        // Two single-brick rows with a 40 px gap the ball can cross
        let config = GameConfig {
            grid: GridSpec::Fixed {
                rows: 2,
                cols: 1,
                width: 80.0,
                height: 25.0,
                padding: 40.0,
                offset_x: 0.0,
                offset_y: 60.0,
            },
            ..GameConfig::classic()
        };
        let mut state = playing_state(config);
        state.ball.pos = Vec2::new(40.0, 105.0);
        state.ball.vel = Vec2::new(0.0, -12.0);

        // Six substeps: up into row 0, back down through the gap into row 1
        tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(state.remaining_bricks(), 0);
        assert_eq!(state.score, 20);
        assert_eq!(state.ball.vel.y, 12.0);
    }

    #[test]
    fn test_penetration_ploughs_through_power_bricks() {
        let config = GameConfig {
            penetration: Some(PenetrationConfig {
                min_power: 3,
                max_power: 3,
                fallback_power: 3,
            }),
            ..GameConfig::default()
        };
        let mut state = playing_state(config);
        state.penetration.power = 3;
        fire_up_column_zero(&mut state);

        assert!(state.ball.vel.y > 0.0);
        assert_eq!(state.score, 30);
        for row in 2..5 {
            assert!(!state.bricks[row * 9].visible);
        }
        assert!(state.bricks[9].visible);
        assert!(state.bricks[0].visible);
        assert_eq!(state.penetration.destroyed, 0);
    }

    #[test]
    fn test_clearing_every_brick() {
        let mut state = playing_state(GameConfig::default());
        let centers: Vec<Vec2> = state
            .bricks
            .iter()
            .map(|b| b.pos + state.layout.cell_size() / 2.0)
            .collect();

        for center in centers {
            state.ball.pos = center;
            state.ball.vel = Vec2::ZERO;
            tick(&mut state, &TickInput::default(), DT);
        }

        assert_eq!(state.score, 450);
        assert_eq!(state.remaining_bricks(), 0);
        assert_eq!(state.phase, GamePhase::Cleared);

        let events = state.drain_events();
        let destroyed = events
            .iter()
            .filter(|e| matches!(e, GameEvent::BrickDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 45);
        assert_eq!(events.last(), Some(&GameEvent::Cleared));

        // Terminal: nothing moves any more
        let frame = state.frame;
        tick(
            &mut state,
            &TickInput {
                start: true,
                direction: 1,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.frame, frame);
        assert_eq!(state.phase, GamePhase::Cleared);
    }

    #[test]
    fn test_three_bottom_outs_end_the_game() {
        let mut state = reference_state();
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let mut game_overs = 0;

        for round in 0..3 {
            tick(&mut state, &start, DT);
            assert_eq!(state.phase, GamePhase::Playing);

            // Away from the paddle, about to drop out
            state.ball.pos = Vec2::new(100.0, 595.0);
            state.ball.vel = Vec2::new(0.0, 4.0);
            tick(&mut state, &TickInput::default(), DT);

            let events = state.drain_events();
            assert!(events.contains(&GameEvent::LifeLost {
                lives_left: 2 - round
            }));
            let over = events.iter().filter(|e| **e == GameEvent::GameOver).count();
            if round < 2 {
                assert_eq!(over, 0);
                assert_eq!(state.phase, GamePhase::Waiting);
                assert_eq!(state.ball.pos, Vec2::new(400.0, 562.0));
            }
            game_overs += over;
        }

        assert_eq!(game_overs, 1);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);

        tick(&mut state, &start, DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut state = reference_state();
        state.phase = GamePhase::GameOver;
        state.lives = 0;
        state.score = 90;

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, DT);
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.remaining_bricks(), 45);
    }

    #[test]
    fn test_determinism() {
        let mut a = reference_state();
        let mut b = reference_state();
        let inputs = [
            TickInput {
                start: true,
                ..Default::default()
            },
            TickInput {
                direction: 1,
                pressed: true,
                ..Default::default()
            },
            TickInput {
                target_x: Some(120.0),
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..50 {
            for input in &inputs {
                tick(&mut a, input, DT);
                tick(&mut b, input, DT);
            }
        }
        assert_eq!(a.ball.pos, b.ball.pos);
        assert_eq!(a.score, b.score);
        assert_eq!(a.bricks, b.bricks);
    }

    fn arb_input() -> impl Strategy<Value = (TickInput, f32)> {
        (
            -1i8..=1,
            prop::option::of(-2000.0f32..2000.0),
            -500.0f32..500.0,
            any::<bool>(),
            prop::bool::weighted(0.1),
            0.0f32..0.2,
        )
            .prop_map(|(direction, target_x, drag_dx, pressed, start, dt)| {
                (
                    TickInput {
                        direction,
                        target_x,
                        drag_dx,
                        pressed,
                        start,
                        restart: false,
                    },
                    dt,
                )
            })
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_in_bounds(inputs in prop::collection::vec(arb_input(), 1..80)) {
            let mut state = reference_state();
            for (input, dt) in &inputs {
                tick(&mut state, input, *dt);
                prop_assert!(state.paddle.pos.x >= 0.0);
                prop_assert!(state.paddle.right() <= state.width + 1e-3);
                prop_assert!(state.paddle.width >= state.paddle.min_width - 1e-3);
                prop_assert!(state.paddle.width <= state.paddle.default_width + 1e-3);
            }
        }

        #[test]
        fn prop_ball_stays_inside_walls(inputs in prop::collection::vec(arb_input(), 1..120)) {
            let mut state = reference_state();
            for (input, dt) in &inputs {
                tick(&mut state, input, *dt);
                prop_assert!(state.ball.left() >= -1e-3);
                prop_assert!(state.ball.right() <= state.width + 1e-3);
                prop_assert!(state.ball.top() >= -1e-3);
            }
        }

        #[test]
        fn prop_destroyed_bricks_stay_destroyed(
            inputs in prop::collection::vec(arb_input(), 1..150),
            seed in any::<u64>(),
        ) {
            let mut state = GameState::new(GameConfig::default(), 800.0, 600.0, seed).unwrap();
            for (input, dt) in &inputs {
                let before: Vec<bool> = state.bricks.iter().map(|b| b.visible).collect();
                tick(&mut state, input, *dt);
                for (was, brick) in before.iter().zip(&state.bricks) {
                    prop_assert!(*was || !brick.visible);
                }
                let visible = state.bricks.iter().filter(|b| b.visible).count();
                prop_assert_eq!(visible, state.remaining);
                let destroyed = (state.total_bricks() - visible) as u32;
                prop_assert_eq!(state.score, destroyed * state.config.brick_value);
            }
        }
    }
}
