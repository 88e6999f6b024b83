//! Blockbreak entry point
//!
//! In the browser this binds the game to `#canvas`; natively it plays a
//! headless demo round and logs the result.

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use blockbreak::platform::web::WebGame;
    use blockbreak::platform::{DEFAULT_BACKDROPS, pick_backdrop};
    use blockbreak::{GameConfig, Settings};

    thread_local! {
        static GAME: RefCell<Option<WebGame>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn wasm_main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        let seed = js_sys::Date::now() as u64;
        let backdrop = pick_backdrop(DEFAULT_BACKDROPS, seed);
        let game = WebGame::start(
            "canvas",
            GameConfig::default(),
            Settings::default(),
            backdrop,
            seed,
        )
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

        GAME.with(|slot| *slot.borrow_mut() = Some(game));
        Ok(())
    }

    /// Tear the game down: cancels the frame loop and removes listeners
    #[wasm_bindgen]
    pub fn stop() {
        GAME.with(|slot| drop(slot.borrow_mut().take()));
    }

    #[wasm_bindgen]
    pub fn restart() {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                game.restart();
            }
        });
    }

    /// Register a HUD observer; receives the HUD as a JSON string
    #[wasm_bindgen(js_name = onHud)]
    pub fn on_hud(callback: js_sys::Function) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                game.set_hud_callback(callback);
            }
        });
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = native::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use blockbreak::consts::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
    use blockbreak::platform::run_headless;
    use blockbreak::{Error, Game, GameConfig, Settings};

    /// Five minutes at 60 FPS
    const MAX_FRAMES: u64 = 60 * 60 * 5;

    pub fn run() -> Result<(), Error> {
        let config = match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading config from {}", path);
                GameConfig::from_json(&std::fs::read_to_string(path)?)?
            }
            None => GameConfig::default(),
        };
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        log::info!("Blockbreak (native) starting headless demo round");
        let mut game = Game::new(
            config,
            Settings::default(),
            REFERENCE_WIDTH,
            REFERENCE_HEIGHT,
            seed,
        )?;
        let hud = run_headless(&mut game, MAX_FRAMES);
        println!(
            "{:?}: score {}, lives {}, bricks {}/{}",
            hud.phase, hud.score, hud.lives, hud.remaining, hud.total
        );
        Ok(())
    }
}
