use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;

use client::assets::TextureCache;
use client::input::{self, InputController};
use client::network::Session;
use client::rendering::{self, ScreenSurface};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server websocket URL
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080/ws")]
    server: String,

    /// Username sent with the join handshake
    #[arg(short = 'u', long, default_value = "wanderer")]
    username: String,

    /// World background image
    #[arg(long, default_value = "assets/world.png")]
    world_image: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Meadow".to_string(),
        window_width: args.width,
        window_height: args.height,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("connecting to {}", args.server);
    info!("Controls: WASD or arrow keys to move, Escape to quit");

    let world = match load_texture(&args.world_image).await {
        Ok(texture) => texture,
        Err(err) => {
            error!("failed to load world image {}: {}", args.world_image, err);
            return;
        }
    };

    let mut session = Session::connect(&args.server, &args.username);
    let mut controller = InputController::new();
    let mut cache = TextureCache::new();

    loop {
        session.pump(&mut cache);

        for key in input::MOVEMENT_KEYS {
            if is_key_pressed(key) {
                if let Some(intent) = controller.key_down(key) {
                    session.send_intent(intent);
                }
            }
            if is_key_released(key) {
                if let Some(intent) = controller.key_up(key) {
                    session.send_intent(intent);
                }
            }
        }

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let mut surface = ScreenSurface::new(&world, &cache);
        rendering::render(session.store(), &mut surface);
        rendering::draw_status(
            session.connection(),
            session.status(),
            session.store().player_count(),
        );

        next_frame().await;
    }

    // Dropping the session closes the outbound channel, which shuts the
    // socket down from the transport thread.
    drop(session);
}
