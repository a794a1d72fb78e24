use life_torus::{
    config::Settings,
    draw,
    prompt,
    Grid,
    Simulation,
};

use std::{
    env, fs,
    io::{stdin, stdout},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut input = stdin().lock();
    let mut output = stdout();

    let (sim, settings) = match env::args().nth(1) {
        Some(path) => {
            let board = Grid::from_pattern(&fs::read_to_string(&path)?)?;
            log::info!("loaded pattern from {}", path);
            let mut settings = Settings {
                rows: board.rows(),
                cols: board.cols(),
                ..Settings::default()
            };
            draw::check_surface(&settings)?;

            settings.on_torus = prompt::ask_torus(&mut input, &mut output)?;
            (Simulation::from_grid(board, settings.on_torus), settings)
        }
        None => {
            let settings = prompt::settings_from_dialogue(&mut input, &mut output)?;
            settings.validate()?;
            draw::check_surface(&settings)?;

            let mut sim = Simulation::new(settings.rows, settings.cols, settings.on_torus)?;
            sim.randomize(settings.density)?;
            (sim, settings)
        }
    };
    drop(input);

    draw::run(sim, &settings)?;
    Ok(())
}
