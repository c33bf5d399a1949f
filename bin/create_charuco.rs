//! ChArUco Board Generator
//!
//! Renders a ChArUco calibration board to a PNG sized for printing. There
//! are no flags; edit the configuration below and rerun.
//!
//! Usage:
//!   cargo run --bin create_charuco

use calib_tools::target::{builtins, generate_board, CharucoBoardConfig};
use calib_tools::PageFormat;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = CharucoBoardConfig {
        columns: 5,
        rows: 7,
        square_size: 0.035,
        marker_size: 0.0275,
        page_format: PageFormat::A4,
        dictionary: builtins::DICT_6X6_1000,
    };

    println!("🎯 ChArUco Board Generator");
    println!("==========================");
    println!(
        "Board: {}x{} squares, square {} m, marker {} m",
        config.columns, config.rows, config.square_size, config.marker_size
    );
    println!(
        "Page: {} ({} markers)",
        config.page_format.name(),
        config.dictionary.name
    );

    let board = generate_board(&config)?;
    println!("✓ Rendered board: {}x{} px", board.width(), board.height());

    let filename = format!("{}.png", config.output_stem());
    board.save(&filename)?;
    println!("✓ Saved board to: {filename}");

    Ok(())
}
