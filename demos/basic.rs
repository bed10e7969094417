//! Basic example of using the Country Quiz engine

use quiz_core::{
    build_catalog, game_share_text, score, Action, CatalogSource, ClueType, Difficulty, GameState,
    JsonCatalogSource, ShareLink,
};

fn main() {
    // Load the bundled catalog
    let raws = JsonCatalogSource::bundled()
        .fetch()
        .expect("bundled catalog is valid");
    let catalog = build_catalog(&raws);
    println!("Catalog: {} countries, most populous {}\n", catalog.len(), catalog[0].name);

    // Start a reproducible game
    let mut game = GameState::new();
    let seed = game
        .start_new_game(&catalog, Difficulty::Easy, Some(42))
        .expect("catalog is not empty");
    println!("Seed {seed} selects:");
    for (i, country) in game.selected_countries().iter().enumerate() {
        println!("  Round {}: {}", i + 1, country.name);
    }

    // Play each round: a couple of clues, one wrong guess, then the answer
    for round in 0..game.playable_rounds() {
        if round > 0 {
            game.apply(Action::NextRound);
        }
        let Some(country) = game.current_country().cloned() else {
            break;
        };
        for clue in ClueType::ALL.iter().take(round % 3) {
            game.apply(Action::RevealClue(*clue));
            println!("\n{}: {}", clue.label(), country.clue_text(*clue));
        }
        if round % 2 == 1 {
            game.apply(Action::MakeGuess("Atlantis".into()));
        }
        game.apply(Action::MakeGuess(country.name.clone()));
        println!(
            "Round {} -> {} for {} points",
            game.round_number(),
            country.name,
            game.score()
        );
    }

    println!("\nPending stats events: {}", game.drain_events().len());
    println!("\n{}", game_share_text(&game, "https://country-quiz.app/"));

    // Scoring table
    println!("\n--- Scores by clues revealed and guesses left ---\n");
    for clues in 0..=ClueType::ALL.len() {
        let row: Vec<String> = (0..=2).rev().map(|left| format!("{:>5}", score(clues, left))).collect();
        println!("{clues} clues: {}", row.join(""));
    }

    // Parse a share link back into a game
    let link: ShareLink = "https://country-quiz.app/?seed=42&difficulty=easy"
        .parse()
        .expect("valid share link");
    println!("\nShare link replays seed {} on {}", link.seed, link.difficulty);
}
