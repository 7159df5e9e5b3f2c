use std::env;

use log::{info, warn};

use glossa_core::{Lexicon, LexiconOptions, LanguageModel, RngEntropy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Model file, "./data/language_model.json" unless given as first argument
    let path = env::args().nth(1).unwrap_or_else(|| "./data/language_model.json".to_owned());
    info!("loading model from {}", path);

    // One entropy source for the whole run.
    // Swap in `RngEntropy::new(StdRng::seed_from_u64(n))` for reproducible output
    let mut entropy = RngEntropy::new(rand::rng());

    // Sticky phonemes are drawn here, once per load
    let model = LanguageModel::from_file(&path, &mut entropy)?;
    info!("{} languages, {} concepts", model.languages().len(), model.concepts().len());

    for language in model.languages() {
        println!("== {}", language.name());

        // Sound changes, in the order they are applied
        for rule in language.rules() {
            println!("  rule: {}", rule);
        }

        // A few base words per register
        for register in language.register_names() {
            let words = (0..5)
                .map(|_| language.generate_word(register, &mut entropy))
                .collect::<Result<Vec<_>, _>>()?;
            println!("  {}: {}", register, words.join(", "));
        }

        // One word per concept (generation + sound changes), avoiding homophones
        let options = LexiconOptions { nb_try: 10, ..LexiconOptions::default() };
        match Lexicon::build(language, model.concepts(), &options, &mut entropy) {
            Ok(lexicon) => {
                for entry in lexicon.entries() {
                    println!("  {} -> {}", entry.concept, entry.word);
                }
            }
            Err(e) => warn!("no lexicon for {}: {}", language.name(), e),
        }
    }

    // Drift an old word through the rules of a later stage
    if let (Some(old), Some(late), Some(concept)) =
        (model.languages().first(), model.languages().last(), model.concept("Water"))
    {
        let word = old.generate_word("default", &mut entropy)?;
        let drifted = late.apply_rules(concept, &word, &mut entropy);
        println!("{} ({}) -> {} ({})", word, old.name(), drifted, late.name());
    }

    Ok(())
}
